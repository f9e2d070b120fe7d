//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::device::pattern::TestPattern;
use crate::device::FacingMode;
use crate::filter::FilterKind;

/// Filters command arguments.
#[derive(Debug, Args)]
pub struct FiltersCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Apply command arguments.
#[derive(Debug, Args)]
pub struct ApplyCommand {
    /// Image to read (PNG)
    pub input: PathBuf,

    /// Where to write the filtered PNG
    pub output: PathBuf,

    /// Filter to apply (see `pbooth filters`)
    #[arg(short, long, default_value = "none")]
    pub filter: FilterKind,

    /// Mirror horizontally before filtering, like the user-facing camera
    #[arg(short, long)]
    pub mirror: bool,
}

/// Snapshot command arguments.
#[derive(Debug, Args)]
pub struct SnapshotCommand {
    /// Filter to apply (defaults to the configured filter)
    #[arg(short, long)]
    pub filter: Option<FilterKind>,

    /// Camera to open (defaults to the configured facing mode)
    #[arg(long, value_enum)]
    pub facing: Option<FacingArg>,

    /// Test pattern rendered by the built-in camera
    #[arg(short, long, value_enum, default_value = "bars")]
    pub pattern: PatternArg,

    /// Directory to save the photo in (defaults to the configured one)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Camera argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FacingArg {
    /// Front camera, mirrored
    User,
    /// Back camera
    Environment,
}

impl From<FacingArg> for FacingMode {
    fn from(arg: FacingArg) -> Self {
        match arg {
            FacingArg::User => Self::User,
            FacingArg::Environment => Self::Environment,
        }
    }
}

/// Test pattern argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PatternArg {
    /// Eight vertical colour bars
    #[default]
    Bars,
    /// Black to white ramp
    Gradient,
    /// Flat mid grey
    Grey,
}

impl From<PatternArg> for TestPattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Bars => Self::ColorBars,
            PatternArg::Gradient => Self::Gradient,
            PatternArg::Grey => Self::Solid([128, 128, 128, 255]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_arg_conversion() {
        assert_eq!(FacingMode::from(FacingArg::User), FacingMode::User);
        assert_eq!(
            FacingMode::from(FacingArg::Environment),
            FacingMode::Environment
        );
    }

    #[test]
    fn test_pattern_arg_conversion() {
        assert_eq!(TestPattern::from(PatternArg::Bars), TestPattern::ColorBars);
        assert_eq!(TestPattern::from(PatternArg::Gradient), TestPattern::Gradient);
        assert_eq!(
            TestPattern::from(PatternArg::Grey),
            TestPattern::Solid([128, 128, 128, 255])
        );
    }

    #[test]
    fn test_pattern_arg_default() {
        assert_eq!(PatternArg::default(), PatternArg::Bars);
    }

    #[test]
    fn test_apply_command_debug() {
        let cmd = ApplyCommand {
            input: PathBuf::from("in.png"),
            output: PathBuf::from("out.png"),
            filter: FilterKind::Sepia,
            mirror: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Sepia"));
        assert!(debug_str.contains("mirror"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
