//! Command-line interface for photobooth.
//!
//! This module provides the CLI structure for the `pbooth` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ApplyCommand, ConfigCommand, FacingArg, FiltersCommand, PatternArg, SnapshotCommand,
};

/// pbooth - Camera snapshots with pixel filters
///
/// Applies the photobooth filter engine to image files and takes filtered
/// snapshots from the built-in test-pattern camera.
#[derive(Debug, Parser)]
#[command(name = "pbooth")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available filters
    Filters(FiltersCommand),

    /// Filter an image file
    Apply(ApplyCommand),

    /// Take a filtered photo with the test-pattern camera
    Snapshot(SnapshotCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
