//! Logging setup for photobooth.
//!
//! Installs the `tracing` subscriber used by the `pbooth` binary. Library code
//! only emits events; it never installs a subscriber itself. Events come from
//! two targets, the `photobooth` library and the `pbooth` binary, and both
//! follow the same verbosity.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets that receive the verbosity level.
pub const LOG_TARGETS: [&str; 2] = ["photobooth", "pbooth"];

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Camera, recording and export milestones.
    #[default]
    Normal,
    /// State transitions, codec negotiation and stream details.
    Verbose,
    /// Per-frame and per-chunk events.
    Trace,
}

impl Verbosity {
    /// Map `-v` counts and `-q` to a verbosity. `quiet` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Convert verbosity to a tracing level.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// `EnvFilter` directive giving every photobooth target this level.
    #[must_use]
    pub fn directive(&self) -> String {
        let level = self.to_level_filter();
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Pick the filter directive: a usable `RUST_LOG` value, else `verbosity`.
///
/// Blank or unparsable `RUST_LOG` values fall back to the verbosity directive
/// so a typo never silences the camera logs.
#[must_use]
pub fn resolve_directive(verbosity: Verbosity, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(env) if !env.is_empty() && env.parse::<EnvFilter>().is_ok() => env.to_string(),
        _ => verbosity.directive(),
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG` takes precedence over `verbosity`.
///
/// # Examples
///
/// ```no_run
/// use photobooth::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_directive(verbosity, rust_log.as_deref());

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(&directive))
        .with(
            fmt::layer()
                .with_target(verbosity != Verbosity::Normal)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        );

    // Ignore the error if a subscriber is already installed
    if subscriber.try_init().is_ok() {
        tracing::debug!(directive = %directive, "Logging initialized");
    }
}

/// Initialize logging for tests.
///
/// Only warnings and errors are shown to keep test output clean.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
