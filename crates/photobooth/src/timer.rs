//! Recording timer arithmetic.

use chrono::{DateTime, Utc};

/// Whole seconds elapsed between `started_at` and `now`.
///
/// A `now` earlier than `started_at` (clock adjustment) reads as zero.
#[must_use]
pub fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - started_at).num_milliseconds();
    u64::try_from(millis).map_or(0, |ms| ms / 1000)
}

/// Format seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so an hour-long clip reads `60:00`.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
