use std::time::Duration;

use chrono::{DateTime, Utc};

/// Format milliseconds as `m:ss`, rounded to the nearest second.
///
/// Rounding happens on the total so `59_500` renders as `1:00`, never `0:60`.
pub fn format_duration(ms: u64) -> String {
    let total_secs = (ms + 500) / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format a `Duration` as `MM:SS` (truncating partial seconds).
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Short human date for the "date added" column, empty when unknown.
pub fn format_added_at(added_at: Option<&DateTime<Utc>>) -> String {
    added_at
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}
