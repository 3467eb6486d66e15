//! Applied-at timestamps for generated changelog rows.

use chrono::Local;

/// Format of the applied-at stamp; fits the changelog's `VARCHAR(25)` column.
pub const APPLIED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// The current local time as an applied-at stamp, e.g. `2024-03-01 14:05:09.123`.
pub fn applied_timestamp() -> String {
    Local::now().format(APPLIED_AT_FORMAT).to_string()
}
