//! Timestamp utilities

use chrono::{NaiveDateTime, Utc};

/// Storage format for every timestamp column written by roster
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp without offset, as stored in the target
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Render a timestamp in the storage format
pub fn format_db_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}
