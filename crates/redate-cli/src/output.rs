use chrono::{FixedOffset, TimeZone};

use redate_core::Timestamp;

/// Format a key-value pair for display.
pub fn kv(key: &str, value: &str) -> String {
    format!("{key:>24}: {value}")
}

/// Format a header line.
pub fn header(title: &str) -> String {
    format!("=== {title} ===")
}

/// Render a timestamp in its own timezone, weekday included.
pub fn format_timestamp(ts: Timestamp) -> String {
    let rendered = FixedOffset::east_opt(ts.offset_minutes * 60)
        .and_then(|offset| offset.timestamp_opt(ts.seconds, 0).single());
    match rendered {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S %z (%a)").to_string(),
        None => format!("@{} {:+}m", ts.seconds, ts.offset_minutes),
    }
}
