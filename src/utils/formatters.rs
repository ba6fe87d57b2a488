//! Human-readable rendering of manifest timestamps.

/// Formats epoch milliseconds as local time, or "never" for 0
#[must_use]
pub fn format_timestamp_millis(millis: i64) -> String {
    use chrono::{Local, TimeZone};

    if millis <= 0 {
        return "never".to_string();
    }
    Local.timestamp_millis_opt(millis).single().map_or_else(
        || format!("Invalid timestamp: {millis}"),
        |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Formats how long ago `millis` was, relative to `now_millis`
#[must_use]
pub fn format_relative_time(millis: i64, now_millis: i64) -> String {
    if millis <= 0 {
        return "never".to_string();
    }
    let diff = (now_millis - millis) / 1000;

    if diff < 0 {
        return "in the future".to_string();
    }

    let (value, unit) = if diff < 60 {
        (diff, "second")
    } else if diff < 3600 {
        (diff / 60, "minute")
    } else if diff < 86400 {
        (diff / 3600, "hour")
    } else if diff < 2_592_000 {
        (diff / 86400, "day")
    } else if diff < 31_536_000 {
        (diff / 2_592_000, "month")
    } else {
        (diff / 31_536_000, "year")
    };

    if value == 1 {
        format!("{value} {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}
