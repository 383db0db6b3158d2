use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use serde_json::Value;

/// Parse an ISO8601 timestamp as returned by the YouTube API.
pub fn parse_iso8601(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }
    date_str.parse::<DateTime<Utc>>().ok()
}

/// Read a counter field leniently.
///
/// YouTube encodes counts as decimal strings. Missing, negative or non-numeric
/// values count as zero so one odd field never aborts a run.
pub fn parse_count(value: &Value, field: &str) -> u64 {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        Value::Null => return 0,
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        warn!("Ignoring non-numeric {field}: {value}");
        0
    })
}

/// Date column of the stats sheet, e.g. `18/10/2026`.
pub fn format_sheet_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d/%m/%Y").to_string()
}

/// Time column of the stats sheet, e.g. `06:00:04`.
pub fn format_sheet_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}

/// PEM keys pasted into a `.env` file usually carry literal `\n` sequences.
pub fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
