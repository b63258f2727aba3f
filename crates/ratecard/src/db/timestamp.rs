//! Timestamp encoding for the `created_at` pagination key.
//!
//! Timestamps are stored as fixed-width UTC text with microsecond precision
//! (`2024-01-01T00:00:00.000000Z`), so lexicographic order in SQLite equals
//! chronological order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};

const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Current time truncated to the stored precision.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format(STORAGE_FORMAT).to_string()
}

/// Parses an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Normalizes a client-supplied cursor into the stored encoding.
/// Returns `None` for anything unparsable.
pub fn normalize_cursor(cursor: &str) -> Option<String> {
    parse_timestamp(cursor).map(format_timestamp)
}

/// Inclusive lower bound covering the whole of `date`.
pub fn start_of_day(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| format_timestamp(naive.and_utc()))
        .unwrap_or_else(|| format!("{}T00:00:00.000000Z", date))
}

/// Inclusive upper bound covering the whole of `date`.
pub fn end_of_day(date: NaiveDate) -> String {
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .map(|naive| format_timestamp(naive.and_utc()))
        .unwrap_or_else(|| format!("{}T23:59:59.999999Z", date))
}
