//! Time parsing utilities for scheduler output.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Seconds with optional fraction and unit suffix: "361", "361s", "0.010s".
static SECONDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:\.\d*)?s?$").expect("seconds pattern is valid")
});

fn naive_to_utc(dt: NaiveDateTime) -> Option<DateTime<Utc>> {
    Utc.from_local_datetime(&dt).single()
}

/// Drop a trailing ".123" fraction from a timestamp or duration.
fn strip_fraction(s: &str) -> &str {
    s.split('.').next().unwrap_or(s)
}

/// Parse a qstat XML timestamp (YYYY-MM-DDTHH:MM:SS, optional fraction).
///
/// The scheduler emits these without a zone; they are read as UTC.
pub fn parse_sge_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(strip_fraction(s), "%Y-%m-%dT%H:%M:%S")
        .ok()
        .and_then(naive_to_utc)
}

/// Parse a qacct timestamp.
///
/// Accepts epoch seconds, the classic ctime form ("Thu Oct 25 13:16:29 2018")
/// and the newer "10/25/2018 13:16:29.123" form. Returns None for
/// placeholders such as "-/-".
pub fn parse_qacct_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() || s == "-/-" || s == "-" {
        return None;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
    }

    // ctime pads single-digit days with an extra space
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Ok(dt) = NaiveDateTime::parse_from_str(&collapsed, "%a %b %d %H:%M:%S %Y") {
        return naive_to_utc(dt);
    }

    NaiveDateTime::parse_from_str(strip_fraction(&collapsed), "%m/%d/%Y %H:%M:%S")
        .ok()
        .and_then(naive_to_utc)
}

/// Parse a duration in various formats.
///
/// Supports:
/// - D:HH:MM:SS
/// - HH:MM:SS
/// - MM:SS
/// - Seconds as integer
///
/// Returns None for "INFINITY" or empty strings.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("INFINITY") || s == "-" {
        return None;
    }

    let time_parts: Vec<u64> = strip_fraction(s)
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;

    // Oversized fields yield None rather than wrapping
    let (days, hours, mins, secs) = match time_parts.as_slice() {
        [d, h, m, s] => (*d, *h, *m, *s),
        [h, m, s] => (0, *h, *m, *s),
        [m, s] => (0, 0, *m, *s),
        [s] => (0, 0, 0, *s),
        _ => return None,
    };
    let seconds = days
        .checked_mul(86400)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(mins.checked_mul(60)?)?
        .checked_add(secs)?;

    Some(Duration::from_secs(seconds))
}

/// Like `parse_duration` but returns seconds as u64 instead of Duration.
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    parse_duration(s).map(|d| d.as_secs())
}

/// Parse an accounting usage value in whole seconds ("361", "361s", "361.000").
pub fn parse_seconds(s: &str) -> Option<u64> {
    SECONDS_RE
        .captures(s.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Whole seconds from `start` until `now`, zero if `start` is in the future.
pub fn elapsed_secs(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_seconds().max(0) as u64
}

/// Format seconds as human-readable duration (e.g., "1d 02:30:00", "01:30:00", "05:30").
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 24 {
        let days = hours / 24;
        let hours = hours % 24;
        format!("{}d {:02}:{:02}:{:02}", days, hours, mins, secs)
    } else if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}
