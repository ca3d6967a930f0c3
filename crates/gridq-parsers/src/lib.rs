//! Shared parsing utilities for Grid Engine command output.
//!
//! Command execution plus the small text and time helpers used by the
//! qstat and qacct parsers in gridq-sge.

pub mod command;
pub mod time;

pub use command::{run_command, CommandError, CommandRunner, ProcessRunner};
pub use time::{
    elapsed_secs, format_duration, parse_duration, parse_duration_secs, parse_qacct_timestamp,
    parse_seconds, parse_sge_timestamp,
};

/// Filter helper for optional string fields.
/// Returns None if the string is empty or a placeholder value.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "NONE" || trimmed == "undefined" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a `key value` line on the first run of whitespace.
///
/// Keys with no value yield an empty value; blank lines yield None.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((key, value)) => Some((key, value.trim())),
        None => Some((line, "")),
    }
}
