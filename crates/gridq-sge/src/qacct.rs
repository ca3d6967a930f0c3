//! Query finished jobs via `qacct -j`.

use crate::error::SgeError;
use crate::types::{JobRecord, JobStatus};
use chrono::{DateTime, Utc};
use gridq_parsers::{non_empty_string, parse_qacct_timestamp, parse_seconds, split_key_value};
use std::collections::BTreeMap;

pub const QACCT: &str = "qacct";

/// Accounting keys passed through untouched in `JobRecord::native`.
const NATIVE_KEYS: &[&str] = &["hostname", "exit_status", "failed", "end_time", "granted_pe"];

pub fn qacct_args(job_id: &str) -> Vec<String> {
    vec!["-j".to_string(), job_id.to_string()]
}

/// Split qacct output into key/value blocks.
///
/// Each record starts with a rule of `=` characters.
fn split_blocks(output: &str) -> Vec<BTreeMap<&str, &str>> {
    let mut blocks = Vec::new();
    let mut current: BTreeMap<&str, &str> = BTreeMap::new();

    for line in output.lines() {
        if line.trim_start().starts_with("====") {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = split_key_value(line) {
            current.insert(key, value);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Parse an optional timestamp field; present-but-garbled is an error.
fn parse_time(
    block: &BTreeMap<&str, &str>,
    key: &str,
    job_id: &str,
) -> Result<Option<DateTime<Utc>>, SgeError> {
    match block.get(key) {
        None => Ok(None),
        Some(&"-/-") | Some(&"") => Ok(None),
        Some(raw) => parse_qacct_timestamp(raw).map(Some).ok_or_else(|| {
            SgeError::parse(QACCT, format!("bad {} '{}' for job {}", key, raw, job_id))
        }),
    }
}

/// Parse one accounting block into a completed record.
fn parse_block(block: &BTreeMap<&str, &str>) -> Result<JobRecord, SgeError> {
    let id = block
        .get("jobnumber")
        .copied()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SgeError::parse(QACCT, "record without jobnumber"))?;

    let allocated_procs = match block.get("slots") {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
            SgeError::parse(QACCT, format!("bad slots '{}' for job {}", raw, id))
        })?),
        None => None,
    };

    let wallclock_time = match block.get("ru_wallclock") {
        Some(raw) => Some(parse_seconds(raw).ok_or_else(|| {
            SgeError::parse(QACCT, format!("bad ru_wallclock '{}' for job {}", raw, id))
        })?),
        None => None,
    };

    let native: BTreeMap<String, String> = NATIVE_KEYS
        .iter()
        .filter_map(|key| {
            let value = non_empty_string(block.get(key)?)?;
            Some((key.to_string(), value))
        })
        .collect();

    Ok(JobRecord {
        id: id.to_string(),
        status: JobStatus::Completed,
        owner: block.get("owner").copied().and_then(non_empty_string),
        accounting_id: block.get("project").copied().and_then(non_empty_string),
        name: block.get("jobname").copied().and_then(non_empty_string),
        allocated_procs,
        queue_name: block.get("qname").copied().and_then(non_empty_string),
        submission_time: parse_time(block, "qsub_time", id)?,
        dispatch_time: parse_time(block, "start_time", id)?,
        wallclock_limit: None,
        wallclock_time,
        submit_host: None,
        native: Some(native).filter(|m| !m.is_empty()),
    })
}

/// Parse `qacct -j <id>` output into a single record.
///
/// When the id matches several accounting records (re-used ids, array
/// tasks) the last one wins.
pub fn parse_qacct_output(output: &str) -> Result<JobRecord, SgeError> {
    let blocks = split_blocks(output);
    if blocks.len() > 1 {
        tracing::debug!("qacct returned {} records, using the last", blocks.len());
    }
    let block = blocks
        .last()
        .ok_or_else(|| SgeError::parse(QACCT, "no accounting record in output"))?;
    parse_block(block)
}
