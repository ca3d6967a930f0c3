//! Query live jobs via `qstat -r -xml`.

use crate::error::SgeError;
use crate::types::{JobRecord, JobStatus};
use chrono::{DateTime, Utc};
use gridq_parsers::{elapsed_secs, non_empty_string, parse_duration_secs, parse_sge_timestamp};
use roxmltree::{Document, Node};
use std::collections::BTreeMap;

pub const QSTAT: &str = "qstat";

/// Build the qstat argument list, with `-u <owner>` last when filtering.
pub fn qstat_args(owner: Option<&str>) -> Vec<String> {
    let mut args = vec!["-r".to_string(), "-xml".to_string()];
    if let Some(owner) = owner {
        args.push("-u".to_string());
        args.push(owner.to_string());
    }
    args
}

/// Trimmed, non-empty text of the first child element named `tag`.
fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Text of the `<hard_request name="...">` child for a given resource.
fn hard_request<'a>(node: Node<'a, '_>, resource: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name("hard_request") && c.attribute("name") == Some(resource))
        .and_then(|c| c.text())
        .map(str::trim)
}

/// Map the `job_list` group and the job's state code to a status.
///
/// The group attribute decides running vs pending; within pending an
/// `h` in the state code (e.g. "hqw") marks a hold.
fn parse_status(group: Option<&str>, state_code: Option<&str>) -> JobStatus {
    match group {
        Some("running") => JobStatus::Running,
        Some("pending") if state_code.is_some_and(|c| c.contains('h')) => JobStatus::QueuedHeld,
        Some("pending") => JobStatus::Queued,
        _ => JobStatus::Undetermined,
    }
}

fn parse_slots(node: Node<'_, '_>, job_id: &str) -> Option<u32> {
    let raw = child_text(node, "slots")?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::warn!("Ignoring unparsable slots '{}' for job {}", raw, job_id);
    }
    parsed
}

fn parse_time_field(node: Node<'_, '_>, tag: &str, job_id: &str) -> Option<DateTime<Utc>> {
    let raw = child_text(node, tag)?;
    let parsed = parse_sge_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!("Ignoring unparsable {} '{}' for job {}", tag, raw, job_id);
    }
    parsed
}

/// Parse a single `<job_list>` element.
fn parse_job_list(node: Node<'_, '_>, now: DateTime<Utc>) -> Result<JobRecord, SgeError> {
    let id = child_text(node, "JB_job_number")
        .ok_or_else(|| SgeError::parse(QSTAT, "job_list without JB_job_number"))?;

    let group = node.attribute("state");
    let state_code = child_text(node, "state");
    let status = parse_status(group, state_code);
    if status == JobStatus::Undetermined {
        tracing::debug!("Job {} listed under unknown group {:?}", id, group);
    }

    // queue_name is "queue@host" once dispatched, empty while pending
    let (queue_instance, exec_host) = match child_text(node, "queue_name") {
        Some(q) => match q.split_once('@') {
            Some((queue, host)) => (Some(queue), non_empty_string(host)),
            None => (Some(q), None),
        },
        None => (None, None),
    };
    let queue_name = child_text(node, "hard_req_queue")
        .or(queue_instance)
        .map(str::to_string);

    let dispatch_time = if status == JobStatus::Running {
        let start = parse_time_field(node, "JAT_start_time", id);
        if start.is_none() {
            return Err(SgeError::parse(
                QSTAT,
                format!("running job {} has no JAT_start_time", id),
            ));
        }
        start
    } else {
        None
    };

    let wallclock_time = match dispatch_time {
        Some(start) => elapsed_secs(start, now),
        None => 0,
    };

    let mut native = BTreeMap::new();
    if let Some(code) = state_code {
        native.insert("state".to_string(), code.to_string());
    }
    if let Some(host) = exec_host {
        native.insert("exec_host".to_string(), host);
    }

    Ok(JobRecord {
        id: id.to_string(),
        status,
        owner: child_text(node, "JB_owner").map(str::to_string),
        accounting_id: child_text(node, "JB_project").and_then(non_empty_string),
        name: child_text(node, "JB_name").map(str::to_string),
        allocated_procs: parse_slots(node, id),
        queue_name,
        submission_time: parse_time_field(node, "JB_submission_time", id),
        dispatch_time,
        wallclock_limit: hard_request(node, "h_rt").and_then(parse_duration_secs),
        wallclock_time: Some(wallclock_time),
        submit_host: None,
        native: Some(native).filter(|m| !m.is_empty()),
    })
}

/// Parse `qstat -r -xml` output into records, in document order.
///
/// Blank output means no jobs. Output that is not well-formed XML, or
/// whose root is not `<job_info>`, is a parse error.
pub fn parse_qstat_xml(xml: &str, now: DateTime<Utc>) -> Result<Vec<JobRecord>, SgeError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc = Document::parse(xml).map_err(|e| SgeError::parse(QSTAT, e.to_string()))?;
    let root = doc.root_element();
    if !root.has_tag_name("job_info") {
        return Err(SgeError::parse(
            QSTAT,
            format!("unexpected root element <{}>", root.tag_name().name()),
        ));
    }

    root.descendants()
        .filter(|n| n.has_tag_name("job_list"))
        .map(|n| parse_job_list(n, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const QSTAT_XML: &str = include_str!("../fixtures/qstat.xml");

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn queued(id: &str, name: &str, project: Option<&str>, submitted: DateTime<Utc>) -> JobRecord {
        JobRecord {
            owner: Some("vagrant".to_string()),
            accounting_id: project.map(str::to_string),
            name: Some(name.to_string()),
            allocated_procs: Some(1),
            queue_name: Some("general.q".to_string()),
            submission_time: Some(submitted),
            wallclock_limit: Some(360),
            wallclock_time: Some(0),
            native: Some(BTreeMap::from([("state".to_string(), "qw".to_string())])),
            ..JobRecord::new(id, JobStatus::Queued)
        }
    }

    /// The four jobs in the fixture, as listed at `now`.
    fn fixture_jobs(now: DateTime<Utc>) -> Vec<JobRecord> {
        let started = ts(2018, 10, 10, 14, 37, 16);
        let running = JobRecord {
            owner: Some("vagrant".to_string()),
            accounting_id: Some("project_a".to_string()),
            name: Some("job_15".to_string()),
            allocated_procs: Some(1),
            queue_name: Some("general.q".to_string()),
            dispatch_time: Some(started),
            wallclock_limit: Some(360),
            wallclock_time: Some(elapsed_secs(started, now)),
            native: Some(BTreeMap::from([
                ("exec_host".to_string(), "worker1".to_string()),
                ("state".to_string(), "r".to_string()),
            ])),
            ..JobRecord::new("88", JobStatus::Running)
        };
        let held = JobRecord {
            status: JobStatus::QueuedHeld,
            native: Some(BTreeMap::from([("state".to_string(), "hqw".to_string())])),
            ..queued("44", "c_d", None, ts(2018, 10, 9, 18, 35, 12))
        };
        vec![
            running,
            queued("1045", "job_RQ", Some("project_b"), ts(2018, 10, 9, 18, 47, 5)),
            queued("1046", "job_RR", None, ts(2018, 10, 9, 18, 47, 5)),
            held,
        ]
    }

    #[test]
    fn test_qstat_args() {
        assert_eq!(qstat_args(None), vec!["-r", "-xml"]);
        assert_eq!(
            qstat_args(Some("vagrant")),
            vec!["-r", "-xml", "-u", "vagrant"]
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(Some("running"), Some("r")), JobStatus::Running);
        assert_eq!(parse_status(Some("running"), Some("hr")), JobStatus::Running);
        assert_eq!(parse_status(Some("pending"), Some("qw")), JobStatus::Queued);
        assert_eq!(
            parse_status(Some("pending"), Some("hqw")),
            JobStatus::QueuedHeld
        );
        assert_eq!(parse_status(Some("pending"), None), JobStatus::Queued);
        assert_eq!(parse_status(Some("zombie"), None), JobStatus::Undetermined);
        assert_eq!(parse_status(None, Some("r")), JobStatus::Undetermined);
    }

    #[test]
    fn test_parse_fixture() {
        let now = ts(2018, 10, 10, 14, 43, 16);
        let jobs = parse_qstat_xml(QSTAT_XML, now).unwrap();
        assert_eq!(jobs, fixture_jobs(now));
        assert_eq!(jobs[0].wallclock_time, Some(360));
    }

    #[test]
    fn test_parse_fixture_order_and_groups() {
        let jobs = parse_qstat_xml(QSTAT_XML, Utc::now()).unwrap();
        let summary: Vec<(&str, JobStatus, Option<&str>)> = jobs
            .iter()
            .map(|j| (j.id.as_str(), j.status, j.accounting_id.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("88", JobStatus::Running, Some("project_a")),
                ("1045", JobStatus::Queued, Some("project_b")),
                ("1046", JobStatus::Queued, None),
                ("44", JobStatus::QueuedHeld, None),
            ]
        );

        for job in &jobs {
            match job.status {
                JobStatus::Running => assert!(job.dispatch_time.is_some()),
                _ => {
                    assert!(job.dispatch_time.is_none());
                    assert!(job.submission_time.is_some());
                    assert_eq!(job.wallclock_time, Some(0));
                }
            }
        }
    }

    #[test]
    fn test_empty_output_is_no_jobs() {
        assert!(parse_qstat_xml("", Utc::now()).unwrap().is_empty());
        assert!(parse_qstat_xml("  \n", Utc::now()).unwrap().is_empty());

        let empty = "<?xml version='1.0'?>\n<job_info>\n  <queue_info>\n  </queue_info>\n  <job_info>\n  </job_info>\n</job_info>\n";
        assert!(parse_qstat_xml(empty, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = parse_qstat_xml("<job_info><queue_info>", Utc::now()).unwrap_err();
        assert!(matches!(err, SgeError::ParseError { command: "qstat", .. }));

        let err = parse_qstat_xml("error: commlib error", Utc::now()).unwrap_err();
        assert!(matches!(err, SgeError::ParseError { .. }));
    }

    #[test]
    fn test_wrong_root_is_parse_error() {
        let err = parse_qstat_xml("<queue_info/>", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("unexpected root element <queue_info>"));
    }

    #[test]
    fn test_job_without_number_is_parse_error() {
        let xml = r#"<job_info><job_info><job_list state="pending"><JB_name>x</JB_name></job_list></job_info></job_info>"#;
        let err = parse_qstat_xml(xml, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("JB_job_number"));
    }

    #[test]
    fn test_running_job_without_start_is_parse_error() {
        let xml = r#"<job_info><queue_info><job_list state="running"><JB_job_number>7</JB_job_number><state>r</state></job_list></queue_info></job_info>"#;
        let err = parse_qstat_xml(xml, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("running job 7"));
    }

    #[test]
    fn test_queue_falls_back_to_queue_instance() {
        let xml = r#"<job_info><queue_info>
            <job_list state="running">
              <JB_job_number>9</JB_job_number>
              <state>r</state>
              <JAT_start_time>2018-10-10T14:37:16.120</JAT_start_time>
              <queue_name>long.q@node07.cluster</queue_name>
              <slots>8</slots>
              <hard_request name="h_rt" resource_contribution="0.000000">1:00:00</hard_request>
            </job_list>
          </queue_info></job_info>"#;
        let now = ts(2018, 10, 10, 15, 37, 16);
        let jobs = parse_qstat_xml(xml, now).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.queue_name.as_deref(), Some("long.q"));
        assert_eq!(job.native_value("exec_host"), Some("node07.cluster"));
        assert_eq!(job.allocated_procs, Some(8));
        assert_eq!(job.wallclock_limit, Some(3600));
        assert_eq!(job.wallclock_time, Some(3600));
        assert!(job.owner.is_none());
        assert!(job.accounting_id.is_none());
    }

    #[test]
    fn test_oversized_h_rt_is_absent() {
        let xml = r#"<job_info><job_info>
            <job_list state="pending">
              <JB_job_number>12</JB_job_number>
              <state>qw</state>
              <JB_submission_time>2018-10-09T18:47:05</JB_submission_time>
              <slots>1</slots>
              <hard_request name="h_rt" resource_contribution="0.000000">300000000000000:00:00:00</hard_request>
            </job_list>
          </job_info></job_info>"#;
        let jobs = parse_qstat_xml(xml, Utc::now()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Queued);
        assert!(jobs[0].wallclock_limit.is_none());
        assert_eq!(jobs[0].allocated_procs, Some(1));
    }

    #[test]
    fn test_garbled_slots_is_absent() {
        let xml = r#"<job_info><job_info>
            <job_list state="pending">
              <JB_job_number>13</JB_job_number>
              <state>qw</state>
              <slots>lots</slots>
            </job_list>
          </job_info></job_info>"#;
        let jobs = parse_qstat_xml(xml, Utc::now()).unwrap();
        assert_eq!(jobs[0].id, "13");
        assert!(jobs[0].allocated_procs.is_none());
    }
}
