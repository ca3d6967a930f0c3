//! Normalized job types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Job status as seen by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Reported in a group the adapter does not recognize
    Undetermined,
    /// Waiting for dispatch
    Queued,
    /// Waiting, but blocked by a hold
    QueuedHeld,
    /// Dispatched to an execution host
    Running,
    /// Finished, or no longer visible to the scheduler
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Undetermined => "undetermined",
            JobStatus::Queued => "queued",
            JobStatus::QueuedHeld => "queued_held",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized job information from qstat/qacct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Scheduler job ID
    pub id: String,

    /// Job status
    pub status: JobStatus,

    /// Submitting user
    pub owner: Option<String>,

    /// Project tag
    pub accounting_id: Option<String>,

    /// Job name
    pub name: Option<String>,

    /// Granted slots
    pub allocated_procs: Option<u32>,

    /// Queue the job runs in or was requested for
    pub queue_name: Option<String>,

    /// Submit time
    pub submission_time: Option<DateTime<Utc>>,

    /// Start time
    pub dispatch_time: Option<DateTime<Utc>>,

    /// Requested wallclock limit (seconds)
    pub wallclock_limit: Option<u64>,

    /// Elapsed wallclock time (seconds)
    pub wallclock_time: Option<u64>,

    /// Submission host
    pub submit_host: Option<String>,

    /// Scheduler-specific extras: the raw `state` code and `exec_host`
    /// from qstat; `hostname`, `exit_status`, `failed`, `end_time` and
    /// `granted_pe` from qacct. None when the source gave none of these.
    pub native: Option<BTreeMap<String, String>>,
}

impl JobRecord {
    /// A record carrying only an id and a status.
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            owner: None,
            accounting_id: None,
            name: None,
            allocated_procs: None,
            queue_name: None,
            submission_time: None,
            dispatch_time: None,
            wallclock_limit: None,
            wallclock_time: None,
            submit_host: None,
            native: None,
        }
    }

    /// Record for a job that is no longer visible and is assumed finished.
    pub fn completed(id: impl Into<String>) -> Self {
        Self::new(id, JobStatus::Completed)
    }

    pub fn native_value(&self, key: &str) -> Option<&str> {
        self.native.as_ref()?.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_is_degenerate() {
        let job = JobRecord::completed("1234");
        assert_eq!(job.id, "1234");
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.owner.is_none());
        assert!(job.dispatch_time.is_none());
        assert!(job.wallclock_time.is_none());
        assert!(job.native.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::QueuedHeld).unwrap();
        assert_eq!(json, "\"queued_held\"");
        assert_eq!(JobStatus::QueuedHeld.to_string(), "queued_held");
    }
}
