//! The Grid Engine batch adapter.
//!
//! Composes the qstat and qacct parsers behind a single [`CommandRunner`].

use crate::config::SgeConfig;
use crate::error::SgeError;
use crate::qacct::{QACCT, parse_qacct_output, qacct_args};
use crate::qstat::{QSTAT, parse_qstat_xml, qstat_args};
use crate::types::JobRecord;
use chrono::Utc;
use gridq_parsers::{CommandRunner, ProcessRunner};

/// Look up `job_id` in a live listing.
///
/// A job missing from the listing is assumed to have finished, so the
/// result is never absent.
pub fn find_enqueued(jobs: &[JobRecord], job_id: &str) -> JobRecord {
    jobs.iter()
        .find(|job| job.id == job_id)
        .cloned()
        .unwrap_or_else(|| JobRecord::completed(job_id))
}

pub struct SgeBatch<R> {
    runner: R,
}

impl SgeBatch<ProcessRunner> {
    /// Adapter that runs the real scheduler tools.
    pub fn from_config(config: &SgeConfig) -> Self {
        Self::new(config.runner())
    }
}

impl<R: CommandRunner> SgeBatch<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// List live jobs, optionally only those owned by `owner`.
    pub async fn get_all(&self, owner: Option<&str>) -> Result<Vec<JobRecord>, SgeError> {
        let xml = self.runner.call(QSTAT, &qstat_args(owner)).await?;
        let jobs = parse_qstat_xml(&xml, Utc::now())?;
        tracing::debug!("qstat listed {} jobs", jobs.len());
        Ok(jobs)
    }

    /// Live record for `job_id`, or a bare completed record if it is not queued.
    ///
    /// Accounting is not consulted; use [`SgeBatch::get_info_historical_job`]
    /// for the final state of a finished job.
    pub async fn get_info_enqueued_job(&self, job_id: &str) -> Result<JobRecord, SgeError> {
        let jobs = self.get_all(None).await?;
        if !jobs.iter().any(|job| job.id == job_id) {
            tracing::debug!("Job {} not in qstat listing, assuming completed", job_id);
        }
        Ok(find_enqueued(&jobs, job_id))
    }

    /// Accounting record for a finished job.
    ///
    /// qacct exits non-zero for ids it has no record of; that is reported
    /// as `Ok(None)`. Spawn failures and malformed output are errors.
    pub async fn get_info_historical_job(
        &self,
        job_id: &str,
    ) -> Result<Option<JobRecord>, SgeError> {
        match self.runner.call(QACCT, &qacct_args(job_id)).await {
            Ok(output) => parse_qacct_output(&output).map(Some),
            Err(e) if e.is_exit_failure() => {
                tracing::debug!("No accounting record for job {}: {}", job_id, e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
