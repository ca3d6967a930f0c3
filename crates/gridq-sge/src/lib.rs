//! Grid Engine integration for gridq.
//!
//! Query live jobs via qstat and finished jobs via qacct, normalized
//! into [`JobRecord`].

pub mod batch;
pub mod config;
pub mod error;
pub mod qacct;
pub mod qstat;
pub mod types;

pub use batch::{find_enqueued, SgeBatch};
pub use config::SgeConfig;
pub use error::SgeError;
pub use qacct::parse_qacct_output;
pub use qstat::parse_qstat_xml;
pub use types::{JobRecord, JobStatus};
