//! Grid Engine installation settings.

use camino::Utf8PathBuf;
use gridq_parsers::ProcessRunner;

/// Where the scheduler tools live and which cell they talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SgeConfig {
    /// Directory containing qstat/qacct; `PATH` lookup when unset
    pub bin: Option<Utf8PathBuf>,

    /// Exported as `SGE_ROOT`
    pub sge_root: Option<Utf8PathBuf>,

    /// Exported as `SGE_CELL`
    pub cell: Option<String>,
}

impl SgeConfig {
    /// Process runner honoring these settings.
    pub fn runner(&self) -> ProcessRunner {
        let mut runner = ProcessRunner::new(self.bin.clone());
        if let Some(root) = &self.sge_root {
            runner = runner.with_env("SGE_ROOT", root.as_str());
        }
        if let Some(cell) = &self.cell {
            runner = runner.with_env("SGE_CELL", cell.as_str());
        }
        runner
    }
}
