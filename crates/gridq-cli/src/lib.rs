//! CLI argument parsing for gridq.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use gridq_sge::SgeConfig;

#[derive(Parser, Debug)]
#[command(name = "gridq")]
#[command(about = "Query Grid Engine job status via qstat and qacct")]
pub struct Args {
    /// Directory containing the qstat/qacct binaries
    #[arg(long, global = true, env = "SGE_BIN")]
    pub bin: Option<Utf8PathBuf>,

    /// Grid Engine installation root
    #[arg(long, global = true, env = "SGE_ROOT")]
    pub sge_root: Option<Utf8PathBuf>,

    /// Grid Engine cell
    #[arg(long, global = true, env = "SGE_CELL")]
    pub cell: Option<String>,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log scheduler invocations
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List jobs in the live queue
    List {
        /// Only jobs submitted by this user
        #[arg(long, short = 'u')]
        owner: Option<String>,
    },
    /// Show a queued or running job (reported completed once it leaves the queue)
    Show { job_id: String },
    /// Show the accounting record of a finished job
    History { job_id: String },
}

impl Args {
    pub fn sge_config(&self) -> SgeConfig {
        SgeConfig {
            bin: self.bin.clone(),
            sge_root: self.sge_root.clone(),
            cell: self.cell.clone(),
        }
    }
}
