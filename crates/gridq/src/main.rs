//! gridq - Grid Engine job status from qstat and qacct.

mod logging;
mod output;

use clap::Parser;
use gridq_cli::{Args, Command};
use gridq_sge::{JobRecord, SgeBatch};
use miette::{IntoDiagnostic, Result};

fn print_jobs(jobs: &[JobRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(jobs).into_diagnostic()?);
    } else if !jobs.is_empty() {
        println!("{}", output::render_table(jobs));
    }
    Ok(())
}

fn print_job(job: &JobRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(job).into_diagnostic()?);
    } else {
        println!("{}", output::render_detail(job));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = args.sge_config();
    tracing::debug!("Dispatching {:?} with {:?}", args.command, config);
    let batch = SgeBatch::from_config(&config);

    match &args.command {
        Command::List { owner } => {
            let jobs = batch.get_all(owner.as_deref()).await.into_diagnostic()?;
            print_jobs(&jobs, args.json)
        }
        Command::Show { job_id } => {
            let job = batch.get_info_enqueued_job(job_id).await.into_diagnostic()?;
            print_job(&job, args.json)
        }
        Command::History { job_id } => {
            match batch.get_info_historical_job(job_id).await.into_diagnostic()? {
                Some(job) => print_job(&job, args.json),
                None => Err(miette::miette!("No accounting record for job {}", job_id)),
            }
        }
    }
}
