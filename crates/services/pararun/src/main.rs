//! pararun
//!
//! Executes a list of named commands concurrently across a fixed pool of
//! worker threads:
//!
//! - **Per-job logs**: raw combined output of each job is appended to
//!   `<logdir>/<name>-<YYYYMMDD>.log`
//! - **Master error log**: every output line tagged with its job name,
//!   written under a shared lock, plus delayed lines that lost the lock race
//! - **Master log**: the runner's own diagnostics, mirrored to the console
//!
//! Exit codes: 0 on completion, 1 missing job list, 2 missing log
//! directory, 3 missing master error log directory, 4 missing master log
//! directory, 5 unparsable job list, 6 any other failure.

mod cli;
mod error;
mod logging;
mod preflight;
mod prelude;

use std::process::ExitCode;

use clap::Parser;
use pararun_config::JobList;
use pararun_pool::Coordinator;
use tracing::{error, info};

use crate::cli::{Cli, Paths};
use crate::prelude::*;

/// Main entry point for pararun.
///
/// # Examples
///
/// ```bash
/// echo '[{"cmd": "uname -a", "name": "kernel"}]' > jobs.json
/// pararun jobs.json --logdir /var/log/jobs --threads 4
/// ```
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Failures before logging::init succeeded were already reported on the console.
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Until the global subscriber is installed, failures only reach the console.
    let paths = tracing::subscriber::with_default(logging::console_subscriber(), || {
        resolve_paths(cli)
            .and_then(|paths| logging::init(&paths.masterlog).map(|()| paths))
            .inspect_err(|err| error!("{err}"))
    })?;

    let config = cli.pool_config(&paths);
    let jobs = JobList::from_file(&paths.cmdfile)?.into_jobs(&paths.logdir);

    info!("Logging output to {}", paths.logdir.display());
    let summary = Coordinator::new(config).run(jobs)?;
    info!(
        "Executed {}/{} job(s), {} delayed entries drained",
        summary.jobs_executed, summary.jobs_dispatched, summary.entries_drained
    );
    if summary.workers_lost > 0 {
        error!("{} worker(s) terminated abnormally", summary.workers_lost);
    }

    info!("Master logs {}", paths.masterlog.display());
    info!("Master error logs {}", paths.mastererrlog.display());
    Ok(())
}

fn resolve_paths(cli: &Cli) -> Result<Paths> {
    let cwd = std::env::current_dir()?;
    let paths = Paths::resolve(cli, &cwd);
    preflight::check(&paths)?;
    Ok(paths)
}
