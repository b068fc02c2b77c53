//! Worker loop executing jobs pulled from the shared queue.
//!
//! A worker handles one job at a time until it receives a sentinel. A job
//! that cannot be executed is reported and skipped; it never stops the
//! worker. Exit status is not inspected: whatever a command printed is
//! logged the same way whether it exited zero or not.

use std::{error::Error as StdError, fs::OpenOptions, io::Write, path::PathBuf, sync::Arc};

use pararun_config::Job;
use pararun_io::runner::Runner;
use tracing::{error, info};

use crate::{
    prelude::*,
    queue::{JobQueue, QueueItem},
    writer::SharedLogWriter,
};

/// Result of executing one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The command ran; `output` holds its combined stdout and stderr.
    Completed { output: String },
    /// The command could not be spawned or read. One line per cause.
    Failed { trace: Vec<String> },
}

/// Totals reported by a worker once it has consumed its sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub jobs_executed: usize,
}

pub struct Worker {
    id: usize,
    queue: Arc<JobQueue>,
    writer: Arc<SharedLogWriter>,
}

impl Worker {
    pub fn new(id: usize, queue: Arc<JobQueue>, writer: Arc<SharedLogWriter>) -> Self {
        Self { id, queue, writer }
    }

    /// Run jobs until a sentinel is dequeued.
    pub fn run(self) -> WorkerReport {
        info!("Worker started");
        let mut report = WorkerReport {
            id: self.id,
            jobs_executed: 0,
        };

        loop {
            let job = match self.queue.dequeue() {
                QueueItem::Job(job) => job,
                QueueItem::Sentinel => {
                    info!("No more job for this worker, terminating");
                    break;
                }
            };
            let _done = self.queue.task_guard();

            let outcome = execute(&job);
            self.record(&job, outcome);
            report.jobs_executed += 1;

            let left = self.queue.depth();
            if left > 0 {
                info!("{left} job(s) left in this queue");
            }
        }
        report
    }

    fn record(&self, job: &Job, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Completed { output } => {
                let lines: Vec<&str> = output.trim().split('\n').collect();
                self.writer.write_lines(&lines, job.tag());
                match append_job_log(job, &output) {
                    Ok(_) => info!("Completed {}", job.command),
                    Err(err) => self.report_failure(job, &trace_lines(&err)),
                }
            }
            JobOutcome::Failed { trace } => self.report_failure(job, &trace),
        }
    }

    fn report_failure(&self, job: &Job, trace: &[String]) {
        error!("Unable to execute {}", job.command);
        self.writer.write_lines(trace, job.tag());
    }
}

/// Run the job's command to completion and capture its combined output.
pub fn execute(job: &Job) -> JobOutcome {
    let runner = match Runner::from_command_line(&job.command) {
        Ok(runner) => runner,
        Err(err) => {
            return JobOutcome::Failed {
                trace: trace_lines(&err),
            };
        }
    };

    info!("Executing {}", job.command);
    match runner.run() {
        Ok(output) => JobOutcome::Completed {
            output: output.text().into_owned(),
        },
        Err(err) => JobOutcome::Failed {
            trace: trace_lines(&err),
        },
    }
}

/// Append raw output to the job's dated log file, returning its path.
pub fn append_job_log(job: &Job, output: &str) -> Result<PathBuf> {
    let path = job.log_file_path();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| file.write_all(output.as_bytes()))
        .map_err(|source| Error::JobLog {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Error message followed by one `Caused by:` line per source.
pub fn trace_lines(err: &dyn StdError) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("Caused by: {cause}"));
        source = cause.source();
    }
    lines
}
