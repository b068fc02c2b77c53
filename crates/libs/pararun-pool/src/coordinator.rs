//! Pool lifecycle: spawn workers, dispatch jobs, shut down, drain.
//!
//! The coordinator waits on the queue's unfinished-job count rather than
//! on the queue looking empty, so sentinels are only injected once every
//! dispatched job has actually been handled by a worker.

use std::{
    any::Any,
    fs::OpenOptions,
    io::{BufWriter, Write},
    sync::Arc,
    thread::{self, JoinHandle},
};

use pararun_config::{Job, PoolConfig};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::{
    prelude::*,
    queue::{JobQueue, QueueItem},
    sink::{FallbackEntry, FallbackSink},
    worker::{Worker, WorkerReport},
    writer::SharedLogWriter,
};

/// Totals of a finished pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub jobs_dispatched: usize,
    pub jobs_executed: usize,
    pub sentinels_consumed: usize,
    pub workers_joined: usize,
    /// Workers that panicked instead of reaching their sentinel.
    pub workers_lost: usize,
    pub entries_drained: usize,
}

#[derive(Debug, Default)]
struct ShutdownReport {
    jobs_executed: usize,
    workers_joined: usize,
    workers_lost: usize,
}

pub struct Coordinator {
    config: PoolConfig,
}

impl Coordinator {
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Execute every job across the pool and drain the fallback sink.
    ///
    /// Per-job failures never abort the run; only failing to start the
    /// workers or to write the final drain is reported as an error.
    pub fn run(&self, jobs: Vec<Job>) -> Result<RunSummary> {
        let queue = Arc::new(JobQueue::new());
        let sink = Arc::new(FallbackSink::new());
        let writer = Arc::new(SharedLogWriter::from_config(
            &self.config,
            Arc::new(Mutex::new(())),
            Arc::clone(&sink),
        ));

        let workers = self.spawn_workers(&queue, &writer, &sink)?;

        let jobs_dispatched = jobs.len();
        for job in jobs {
            queue.enqueue(QueueItem::Job(job));
        }
        info!(
            "Dispatched {jobs_dispatched} job(s) to {} worker(s)",
            workers.len()
        );

        queue.wait_until_done();
        debug!("All dispatched jobs handled");

        let shutdown = Self::terminate(&queue, workers, &sink);
        if !sink.is_empty() {
            debug!("{} fallback entries pending", sink.len());
        }
        let entries_drained = self.drain(&sink)?;

        Ok(RunSummary {
            jobs_dispatched,
            jobs_executed: shutdown.jobs_executed,
            sentinels_consumed: queue.sentinels_consumed(),
            workers_joined: shutdown.workers_joined,
            workers_lost: shutdown.workers_lost,
            entries_drained,
        })
    }

    fn spawn_workers(
        &self,
        queue: &Arc<JobQueue>,
        writer: &Arc<SharedLogWriter>,
        sink: &Arc<FallbackSink>,
    ) -> Result<Vec<JoinHandle<WorkerReport>>> {
        let mut workers = Vec::with_capacity(self.config.workers());
        for id in 0..self.config.workers() {
            let worker = Worker::new(id, Arc::clone(queue), Arc::clone(writer));
            let spawned = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    error!("Failed to spawn worker {id} - {source}");
                    Self::terminate(queue, workers, sink);
                    return Err(Error::WorkerSpawn { id, source });
                }
            }
        }
        Ok(workers)
    }

    /// Send one sentinel per worker and wait for all of them.
    fn terminate(
        queue: &JobQueue,
        workers: Vec<JoinHandle<WorkerReport>>,
        sink: &FallbackSink,
    ) -> ShutdownReport {
        for _ in 0..workers.len() {
            queue.enqueue(QueueItem::Sentinel);
        }

        let mut report = ShutdownReport::default();
        for handle in workers {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            match handle.join() {
                Ok(worker) => {
                    debug!("{name} executed {} job(s)", worker.jobs_executed);
                    report.jobs_executed += worker.jobs_executed;
                    report.workers_joined += 1;
                }
                Err(panic) => {
                    let message = panic_message(&*panic);
                    error!("{name} panicked - {message}");
                    sink.push(FallbackEntry::Trace(
                        format!("{name} panicked: {message}\n").into_bytes(),
                    ));
                    report.workers_lost += 1;
                }
            }
        }
        report
    }

    /// Append everything left in the fallback sink to the error log.
    fn drain(&self, sink: &FallbackSink) -> Result<usize> {
        let path = self.config.error_log();
        let entries = sink.drain_all();
        let map_err = |source: std::io::Error| Error::ErrorLog {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(map_err)?;
        let mut out = BufWriter::new(file);
        for entry in &entries {
            out.write_all(entry.as_text().as_bytes()).map_err(map_err)?;
        }
        out.flush().map_err(map_err)?;

        if !entries.is_empty() {
            info!(
                "Drained {} fallback entries into {}",
                entries.len(),
                path.display()
            );
        }
        Ok(entries.len())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}
