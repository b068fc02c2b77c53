//! Worker pool configuration.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

/// Number of workers when none is configured.
pub const DEFAULT_WORKERS: usize = 2;

/// Lock acquisition attempts before falling back to the overflow queue.
pub const DEFAULT_LOCK_RETRY: u32 = 3;

/// Upper bound (exclusive) of the randomized backoff between lock attempts.
pub const DEFAULT_BACKOFF_CEILING: Duration = Duration::from_millis(1000);

/// Immutable settings of one pool run.
///
/// Built once from the command line and handed to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    workers: usize,
    lock_retry: u32,
    backoff_ceiling: Duration,
    error_log: PathBuf,
}

impl PoolConfig {
    /// Default settings writing shared and fallback lines to `error_log`.
    pub fn new(error_log: impl Into<PathBuf>) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            lock_retry: DEFAULT_LOCK_RETRY,
            backoff_ceiling: DEFAULT_BACKOFF_CEILING,
            error_log: error_log.into(),
        }
    }

    /// Set the pool size. Zero is raised to one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        if workers == 0 {
            warn!("A pool needs at least one worker, using 1");
        }
        self.workers = workers.max(1);
        self
    }

    /// Set the number of lock attempts. Zero sends every line to the overflow queue.
    pub fn with_lock_retry(mut self, lock_retry: u32) -> Self {
        self.lock_retry = lock_retry;
        self
    }

    pub fn with_backoff_ceiling(mut self, backoff_ceiling: Duration) -> Self {
        self.backoff_ceiling = backoff_ceiling;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn lock_retry(&self) -> u32 {
        self.lock_retry
    }

    pub fn backoff_ceiling(&self) -> Duration {
        self.backoff_ceiling
    }

    /// Shared log written by the workers and receiving the final drain.
    pub fn error_log(&self) -> &Path {
        &self.error_log
    }
}
