//! Lock-guarded appender for the log file shared by all workers.
//!
//! Workers never block on the lock. A writer tries to take it without
//! waiting, backs off for a random delay when it is busy, and after
//! `lock_retry` failed attempts hands the whole batch to the fallback sink
//! with the delayed marker instead. Lines are formatted at the moment they
//! are written or rerouted, so fallback entries keep their original time.

use std::{
    fmt::Write as _,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use pararun_config::PoolConfig;
use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use tracing::{error, warn};

use crate::{
    log_line::LogLine,
    sink::{FallbackEntry, FallbackSink},
};

/// Randomized delay between two lock attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    ceiling: Duration,
}

impl Backoff {
    pub fn new(ceiling: Duration) -> Self {
        Self { ceiling }
    }

    /// Whole milliseconds drawn uniformly from `[0, ceiling)`.
    pub fn delay(&self) -> Duration {
        let ceiling_ms = u64::try_from(self.ceiling.as_millis()).unwrap_or(u64::MAX);
        if ceiling_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..ceiling_ms))
    }
}

/// Where a batch of lines ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Appended to the shared log after some failed lock attempts.
    Written { failed_attempts: u32 },
    /// Pushed onto the fallback sink.
    Delayed { failed_attempts: u32 },
}

#[derive(Debug)]
pub struct SharedLogWriter {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    sink: Arc<FallbackSink>,
    lock_retry: u32,
    backoff: Backoff,
}

impl SharedLogWriter {
    pub fn new(
        path: impl Into<PathBuf>,
        lock: Arc<Mutex<()>>,
        sink: Arc<FallbackSink>,
        lock_retry: u32,
        backoff: Backoff,
    ) -> Self {
        Self {
            path: path.into(),
            lock,
            sink,
            lock_retry,
            backoff,
        }
    }

    /// Writer appending to the configured error log.
    pub fn from_config(config: &PoolConfig, lock: Arc<Mutex<()>>, sink: Arc<FallbackSink>) -> Self {
        Self::new(
            config.error_log(),
            lock,
            sink,
            config.lock_retry(),
            Backoff::new(config.backoff_ceiling()),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deliver every line exactly once, tagged with `tag`.
    ///
    /// The batch is appended as one contiguous block while the lock is held.
    pub fn write_lines<S: AsRef<str>>(&self, lines: &[S], tag: &str) -> Delivery {
        let mut failed_attempts = 0;
        while failed_attempts < self.lock_retry {
            if let Some(guard) = self.lock.try_lock() {
                return self.write_locked(guard, lines, tag, failed_attempts);
            }
            warn!("Unable to acquire logfile lock");
            failed_attempts += 1;
            thread::sleep(self.backoff.delay());
        }
        self.reroute(lines, tag);
        Delivery::Delayed { failed_attempts }
    }

    /// Append the batch while `guard` is held, rerouting it on I/O failure.
    ///
    /// A write that fails part way through reroutes the whole batch, so the
    /// lines that did reach the file before the failure also show up again
    /// as delayed entries.
    fn write_locked<S: AsRef<str>>(
        &self,
        guard: MutexGuard<'_, ()>,
        lines: &[S],
        tag: &str,
        failed_attempts: u32,
    ) -> Delivery {
        let written = self.append(lines, tag);
        drop(guard);
        match written {
            Ok(()) => Delivery::Written { failed_attempts },
            Err(err) => {
                error!(
                    "Failed to write shared log {} - {err}",
                    self.path.display()
                );
                self.reroute(lines, tag);
                Delivery::Delayed { failed_attempts }
            }
        }
    }

    fn append<S: AsRef<str>>(&self, lines: &[S], tag: &str) -> io::Result<()> {
        let mut block = String::new();
        for line in lines {
            // Writing into a String cannot fail.
            let _ = write!(block, "{}", LogLine::now(tag, line.as_ref(), false));
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(block.as_bytes())?;
        file.flush()
    }

    fn reroute<S: AsRef<str>>(&self, lines: &[S], tag: &str) {
        for line in lines {
            self.sink.push(FallbackEntry::Delayed(
                LogLine::now(tag, line.as_ref(), true).to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use super::*;

    fn writer(dir: &Path, lock_retry: u32) -> (SharedLogWriter, Arc<Mutex<()>>, Arc<FallbackSink>) {
        let lock = Arc::new(Mutex::new(()));
        let sink = Arc::new(FallbackSink::new());
        let writer = SharedLogWriter::new(
            dir.join("shared.log"),
            Arc::clone(&lock),
            Arc::clone(&sink),
            lock_retry,
            Backoff::new(Duration::from_millis(5)),
        );
        (writer, lock, sink)
    }

    #[test]
    fn backoff_handles_huge_ceiling() {
        let backoff = Backoff::new(Duration::MAX);
        assert!(backoff.delay() < Duration::from_millis(u64::MAX));
    }

    #[test]
    fn backoff_stays_below_ceiling() {
        let backoff = Backoff::new(Duration::from_millis(10));
        for _ in 0..200 {
            assert!(backoff.delay() < Duration::from_millis(10));
        }
        assert_eq!(Backoff::new(Duration::ZERO).delay(), Duration::ZERO);
    }

    #[test]
    fn writes_when_lock_is_free() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _lock, sink) = writer(dir.path(), 3);

        let delivery = writer.write_lines(&["first", "second"], "job");
        assert_eq!(delivery, Delivery::Written { failed_attempts: 0 });
        assert!(sink.is_empty());

        let content = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" [job]      first"));
        assert!(lines[1].ends_with(" [job]      second"));
    }

    #[test]
    fn appends_to_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _lock, _sink) = writer(dir.path(), 3);
        writer.write_lines(&["one"], "a");
        writer.write_lines(&["two"], "b");

        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    #[timeout(5000)]
    fn permanent_contention_falls_back_after_retry_limit() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, lock, sink) = writer(dir.path(), 3);

        let _held = lock.lock();
        let delivery = writer.write_lines(&["alpha", "beta"], "busy");
        assert_eq!(delivery, Delivery::Delayed { failed_attempts: 3 });

        let entries = sink.drain_all();
        assert_eq!(entries.len(), 2);
        for (entry, body) in entries.iter().zip(["alpha", "beta"]) {
            match entry {
                FallbackEntry::Delayed(line) => {
                    assert!(line.ends_with(&format!(" [busy]*    {body}\n")));
                }
                other => panic!("unexpected entry {other:?}"),
            }
        }
        assert!(!writer.path().exists());
    }

    #[test]
    fn zero_retry_always_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _lock, sink) = writer(dir.path(), 0);

        let delivery = writer.write_lines(&["line"], "x");
        assert_eq!(delivery, Delivery::Delayed { failed_attempts: 0 });
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn unwritable_destination_reroutes_batch() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FallbackSink::new());
        let writer = SharedLogWriter::new(
            dir.path().join("missing").join("shared.log"),
            Arc::new(Mutex::new(())),
            Arc::clone(&sink),
            3,
            Backoff::new(Duration::ZERO),
        );

        let delivery = writer.write_lines(&["a", "b", "c"], "job");
        assert_eq!(delivery, Delivery::Delayed { failed_attempts: 0 });
        assert_eq!(sink.len(), 3);
    }

    #[test]
    #[timeout(5000)]
    fn lock_released_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, lock, _sink) = writer(dir.path(), 3);
        writer.write_lines(&["line"], "job");
        assert!(lock.try_lock().is_some());
    }
}
