//! Worker pool execution engine for pararun.
//!
//! A [`Coordinator`] spawns a fixed number of worker threads bound to one
//! [`JobQueue`]. Workers run each job's command, push its combined output
//! through a [`SharedLogWriter`] that serializes appends to a single log
//! file, and write the raw output to a per-job log. Lines that cannot get
//! the shared lock in time go to a [`FallbackSink`] which the coordinator
//! drains into the error log once every worker has stopped.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pararun_config::{JobList, PoolConfig};
//! use pararun_pool::Coordinator;
//! use std::path::Path;
//!
//! let jobs = JobList::from_json(r#"[{"cmd": "echo hi", "name": "greet"}]"#)
//!     .unwrap()
//!     .into_jobs(Path::new("/tmp"));
//! let coordinator = Coordinator::new(PoolConfig::new("/tmp/mastererror.log"));
//! let summary = coordinator.run(jobs).unwrap();
//! assert_eq!(summary.jobs_executed, 1);
//! ```

pub mod coordinator;
pub mod error;
pub mod log_line;
pub mod prelude;
pub mod queue;
pub mod sink;
pub mod worker;
pub mod writer;

pub use coordinator::{Coordinator, RunSummary};
pub use queue::{JobQueue, QueueItem};
pub use sink::{FallbackEntry, FallbackSink};
pub use worker::{JobOutcome, Worker};
pub use writer::{Backoff, Delivery, SharedLogWriter};
