//! Configuration for pararun.
//!
//! Provides the typed job records read from a job list file and the
//! immutable pool configuration handed to the coordinator.
//!
//! # Usage
//!
//! ```rust
//! use pararun_config::{JobList, PoolConfig};
//! use std::path::Path;
//!
//! let list = JobList::from_json(r#"[{"cmd": "echo hi", "name": "greet"}]"#).unwrap();
//! let jobs = list.into_jobs(Path::new("/var/log/pararun"));
//! assert_eq!(jobs[0].name, "greet");
//!
//! let config = PoolConfig::new("/var/log/pararun/mastererror.log").with_workers(4);
//! assert_eq!(config.workers(), 4);
//! ```

pub mod error;
pub mod job;
pub mod pool_config;
pub mod prelude;

pub use job::{Job, JobList, JobRecord};
pub use pool_config::PoolConfig;
