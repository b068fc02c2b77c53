//! Error types for the worker pool.

use std::path::PathBuf;

/// Worker pool errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to spawn worker {id}")]
    WorkerSpawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to job log {}", path.display())]
    JobLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to drain into error log {}", path.display())]
    ErrorLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
