//! Configuration error types.

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// The job list is not a list of `{"cmd": ..., "name": ...}` records.
    #[error(r#"Unable to parse job list. Must be in [{{"cmd":"xxx", "name": "yyy"}},...] format: {0}"#)]
    Deserialization(#[from] serde_json::Error),
}
