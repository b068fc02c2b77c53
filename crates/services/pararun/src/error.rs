//! Error types for the pararun binary.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("CMDFILE {} not found", .0.display())]
    JobFileNotFound(PathBuf),

    #[error("LOGDIR {} not found", .0.display())]
    OutputDirNotFound(PathBuf),

    #[error("MASTERERRLOG directory {} not found", .0.display())]
    ErrorLogDirNotFound(PathBuf),

    #[error("MASTERLOG directory {} not found", .0.display())]
    MasterLogDirNotFound(PathBuf),

    #[error("Unable to open MASTERLOG {}", path.display())]
    MasterLogOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    JobList(#[from] pararun_config::error::Error),

    #[error(transparent)]
    Pool(#[from] pararun_pool::error::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Failed to install log subscriber - {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::JobFileNotFound(_) => 1,
            Error::OutputDirNotFound(_) => 2,
            Error::ErrorLogDirNotFound(_) => 3,
            Error::MasterLogDirNotFound(_) => 4,
            Error::JobList(pararun_config::error::Error::Deserialization(_)) => 5,
            Error::JobList(pararun_config::error::Error::IO(_))
            | Error::MasterLogOpen { .. }
            | Error::Pool(_)
            | Error::IO(_)
            | Error::Logging(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn unreadable_job_list_is_not_a_parse_failure() {
        let err = Error::from(pararun_config::error::Error::IO(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn malformed_job_list_is_a_parse_failure() {
        let parse = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err = Error::from(pararun_config::error::Error::Deserialization(parse));
        assert_eq!(err.exit_code(), 5);
    }
}
