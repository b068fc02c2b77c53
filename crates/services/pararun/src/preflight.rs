//! Checks run before logging is configured and any worker starts.

use std::path::{Path, PathBuf};

use crate::{cli::Paths, prelude::*};

/// Validate every input location, in the order their exit codes are numbered.
pub fn check(paths: &Paths) -> Result<()> {
    if !paths.cmdfile.is_file() {
        return Err(Error::JobFileNotFound(paths.cmdfile.clone()));
    }
    if !paths.logdir.is_dir() {
        return Err(Error::OutputDirNotFound(paths.logdir.clone()));
    }
    let error_log_dir = parent_dir(&paths.mastererrlog);
    if !error_log_dir.is_dir() {
        return Err(Error::ErrorLogDirNotFound(error_log_dir));
    }
    let master_log_dir = parent_dir(&paths.masterlog);
    if !master_log_dir.is_dir() {
        return Err(Error::MasterLogDirNotFound(master_log_dir));
    }
    Ok(())
}

/// Directory containing `path`; a bare file name lives in the current directory.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
