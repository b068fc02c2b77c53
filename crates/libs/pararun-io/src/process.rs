//! Low-level process management utilities.

use std::{
    ffi::OsStr,
    io::{self, PipeReader},
    process::{Child, Command, ExitStatus, Stdio},
};

/// Errors that can occur during process operations.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// The command line did not contain a program name.
    #[error("Empty command line")]
    EmptyCommand,

    /// Failed to spawn the process.
    #[error("Failed to spawn `{command}`")]
    SpawnProcessFail {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Failed to read the combined output of the process.
    #[error("Failed to read output of `{command}`")]
    ReadOutputFail {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Failed to wait for child process.
    #[error("Failed to wait for `{command}`")]
    WaitChildFail {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Spawn a new process whose stdout and stderr share a single pipe.
///
/// Both streams are attached to the same write end, so the returned reader
/// yields bytes in the order the child wrote them. Stdin is closed so a
/// child waiting on input sees end of file instead of blocking its worker
/// forever.
///
/// # Examples
///
/// ```rust
/// use std::io::Read;
/// use pararun_io::process::spawn_process;
///
/// let (mut child, mut output) = spawn_process("echo", &["Hello".to_string()]).unwrap();
/// let mut text = String::new();
/// output.read_to_string(&mut text).unwrap();
/// child.wait().unwrap();
/// assert_eq!(text, "Hello\n");
/// ```
pub fn spawn_process(cmd: &str, args: &[String]) -> Result<(Child, PipeReader), io::Error> {
    let (reader, writer) = io::pipe()?;
    // The command, and with it our copies of the write end, is dropped
    // here, so the reader sees end of file once the child exits.
    let child = Command::new(OsStr::new(cmd))
        .args(args)
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer)
        .spawn()?;
    Ok((child, reader))
}

/// Wait for the child process to complete and return its exit status.
///
/// There is no timeout: a child that never exits blocks the caller.
pub fn capture_exit_status(child: &mut Child) -> Result<ExitStatus, io::Error> {
    child.wait()
}
