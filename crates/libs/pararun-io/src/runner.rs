//! High-level process runner with combined output capture.

use std::{borrow::Cow, io::Read, process::ExitStatus};

use tracing::debug;

use crate::process::{ProcessError, capture_exit_status, spawn_process};

/// Combined output of a finished process.
#[derive(Debug)]
pub struct RunOutput {
    /// Stdout and stderr bytes, in the order the child wrote them.
    pub combined: Vec<u8>,
    /// Exit status of the child. Reported but never used to judge a run.
    pub status: ExitStatus,
}

impl RunOutput {
    /// Combined output decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.combined)
    }
}

/// Process runner that merges the error stream into the output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    /// Command to execute.
    command: String,
    /// Command line arguments.
    args: Vec<String>,
}

impl Runner {
    /// Create a new runner with command and arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pararun_io::runner::Runner;
    ///
    /// let runner = Runner::new("ls", vec!["-la", "/tmp"]);
    /// ```
    pub fn new(command: impl Into<String>, args: Vec<impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(|a| a.into()).collect(),
        }
    }

    /// Build a runner from a single command line split on whitespace.
    ///
    /// Quoting is not interpreted: `echo "a b"` yields the arguments
    /// `"a` and `b"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pararun_io::runner::Runner;
    ///
    /// let runner = Runner::from_command_line("ls -la /tmp").unwrap();
    /// assert_eq!(runner.get_full_command(), "ls -la /tmp");
    /// ```
    pub fn from_command_line(line: &str) -> Result<Self, ProcessError> {
        let mut parts = line.split_whitespace();
        let command = parts.next().ok_or(ProcessError::EmptyCommand)?;
        Ok(Self::new(command, parts.collect()))
    }

    /// Get the full command string with arguments.
    pub fn get_full_command(&self) -> String {
        if self.args.is_empty() {
            return self.command.clone();
        }
        format!("{} {}", &self.command, &self.args.join(" "))
    }

    /// Run the process to completion and return its combined output.
    ///
    /// Both streams share one pipe which is drained to end of file before
    /// the child is reaped, so the child never stalls on a full pipe. Blocks
    /// until the child exits; a non-zero exit status is not an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pararun_io::runner::Runner;
    ///
    /// let output = Runner::new("sh", vec!["-c", "echo out; echo err >&2"])
    ///     .run()
    ///     .unwrap();
    /// assert!(output.text().contains("err"));
    /// ```
    pub fn run(&self) -> Result<RunOutput, ProcessError> {
        let full_command = self.get_full_command();
        let (mut process, mut output) =
            spawn_process(&self.command, &self.args).map_err(|source| {
                ProcessError::SpawnProcessFail {
                    command: full_command.clone(),
                    source,
                }
            })?;
        debug!("Spawned `{}` with pid {}", full_command, process.id());

        let mut combined = Vec::new();
        let read = output.read_to_end(&mut combined);
        drop(output);

        let status =
            capture_exit_status(&mut process).map_err(|source| ProcessError::WaitChildFail {
                command: full_command.clone(),
                source,
            })?;
        read.map_err(|source| ProcessError::ReadOutputFail {
            command: full_command,
            source,
        })?;

        Ok(RunOutput { combined, status })
    }
}
