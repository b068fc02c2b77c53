//! Process execution for pararun.
//!
//! Spawns external commands with stdout and stderr merged into one
//! combined output stream, blocking until the child exits.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pararun_io::runner::Runner;
//!
//! let runner = Runner::from_command_line("echo Hello").unwrap();
//! let output = runner.run().unwrap();
//! assert_eq!(output.text(), "Hello\n");
//! ```

pub mod process;
pub mod runner;
