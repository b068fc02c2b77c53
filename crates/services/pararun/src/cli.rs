//! Command-line interface for pararun.
//!
//! Defines the CLI structure and resolves it into paths and an immutable
//! pool configuration.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use pararun_config::{
    PoolConfig,
    pool_config::{DEFAULT_LOCK_RETRY, DEFAULT_WORKERS},
};
use tracing::warn;

/// Command-line interface for pararun.
#[derive(Parser, Debug)]
#[command(name = "pararun")]
#[command(about = "Run named commands in parallel across a pool of worker threads")]
pub struct Cli {
    /// JSON job list in [{"cmd": "xxx", "name": "yyy"}, ...] format
    pub cmdfile: PathBuf,

    /// Directory receiving per-job logs, defaults to the current directory
    #[arg(long)]
    pub logdir: Option<PathBuf>,

    /// Master log path, defaults to ./master.log
    #[arg(long)]
    pub masterlog: Option<PathBuf>,

    /// Master error log path, defaults to ./mastererror.log
    #[arg(long)]
    pub mastererrlog: Option<PathBuf>,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<String>,

    /// Lock acquisition attempts before the fallback queue is used
    #[arg(long)]
    pub lockretry: Option<String>,
}

/// File system locations used by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub cmdfile: PathBuf,
    pub logdir: PathBuf,
    pub masterlog: PathBuf,
    pub mastererrlog: PathBuf,
}

impl Paths {
    /// Fill in defaults relative to `cwd`.
    pub fn resolve(cli: &Cli, cwd: &Path) -> Self {
        Self {
            cmdfile: cli.cmdfile.clone(),
            logdir: cli.logdir.clone().unwrap_or_else(|| cwd.to_path_buf()),
            masterlog: cli
                .masterlog
                .clone()
                .unwrap_or_else(|| cwd.join("master.log")),
            mastererrlog: cli
                .mastererrlog
                .clone()
                .unwrap_or_else(|| cwd.join("mastererror.log")),
        }
    }
}

impl Cli {
    /// Build the pool configuration. Unparsable counts fall back to defaults.
    pub fn pool_config(&self, paths: &Paths) -> PoolConfig {
        let workers = parse_or_default(self.threads.as_deref(), DEFAULT_WORKERS, "thread(s)");
        let lock_retry = parse_or_default(
            self.lockretry.as_deref(),
            DEFAULT_LOCK_RETRY,
            "lock acquisition attempts",
        );
        PoolConfig::new(&paths.mastererrlog)
            .with_workers(workers)
            .with_lock_retry(lock_retry)
    }
}

fn parse_or_default<T>(raw: Option<&str>, default: T, what: &str) -> T
where
    T: FromStr + Display,
{
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Fallback to default {default} {what}");
            default
        }),
    }
}
