//! Process-wide logging: console plus the master log file.

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::prelude::*;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

/// Console-only subscriber used before the master log has been validated.
pub fn console_subscriber() -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(env_filter()).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_names(true),
    )
}

/// Install the global subscriber mirroring every event to stderr and `master_log`.
pub fn init(master_log: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(master_log)
        .map_err(|source| Error::MasterLogOpen {
            path: master_log.to_path_buf(),
            source,
        })?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true),
        )
        .try_init()?;
    Ok(())
}
