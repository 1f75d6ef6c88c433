use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the global `tracing` subscriber, appending to the log file in the
/// data directory. `RUST_LOG` wins over the configured filter.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    debug!(path = %log_path.display(), "logging initialised");
    Ok(())
}
