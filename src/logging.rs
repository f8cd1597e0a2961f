use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::error::{DeployError, DeployResult};

/// `deploy_YYYYMMDD_HHMMSS.log`
#[must_use]
pub fn log_file_name(at: DateTime<Local>) -> String {
    format!("deploy_{}.log", at.format("%Y%m%d_%H%M%S"))
}

/// Install the global subscriber: human-readable output on stderr
/// and a plain-text copy appended to a timestamped file in
/// `log_dir`. Returns the log file path.
///
/// The file always records `debug`, so every command line lands in
/// it. Stderr shows `info`, or `debug` with `verbose`. `RUST_LOG`
/// overrides both.
pub fn init(log_dir: &Path, verbose: bool) -> DeployResult<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file_name(Local::now()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let stderr_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(filter(stderr_level)),
        )
        .with(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter("debug")),
        )
        .try_init()
        .map_err(|e| DeployError::Other(format!("logging already initialized: {e}")))?;

    Ok(path)
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
