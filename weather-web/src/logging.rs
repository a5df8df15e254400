//! Log output: stderr plus a rotating file.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "weather_web=info,weather_core=info,tower_http=info";

pub const LOG_FILE_PREFIX: &str = "weather_app";
const LOG_FILE_SUFFIX: &str = "log";
/// Rotated files kept on disk, the current one included.
const MAX_LOG_FILES: usize = 2;

/// Install the global subscriber. Buffered file output is flushed when the
/// returned guard is dropped, so keep it alive for the whole run.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    let (file_writer, guard) = file_writer(log_dir)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        // stderr keeps `lookup --json` output on stdout clean
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

/// Non-blocking writer into `{log_dir}/weather_app.<date>.log`, rotated daily.
pub fn file_writer(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .with_context(|| format!("Failed to open log directory: {}", log_dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}
