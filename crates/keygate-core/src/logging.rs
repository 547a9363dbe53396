//! Tracing subscriber setup.
//!
//! The login screen owns the terminal, so logs go to a file under
//! `$KEYGATE_HOME/logs`. `KEYGATE_LOG` takes precedence over the configured
//! level and accepts full `EnvFilter` directives.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "KEYGATE_LOG";

/// File name inside the logs directory.
pub const LOG_FILE_NAME: &str = "keygate.log";

/// Builds the filter from `KEYGATE_LOG`, falling back to `default_level`.
///
/// # Errors
/// Returns an error if neither source is a valid directive.
pub fn build_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("Invalid log level '{default_level}'"))
}

/// Installs a global subscriber writing to `logs_dir/keygate.log`.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the background writer.
///
/// # Errors
/// Returns an error if the directory cannot be created, the filter is
/// invalid, or a global subscriber is already installed.
pub fn init_file_logging(logs_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let filter = build_filter(default_level)?;
    let appender = tracing_appender::rolling::never(logs_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
