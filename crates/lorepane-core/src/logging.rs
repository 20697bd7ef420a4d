//! File-backed tracing setup.
//!
//! The terminal belongs to the TUI, so every event goes to a log file through
//! a non-blocking `tracing-appender` writer.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Environment variable that overrides `[log] level`.
pub const LOG_ENV: &str = "LOREPANE_LOG";

/// Builds the event filter: `LOREPANE_LOG` wins, then the configured level.
pub fn build_filter(env_value: Option<&str>, config: &LogConfig) -> Result<EnvFilter> {
    if let Some(directives) = env_value.filter(|v| !v.trim().is_empty())
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))
}

/// Installs the global subscriber.
///
/// Returns the appender guard; keep it alive for the lifetime of the process
/// so buffered lines are flushed on exit. Returns `None` when a subscriber was
/// already installed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env_value.as_deref(), config)?;

    let path = config.effective_file();
    let (dir, file_name) = split_log_path(&path)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
    {
        Ok(()) => {
            tracing::info!(file = %path.display(), "logging initialized");
            Ok(Some(guard))
        }
        // Someone else owns the global subscriber; dropping the guard stops our writer.
        Err(_) => Ok(None),
    }
}

fn split_log_path(path: &Path) -> Result<(std::path::PathBuf, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log path {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf);
    Ok((dir, file_name))
}
