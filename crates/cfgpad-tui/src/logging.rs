//! File logging. The terminal belongs to the UI, so events never go to stdout/stderr.

use crate::config::ConfigError;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber appending to `path`, filtered by `filter`.
///
/// If a global subscriber is already installed it is kept.
pub fn init_file_logging(filter: &str, path: &Path) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|source| ConfigError::InvalidLogFilter {
        filter: filter.to_string(),
        source,
    })?;

    let log_file_error = |source| ConfigError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(log_file_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_file_error)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed; keeping it");
    }
    Ok(())
}
