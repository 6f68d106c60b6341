//! Tracing subscriber setup for the demo binary.
//!
//! The demo owns the terminal, so events go to a log file users can follow
//! with `tail -f`. Library modules only emit events; installing a subscriber
//! is the binary's job.
//!
//! Filtering: `SIGHTLINE_LOG` wins over `RUST_LOG`; with neither set,
//! [`DEFAULT_DIRECTIVES`] applies. Per-record fan-out is logged at `trace`,
//! so `SIGHTLINE_LOG=sightline::observer=trace` shows every dispatch decision.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives for this crate.
pub const LOG_ENV: &str = "SIGHTLINE_LOG";

/// Filter used when neither `SIGHTLINE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVES: &str = "warn,sightline=info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Build the event filter from the environment.
///
/// Unparsable directives fall back to the next source rather than failing.
pub fn env_filter() -> EnvFilter {
    [LOG_ENV, EnvFilter::DEFAULT_ENV]
        .into_iter()
        .find_map(|var| EnvFilter::try_from_env(var).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Split a log file path into its directory and file name.
fn split_log_path(log_path: &Path) -> Result<(&Path, &str), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;
    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;
    Ok((directory, file_name))
}

/// Install the global subscriber writing to `log_path`.
///
/// Creates the log directory if it doesn't exist.
///
/// # Errors
///
/// Fails on an unusable path, when the directory cannot be created, or when
/// a global subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let (directory, file_name) = split_log_path(log_path)?;

    // An empty parent means the current directory.
    if !directory.as_os_str().is_empty() {
        std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
            path: directory.to_path_buf(),
            source,
        })?;
    }

    let file_appender = tracing_appender::rolling::never(directory, file_name);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)?;

    info!(path = %log_path.display(), "logging initialized");
    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
