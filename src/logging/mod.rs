//! Tracing subscriber initialization.
//!
//! The terminal host owns stdout, so events go to a log file. Follow it with `tail -f`
//! from another terminal; `RUST_LOG=fluent_grid=trace` shows every container operation.

use std::path::{Path, PathBuf};
use thiserror::Error;

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

    /// Log file path has no usable file name
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Install a file-backed `fmt` subscriber.
///
/// Respects `RUST_LOG`, defaulting to `info`. Creates the parent directory when missing.
///
/// # Errors
///
/// Directory creation failure, a path without a file name, or a subscriber that is
/// already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial(tracing_init)]
    fn init_creates_log_directory_if_missing() {
        let test_dir = std::env::temp_dir().join("fluent_grid_test_logs_create");
        let log_file = test_dir.join("grid.log");
        let _ = fs::remove_dir_all(&test_dir);

        // subscriber may already be set by another test
        let _ = init(&log_file);

        assert!(
            test_dir.exists(),
            "Log directory should be created: {:?}",
            test_dir
        );
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn init_rejects_path_without_file_name() {
        let result = init(Path::new("/"));
        assert!(
            matches!(result, Err(LoggingError::InvalidPath(_))),
            "Root path has no file name, got: {:?}",
            result
        );
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let test_dir = std::env::temp_dir().join("fluent_grid_test_logs_twice");
        let log_file = test_dir.join("grid.log");

        let _ = init(&log_file);
        let second = init(&log_file);

        assert!(
            matches!(second, Err(LoggingError::SubscriberAlreadySet)),
            "Second init must fail, got: {:?}",
            second
        );
        let _ = fs::remove_dir_all(&test_dir);
    }
}
