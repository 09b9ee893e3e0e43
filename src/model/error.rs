//! Error types for fluent-grid.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via `?` and
//! `From` conversions from the pure core up to the binary entry point.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error wrapping all domain-specific failures
//!   - [`GridError`] - Reconciliation failures (malformed keys, registry drift, bad geometry)
//!   - [`InputError`] - Dataset loading failures (file not found, not a JSON array, IO)
//!   - [`ConfigError`](crate::config::ConfigError) - Config file read/parse failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing subscriber setup failures
//!   - [`TuiError`](crate::view::TuiError) - Terminal app failures
//!   - `std::io::Error` - Terminal/TUI rendering failures
//!
//! # Pass Failure Semantics
//!
//! Diff and geometry errors abort a reconciliation pass before any mutation is applied.
//! Registry errors raised mid-mutation leave already-applied operations in place; the next
//! successful pass re-derives the view set from the source collection.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the reconciliation core.
///
/// Keys are carried in their `Debug` rendering so the error type stays independent of the
/// key type chosen by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Two items in one ordered collection map to the same key.
    ///
    /// Raised by the differ before anything is mutated. The second occurrence is the one
    /// reported as `second_index`.
    #[error("duplicate key {key} at indices {first_index} and {second_index}")]
    DuplicateKey {
        /// Debug rendering of the offending key.
        key: String,
        /// Index of the first occurrence in the new collection.
        first_index: usize,
        /// Index of the repeated occurrence in the new collection.
        second_index: usize,
    },

    /// A view was acquired for a key that already owns one.
    ///
    /// Indicates the diff and the registry have drifted apart.
    #[error("a view is already registered for key {key}")]
    DuplicateAcquire {
        /// Debug rendering of the key.
        key: String,
    },

    /// A registry operation referenced a key with no registered view.
    #[error("no view is registered for key {key}")]
    UnknownKey {
        /// Debug rendering of the key.
        key: String,
    },

    /// Container or item dimensions cannot produce a grid.
    #[error(
        "invalid geometry input (container {container_width_px}px, item {item_width_px}px): {reason}"
    )]
    InvalidGeometryInput {
        /// Container width that was supplied.
        container_width_px: f64,
        /// Item width that was supplied.
        item_width_px: f64,
        /// Which constraint was violated.
        reason: &'static str,
    },
}

impl GridError {
    /// Build a [`GridError::DuplicateKey`] from any debuggable key.
    pub fn duplicate_key(key: &impl std::fmt::Debug, first_index: usize, second_index: usize) -> Self {
        Self::DuplicateKey {
            key: format!("{key:?}"),
            first_index,
            second_index,
        }
    }

    /// Build a [`GridError::DuplicateAcquire`] from any debuggable key.
    pub fn duplicate_acquire(key: &impl std::fmt::Debug) -> Self {
        Self::DuplicateAcquire {
            key: format!("{key:?}"),
        }
    }

    /// Build a [`GridError::UnknownKey`] from any debuggable key.
    pub fn unknown_key(key: &impl std::fmt::Debug) -> Self {
        Self::UnknownKey {
            key: format!("{key:?}"),
        }
    }

    /// Whether the failure happened before any mutation was applied.
    ///
    /// Registry errors are the only ones that can leave a pass half applied.
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. } | Self::InvalidGeometryInput { .. }
        )
    }
}

/// Top-level application error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// A reconciliation pass failed.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// The dataset could not be loaded.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// The configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The terminal app failed.
    #[error("TUI error: {0}")]
    Tui(#[from] crate::view::TuiError),
}

/// Errors encountered when loading the item dataset.
#[derive(Debug, Error)]
pub enum InputError {
    /// The dataset file does not exist at the given path.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The input parsed as JSON but its top-level value is not an array.
    #[error("Dataset must be a JSON array of items")]
    NotAnArray,

    /// The input is not valid JSON.
    #[error("Invalid JSON dataset: {reason}")]
    Json {
        /// Parser message.
        reason: String,
    },

    /// Generic I/O failure while reading the dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_renders_debug_key_and_indices() {
        let err = GridError::duplicate_key(&"hydrogen", 0, 3);
        assert_eq!(
            err.to_string(),
            "duplicate key \"hydrogen\" at indices 0 and 3"
        );
    }

    #[test]
    fn unknown_key_renders_debug_key() {
        let err = GridError::unknown_key(&42u32);
        assert_eq!(err.to_string(), "no view is registered for key 42");
    }

    #[test]
    fn pre_mutation_classification() {
        assert!(GridError::duplicate_key(&1, 0, 1).is_pre_mutation());
        assert!(GridError::InvalidGeometryInput {
            container_width_px: 0.0,
            item_width_px: 100.0,
            reason: "container width must be positive",
        }
        .is_pre_mutation());
        assert!(!GridError::unknown_key(&1).is_pre_mutation());
        assert!(!GridError::duplicate_acquire(&1).is_pre_mutation());
    }

    #[test]
    fn app_error_from_grid_error() {
        let app: AppError = GridError::unknown_key(&"x").into();
        assert!(matches!(app, AppError::Grid(GridError::UnknownKey { .. })));
    }

    #[test]
    fn app_error_from_io_error() {
        let app: AppError = std::io::Error::other("boom").into();
        assert!(matches!(app, AppError::Terminal(_)));
    }

    #[test]
    fn input_error_file_not_found_includes_path() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        assert!(err.to_string().contains("/tmp/missing.json"));
    }
}
