//! Dataset input.
//!
//! Items are a JSON array of objects read once, from a file, from piped stdin, or from
//! the bundled periodic-table demo when neither is available.

use crate::model::error::InputError;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::info;

/// Periodic table sample shipped with the binary.
pub const DEMO_DATASET: &str = include_str!("../../demos/elements.json");

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A JSON file.
    File(PathBuf),
    /// Piped standard input.
    Stdin,
    /// The bundled demo dataset.
    Demo,
}

/// Pick a source: the given file, else piped stdin, else the demo dataset.
pub fn detect_input_source(file: Option<PathBuf>) -> InputSource {
    match file {
        Some(path) => InputSource::File(path),
        None if !std::io::stdin().is_terminal() => InputSource::Stdin,
        None => InputSource::Demo,
    }
}

/// Read and parse the dataset from `source`.
///
/// # Errors
///
/// [`InputError::FileNotFound`] for a missing file, [`InputError::Io`] for read failures,
/// and the errors of [`parse_dataset`].
pub fn load_dataset(source: &InputSource) -> Result<Vec<Value>, InputError> {
    let text = match source {
        InputSource::File(path) => {
            if !path.exists() {
                return Err(InputError::FileNotFound { path: path.clone() });
            }
            std::fs::read_to_string(path)?
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        InputSource::Demo => DEMO_DATASET.to_string(),
    };
    let items = parse_dataset(&text)?;
    info!(source = ?source, items = items.len(), "loaded dataset");
    Ok(items)
}

/// Parse a JSON array of items.
///
/// # Errors
///
/// [`InputError::Json`] for malformed JSON, [`InputError::NotAnArray`] when the top-level
/// value is not an array.
pub fn parse_dataset(text: &str) -> Result<Vec<Value>, InputError> {
    let value: Value = serde_json::from_str(text).map_err(|e| InputError::Json {
        reason: e.to_string(),
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(InputError::NotAnArray),
    }
}

/// Text of `field` in `item`: strings as-is, other scalars in their JSON form.
pub fn field_text(item: &Value, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Identity key of `item`; items lacking `key_field` are keyed by their full JSON text.
pub fn item_key(item: &Value, key_field: &str) -> String {
    field_text(item, key_field).unwrap_or_else(|| item.to_string())
}
