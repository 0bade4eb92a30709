//! Document loading and the text codec for schema / ui schema documents.
//!
//! Documents are kept as `serde_json::Value` with key order preserved, so
//! the order of `properties` in the text is the order elements are read in.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ElementError;

/// Parse a document from text.
///
/// Blank input parses to an empty object.
///
/// # Errors
///
/// Returns `ElementError::InvalidJson` if the text isn't valid JSON.
pub fn parse(text: &str) -> Result<Value, ElementError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|source| ElementError::InvalidJson { source })
}

/// Serialize a document to compact text.
///
/// A `null` document serializes to `{}`.
pub fn stringify(document: &Value) -> String {
    if document.is_null() {
        return "{}".to_string();
    }
    document.to_string()
}

/// Serialize a document to indented text.
pub fn stringify_pretty(document: &Value) -> String {
    if document.is_null() {
        return "{}".to_string();
    }
    // Serializing a Value cannot fail: keys are always strings.
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `ElementError::FileNotFound` if the file doesn't exist,
/// or `ElementError::InvalidJson` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, ElementError> {
    if !path.exists() {
        return Err(ElementError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ElementError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    parse(&content)
}

/// Write a document to a file path.
pub fn write_document(path: &Path, document: &Value, pretty: bool) -> Result<(), ElementError> {
    let text = if pretty {
        stringify_pretty(document)
    } else {
        stringify(document)
    };
    std::fs::write(path, text).map_err(|source| ElementError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

/// Navigate a `#/definitions/...` reference inside a definitions table.
///
/// `reference` must already be known to start with `#/definitions/`.
/// Segments are unescaped per RFC 6901 (`~1` is `/`, `~0` is `~`).
pub fn navigate_definition<'a>(
    definitions: &'a Map<String, Value>,
    reference: &str,
) -> Option<&'a Value> {
    let path = reference
        .strip_prefix(crate::types::DEFINITIONS_PREFIX)
        .unwrap_or(reference);
    let mut parts = path.split('/').map(|p| p.replace("~1", "/").replace("~0", "~"));

    let first = parts.next()?;
    let mut current = definitions.get(&first)?;
    for key in parts {
        current = current.get(&key)?;
    }
    Some(current)
}
