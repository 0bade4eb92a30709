//! Error types for element extraction, serialization and editing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while building the category lookup table from a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate match rule {key}: claimed by both '{existing}' and '{category}'")]
    DuplicateKey {
        key: String,
        existing: String,
        category: String,
    },

    #[error("invalid form input '{category}': {source}")]
    InvalidInput {
        category: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while reading documents or turning them into elements and back.
#[derive(Debug, Error)]
pub enum ElementError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Document errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid definition for '{name}', not at '#/definitions': {reference}")]
    InvalidRef { name: String, reference: String },

    #[error("element '{name}' is not a card")]
    NotACard { name: String },

    #[error("no element named '{name}'")]
    UnknownElement { name: String },

    #[error("index {index} out of range for {len} element(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown category '{category}'")]
    UnknownCategory { category: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ElementError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ElementError::FileNotFound { .. }
            | ElementError::ReadError { .. }
            | ElementError::WriteError { .. } => 3,
            _ => 2,
        }
    }
}

/// Rejected rename of an element.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("name '{name}' is already used by a sibling element")]
    NameTaken { name: String },

    #[error(transparent)]
    Element(#[from] ElementError),
}

impl RenameError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenameError::NameTaken { .. } => 1,
            RenameError::Element(e) => e.exit_code(),
        }
    }
}
