//! Errors raised by the document store and mutation engine

use std::path::PathBuf;
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document text is not well-formed JSON, or its root is not an object
    #[error("failed to parse document {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// A dotted path or identifier did not resolve
    #[error("path '{path}' not found")]
    NotFound { path: String },

    /// Creation target is already present
    #[error("'{path}' already exists")]
    AlreadyExists { path: String },

    /// A status write with a value outside draft/active/deprecated
    #[error("invalid status '{value}' (expected one of: draft, active, deprecated)")]
    InvalidStatus { value: String },

    /// A path segment or child key holds something other than a mapping
    #[error("'{path}' is not a mapping")]
    NotAMapping { path: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(path: impl Into<String>) -> Self {
        StoreError::NotFound { path: path.into() }
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        StoreError::AlreadyExists { path: path.into() }
    }

    /// True when the error is a missing identifier/path
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
