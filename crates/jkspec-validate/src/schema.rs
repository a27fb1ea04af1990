//! External schema-conformance boundary
//!
//! The schema itself is maintained elsewhere. This crate only triggers a
//! check and reacts to its pass/fail outcome.

use std::path::{Path, PathBuf};

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use thiserror::Error;

/// Outcome of an external schema check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaOutcome {
    pub passed: bool,
    /// Human-readable failure messages; empty on success
    pub messages: Vec<String>,
}

impl SchemaOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            messages: Vec::new(),
        }
    }

    pub fn fail(messages: Vec<String>) -> Self {
        Self {
            passed: false,
            messages,
        }
    }
}

/// A schema checker consumed as a black box
pub trait SchemaCheck {
    /// Name used in findings, usually the schema file
    fn name(&self) -> String;

    fn check(&self, document: &Value) -> SchemaOutcome;
}

/// Errors loading a schema file
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse schema {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("failed to compile schema {path}: {reason}")]
    Compile { path: PathBuf, reason: String },
}

/// JSON Schema (Draft 7) checker backed by a schema file
pub struct JsonSchemaCheck {
    path: PathBuf,
    compiled: JSONSchema,
}

impl JsonSchemaCheck {
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let schema: Value = serde_json::from_str(&text).map_err(|e| SchemaError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_value(path, &schema)
    }

    /// Compile an in-memory schema; `path` is only used for naming
    pub fn from_value(path: &Path, schema: &Value) -> Result<Self, SchemaError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| SchemaError::Compile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            compiled,
        })
    }
}

impl SchemaCheck for JsonSchemaCheck {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn check(&self, document: &Value) -> SchemaOutcome {
        match self.compiled.validate(document) {
            Ok(()) => SchemaOutcome::pass(),
            Err(errors) => SchemaOutcome::fail(
                errors
                    .map(|e| {
                        let path = e.instance_path.to_string();
                        let path = if path.is_empty() { "root".to_string() } else { path };
                        format!("{e} at '{path}'")
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn project_schema() -> Value {
        json!({
            "type": "object",
            "required": ["project", "specs"],
            "properties": {
                "specs": {"type": "object"}
            }
        })
    }

    #[test]
    fn test_passes_conforming_document() {
        let check = JsonSchemaCheck::from_value(Path::new("schema.json"), &project_schema()).unwrap();
        let outcome = check.check(&json!({"project": {}, "specs": {}}));
        assert_eq!(outcome, SchemaOutcome::pass());
    }

    #[test]
    fn test_fails_nonconforming_document() {
        let check = JsonSchemaCheck::from_value(Path::new("schema.json"), &project_schema()).unwrap();
        let outcome = check.check(&json!({"project": {}, "specs": []}));
        assert!(!outcome.passed);
        assert!(outcome.messages.iter().any(|m| m.contains("/specs")));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, project_schema().to_string()).unwrap();

        let check = JsonSchemaCheck::from_file(&path).unwrap();
        assert!(check.name().ends_with("schema.json"));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonSchemaCheck::from_file(&path), Err(SchemaError::Parse { .. })));
    }
}
