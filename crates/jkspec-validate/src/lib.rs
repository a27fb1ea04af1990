//! jkspec Structural Validator
//!
//! Checks document- and record-level invariants of a spec document and
//! produces a report of findings. Findings accumulate; only a malformed
//! document or a missing `specs` mapping stops the run early.

mod report;
mod schema;
mod validator;

pub use report::ReportFormat;
pub use schema::{JsonSchemaCheck, SchemaCheck, SchemaError, SchemaOutcome};
pub use validator::{is_kebab_case, validate, Validator};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Finding {
    /// E-DOC-001: Document is not well-formed structured data
    #[error("document {source_name} is malformed: {reason}")]
    MalformedDocument { source_name: String, reason: String },

    /// E-DOC-002: `project.name` missing or empty
    #[error("project.name is missing or empty")]
    MissingProjectName,

    /// E-DOC-003: `project.version` missing
    #[error("project.version is missing")]
    MissingProjectVersion,

    /// E-DOC-004: `specs` mapping missing
    #[error("specs mapping is missing")]
    MissingSpecs,

    /// E-DOC-005: External schema check failed
    #[error("document does not conform to schema {schema}: {}", .messages.join("; "))]
    SchemaViolation { schema: String, messages: Vec<String> },

    /// E-SPEC-001: Top-level identifier is not kebab-case
    #[error("spec '{id}': identifier is not kebab-case")]
    InvalidIdentifier { id: String },

    /// E-SPEC-002: Required field missing
    #[error("spec '{id}': missing required field '{field}'")]
    MissingField { id: String, field: String },

    /// E-SPEC-003: Status missing
    #[error("spec '{id}': missing status")]
    MissingStatus { id: String },

    /// E-SPEC-004: Status outside draft/active/deprecated
    #[error("spec '{id}': invalid status {value} (expected one of: draft, active, deprecated)")]
    InvalidStatus { id: String, value: String },

    /// E-SPEC-005: Record is not a mapping
    #[error("spec '{id}': record is not a mapping")]
    NotARecord { id: String },
}

impl Finding {
    /// Get the finding code for display
    pub fn code(&self) -> &'static str {
        match self {
            Finding::MalformedDocument { .. } => "E-DOC-001",
            Finding::MissingProjectName => "E-DOC-002",
            Finding::MissingProjectVersion => "E-DOC-003",
            Finding::MissingSpecs => "E-DOC-004",
            Finding::SchemaViolation { .. } => "E-DOC-005",
            Finding::InvalidIdentifier { .. } => "E-SPEC-001",
            Finding::MissingField { .. } => "E-SPEC-002",
            Finding::MissingStatus { .. } => "E-SPEC-003",
            Finding::InvalidStatus { .. } => "E-SPEC-004",
            Finding::NotARecord { .. } => "E-SPEC-005",
        }
    }

    /// Fatal findings end the run; nothing after them is checked
    pub fn is_fatal(&self) -> bool {
        matches!(self, Finding::MalformedDocument { .. } | Finding::MissingSpecs)
    }

    /// The spec identifier the finding is about, if any
    pub fn spec_id(&self) -> Option<&str> {
        match self {
            Finding::InvalidIdentifier { id }
            | Finding::MissingField { id, .. }
            | Finding::MissingStatus { id }
            | Finding::InvalidStatus { id, .. }
            | Finding::NotARecord { id } => Some(id),
            _ => None,
        }
    }
}

/// Result of a validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of top-level records inspected
    pub specs_checked: usize,
    /// Findings in the order they were detected
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.findings.len()
    }

    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }

    /// Whether the run stopped at a fatal finding
    pub fn aborted(&self) -> bool {
        self.findings.iter().any(Finding::is_fatal)
    }

    /// Findings about one spec identifier
    pub fn for_spec<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.spec_id() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let findings = [
            Finding::MalformedDocument { source_name: "x".into(), reason: "y".into() },
            Finding::MissingProjectName,
            Finding::MissingProjectVersion,
            Finding::MissingSpecs,
            Finding::SchemaViolation { schema: "s".into(), messages: vec![] },
            Finding::InvalidIdentifier { id: "A".into() },
            Finding::MissingField { id: "a".into(), field: "type".into() },
            Finding::MissingStatus { id: "a".into() },
            Finding::InvalidStatus { id: "a".into(), value: "\"x\"".into() },
            Finding::NotARecord { id: "a".into() },
        ];
        let mut codes: Vec<_> = findings.iter().map(Finding::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), findings.len());
    }

    #[test]
    fn test_display_names_identifier() {
        let finding = Finding::MissingField { id: "auth-api".into(), field: "type".into() };
        assert_eq!(finding.to_string(), "spec 'auth-api': missing required field 'type'");
        assert_eq!(finding.spec_id(), Some("auth-api"));
    }

    #[test]
    fn test_fatal_findings() {
        assert!(Finding::MissingSpecs.is_fatal());
        assert!(!Finding::MissingProjectName.is_fatal());
    }
}
