//! Structural checks over a spec document

use std::sync::OnceLock;

use jkspec_store::{Document, RecordView, Status, StoreError};
use regex_lite::Regex;
use serde_json::Value;
use tracing::warn;

use crate::schema::SchemaCheck;
use crate::{Finding, ValidationReport};

/// Fields every top-level record must carry, besides `status`
const REQUIRED_FIELDS: [&str; 2] = ["type", "description"];

fn kebab_case() -> &'static Regex {
    static KEBAB: OnceLock<Regex> = OnceLock::new();
    KEBAB.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("kebab-case pattern is valid")
    })
}

/// Whether `id` is lowercase alphanumeric segments joined by single hyphens,
/// starting with a letter
pub fn is_kebab_case(id: &str) -> bool {
    kebab_case().is_match(id)
}

/// Validate a parsed document with the structural checks only
pub fn validate(doc: &Document) -> ValidationReport {
    Validator::new().validate(doc)
}

/// Runs the structural checks, optionally followed by an external schema check
#[derive(Default)]
pub struct Validator<'s> {
    schema: Option<&'s dyn SchemaCheck>,
}

impl<'s> Validator<'s> {
    pub fn new() -> Self {
        Self { schema: None }
    }

    /// Also run `schema` once the structural checks complete without a fatal finding
    pub fn with_schema(mut self, schema: &'s dyn SchemaCheck) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Parse `text` and validate it. A parse failure is the only finding.
    pub fn validate_text(&self, text: &str, source_name: &str) -> ValidationReport {
        match Document::parse(text, source_name) {
            Ok(doc) => self.validate(&doc),
            Err(StoreError::Parse { source_name, reason }) => {
                let mut report = ValidationReport::default();
                push(&mut report, Finding::MalformedDocument { source_name, reason });
                report
            }
            Err(other) => {
                let mut report = ValidationReport::default();
                push(
                    &mut report,
                    Finding::MalformedDocument {
                        source_name: source_name.to_string(),
                        reason: other.to_string(),
                    },
                );
                report
            }
        }
    }

    pub fn validate(&self, doc: &Document) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_project(doc, &mut report);

        let Some(specs) = doc.specs() else {
            push(&mut report, Finding::MissingSpecs);
            return report;
        };

        for (id, record) in specs {
            check_spec(id, record, &mut report);
            report.specs_checked += 1;
        }

        if let Some(schema) = self.schema {
            let outcome = schema.check(doc.root());
            if !outcome.passed {
                push(
                    &mut report,
                    Finding::SchemaViolation {
                        schema: schema.name(),
                        messages: outcome.messages,
                    },
                );
            }
        }

        report
    }
}

fn push(report: &mut ValidationReport, finding: Finding) {
    warn!(code = finding.code(), "{}", finding);
    report.findings.push(finding);
}

fn check_project(doc: &Document, report: &mut ValidationReport) {
    let project = doc.project();

    let has_name = project
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty());
    if !has_name {
        push(report, Finding::MissingProjectName);
    }

    let has_version = project
        .and_then(|p| p.get("version"))
        .is_some_and(|v| !v.is_null());
    if !has_version {
        push(report, Finding::MissingProjectVersion);
    }
}

/// Check one top-level record. Child records are not descended into.
fn check_spec(id: &str, record: &Value, report: &mut ValidationReport) {
    if !is_kebab_case(id) {
        push(report, Finding::InvalidIdentifier { id: id.to_string() });
    }

    let Some(view) = RecordView::new(record) else {
        push(report, Finding::NotARecord { id: id.to_string() });
        return;
    };

    for field in REQUIRED_FIELDS {
        if view.get(field).map_or(true, Value::is_null) {
            push(
                report,
                Finding::MissingField {
                    id: id.to_string(),
                    field: field.to_string(),
                },
            );
        }
    }

    match view.raw_status() {
        None | Some(Value::Null) => push(report, Finding::MissingStatus { id: id.to_string() }),
        Some(value) => {
            if Status::from_value(value).is_err() {
                push(
                    report,
                    Finding::InvalidStatus {
                        id: id.to_string(),
                        value: value.to_string(),
                    },
                );
            }
        }
    }
}
