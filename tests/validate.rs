//! Validation of documents produced through the store

use jkspec::store::{Document, Mutator, NewRecord};
use jkspec::validate::{validate, Finding, Validator};
use serde_json::json;

#[test]
fn test_fresh_document_needs_only_a_name() {
    let mut doc = Document::template();
    let report = validate(&doc);
    assert_eq!(report.findings, vec![Finding::MissingProjectName]);

    doc.resolve_mut(&jkspec::store::SpecPath::parse("project"))
        .unwrap()
        .as_object_mut()
        .unwrap()
        .insert("name".to_string(), json!("demo"));
    Mutator::new()
        .create_spec(&mut doc, "auth-api", NewRecord::new("api", "Auth"))
        .unwrap();
    let report = validate(&doc);
    assert!(report.is_ok());
    assert_eq!(report.specs_checked, 1);
}

#[test]
fn test_one_identifier_finding_per_bad_id() {
    let doc = Document::from_value(json!({
        "project": {"version": "0.1.0"},
        "specs": {
            "Bad_Id": {"status": "bogus"},
            "good-id": {"type": "api", "description": "ok", "status": "draft"},
            "AlsoBad": {"type": "api", "description": "ok", "status": "draft"}
        }
    }))
    .unwrap();

    let report = validate(&doc);
    let identifier_findings: Vec<_> = report
        .findings
        .iter()
        .filter(|f| matches!(f, Finding::InvalidIdentifier { .. }))
        .collect();
    assert_eq!(identifier_findings.len(), 2);
    assert_eq!(report.for_spec("good-id").count(), 0);
    assert!(report.findings.contains(&Finding::MissingProjectName));
}

#[test]
fn test_malformed_text_is_single_fatal_finding() {
    let report = Validator::new().validate_text("[1, 2", "project.json");
    assert_eq!(report.findings.len(), 1);
    assert!(report.aborted());
    assert_eq!(report.findings[0].code(), "E-DOC-001");
}
