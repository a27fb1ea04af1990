//! Read-only queries against a document

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::path::{SpecPath, SPECS_KEY};
use crate::record::{RecordView, Status};

/// Filter over top-level records; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecFilter {
    pub status: Option<Status>,
    pub kind: Option<String>,
    pub tag: Option<String>,
}

impl SpecFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.kind.is_none() && self.tag.is_none()
    }

    pub fn matches(&self, record: &Value) -> bool {
        let Some(view) = RecordView::new(record) else {
            return self.is_empty();
        };
        if let Some(status) = self.status {
            if view.status() != Some(status) {
                return false;
            }
        }
        if let Some(ref kind) = self.kind {
            if view.kind() != Some(kind.as_str()) {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            if !view.tags().contains(&tag.as_str()) {
                return false;
            }
        }
        true
    }
}

/// A top-level record, unmodified
pub fn get_spec<'a>(doc: &'a Document, id: &str) -> Result<&'a Value> {
    doc.resolve(&SpecPath::spec(id))
}

/// A child record, unmodified
pub fn get_child<'a>(doc: &'a Document, parent: &str, key: &str, child: &str) -> Result<&'a Value> {
    doc.resolve(&SpecPath::child(parent, key, child))
}

/// Top-level identifiers in document order; empty when `specs` is absent
pub fn list_ids(doc: &Document) -> Vec<String> {
    list(doc, &SpecFilter::default())
}

/// Top-level identifiers matching `filter`, in document order
pub fn list(doc: &Document, filter: &SpecFilter) -> Vec<String> {
    doc.specs()
        .map(|specs| {
            specs
                .iter()
                .filter(|(_, record)| filter.matches(record))
                .map(|(id, _)| id.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Sorted dotted paths of every top-level and child record still in draft
pub fn drafts(doc: &Document) -> Vec<String> {
    let mut paths = Vec::new();
    let Some(specs) = doc.specs() else {
        return paths;
    };

    for (id, record) in specs {
        let Some(view) = RecordView::new(record) else {
            continue;
        };
        if view.status() == Some(Status::Draft) {
            paths.push(SpecPath::spec(id).to_string());
        }
        for (key, child_id, child) in view.children() {
            if RecordView::new(child).and_then(|c| c.status()) == Some(Status::Draft) {
                paths.push(SpecPath::child(id, key, child_id).to_string());
            }
        }
    }

    paths.sort();
    paths
}

/// Where a `references` or `implements` entry points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LinkTarget {
    Found {
        status: Option<Status>,
        description: Option<String>,
    },
    Missing,
}

/// One dependency edge as seen from the record under analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Normalized dotted path, always starting with `specs.`
    pub path: String,
    pub target: LinkTarget,
}

impl Link {
    /// Active or deprecated targets are settled; draft, unknown status and
    /// missing targets are not.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.target,
            LinkTarget::Found {
                status: Some(Status::Active | Status::Deprecated),
                ..
            }
        )
    }
}

/// Upstream and downstream dependencies of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Impact {
    pub path: String,
    pub status: Option<Status>,
    pub description: Option<String>,
    /// Targets of `references`
    pub upstream: Vec<Link>,
    /// Targets of `implements`
    pub downstream: Vec<Link>,
}

impl Impact {
    pub fn missing(&self) -> impl Iterator<Item = &Link> {
        self.upstream
            .iter()
            .chain(&self.downstream)
            .filter(|link| link.target == LinkTarget::Missing)
    }
}

/// Path of a reference string; a leading `specs.` is optional
fn reference_path(reference: &str) -> SpecPath {
    let relative = reference
        .strip_prefix(SPECS_KEY)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(reference);
    SpecPath::under_specs(relative)
}

fn link(doc: &Document, reference: &str) -> Link {
    let path = reference_path(reference);
    let target = match doc.resolve(&path).ok().and_then(RecordView::new) {
        Some(view) => LinkTarget::Found {
            status: view.status(),
            description: view.description().map(String::from),
        },
        None => LinkTarget::Missing,
    };
    Link {
        path: path.to_string(),
        target,
    }
}

/// Dependencies of the record at `path` (relative to `specs`, or prefixed
/// with `specs.`). Targets that do not resolve are reported, not errors.
pub fn impact(doc: &Document, path: &str) -> Result<Impact> {
    let path = reference_path(path);
    let view = RecordView::new(doc.resolve(&path)?).ok_or_else(|| StoreError::NotAMapping {
        path: path.to_string(),
    })?;

    Ok(Impact {
        path: path.to_string(),
        status: view.status(),
        description: view.description().map(String::from),
        upstream: view.references().into_iter().map(|r| link(doc, r)).collect(),
        downstream: view.implements().into_iter().map(|r| link(doc, r)).collect(),
    })
}

/// Why a record's references are not settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    Missing(String),
    Draft(String),
    UnknownStatus(String),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Missing(path) => write!(f, "reference not found: {}", path),
            StaleReason::Draft(path) => write!(f, "reference is still draft: {}", path),
            StaleReason::UnknownStatus(path) => write!(f, "reference has no valid status: {}", path),
        }
    }
}

/// An active record resting on unsettled references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleRecord {
    pub path: SpecPath,
    pub reasons: Vec<StaleReason>,
}

fn stale_reasons(doc: &Document, view: RecordView<'_>) -> Vec<StaleReason> {
    view.references()
        .into_iter()
        .filter_map(|reference| {
            let link = link(doc, reference);
            match link.target {
                LinkTarget::Missing => Some(StaleReason::Missing(link.path)),
                LinkTarget::Found { status: Some(Status::Draft), .. } => Some(StaleReason::Draft(link.path)),
                LinkTarget::Found { status: None, .. } => Some(StaleReason::UnknownStatus(link.path)),
                LinkTarget::Found { .. } => None,
            }
        })
        .collect()
}

/// Active top-level and child records with at least one unsettled
/// reference, sorted by path.
///
/// Computed against the document as it is now: resetting one record does
/// not make the records that reference it stale within the same pass.
pub fn stale_references(doc: &Document) -> Vec<StaleRecord> {
    let mut stale = Vec::new();
    let Some(specs) = doc.specs() else {
        return stale;
    };

    let mut consider = |path: SpecPath, node: &Value| {
        let Some(view) = RecordView::new(node) else {
            return;
        };
        if view.status() != Some(Status::Active) {
            return;
        }
        let reasons = stale_reasons(doc, view);
        if !reasons.is_empty() {
            stale.push(StaleRecord { path, reasons });
        }
    };

    for (id, record) in specs {
        consider(SpecPath::spec(id), record);
        if let Some(view) = RecordView::new(record) {
            for (key, child_id, child) in view.children() {
                consider(SpecPath::child(id, key, child_id), child);
            }
        }
    }

    stale.sort_by_key(|record| record.path.to_string());
    stale
}
