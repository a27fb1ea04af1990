//! Mutation Engine - create, update and remove records
//!
//! Two levels are addressable: top-level records under `specs`, and one level
//! of child records under a caller-chosen key of a parent. Any write to a
//! field other than `status` forces the touched record back to draft, and a
//! child edit also forces its parent back to draft.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::path::SpecPath;
use crate::query::{self, StaleRecord};
use crate::record::{force_draft, NewRecord, Status, STATUS_FIELD};

/// What a successful mutation touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Dotted path of the record that was written
    pub path: String,
    /// Dotted paths whose status was forced to draft, innermost first
    pub drafted: Vec<String>,
}

impl MutationOutcome {
    fn new(path: &SpecPath) -> Self {
        Self {
            path: path.to_string(),
            drafted: Vec::new(),
        }
    }

    fn with_drafted(mut self, path: &SpecPath) -> Self {
        self.drafted.push(path.to_string());
        self
    }
}

/// Applies record mutations to a [`Document`]
///
/// The mutator holds no state; the document is passed explicitly so the
/// caller decides when to persist.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mutator;

impl Mutator {
    pub fn new() -> Self {
        Self
    }

    /// Insert a new top-level record with status draft
    pub fn create_spec(&self, doc: &mut Document, id: &str, record: NewRecord) -> Result<MutationOutcome> {
        let path = SpecPath::spec(id);
        let specs = doc.specs_mut()?;
        if specs.contains_key(id) {
            return Err(StoreError::already_exists(path.to_string()));
        }
        specs.insert(id.to_string(), record.into_value());

        debug!(%path, "created spec");
        Ok(MutationOutcome::new(&path))
    }

    /// Set one field of a top-level record.
    ///
    /// A `status` write only changes status; any other field also forces
    /// the record back to draft.
    pub fn update_spec(&self, doc: &mut Document, id: &str, field: &str, value: Value) -> Result<MutationOutcome> {
        let path = SpecPath::spec(id);
        let record = record_mut(doc.specs_mut()?, id, &path)?;

        let outcome = MutationOutcome::new(&path);
        let outcome = if field == STATUS_FIELD {
            set_status(record, &value)?;
            outcome
        } else {
            record.insert(field.to_string(), value);
            force_draft(record);
            outcome.with_drafted(&path)
        };

        debug!(%path, field, drafted = outcome.drafted.len(), "updated spec");
        Ok(outcome)
    }

    /// Delete a top-level record and its whole subtree, returning it
    pub fn remove_spec(&self, doc: &mut Document, id: &str) -> Result<Value> {
        let path = SpecPath::spec(id);
        let removed = doc
            .specs_mut()?
            .shift_remove(id)
            .ok_or_else(|| StoreError::not_found(path.to_string()))?;

        debug!(%path, "removed spec");
        Ok(removed)
    }

    /// Insert a child record under `parent[key][child]`, creating the key's
    /// mapping if needed. The parent is forced to draft.
    pub fn create_child(
        &self,
        doc: &mut Document,
        parent: &str,
        key: &str,
        child: &str,
        record: NewRecord,
    ) -> Result<MutationOutcome> {
        let parent_path = SpecPath::spec(parent);
        let path = SpecPath::child(parent, key, child);
        let parent_record = record_mut(doc.specs_mut()?, parent, &parent_path)?;

        let children = parent_record
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| StoreError::NotAMapping {
                path: parent_path.clone().join(key).to_string(),
            })?;
        if children.contains_key(child) {
            return Err(StoreError::already_exists(path.to_string()));
        }
        children.insert(child.to_string(), record.into_value());
        force_draft(parent_record);

        debug!(%path, "created child");
        Ok(MutationOutcome::new(&path).with_drafted(&parent_path))
    }

    /// Set one field of a child record.
    ///
    /// A `status` write touches only the child. Any other field forces both
    /// the child and its parent back to draft.
    pub fn update_child(
        &self,
        doc: &mut Document,
        parent: &str,
        key: &str,
        child: &str,
        field: &str,
        value: Value,
    ) -> Result<MutationOutcome> {
        let parent_path = SpecPath::spec(parent);
        let path = SpecPath::child(parent, key, child);
        let parent_record = record_mut(doc.specs_mut()?, parent, &parent_path)?;

        let group_path = parent_path.clone().join(key);
        let children = parent_record
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found(group_path.to_string()))?
            .as_object_mut()
            .ok_or_else(|| StoreError::NotAMapping {
                path: group_path.to_string(),
            })?;
        let child_record = record_mut(children, child, &path)?;

        let outcome = MutationOutcome::new(&path);
        let outcome = if field == STATUS_FIELD {
            set_status(child_record, &value)?;
            outcome
        } else {
            child_record.insert(field.to_string(), value);
            force_draft(child_record);
            force_draft(parent_record);
            outcome.with_drafted(&path).with_drafted(&parent_path)
        };

        debug!(%path, field, drafted = outcome.drafted.len(), "updated child");
        Ok(outcome)
    }

    /// Reset every active record with an unsettled reference to draft.
    ///
    /// This is a status write: parents of reset children are not touched.
    /// Returns what was reset; an empty result means the document is
    /// unchanged.
    pub fn invalidate_stale_references(&self, doc: &mut Document) -> Result<Vec<StaleRecord>> {
        let stale = query::stale_references(doc);
        for record in &stale {
            let node = doc
                .resolve_mut(&record.path)?
                .as_object_mut()
                .ok_or_else(|| StoreError::NotAMapping {
                    path: record.path.to_string(),
                })?;
            force_draft(node);
            debug!(path = %record.path, reasons = record.reasons.len(), "reset stale record");
        }
        Ok(stale)
    }
}

/// Look up a record mapping by id within `container`
fn record_mut<'a>(
    container: &'a mut Map<String, Value>,
    id: &str,
    path: &SpecPath,
) -> Result<&'a mut Map<String, Value>> {
    container
        .get_mut(id)
        .ok_or_else(|| StoreError::not_found(path.to_string()))?
        .as_object_mut()
        .ok_or_else(|| StoreError::NotAMapping {
            path: path.to_string(),
        })
}

fn set_status(record: &mut Map<String, Value>, value: &Value) -> Result<()> {
    let status = Status::from_value(value)?;
    record.insert(STATUS_FIELD.to_string(), status.into());
    Ok(())
}
