//! Record model: status lifecycle and typed views over untyped record nodes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::StoreError;

/// Field name of the lifecycle marker
pub const STATUS_FIELD: &str = "status";

/// Upstream dependencies of a record, as dotted paths under `specs`
pub const REFERENCES_FIELD: &str = "references";

/// Downstream dependents of a record, as dotted paths under `specs`
pub const IMPLEMENTS_FIELD: &str = "implements";

/// Lifecycle marker of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Active,
    Deprecated,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Draft, Status::Active, Status::Deprecated];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Active => "active",
            Status::Deprecated => "deprecated",
        }
    }

    /// Parse a status from a stored JSON value
    pub fn from_value(value: &Value) -> Result<Self, StoreError> {
        match value {
            Value::String(s) => s.parse(),
            other => Err(StoreError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "active" => Ok(Status::Active),
            "deprecated" => Ok(Status::Deprecated),
            _ => Err(StoreError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

impl From<Status> for Value {
    fn from(status: Status) -> Self {
        Value::String(status.as_str().to_string())
    }
}

/// Fields supplied when creating a record; status always starts as draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub kind: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl NewRecord {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Build the stored node in canonical field order
    pub fn into_value(self) -> Value {
        json!({
            "type": self.kind,
            "description": self.description,
            "status": Status::Draft,
            "tags": self.tags,
        })
    }
}

/// Read-only typed accessors over a record node
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RecordView<'a> {
    /// Returns `None` when the node is not a mapping
    pub fn new(node: &'a Value) -> Option<Self> {
        node.as_object().map(|fields| Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field)
    }

    pub fn kind(&self) -> Option<&'a str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.fields.get("description").and_then(Value::as_str)
    }

    /// Raw status value, present or not
    pub fn raw_status(&self) -> Option<&'a Value> {
        self.fields.get(STATUS_FIELD)
    }

    /// Parsed status; `None` if absent or not one of the known values
    pub fn status(&self) -> Option<Status> {
        self.raw_status().and_then(|v| Status::from_value(v).ok())
    }

    pub fn tags(&self) -> Vec<&'a str> {
        self.string_list("tags")
    }

    /// Child records one level down, as `(key, child id, node)` in document order.
    ///
    /// A child is an entry of a mapping field that carries both a string
    /// `type` and a `status`, the shape `create_child` writes. Entries of the
    /// same mapping without that shape are skipped individually. Free-form
    /// content whose entries happen to carry `type` and `status` cannot be
    /// told apart from children and is reported as such.
    pub fn children(&self) -> Vec<(&'a str, &'a str, &'a Value)> {
        let mut found = Vec::new();
        for (key, value) in self.fields {
            let Some(group) = value.as_object() else {
                continue;
            };
            for (child_id, child) in group {
                if is_record_shaped(child) {
                    found.push((key.as_str(), child_id.as_str(), child));
                }
            }
        }
        found
    }

    /// `references` entries: records this one depends on
    pub fn references(&self) -> Vec<&'a str> {
        self.string_list(REFERENCES_FIELD)
    }

    /// `implements` entries: records built on top of this one
    pub fn implements(&self) -> Vec<&'a str> {
        self.string_list(IMPLEMENTS_FIELD)
    }

    fn string_list(&self, field: &str) -> Vec<&'a str> {
        self.fields
            .get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

fn is_record_shaped(node: &Value) -> bool {
    node.as_object()
        .is_some_and(|n| n.get("type").is_some_and(Value::is_string) && n.contains_key(STATUS_FIELD))
}

/// Force a record's status to draft
pub(crate) fn force_draft(record: &mut Map<String, Value>) {
    record.insert(STATUS_FIELD.to_string(), Status::Draft.into());
}
