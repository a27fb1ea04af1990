//! Dotted path resolution (`specs.a.b.c`) by sequential key lookups

use std::fmt;

use serde_json::Value;

use crate::error::{Result, StoreError};

/// Root key holding every spec record
pub const SPECS_KEY: &str = "specs";

/// A dotted path into the document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecPath {
    segments: Vec<String>,
}

impl SpecPath {
    /// Split a dotted path. Empty segments are kept and simply never resolve.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(String::from).collect(),
        }
    }

    /// A dotted path interpreted relative to `specs`
    pub fn under_specs(dotted: &str) -> Self {
        let mut path = Self::root();
        path.segments.extend(dotted.split('.').map(String::from));
        path
    }

    /// `specs`
    pub fn root() -> Self {
        Self {
            segments: vec![SPECS_KEY.to_string()],
        }
    }

    /// `specs.<id>`
    pub fn spec(id: &str) -> Self {
        Self::root().join(id)
    }

    /// `specs.<parent>.<key>.<child>`
    pub fn child(parent: &str, key: &str, child: &str) -> Self {
        Self::spec(parent).join(key).join(child)
    }

    pub fn join(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path with dots replaced by underscores, for file names
    pub fn file_stem(&self) -> String {
        self.segments.join("_")
    }

    fn prefix(&self, len: usize) -> String {
        self.segments[..len].join(".")
    }
}

impl fmt::Display for SpecPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Resolve a path to a node, failing with `NotFound` naming the full path
pub fn resolve<'a>(root: &'a Value, path: &SpecPath) -> Result<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current
            .as_object()
            .and_then(|map| map.get(segment))
            .ok_or_else(|| StoreError::not_found(path.to_string()))?;
    }
    Ok(current)
}

/// Mutable variant of [`resolve`]
///
/// Distinguishes a missing segment from a segment that exists but is not a
/// mapping, so callers can report which prefix broke the walk.
pub fn resolve_mut<'a>(root: &'a mut Value, path: &SpecPath) -> Result<&'a mut Value> {
    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        let map = current.as_object_mut().ok_or_else(|| StoreError::NotAMapping {
            path: path.prefix(depth),
        })?;
        current = map
            .get_mut(segment)
            .ok_or_else(|| StoreError::not_found(path.to_string()))?;
    }
    Ok(current)
}
