//! Document Store - load, resolve, and atomically persist the spec document
//!
//! The whole document lives in memory as a JSON tree. Every mutating command
//! loads it once, edits it, and calls [`Document::persist`] exactly once.

use std::fs::Permissions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::path::{self, SpecPath, SPECS_KEY};

/// In-memory spec document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Empty project document
    pub fn template() -> Self {
        Self {
            root: json!({
                "project": {
                    "name": "",
                    "description": "",
                    "version": "0.1.0",
                    "architecture": {},
                    "conventions": {},
                    "decisions": []
                },
                "specs": {}
            }),
        }
    }

    /// Wrap an already-parsed tree; the root must be a mapping
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(StoreError::Parse {
                source_name: "<value>".to_string(),
                reason: "document root is not an object".to_string(),
            });
        }
        Ok(Self { root })
    }

    /// Parse document text, naming `source_name` in any error
    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text).map_err(|e| StoreError::Parse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_value(root).map_err(|_| StoreError::Parse {
            source_name: source_name.to_string(),
            reason: "document root is not an object".to_string(),
        })
    }

    /// Read and parse the document at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let doc = Self::parse(&text, &path.display().to_string())?;
        debug!(path = %path.display(), bytes = text.len(), "loaded document");
        Ok(doc)
    }

    /// Write the full document next to `path` and rename it over the original.
    ///
    /// Readers observe either the previous or the new document, never a
    /// partial write. Missing parent directories are created. An existing
    /// file keeps its permissions; a new one gets the process umask default.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let text = self.to_json_string()?;
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = temp_file_for(dir, path).map_err(io_err)?;
        tmp.write_all(text.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        debug!(path = %path.display(), bytes = text.len(), "persisted document");
        Ok(())
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json_string(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&self.root)?;
        text.push('\n');
        Ok(text)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn resolve(&self, path: &SpecPath) -> Result<&Value> {
        path::resolve(&self.root, path)
    }

    pub fn resolve_mut(&mut self, path: &SpecPath) -> Result<&mut Value> {
        path::resolve_mut(&mut self.root, path)
    }

    /// The `project` metadata mapping, if present
    pub fn project(&self) -> Option<&Map<String, Value>> {
        self.root.get("project").and_then(Value::as_object)
    }

    /// The `specs` mapping, if present and a mapping
    pub fn specs(&self) -> Option<&Map<String, Value>> {
        self.root.get(SPECS_KEY).and_then(Value::as_object)
    }

    pub(crate) fn specs_mut(&mut self) -> Result<&mut Map<String, Value>> {
        match self.root.get_mut(SPECS_KEY) {
            Some(Value::Object(specs)) => Ok(specs),
            Some(_) => Err(StoreError::NotAMapping {
                path: SPECS_KEY.to_string(),
            }),
            None => Err(StoreError::not_found(SPECS_KEY)),
        }
    }
}

/// Temp file in `dir` carrying the permissions `target` will end up with
fn temp_file_for(dir: &Path, target: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    if let Some(permissions) = new_file_permissions() {
        builder.permissions(permissions);
    }
    let tmp = builder.tempfile_in(dir)?;

    match std::fs::metadata(target) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    Ok(tmp)
}

/// 0666 before the umask, as `File::create` would use
#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

impl FromStr for Document {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, "<input>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_rejects_malformed_text() {
        let err = Document::parse("{ not json", "broken.json").unwrap_err();
        assert!(matches!(err, StoreError::Parse { ref source_name, .. } if source_name == "broken.json"));
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        assert!(matches!(
            "[1, 2]".parse::<Document>(),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn test_template_shape() {
        let doc = Document::template();
        assert_eq!(doc.project().unwrap()["version"], "0.1.0");
        assert!(doc.specs().unwrap().is_empty());
    }

    #[test]
    fn test_persist_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("project.json");

        let doc = Document::template();
        doc.persist(&path).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded, doc);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        Document::template().persist(&path).unwrap();
        Document::template().persist(&path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        Document::template().persist(&path).unwrap();

        for mode in [0o644, 0o640] {
            std::fs::set_permissions(&path, Permissions::from_mode(mode)).unwrap();
            let doc = Document::load(&path).unwrap();
            doc.persist(&path).unwrap();

            let after = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(after, mode);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_new_file_uses_umask_default() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        Document::template().persist(&path).unwrap();

        let plain = dir.path().join("plain.json");
        std::fs::File::create(&plain).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Document::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_specs_mut_requires_specs() {
        let mut doc: Document = r#"{"project": {}}"#.parse().unwrap();
        assert!(doc.specs_mut().unwrap_err().is_not_found());
    }
}
