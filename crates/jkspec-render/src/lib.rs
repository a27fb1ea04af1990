//! jkspec-render: Markdown rendering of spec records
//!
//! A record renders as an H1 title followed by a fixed sequence of sections
//! (Meta, Problem, Deliverables, Requirements, Implementation, Workflow,
//! Testing, Tasks, Notes). Each section is produced by the formatter bound
//! to its slot in a [`SlotTable`]; sections that format to nothing are
//! left out entirely.
//!
//! # Usage
//!
//! ```ignore
//! use jkspec_render::{render_spec, Renderer};
//! use jkspec_store::Document;
//!
//! let doc = Document::load(path)?;
//! let markdown = render_spec(&doc, "auth-api.endpoints.login")?;
//! ```

mod format;
mod slots;

pub use format::format_scalar;
pub use slots::{Formatter, Slot, SlotTable};

use std::path::{Path, PathBuf};

use jkspec_store::{Document, SpecPath, StoreError};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Heading level of the first headings inside a section body
pub const SECTION_BODY_LEVEL: usize = 3;

/// Rendering failures
#[derive(Debug, Error)]
pub enum RenderError {
    /// The input document does not exist
    #[error("input document not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    /// The input document could not be read or parsed
    #[error(transparent)]
    Load(#[from] StoreError),

    /// The record path does not resolve under `specs`
    #[error("path '{path}' not found (available specs: {})", .available.join(", "))]
    NotFound { path: String, available: Vec<String> },

    /// The output file or its directory could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Renders records through a slot table
#[derive(Debug, Clone)]
pub struct Renderer {
    table: SlotTable,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer with the standard slot bindings
    pub fn new() -> Self {
        Self::with_table(SlotTable::standard())
    }

    pub fn with_table(table: SlotTable) -> Self {
        Self { table }
    }

    /// Render `record` under the title `# Spec: <title>`.
    ///
    /// Output depends only on the record and the title.
    pub fn render(&self, title: &str, record: &Value) -> String {
        let mut parts = vec![format!("# Spec: {}", title)];

        for slot in Slot::ALL {
            let (Some(input), Some(formatter)) = (slot.input(record), self.table.resolve(slot)) else {
                continue;
            };
            let body = formatter.format(input, SECTION_BODY_LEVEL);
            if body.trim().is_empty() {
                continue;
            }
            parts.push(format!("## {}\n\n{}", slot.title(), body));
        }

        debug!(title, sections = parts.len() - 1, "rendered spec");
        let mut output = parts.join("\n\n");
        output.push('\n');
        output
    }

    /// Resolve a dotted path under `specs` and render it
    pub fn render_spec(&self, doc: &Document, path: &str) -> Result<String, RenderError> {
        let record = doc
            .resolve(&SpecPath::under_specs(path))
            .map_err(|_| RenderError::NotFound {
                path: path.to_string(),
                available: jkspec_store::query::list_ids(doc),
            })?;
        Ok(self.render(path, record))
    }
}

/// Render the record at `path` with the standard bindings
pub fn render_spec(doc: &Document, path: &str) -> Result<String, RenderError> {
    Renderer::new().render_spec(doc, path)
}

/// Default output location: `.tmp/<path with dots replaced by underscores>.md`
pub fn default_output_path(path: &str) -> PathBuf {
    PathBuf::from(".tmp").join(format!("{}.md", path.replace('.', "_")))
}

/// Load `input`, render the record at `path`, and write it to `output`,
/// creating intermediate directories.
pub fn render_to_file(input: &Path, path: &str, output: &Path) -> Result<(), RenderError> {
    if !input.exists() {
        return Err(RenderError::MissingInput {
            path: input.to_path_buf(),
        });
    }
    let doc = Document::load(input)?;
    let markdown = render_spec(&doc, path)?;

    let output_err = |source| RenderError::Output {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(output_err)?;
    }
    std::fs::write(output, markdown).map_err(output_err)?;

    debug!(input = %input.display(), output = %output.display(), path, "wrote rendered spec");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn full_record() -> Value {
        json!({
            "type": "api",
            "description": "Auth endpoints",
            "status": "active",
            "tags": ["backend"],
            "problem": "Users cannot log in",
            "deliverables": ["login route", "logout route"],
            "requirements": [{"title": "Login", "priority": "high", "description": "Users can log in"}],
            "implementation": {"language": "rust"},
            "workflow": [{"name": "review"}],
            "testing": {"unit": true},
            "tasks": [{"name": "A", "description": "do A", "done": true}],
            "notes": ["keep it small"],
            "endpoints": {"login": {"type": "route", "status": "draft"}}
        })
    }

    #[test]
    fn test_render_full_record() {
        let output = Renderer::new().render("auth-api", &full_record());
        let expected = "\
# Spec: auth-api

## Meta

- **Type:** api
- **Status:** active
- **Tags:** backend
- **Description:** Auth endpoints

## Problem

Users cannot log in

## Deliverables

- login route
- logout route

## Requirements

- **Login** (high)
  Users can log in

## Implementation

### language

rust

## Workflow

### review

## Testing

### unit

true

## Tasks

- [x] A: do A

## Notes

- keep it small
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_tasks_section_single_line() {
        let record = json!({"tasks": [{"name": "A", "description": "do A", "done": true}]});
        let output = Renderer::new().render("x", &record);
        assert_eq!(output, "# Spec: x\n\n## Tasks\n\n- [x] A: do A\n");
    }

    #[test]
    fn test_empty_slots_are_omitted() {
        let record = json!({"problem": "", "notes": [], "tasks": null, "requirements": {"not": "a list"}});
        let output = Renderer::new().render("bare", &record);
        assert_eq!(output, "# Spec: bare\n");
    }

    #[test]
    fn test_specialized_formatter_wins_over_structural() {
        let record = json!({"tasks": [{"name": "A", "description": "do A", "done": true}]});

        let output = Renderer::new().render("t", &record);
        assert!(output.contains("## Tasks\n\n- [x] A: do A"));

        let mut table = SlotTable::new();
        table.register(Slot::Tasks, Formatter::Tasks);
        table.register(Slot::Tasks, Formatter::Structural);
        let output = Renderer::with_table(table).render("t", &record);
        assert!(output.contains("## Tasks\n\n### A\n\n#### description\n\ndo A\n\n#### done\n\ntrue"));

        let mut table = SlotTable::new();
        table.register(Slot::Meta, Formatter::Structural);
        let output = Renderer::with_table(table).render("m", &json!({"type": "api"}));
        assert!(output.contains("## Meta\n\n### type\n\napi"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = Renderer::new();
        let record = full_record();
        assert_eq!(renderer.render("a", &record), renderer.render("a", &record));
    }

    #[test]
    fn test_render_spec_resolves_child_path() {
        let doc = Document::from_value(json!({"specs": {"auth-api": full_record()}})).unwrap();
        let output = render_spec(&doc, "auth-api.endpoints.login").unwrap();
        assert!(output.starts_with("# Spec: auth-api.endpoints.login\n\n## Meta\n\n- **Type:** route\n- **Status:** draft"));
    }

    #[test]
    fn test_render_spec_missing_path() {
        let doc = Document::from_value(json!({"specs": {"auth-api": {}, "web-ui": {}}})).unwrap();
        let err = render_spec(&doc, "auth-api.nope").unwrap_err();
        assert!(matches!(err, RenderError::NotFound { ref path, .. } if path == "auth-api.nope"));
        assert!(err.to_string().contains("auth-api.nope"));
        assert!(err.to_string().contains("auth-api, web-ui"));
    }

    #[test]
    fn test_render_to_file_creates_directories() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("project.json");
        std::fs::write(&input, json!({"specs": {"auth-api": full_record()}}).to_string()).unwrap();
        let output = dir.path().join("out").join("deep").join("auth-api.md");

        render_to_file(&input, "auth-api", &output).unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("# Spec: auth-api\n"));
    }

    #[test]
    fn test_render_to_file_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = render_to_file(&dir.path().join("absent.json"), "a", &dir.path().join("a.md")).unwrap_err();
        assert!(matches!(err, RenderError::MissingInput { .. }));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path("auth-api.endpoints"), PathBuf::from(".tmp/auth-api_endpoints.md"));
    }
}
