//! Formatters turning slot values into Markdown text
//!
//! Every formatter returns its body without a trailing newline; an empty
//! string means the slot has nothing to show.

use jkspec_store::RecordView;
use serde_json::{Map, Value};

/// Deepest level rendered as a Markdown heading
const MAX_HEADING_LEVEL: usize = 6;

/// Scalar text: booleans and numbers in their literal form, strings verbatim,
/// anything else as compact JSON
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn heading(level: usize, text: &str) -> String {
    if level <= MAX_HEADING_LEVEL {
        format!("{} {}", "#".repeat(level), text)
    } else {
        format!("**{}**", text)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Generic structural formatter.
///
/// Mapping keys become headings at `level`, sequences become bullets (for
/// scalars) or titled headings (for mappings), scalars format as text.
pub fn structural(value: &Value, level: usize) -> String {
    match value {
        Value::Object(map) => entries(map.iter(), level),
        Value::Array(items) => sequence(items, level),
        scalar => format_scalar(scalar),
    }
}

fn entries<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>, level: usize) -> String {
    let blocks: Vec<String> = fields
        .map(|(key, value)| {
            let title = heading(level, key);
            let body = structural(value, level + 1);
            if body.is_empty() {
                title
            } else {
                format!("{}\n\n{}", title, body)
            }
        })
        .collect();
    blocks.join("\n\n")
}

fn sequence(items: &[Value], level: usize) -> String {
    let mut blocks = Vec::new();
    let mut bullets: Vec<String> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(map) => {
                if !bullets.is_empty() {
                    blocks.push(bullets.join("\n"));
                    bullets.clear();
                }
                let (title, title_key) = item_title(map, index + 1);
                let body = entries(map.iter().filter(|(k, _)| Some(k.as_str()) != title_key), level + 1);
                if body.is_empty() {
                    blocks.push(heading(level, &title));
                } else {
                    blocks.push(format!("{}\n\n{}", heading(level, &title), body));
                }
            }
            other => bullets.push(format!("- {}", format_scalar(other))),
        }
    }
    if !bullets.is_empty() {
        blocks.push(bullets.join("\n"));
    }

    blocks.join("\n\n")
}

/// Title of a mapping inside a sequence and the field it was taken from
fn item_title(map: &Map<String, Value>, position: usize) -> (String, Option<&'static str>) {
    for key in ["name", "title"] {
        if let Some(value) = present(map.get(key)) {
            return (format_scalar(value), Some(key));
        }
    }
    (format!("Item {}", position), None)
}

/// Meta block: type, status, tags and description of the record itself
pub fn meta(record: &Value, _level: usize) -> String {
    let Some(view) = RecordView::new(record) else {
        return String::new();
    };
    let mut lines = Vec::new();

    if let Some(kind) = present(view.get("type")) {
        lines.push(format!("- **Type:** {}", format_scalar(kind)));
    }
    if let Some(status) = present(view.get("status")) {
        lines.push(format!("- **Status:** {}", format_scalar(status)));
    }
    match present(view.get("tags")) {
        Some(Value::Array(tags)) if !tags.is_empty() => {
            let joined: Vec<String> = tags.iter().map(format_scalar).collect();
            lines.push(format!("- **Tags:** {}", joined.join(", ")));
        }
        Some(Value::Array(_)) | None => {}
        Some(other) => lines.push(format!("- **Tags:** {}", format_scalar(other))),
    }
    if let Some(description) = present(view.get("description")) {
        lines.push(format!("- **Description:** {}", format_scalar(description)));
    }

    lines.join("\n")
}

/// Requirement list: titled bullets with priority, description and details
pub fn requirements(value: &Value, _level: usize) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };
    let mut lines = Vec::new();

    for item in items {
        let Some(req) = item.as_object() else {
            lines.push(format!("- {}", format_scalar(item)));
            continue;
        };

        let title = present(req.get("title"))
            .or_else(|| present(req.get("id")))
            .map(format_scalar)
            .unwrap_or_else(|| "Requirement".to_string());
        let priority = present(req.get("priority"))
            .map(format_scalar)
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!("- **{}** ({})", title, priority));

        if let Some(description) = present(req.get("description")) {
            for line in format_scalar(description).lines() {
                lines.push(format!("  {}", line));
            }
        }

        match present(req.get("details")) {
            Some(Value::Array(details)) => {
                for detail in details {
                    lines.push(format!("    - {}", format_scalar(detail)));
                }
            }
            Some(detail) => lines.push(format!("    - {}", format_scalar(detail))),
            None => {}
        }
    }

    lines.join("\n")
}

/// Task checklist: `- [x] name: description`
pub fn tasks(value: &Value, _level: usize) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };

    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            let Some(task) = item.as_object() else {
                return format!("- [ ] {}", format_scalar(item));
            };
            let mark = if task.get("done") == Some(&Value::Bool(true)) { "x" } else { " " };
            let name = present(task.get("name"))
                .map(format_scalar)
                .unwrap_or_else(|| "Task".to_string());
            match present(task.get("description")).map(format_scalar) {
                Some(description) if !description.is_empty() => {
                    format!("- [{}] {}: {}", mark, name, description)
                }
                _ => format!("- [{}] {}:", mark, name),
            }
        })
        .collect();

    lines.join("\n")
}

/// Notes: one plain bullet per entry
pub fn notes(value: &Value, _level: usize) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };
    items
        .iter()
        .map(|note| format!("- {}", format_scalar(note)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(&json!(true)), "true");
        assert_eq!(format_scalar(&json!(false)), "false");
        assert_eq!(format_scalar(&json!(42)), "42");
        assert_eq!(format_scalar(&json!(2.5)), "2.5");
        assert_eq!(format_scalar(&json!("as is")), "as is");
        assert_eq!(format_scalar(&Value::Null), "null");
        assert_eq!(format_scalar(&json!([1, "a"])), r#"[1,"a"]"#);
    }

    #[test]
    fn test_structural_mapping() {
        let value = json!({"language": "rust", "runtime": {"async": false, "threads": 4}});
        assert_eq!(
            structural(&value, 3),
            "### language\n\nrust\n\n### runtime\n\n#### async\n\nfalse\n\n#### threads\n\n4"
        );
    }

    #[test]
    fn test_structural_sequence_of_scalars() {
        assert_eq!(structural(&json!(["a", 1, true]), 3), "- a\n- 1\n- true");
    }

    #[test]
    fn test_structural_sequence_of_mappings() {
        let value = json!([
            {"name": "parse", "input": "text"},
            {"title": "emit"},
            {"kind": "anonymous"}
        ]);
        assert_eq!(
            structural(&value, 3),
            "### parse\n\n#### input\n\ntext\n\n### emit\n\n### Item 3\n\n#### kind\n\nanonymous"
        );
    }

    #[test]
    fn test_structural_mixed_sequence_groups_bullets() {
        let value = json!(["a", "b", {"name": "c"}, "d"]);
        assert_eq!(structural(&value, 4), "- a\n- b\n\n#### c\n\n- d");
    }

    #[test]
    fn test_structural_deep_nesting_past_h6() {
        let value = json!({"a": {"b": {"c": {"d": "leaf"}}}});
        assert_eq!(
            structural(&value, 4),
            "#### a\n\n##### b\n\n###### c\n\n**d**\n\nleaf"
        );
    }

    #[test]
    fn test_structural_empty_values() {
        assert_eq!(structural(&json!({}), 3), "");
        assert_eq!(structural(&json!([]), 3), "");
        assert_eq!(structural(&json!({"empty": []}), 3), "### empty");
    }

    #[test]
    fn test_meta_block() {
        let record = json!({
            "type": "api",
            "description": "Auth endpoints",
            "status": "draft",
            "tags": ["backend", "auth"]
        });
        assert_eq!(
            meta(&record, 3),
            "- **Type:** api\n- **Status:** draft\n- **Tags:** backend, auth\n- **Description:** Auth endpoints"
        );
    }

    #[test]
    fn test_meta_skips_absent_items() {
        let record = json!({"status": "active", "tags": []});
        assert_eq!(meta(&record, 3), "- **Status:** active");
        assert_eq!(meta(&json!("scalar"), 3), "");
    }

    #[test]
    fn test_requirements() {
        let value = json!([
            {"title": "Login", "priority": "high", "description": "Users can log in", "details": ["rate limited", "audited"]},
            {"id": "R-2"},
            {}
        ]);
        assert_eq!(
            requirements(&value, 3),
            "- **Login** (high)\n  Users can log in\n    - rate limited\n    - audited\n- **R-2** (n/a)\n- **Requirement** (n/a)"
        );
    }

    #[test]
    fn test_requirements_not_a_sequence() {
        assert_eq!(requirements(&json!({"title": "x"}), 3), "");
    }

    #[test]
    fn test_tasks() {
        let value = json!([
            {"name": "A", "description": "do A", "done": true},
            {"description": "unnamed", "done": "yes"},
            {"name": "C"}
        ]);
        assert_eq!(tasks(&value, 3), "- [x] A: do A\n- [ ] Task: unnamed\n- [ ] C:");
    }

    #[test]
    fn test_notes() {
        assert_eq!(notes(&json!(["one", "two"]), 3), "- one\n- two");
        assert_eq!(notes(&json!("not a list"), 3), "");
    }
}
