//! Format validation reports

use crate::ValidationReport;

/// How `validate` prints its report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable summary for a terminal
    #[default]
    Text,
    /// Machine-readable, one object per run
    Json,
    /// Table plus finding list, for pasting into docs or PRs
    Markdown,
}

impl ReportFormat {
    /// Names accepted on the command line, in help order
    pub const NAMES: [&'static str; 3] = ["text", "json", "markdown"];

    pub fn render(self, report: &ValidationReport) -> String {
        match self {
            ReportFormat::Text => format_text(report),
            ReportFormat::Json => format_json(report),
            ReportFormat::Markdown => format_markdown(report),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("text") {
            Ok(ReportFormat::Text)
        } else if name.eq_ignore_ascii_case("json") {
            Ok(ReportFormat::Json)
        } else if name.eq_ignore_ascii_case("markdown") || name.eq_ignore_ascii_case("md") {
            Ok(ReportFormat::Markdown)
        } else {
            Err(format!(
                "no report format named '{}' (choose one of: {})",
                s,
                Self::NAMES.join(", ")
            ))
        }
    }
}

fn format_text(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push_str("=== Spec Validation Report ===\n\n");
    output.push_str(&format!("Specs checked: {}\n", report.specs_checked));
    output.push_str(&format!("Errors: {}\n", report.error_count()));

    if !report.findings.is_empty() {
        output.push('\n');
        for finding in &report.findings {
            output.push_str(&format!("  [{}] {}\n", finding.code(), finding));
        }
    }

    output.push('\n');
    if report.is_ok() {
        output.push_str("Validation passed\n");
    } else if report.aborted() {
        output.push_str("Validation aborted\n");
    } else {
        output.push_str("Validation failed\n");
    }

    output
}

fn format_json(report: &ValidationReport) -> String {
    let value = serde_json::json!({
        "ok": report.is_ok(),
        "error_count": report.error_count(),
        "specs_checked": report.specs_checked,
        "findings": report.findings.iter().map(|f| serde_json::json!({
            "code": f.code(),
            "spec": f.spec_id(),
            "message": f.to_string(),
        })).collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn format_markdown(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push_str("# Spec Validation Report\n\n");

    output.push_str("| Metric | Value |\n");
    output.push_str("|--------|-------|\n");
    output.push_str(&format!("| Specs checked | {} |\n", report.specs_checked));
    output.push_str(&format!("| Errors | {} |\n\n", report.error_count()));

    if report.is_ok() {
        output.push_str("No findings.\n");
        return output;
    }

    output.push_str("## Findings\n\n");
    for finding in &report.findings {
        output.push_str(&format!("- `{}`: {}\n", finding.code(), finding));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Finding;

    fn make_report() -> ValidationReport {
        ValidationReport {
            specs_checked: 2,
            findings: vec![
                Finding::MissingProjectVersion,
                Finding::InvalidIdentifier { id: "Bad_Id".to_string() },
            ],
        }
    }

    #[test]
    fn test_format_text() {
        let output = format_text(&make_report());

        assert!(output.contains("=== Spec Validation Report ==="));
        assert!(output.contains("Specs checked: 2"));
        assert!(output.contains("Errors: 2"));
        assert!(output.contains("[E-SPEC-001] spec 'Bad_Id': identifier is not kebab-case"));
        assert!(output.ends_with("Validation failed\n"));
    }

    #[test]
    fn test_format_text_clean() {
        let output = format_text(&ValidationReport { specs_checked: 1, findings: vec![] });
        assert!(output.contains("Errors: 0"));
        assert!(output.ends_with("Validation passed\n"));
    }

    #[test]
    fn test_format_json() {
        let output = format_json(&make_report());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["ok"], false);
        assert_eq!(value["error_count"], 2);
        assert_eq!(value["findings"][0]["code"], "E-DOC-003");
        assert!(value["findings"][0]["spec"].is_null());
        assert_eq!(value["findings"][1]["spec"], "Bad_Id");
    }

    #[test]
    fn test_format_markdown() {
        let output = format_markdown(&make_report());

        assert!(output.contains("# Spec Validation Report"));
        assert!(output.contains("| Errors | 2 |"));
        assert!(output.contains("## Findings"));
        assert!(output.contains("- `E-SPEC-001`: spec 'Bad_Id'"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("Markdown".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("txt".parse::<ReportFormat>().is_err());

        let err = "yaml".parse::<ReportFormat>().unwrap_err();
        assert_eq!(err, "no report format named 'yaml' (choose one of: text, json, markdown)");
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let report = make_report();
        assert_eq!(ReportFormat::Text.render(&report), format_text(&report));
        assert!(ReportFormat::Json.render(&report).starts_with('{'));
        assert!(ReportFormat::Markdown.render(&report).starts_with("# Spec Validation Report"));
    }
}
