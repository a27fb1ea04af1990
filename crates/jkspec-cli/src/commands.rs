//! Command execution
//!
//! Every mutating command loads the document, applies exactly one
//! [`Mutator`] operation and persists once. A failed operation returns
//! before the persist, so the file on disk is left as it was.

use std::io::Write;
use std::path::Path;

use jkspec_render::{default_output_path, render_to_file};
use jkspec_store::{
    query, Document, Impact, LinkTarget, MutationOutcome, Mutator, NewRecord, SpecFilter, StaleRecord, Status,
    StoreError,
};
use jkspec_validate::{JsonSchemaCheck, SchemaCheck, Validator};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Run one parsed command, writing user-facing output to `out`
pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let file = cli.file.as_path();
    let mutator = Mutator::new();

    match cli.command {
        Command::Init => init(file, out),

        Command::AddSpec { id, kind, description, tags } => {
            let record = NewRecord::new(kind, description).with_tags(tags);
            let outcome = mutate(file, |doc| mutator.create_spec(doc, &id, record))?;
            writeln!(out, "Created {}", outcome.path)?;
            Ok(())
        }

        Command::UpdateSpec { id, field, value, json } => {
            let value = parse_value(&field, &value, json)?;
            let outcome = mutate(file, |doc| mutator.update_spec(doc, &id, &field, value))?;
            report_update(out, &field, &outcome)
        }

        Command::RemoveSpec { id } => {
            mutate(file, |doc| mutator.remove_spec(doc, &id))?;
            writeln!(out, "Removed specs.{}", id)?;
            Ok(())
        }

        Command::List { status, kind, tag } => {
            let doc = Document::load(file)?;
            let filter = SpecFilter { status, kind, tag };
            for id in query::list(&doc, &filter) {
                writeln!(out, "{}", id)?;
            }
            Ok(())
        }

        Command::Get { id } => {
            let doc = Document::load(file)?;
            print_json(out, query::get_spec(&doc, &id)?)
        }

        Command::AddChild { parent, key, child, kind, description, tags } => {
            let record = NewRecord::new(kind, description).with_tags(tags);
            let outcome = mutate(file, |doc| mutator.create_child(doc, &parent, &key, &child, record))?;
            writeln!(out, "Created {}", outcome.path)?;
            Ok(())
        }

        Command::UpdateChild { parent, key, child, field, value, json } => {
            let value = parse_value(&field, &value, json)?;
            let outcome = mutate(file, |doc| {
                mutator.update_child(doc, &parent, &key, &child, &field, value)
            })?;
            report_update(out, &field, &outcome)
        }

        Command::GetChild { parent, key, child } => {
            let doc = Document::load(file)?;
            print_json(out, query::get_child(&doc, &parent, &key, &child)?)
        }

        Command::Validate { format, schema } => {
            let text = std::fs::read_to_string(file).map_err(|source| StoreError::Io {
                path: file.to_path_buf(),
                source,
            })?;
            let schema = schema.as_deref().map(JsonSchemaCheck::from_file).transpose()?;

            let mut validator = Validator::new();
            if let Some(ref check) = schema {
                validator = validator.with_schema(check as &dyn SchemaCheck);
            }
            let report = validator.validate_text(&text, &file.display().to_string());

            write!(out, "{}", format.render(&report))?;
            if report.is_ok() {
                Ok(())
            } else {
                Err(CliError::ValidationFailed { count: report.error_count() })
            }
        }

        Command::Drafts => {
            let doc = Document::load(file)?;
            for path in query::drafts(&doc) {
                writeln!(out, "{}", path)?;
            }
            Ok(())
        }

        Command::Impact { path, json } => {
            let doc = Document::load(file)?;
            let impact = query::impact(&doc, &path)?;
            if json {
                let text = serde_json::to_string_pretty(&impact).map_err(StoreError::from)?;
                writeln!(out, "{}", text)?;
                return Ok(());
            }
            print_impact(out, &impact)
        }

        Command::Invalidate { dry_run } => {
            let mut doc = Document::load(file)?;
            let stale = if dry_run {
                query::stale_references(&doc)
            } else {
                let stale = mutator.invalidate_stale_references(&mut doc)?;
                if !stale.is_empty() {
                    doc.persist(file)?;
                }
                stale
            };
            print_stale(out, &stale, dry_run)
        }

        Command::Render { path, output } => {
            let output = output.unwrap_or_else(|| default_output_path(&path));
            render_to_file(file, &path, &output)?;
            writeln!(out, "Rendered {} to {}", path, output.display())?;
            Ok(())
        }
    }
}

fn init(file: &Path, out: &mut impl Write) -> Result<(), CliError> {
    if file.exists() {
        writeln!(out, "Document already exists at {}", file.display())?;
        return Ok(());
    }
    Document::template().persist(file)?;
    writeln!(out, "Initialized {}", file.display())?;
    Ok(())
}

/// Load, apply `op`, persist. Nothing is written if `op` fails.
fn mutate<T>(file: &Path, op: impl FnOnce(&mut Document) -> Result<T, StoreError>) -> Result<T, CliError> {
    let mut doc = Document::load(file)?;
    let result = op(&mut doc)?;
    doc.persist(file)?;
    debug!(file = %file.display(), "mutation persisted");
    Ok(result)
}

fn parse_value(field: &str, raw: &str, json: bool) -> Result<Value, CliError> {
    if !json {
        return Ok(Value::String(raw.to_string()));
    }
    serde_json::from_str(raw).map_err(|source| CliError::InvalidValue {
        field: field.to_string(),
        source,
    })
}

fn report_update(out: &mut impl Write, field: &str, outcome: &MutationOutcome) -> Result<(), CliError> {
    writeln!(out, "Updated {}.{}", outcome.path, field)?;
    for path in &outcome.drafted {
        writeln!(out, "  {} reset to draft", path)?;
    }
    Ok(())
}

fn print_impact(out: &mut impl Write, impact: &Impact) -> Result<(), CliError> {
    writeln!(out, "Impact: {}", impact.path)?;
    writeln!(out, "Status: {}", status_label(impact.status))?;
    if let Some(ref description) = impact.description {
        writeln!(out, "Description: {}", description)?;
    }

    for (title, links) in [("Upstream (references)", &impact.upstream), ("Downstream (implements)", &impact.downstream)] {
        writeln!(out)?;
        if links.is_empty() {
            writeln!(out, "{}: none", title)?;
            continue;
        }
        writeln!(out, "{}:", title)?;
        for link in links {
            match link.target {
                LinkTarget::Found { status, .. } => writeln!(out, "  [{}] {}", status_label(status), link.path)?,
                LinkTarget::Missing => writeln!(out, "  [not found] {}", link.path)?,
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} upstream, {} downstream, {} not found",
        impact.upstream.len(),
        impact.downstream.len(),
        impact.missing().count()
    )?;
    Ok(())
}

fn status_label(status: Option<Status>) -> &'static str {
    status.map_or("unknown", Status::as_str)
}

fn print_stale(out: &mut impl Write, stale: &[StaleRecord], dry_run: bool) -> Result<(), CliError> {
    if stale.is_empty() {
        writeln!(out, "No stale records")?;
        return Ok(());
    }
    let verb = if dry_run { "Would reset" } else { "Reset" };
    writeln!(out, "{} {} record(s) to draft:", verb, stale.len())?;
    for record in stale {
        writeln!(out, "  {}", record.path)?;
        for reason in &record.reasons {
            writeln!(out, "    {}", reason)?;
        }
    }
    Ok(())
}

fn print_json(out: &mut impl Write, value: &Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(StoreError::from)?;
    writeln!(out, "{}", text)?;
    Ok(())
}
