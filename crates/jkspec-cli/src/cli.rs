//! Command-line surface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jkspec_store::{Status, DEFAULT_DOCUMENT_PATH};
use jkspec_validate::ReportFormat;

/// Maintain a JSON spec document.
#[derive(Debug, Parser)]
#[command(name = "jkspec", version)]
pub struct Cli {
    /// Spec document to operate on.
    #[arg(long, short, global = true, env = "JKSPEC_FILE", default_value = DEFAULT_DOCUMENT_PATH)]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty document if none exists.
    Init,

    /// Add a top-level spec (status starts as draft).
    AddSpec {
        id: String,
        #[arg(value_name = "TYPE")]
        kind: String,
        description: String,
        tags: Vec<String>,
    },

    /// Set one field of a spec. Any field other than status resets status to draft.
    UpdateSpec {
        id: String,
        field: String,
        value: String,
        /// Parse VALUE as JSON instead of storing it as a string.
        #[arg(long)]
        json: bool,
    },

    /// Remove a spec and everything nested under it.
    RemoveSpec { id: String },

    /// List top-level spec identifiers in document order.
    List {
        #[arg(long)]
        status: Option<Status>,
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },

    /// Print a spec as JSON.
    Get { id: String },

    /// Add a child record under PARENT.KEY.CHILD (resets the parent to draft).
    AddChild {
        parent: String,
        key: String,
        child: String,
        #[arg(value_name = "TYPE")]
        kind: String,
        description: String,
        tags: Vec<String>,
    },

    /// Set one field of a child record. Any field other than status resets
    /// both the child and its parent to draft.
    UpdateChild {
        parent: String,
        key: String,
        child: String,
        field: String,
        value: String,
        /// Parse VALUE as JSON instead of storing it as a string.
        #[arg(long)]
        json: bool,
    },

    /// Print a child record as JSON.
    GetChild {
        parent: String,
        key: String,
        child: String,
    },

    /// Check document structure; exits non-zero on any finding.
    Validate {
        #[arg(long, default_value = "text")]
        format: ReportFormat,
        /// JSON Schema file the document must also conform to.
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// List dotted paths of every record still in draft.
    Drafts,

    /// Show what a record references (upstream) and what implements it
    /// (downstream), with each target's status.
    Impact {
        /// Record path, relative to specs (a leading `specs.` is accepted).
        path: String,
        /// Print the analysis as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Reset active records whose references are missing or still draft.
    Invalidate {
        /// Report what would be reset without writing the document.
        #[arg(long)]
        dry_run: bool,
    },

    /// Render a spec (dotted path under specs) to Markdown.
    Render {
        path: String,
        /// Output file (default: .tmp/<path>.md).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}
