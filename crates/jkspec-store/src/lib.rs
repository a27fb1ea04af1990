//! jkspec-store: the spec document and its mutation engine
//!
//! This crate provides:
//! - `Document`: the in-memory spec document with load and atomic persist
//! - `SpecPath`: dotted path resolution into the document
//! - `Mutator`: create/update/remove of records with draft invalidation
//! - `query`: read-only lookups, listing, draft discovery and dependency impact
//!
//! Every mutating command follows the same cycle:
//!
//! ```text
//! Document::load ──► Mutator::* (in memory) ──► Document::persist (one atomic rename)
//! ```
//!
//! A failed precondition returns before `persist`, so the file on disk is
//! never touched by a failed command.

mod document;
mod error;
mod mutation;
mod path;
pub mod query;
mod record;

pub use document::Document;
pub use error::{Result, StoreError};
pub use mutation::{MutationOutcome, Mutator};
pub use path::{resolve, resolve_mut, SpecPath, SPECS_KEY};
pub use query::{Impact, Link, LinkTarget, SpecFilter, StaleReason, StaleRecord};
pub use record::{NewRecord, RecordView, Status, IMPLEMENTS_FIELD, REFERENCES_FIELD, STATUS_FIELD};

/// Default location of the project document, relative to the working directory
pub const DEFAULT_DOCUMENT_PATH: &str = ".jkspec-project/project.json";
