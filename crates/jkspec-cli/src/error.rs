//! CLI error type and exit codes

use jkspec_render::RenderError;
use jkspec_store::StoreError;
use jkspec_validate::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("value for field '{field}' is not valid JSON: {source}")]
    InvalidValue {
        field: String,
        source: serde_json::Error,
    },

    #[error("validation failed with {count} finding(s)")]
    ValidationFailed { count: usize },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Exit code for the `jkspec-render` entry point
pub fn render_exit_code(err: &RenderError) -> u8 {
    match err {
        RenderError::MissingInput { .. } => 2,
        RenderError::Load(StoreError::Parse { .. }) => 3,
        RenderError::Load(_) => 2,
        RenderError::NotFound { .. } => 4,
        RenderError::Output { .. } => 5,
    }
}
