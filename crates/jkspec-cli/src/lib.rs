//! jkspec-cli: command-line front end for jkspec documents
//!
//! Two binaries share this library: `jkspec` (document commands) and
//! `jkspec-render` (Markdown rendering with its own exit codes).

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::run;
pub use error::{render_exit_code, CliError};
pub use logging::init_logging;
