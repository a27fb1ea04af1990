//! Render one spec record to a Markdown file.
//!
//! Exit codes: 0 success, 1 usage, 2 input missing or unreadable,
//! 3 input malformed, 4 path not found, 5 output not writable.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jkspec_cli::{init_logging, render_exit_code};
use jkspec_render::{default_output_path, render_to_file};
use jkspec_store::DEFAULT_DOCUMENT_PATH;

/// Render a spec (dotted path under specs) to Markdown.
#[derive(Debug, Parser)]
#[command(name = "jkspec-render", version)]
struct Args {
    /// Record path, e.g. `auth-api` or `auth-api.endpoints.login`
    path: String,

    /// Input document.
    #[arg(long, short, env = "JKSPEC_FILE", default_value = DEFAULT_DOCUMENT_PATH)]
    input: PathBuf,

    /// Output file (default: .tmp/<path>.md).
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    let output = args.output.unwrap_or_else(|| default_output_path(&args.path));
    match render_to_file(&args.input, &args.path, &output) {
        Ok(()) => {
            println!("Rendered {} to {}", args.path, output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(render_exit_code(&err))
        }
    }
}
