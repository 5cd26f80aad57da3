//! Generate io-ts typed TypeScript API clients from OpenAPI 3.0 and Swagger 2.0
//! documents.
//!
//! The library entry point is [`run`]: given a [`Config`] and a
//! [`FileSystem`], it reads the source document, builds declarations for every
//! schema and operation, prints `models.ts`, `controllers.ts`, `actions.ts`,
//! `utilities.ts` and `index.ts`, and writes them, reporting a diff for each
//! existing file it is not allowed to replace.

#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    missing_debug_implementations,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod materialize;
pub mod openapi;
pub mod pipeline;

pub use config::{Config, ConfigOverrides, SourceFormat, load_config};
pub use error::{CodegenError, Result};
pub use fs::{FileSystem, TokioFileSystem};
pub use materialize::{FileOutcome, diff_file};
pub use pipeline::{File, get_source, program, run};

#[derive(Parser)]
#[command(
    name = "api-codegen",
    version,
    about = "Generate an io-ts typed TypeScript client from an OpenAPI document"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the client
    Generate(cli::generate::GenerateArgs),
}

/// Parse `args` (program name first), run the command and return the exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_cli_async(args))
}

async fn run_cli_async(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => cli::generate::run(args).await,
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr `fmt` subscriber.
///
/// API_CODEGEN_LOG takes a plain level ("debug") or a full filter spec
/// ("api_codegen=debug,tokio=warn"). Defaults to info for this crate.
pub fn init_tracing() {
    let crate_root = module_path!().to_string();

    let filter = match std::env::var("API_CODEGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("{crate_root}={level}")
        }
        Ok(spec) => spec,
        Err(_) => format!("{crate_root}=info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
