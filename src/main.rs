//! Command-line interface for http-stream
//!
//! # Usage Examples
//!
//! ## Validation
//! ```bash
//! http-stream validate --template template.json
//!
//! # Template nested inside a request description
//! http-stream validate --template request.json --pointer /request/body
//! ```
//!
//! ## Generation
//! ```bash
//! # One pretty-printed document on stdout
//! http-stream generate --template template.json
//!
//! # Reproducible NDJSON stream written to a file
//! http-stream generate --template template.yaml \
//!   --count 1000 --seed 42 --format ndjson --out documents.ndjson
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=debug`) to change
//! verbosity.

use anyhow::Context;
use clap::{Parser, Subcommand};
use http_stream::{run_generate, run_validate, GenerateOpts, TemplateOpts};
use std::fs::File;
use std::io::{self, BufWriter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "http-stream")]
#[command(about = "Generate synthetic JSON documents from a template")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a template and report problems
    Validate {
        #[command(flatten)]
        template: TemplateOpts,
    },

    /// Generate documents from a template
    Generate {
        #[command(flatten)]
        template: TemplateOpts,

        #[command(flatten)]
        generate: GenerateOpts,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { template } => {
            let validated = run_validate(&template)?;
            println!(
                "{}: OK ({} warnings)",
                template.template.display(),
                validated.warnings.len()
            );
        }
        Commands::Generate { template, generate } => match &generate.out {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file {path:?}"))?;
                run_generate(&template, &generate, BufWriter::new(file))?;
            }
            None => {
                let stdout = io::stdout();
                run_generate(&template, &generate, BufWriter::new(stdout.lock()))?;
            }
        },
    }

    Ok(())
}
