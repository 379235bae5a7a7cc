//! http-stream library
//!
//! Generates synthetic JSON documents from a declarative template. Each
//! template field either nests further fields or declares a value source
//! (a spreadsheet column, random numbers, random dates).
//!
//! # Crates
//!
//! - `template_core` - template grammar, validation, value types
//! - `http_stream_xlsx_source` - spreadsheet column source
//! - `document_generator` - random sources and the document builder
//!
//! # CLI Usage
//!
//! ```bash
//! # Check a template
//! http-stream validate --template request.json --pointer /request/body
//!
//! # Generate 100 documents as NDJSON
//! http-stream generate --template request.json --pointer /request/body \
//!   --count 100 --seed 42 --format ndjson --out bodies.ndjson
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use document_generator::{BuildOptions, DocumentBuilder, FailurePolicy};
use std::io::Write;
use std::path::PathBuf;
use template_core::{load_template, select_pointer, SchemaValidator, ValidatedTemplate};
use tracing::{info, warn};

pub use document_generator;
pub use template_core;

/// Template location options.
#[derive(Parser, Clone, Debug)]
pub struct TemplateOpts {
    /// Template file (.json, .yaml or .yml)
    #[arg(long, env = "HTTP_STREAM_TEMPLATE", value_name = "PATH")]
    pub template: PathBuf,

    /// JSON pointer selecting the template inside the file (e.g. /request/body)
    #[arg(long, env = "HTTP_STREAM_POINTER", value_name = "POINTER")]
    pub pointer: Option<String>,
}

/// Document generation options.
#[derive(Parser, Clone, Debug)]
pub struct GenerateOpts {
    /// Number of documents to generate
    #[arg(long, default_value = "1")]
    pub count: u64,

    /// Seed for the random sources (OS entropy when absent)
    #[arg(long, env = "HTTP_STREAM_SEED")]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Output file (stdout when absent)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Fail on the first field that cannot be built instead of leaving it out
    #[arg(long)]
    pub abort_on_error: bool,
}

/// How generated documents are written.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single pretty-printed JSON array
    #[default]
    Pretty,
    /// One compact JSON document per line
    Ndjson,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Documents written
    pub documents: u64,
    /// Fields left out across all documents
    pub skipped_fields: usize,
    /// Whether generation stopped because a source ran out of data
    pub exhausted: bool,
}

/// Load, narrow and validate a template.
pub fn load_validated(opts: &TemplateOpts) -> anyhow::Result<ValidatedTemplate> {
    let raw = load_template(&opts.template)
        .with_context(|| format!("Failed to load template from {:?}", opts.template))?;
    let selected = select_pointer(raw, opts.pointer.as_deref())
        .with_context(|| format!("Failed to select template in {:?}", opts.template))?;
    let validated = SchemaValidator::new()
        .validate_document(&selected)
        .with_context(|| format!("Invalid template {:?}", opts.template))?;
    Ok(validated)
}

/// Validate a template and report its warnings.
pub fn run_validate(opts: &TemplateOpts) -> anyhow::Result<ValidatedTemplate> {
    let validated = load_validated(opts)?;
    info!(
        "Template {:?} is valid ({} sources, {} warnings)",
        opts.template,
        validated.root.leaf_count(),
        validated.warnings.len()
    );
    Ok(validated)
}

/// Generate documents from a template and write them to `out`.
pub fn run_generate<W: Write>(
    template: &TemplateOpts,
    opts: &GenerateOpts,
    out: W,
) -> anyhow::Result<GenerateSummary> {
    let validated = load_validated(template)?;

    let options = BuildOptions {
        seed: opts.seed,
        failure_policy: if opts.abort_on_error {
            FailurePolicy::AbortDocument
        } else {
            FailurePolicy::SkipSubtree
        },
    };
    let mut builder = DocumentBuilder::new(&validated.root, options)
        .context("Failed to create value sources")?;

    let summary = write_documents(&mut builder, opts.count, opts.format, out)?;
    if summary.documents < opts.count {
        warn!(
            "Generated {} of {} requested documents",
            summary.documents, opts.count
        );
    }
    info!(
        "Generated {} documents ({} fields skipped)",
        summary.documents, summary.skipped_fields
    );
    Ok(summary)
}

/// Write up to `count` documents from `builder` in the given format.
///
/// `Pretty` output is a single JSON array, so documents are collected first
/// and nothing is written when a document fails. `Ndjson` streams: a failure
/// leaves the documents written so far, one complete line each.
pub fn write_documents<W: Write>(
    builder: &mut DocumentBuilder,
    count: u64,
    format: OutputFormat,
    mut out: W,
) -> anyhow::Result<GenerateSummary> {
    let mut summary = GenerateSummary::default();
    let mut collected = Vec::new();

    for document in builder.documents(count) {
        let document = document
            .with_context(|| format!("Failed to build document #{}", summary.documents + 1))?;

        summary.documents += 1;
        summary.skipped_fields += document.skipped.len();

        match format {
            OutputFormat::Pretty => collected.push(document.value),
            OutputFormat::Ndjson => {
                serde_json::to_writer(&mut out, &document.value)?;
                out.write_all(b"\n")?;
            }
        }
    }

    if format == OutputFormat::Pretty {
        serde_json::to_writer_pretty(&mut out, &collected)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    summary.exhausted = builder.is_exhausted();
    Ok(summary)
}
