//! # Lint Subcommand
//!
//! Validates every schema and function definition in a document and
//! reports the diagnostics of each.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use provkit_core::Diagnostics;
use serde::Serialize;

use crate::document::{Document, DocumentError};
use crate::{OutputFormat, EXIT_DIAGNOSTICS, EXIT_OK};

/// Arguments for the lint subcommand.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Definition document (.yaml, .yml or .json).
    pub file: PathBuf,
}

/// Diagnostics of one definition.
#[derive(Debug, Serialize)]
pub struct LintEntry {
    pub kind: &'static str,
    pub name: String,
    pub diagnostics: Diagnostics,
}

/// Diagnostics of a whole document, schemas first, each group by name.
#[derive(Debug, Default, Serialize)]
pub struct LintReport {
    pub entries: Vec<LintEntry>,
}

impl LintReport {
    pub fn has_error(&self) -> bool {
        self.entries.iter().any(|entry| entry.diagnostics.has_error())
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if entry.diagnostics.is_empty() {
                out.push_str(&format!("{} {}: ok\n", entry.kind, entry.name));
            } else {
                out.push_str(&format!(
                    "{} {}: {} diagnostic(s)\n{}\n",
                    entry.kind,
                    entry.name,
                    entry.diagnostics.len(),
                    entry.diagnostics
                ));
            }
        }
        out
    }
}

/// Validate every definition in `document`.
pub fn lint_document(document: &Document) -> Result<LintReport, DocumentError> {
    let mut report = LintReport::default();
    for (name, doc) in &document.schemas {
        let schema = doc.to_schema(name)?;
        report.entries.push(LintEntry {
            kind: "schema",
            name: name.clone(),
            diagnostics: schema.validate_implementation(),
        });
    }
    for (name, doc) in &document.functions {
        let definition = doc.to_definition(name)?;
        report.entries.push(LintEntry {
            kind: "function",
            name: name.clone(),
            diagnostics: definition.validate_implementation(),
        });
    }
    Ok(report)
}

/// Execute the lint subcommand.
pub fn run_lint(args: &LintArgs, format: OutputFormat) -> Result<u8> {
    let document = Document::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let report = lint_document(&document)
        .with_context(|| format!("invalid definitions in {}", args.file.display()))?;

    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize lint report")?
        ),
    }

    let failed = report.has_error();
    tracing::info!(
        file = %args.file.display(),
        definitions = report.entries.len(),
        failed,
        "lint finished"
    );
    Ok(if failed { EXIT_DIAGNOSTICS } else { EXIT_OK })
}
