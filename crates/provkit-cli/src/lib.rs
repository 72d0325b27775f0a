//! # provkit-cli — CLI Tool for provkit
//!
//! Provides the `provkit` command-line interface for checking provider
//! definitions outside of a running provider.
//!
//! ## Subcommands
//!
//! - `provkit lint <FILE>` validates every schema and function in a
//!   definition document.
//! - `provkit resolve <FILE> --schema <NAME> --path <PATH>` prints the type
//!   found at a schema path.
//!
//! ```bash
//! provkit lint provider.yaml
//! provkit --format json lint provider.json
//! provkit resolve provider.yaml --schema server --path 'disks["root"].size'
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers return `anyhow::Result<u8>`; the value is the exit status.
//! - Any error diagnostic makes the exit status non-zero.
//! - The binary installs the only tracing subscriber.

pub mod document;
pub mod lint;
pub mod resolve;

use clap::ValueEnum;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON document on stdout.
    Json,
}

/// How log events are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Exit status when every check passed.
pub const EXIT_OK: u8 = 0;

/// Exit status when an error diagnostic was produced.
pub const EXIT_DIAGNOSTICS: u8 = 1;
