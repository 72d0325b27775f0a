//! # provkit CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to the subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use provkit_cli::lint::{run_lint, LintArgs};
use provkit_cli::resolve::{run_resolve, ResolveArgs};
use provkit_cli::{LogFormat, OutputFormat};

/// provkit: check provider schemas and function definitions.
#[derive(Parser, Debug)]
#[command(name = "provkit", version, about, long_about = None)]
struct Cli {
    /// Output format for results and diagnostics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Format of log events on stderr. Levels come from `RUST_LOG`.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every schema and function in a definition document.
    Lint(LintArgs),

    /// Print the type at a path in one schema.
    Resolve(ResolveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    tracing::debug!(command = ?cli.command, "provkit starting");

    let result = match &cli.command {
        Commands::Lint(args) => run_lint(args, cli.format),
        Commands::Resolve(args) => run_resolve(args, cli.format),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
