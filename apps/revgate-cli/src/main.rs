//! # revgate
//!
//! Command-line interface for the revgate review policy engine.
//!
//! - `revgate check` — evaluate a pull request and print the outcome
//! - `revgate ancestor` — print the first-parent common ancestor of two revisions
//! - `revgate diff` — list the files changed since that ancestor
//!
//! Logs go to stderr so stdout stays machine-readable. The process exit code
//! is 0 when the check passes, 1 when reviews are still pending, and a
//! distinct code per error kind otherwise.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use revgate_policy::{ErrorKind, PolicyError};
use revgate_vcs::VcsError;
use tracing_subscriber::EnvFilter;

/// revgate — reviewer-approval policy for pull requests.
#[derive(Parser)]
#[command(name = "revgate", version, about)]
struct Cli {
    /// Log output format (logs always go to stderr).
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the review policy for a pull request.
    Check(commands::check::CheckArgs),
    /// Print the first-parent common ancestor of base and head.
    Ancestor(commands::RangeArgs),
    /// List files changed on head since the common ancestor, as JSON.
    Diff(commands::RangeArgs),
}

const DEFAULT_LOG_FILTER: &str = "revgate=info";

/// `RUST_LOG` when set and valid, otherwise the default filter.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing(format: LogFormat) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref());
    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Map an error to the process exit code for its kind.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(policy) = cause.downcast_ref::<PolicyError>() {
            return policy.kind().exit_code();
        }
        if cause.downcast_ref::<VcsError>().is_some() {
            return ErrorKind::Provider.exit_code();
        }
    }
    ErrorKind::Config.exit_code()
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Ancestor(args) => commands::ancestor::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(&cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}
