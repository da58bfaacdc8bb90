// check.rs — Evaluate the review policy for one pull request.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use revgate_policy::{GroupConfig, Outcome, PolicySettings, ReviewPipeline, ReviewSnapshot};

use super::{open_range, RangeArgs};

/// Settings file looked up in the repository when `--settings` is not given.
const DEFAULT_SETTINGS_FILE: &str = "revgate.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The full outcome as JSON.
    Json,
    /// Only the Markdown report.
    Markdown,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Reviewer group config (YAML: group → accounts).
    #[arg(long)]
    pub groups: PathBuf,

    /// Pull request review snapshot (JSON).
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Policy settings (TOML). Defaults to revgate.toml in the repository;
    /// built-in defaults apply when that file doesn't exist.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// What to print on stdout.
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: OutputFormat,
}

pub fn execute(args: &CheckArgs) -> anyhow::Result<i32> {
    // Configuration errors surface before any repository access.
    let settings = match &args.settings {
        Some(path) => PolicySettings::load(path)?,
        None => PolicySettings::load_or_default(&args.range.repo.join(DEFAULT_SETTINGS_FILE))?,
    };
    let groups = GroupConfig::load(&args.groups)?;
    let mut snapshot = ReviewSnapshot::load(&args.snapshot)?;
    let pipeline = ReviewPipeline::new(settings)?;

    let (repo, base, head) = open_range(&args.range)?;
    if snapshot.head_commit.is_empty() {
        tracing::debug!(%head, "snapshot has no head commit, using resolved head");
        snapshot.head_commit = head.to_string();
    }

    let outcome = pipeline
        .run(&repo, &base, &head, &groups, &snapshot)
        .with_context(|| format!("evaluating {}..{}", args.range.base, args.range.head))?
        .filtered_against(&snapshot.labels);

    print_outcome(&outcome, args.format)?;
    Ok(outcome.exit_code())
}

fn print_outcome(outcome: &Outcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Markdown => print!("{}", outcome.report),
    }
    Ok(())
}
