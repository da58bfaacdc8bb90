pub mod ancestor;
pub mod check;
pub mod diff;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use revgate_changeset::CommitId;
use revgate_vcs::GitRepository;

/// A base/head revision pair in a local repository.
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Repository working directory.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Base branch tip (revision the pull request targets).
    #[arg(long)]
    pub base: String,

    /// Head branch tip (revision the pull request proposes).
    #[arg(long)]
    pub head: String,
}

/// Open the repository and resolve both revisions.
pub fn open_range(args: &RangeArgs) -> anyhow::Result<(GitRepository, CommitId, CommitId)> {
    let repo = GitRepository::open(args.repo.clone())
        .with_context(|| format!("opening repository {}", args.repo.display()))?;
    let base = repo
        .resolve(&args.base)
        .with_context(|| format!("resolving base revision '{}'", args.base))?;
    let head = repo
        .resolve(&args.head)
        .with_context(|| format!("resolving head revision '{}'", args.head))?;
    Ok((repo, base, head))
}
