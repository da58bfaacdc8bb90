// diff.rs — List files changed on head since the common ancestor.

use revgate_changeset::{common_ancestor, diff_trees, CommitProvider, File, FileStatus};
use revgate_policy::PolicyError;
use serde::Serialize;

use super::{open_range, RangeArgs};

/// One line of `revgate diff` output.
#[derive(Debug, Serialize)]
struct DiffEntry<'a> {
    status: FileStatus,
    filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_filename: Option<&'a str>,
    sha: &'a str,
}

impl<'a> From<&'a File> for DiffEntry<'a> {
    fn from(file: &'a File) -> Self {
        Self {
            status: file.status,
            filename: &file.filename,
            previous_filename: file.previous_filename.as_deref(),
            sha: &file.sha,
        }
    }
}

pub fn execute(args: &RangeArgs) -> anyhow::Result<i32> {
    let (repo, base, head) = open_range(args)?;
    let ancestor = common_ancestor(&base, &head, |c| repo.parents(c)).map_err(PolicyError::from)?;
    let ancestor_tree = repo.tree(&ancestor).map_err(PolicyError::from)?;
    let head_tree = repo.tree(&head).map_err(PolicyError::from)?;

    let files = diff_trees(&repo, &ancestor_tree, &head_tree);
    let entries: Vec<DiffEntry<'_>> = files.iter().map(DiffEntry::from).collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(0)
}
