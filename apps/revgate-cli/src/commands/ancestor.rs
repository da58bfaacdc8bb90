// ancestor.rs — Print the first-parent common ancestor of two revisions.

use revgate_changeset::{common_ancestor, CommitProvider};
use revgate_policy::PolicyError;

use super::{open_range, RangeArgs};

pub fn execute(args: &RangeArgs) -> anyhow::Result<i32> {
    let (repo, base, head) = open_range(args)?;
    let ancestor = common_ancestor(&base, &head, |c| repo.parents(c)).map_err(PolicyError::from)?;
    println!("{}", ancestor);
    Ok(0)
}
