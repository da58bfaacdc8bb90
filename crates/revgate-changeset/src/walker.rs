// walker.rs — First-parent common ancestor resolution.
//
// Two cursors start at the base and head tips and step back one first parent
// at a time. Each side remembers what it has visited; the first cursor that
// lands on a commit the other side has already seen is the ancestor.
//
// This is an approximation of merge-base. A common ancestor that is only
// reachable through a merge commit's second parent is never found, and the
// walk fails with NoCommonAncestor instead.

use std::collections::HashSet;

use crate::error::ChangeSetError;
use crate::provider::CommitId;

/// Resolve the nearest first-parent common ancestor of `base` and `head`.
///
/// `parents` returns the ordered parent list of a commit; only the first
/// entry is followed. A cursor whose commit has no parent stays in place.
/// When both cursors are stuck and neither has reached the other's history,
/// the walk fails with [`ChangeSetError::NoCommonAncestor`].
pub fn common_ancestor<F>(
    base: &CommitId,
    head: &CommitId,
    parents: F,
) -> Result<CommitId, ChangeSetError>
where
    F: FnMut(&CommitId) -> Result<Vec<CommitId>, ChangeSetError>,
{
    walk_first_parents(base, head, parents).map(|(ancestor, _)| ancestor)
}

/// The walk itself. Also returns how many times the cursors were stepped.
fn walk_first_parents<F>(
    base: &CommitId,
    head: &CommitId,
    mut parents: F,
) -> Result<(CommitId, usize), ChangeSetError>
where
    F: FnMut(&CommitId) -> Result<Vec<CommitId>, ChangeSetError>,
{
    let mut base_seen = HashSet::new();
    let mut head_seen = HashSet::new();
    let mut base_cursor = Cursor::new(base.clone());
    let mut head_cursor = Cursor::new(head.clone());
    let mut steps = 0usize;

    loop {
        base_seen.insert(base_cursor.commit.clone());
        head_seen.insert(head_cursor.commit.clone());

        if head_seen.contains(&base_cursor.commit) {
            tracing::debug!(ancestor = %base_cursor.commit, steps, "common ancestor found");
            return Ok((base_cursor.commit, steps));
        }
        if base_seen.contains(&head_cursor.commit) {
            tracing::debug!(ancestor = %head_cursor.commit, steps, "common ancestor found");
            return Ok((head_cursor.commit, steps));
        }

        let base_moved = base_cursor.advance(&mut parents, &base_seen)?;
        let head_moved = head_cursor.advance(&mut parents, &head_seen)?;
        if !base_moved && !head_moved {
            return Err(ChangeSetError::NoCommonAncestor {
                base: base.to_string(),
                head: head.to_string(),
            });
        }
        steps += 1;
    }
}

struct Cursor {
    commit: CommitId,
    at_root: bool,
}

impl Cursor {
    fn new(commit: CommitId) -> Self {
        Self {
            commit,
            at_root: false,
        }
    }

    /// Step to the first parent. Returns false when the cursor stays put.
    ///
    /// A first parent this side already visited is treated as a root, which
    /// keeps a malformed (cyclic) history from looping forever.
    fn advance<F>(
        &mut self,
        parents: &mut F,
        seen: &HashSet<CommitId>,
    ) -> Result<bool, ChangeSetError>
    where
        F: FnMut(&CommitId) -> Result<Vec<CommitId>, ChangeSetError>,
    {
        if self.at_root {
            return Ok(false);
        }
        match parents(&self.commit)?.into_iter().next() {
            Some(parent) if !seen.contains(&parent) => {
                self.commit = parent;
                Ok(true)
            }
            _ => {
                self.at_root = true;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRepository;
    use crate::provider::CommitProvider;

    fn walk(repo: &MemoryRepository, base: &str, head: &str) -> Result<CommitId, ChangeSetError> {
        common_ancestor(&CommitId::new(base), &CommitId::new(head), |c| {
            repo.parents(c)
        })
    }

    #[test]
    fn diverged_branches_meet_at_fork_point() {
        // A ← B ← C (base), A ← D ← E (head)
        let mut repo = MemoryRepository::new();
        repo.commit("A", &[], &[]);
        repo.commit("B", &["A"], &[]);
        repo.commit("C", &["B"], &[]);
        repo.commit("D", &["A"], &[]);
        repo.commit("E", &["D"], &[]);

        assert_eq!(walk(&repo, "C", "E").unwrap(), CommitId::new("A"));
    }

    #[test]
    fn head_ahead_of_base_returns_base() {
        let mut repo = MemoryRepository::new();
        repo.commit("A", &[], &[]);
        repo.commit("B", &["A"], &[]);
        repo.commit("C", &["B"], &[]);

        assert_eq!(walk(&repo, "A", "C").unwrap(), CommitId::new("A"));
        assert_eq!(walk(&repo, "C", "A").unwrap(), CommitId::new("A"));
    }

    #[test]
    fn same_tip_is_its_own_ancestor() {
        let mut repo = MemoryRepository::new();
        repo.commit("A", &[], &[]);
        assert_eq!(walk(&repo, "A", "A").unwrap(), CommitId::new("A"));
    }

    #[test]
    fn uneven_depths_still_meet() {
        // Base is one commit past the fork, head is five past it.
        let mut repo = MemoryRepository::new();
        repo.commit("root", &[], &[]);
        repo.commit("fork", &["root"], &[]);
        repo.commit("b1", &["fork"], &[]);
        let mut prev = "fork".to_string();
        for i in 1..=5 {
            let id = format!("h{i}");
            repo.commit(&id, &[prev.as_str()], &[]);
            prev = id;
        }

        assert_eq!(walk(&repo, "b1", "h5").unwrap(), CommitId::new("fork"));
    }

    #[test]
    fn ancestor_found_within_combined_depth() {
        // A ← b1 ← b2 ← b3 (base), A ← h1 ← … ← h7 (head)
        let mut repo = MemoryRepository::new();
        repo.commit("A", &[], &[]);
        let mut prev = "A".to_string();
        for i in 1..=3 {
            let id = format!("b{i}");
            repo.commit(&id, &[prev.as_str()], &[]);
            prev = id;
        }
        let mut prev = "A".to_string();
        for i in 1..=7 {
            let id = format!("h{i}");
            repo.commit(&id, &[prev.as_str()], &[]);
            prev = id;
        }

        let depth = 3 + 7;
        let mut lookups = 0usize;
        let (ancestor, steps) = walk_first_parents(
            &CommitId::new("b3"),
            &CommitId::new("h7"),
            |c| {
                lookups += 1;
                repo.parents(c)
            },
        )
        .unwrap();

        assert_eq!(ancestor, CommitId::new("A"));
        assert!(steps <= depth, "stepped {steps} times");
        assert!(lookups <= 2 * depth, "{lookups} parent lookups");
    }

    #[test]
    fn unrelated_histories_fail() {
        let mut repo = MemoryRepository::new();
        repo.commit("A", &[], &[]);
        repo.commit("B", &["A"], &[]);
        repo.commit("X", &[], &[]);
        repo.commit("Y", &["X"], &[]);

        let err = walk(&repo, "B", "Y").unwrap_err();
        assert!(matches!(err, ChangeSetError::NoCommonAncestor { .. }));
    }

    #[test]
    fn ancestor_behind_second_parent_is_not_found() {
        // M merges an unrelated root R2 into head; base only shares R2.
        //   base: R2 ← S
        //   head: R1 ← M (parents R1, R2)
        let mut repo = MemoryRepository::new();
        repo.commit("R1", &[], &[]);
        repo.commit("R2", &[], &[]);
        repo.commit("S", &["R2"], &[]);
        repo.commit("M", &["R1", "R2"], &[]);

        let err = walk(&repo, "S", "M").unwrap_err();
        assert!(matches!(err, ChangeSetError::NoCommonAncestor { .. }));
    }

    #[test]
    fn merge_commit_first_parent_is_followed() {
        // main: A ← B ← M (M merges feature F into main)
        // head branches off M.
        let mut repo = MemoryRepository::new();
        repo.commit("A", &[], &[]);
        repo.commit("B", &["A"], &[]);
        repo.commit("F", &["A"], &[]);
        repo.commit("M", &["B", "F"], &[]);
        repo.commit("H", &["M"], &[]);
        repo.commit("N", &["M"], &[]);

        assert_eq!(walk(&repo, "N", "H").unwrap(), CommitId::new("M"));
    }

    #[test]
    fn lookup_failure_propagates() {
        let repo = MemoryRepository::new();
        let err = walk(&repo, "missing", "also-missing").unwrap_err();
        assert!(matches!(err, ChangeSetError::UnknownCommit(_)));
    }

    #[test]
    fn cyclic_history_terminates() {
        let mut repo = MemoryRepository::new();
        repo.commit("A", &["B"], &[]);
        repo.commit("B", &["A"], &[]);
        repo.commit("X", &[], &[]);

        let err = walk(&repo, "A", "X").unwrap_err();
        assert!(matches!(err, ChangeSetError::NoCommonAncestor { .. }));
    }
}
