//! Git-backed commit provider for a local checkout

use std::path::{Path, PathBuf};
use std::process::Command;

use revgate_changeset::{BlobId, ChangeSetError, CommitId, CommitProvider, Tree};

use crate::error::{Result, VcsError};

/// Reads commits, trees, and blobs from a local git repository.
///
/// Every lookup runs one `git` plumbing command in `work_dir`. Objects must
/// already be present locally.
pub struct GitRepository {
    /// Working directory for git operations
    work_dir: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `work_dir`.
    pub fn open(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let repo = Self {
            work_dir: work_dir.into(),
        };
        repo.git_text(&["rev-parse", "--git-dir"])
            .map_err(|_| VcsError::NotARepository(repo.work_dir.display().to_string()))?;
        Ok(repo)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run a git command in the working directory and return raw stdout.
    fn git_cmd(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::CommandFailed {
                command: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    /// Run a git command and return trimmed stdout as text.
    fn git_text(&self, args: &[&str]) -> Result<String> {
        let stdout = self.git_cmd(args)?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    /// Resolve a revision (branch, tag, sha) to a full commit id.
    pub fn resolve(&self, rev: &str) -> Result<CommitId> {
        let revspec = format!("{}^{{commit}}", rev);
        let sha = self.git_text(&["rev-parse", "--verify", "--quiet", &revspec])?;
        tracing::debug!(rev, %sha, "resolved revision");
        Ok(CommitId::new(sha))
    }

    fn list_parents(&self, commit: &CommitId) -> Result<Vec<CommitId>> {
        // Output: "<commit> <parent1> <parent2> ..." with parents in order.
        let line = self.git_text(&["rev-list", "--parents", "-n", "1", commit.as_str()])?;
        let mut ids = line.split_whitespace();
        match ids.next() {
            Some(_) => Ok(ids.map(CommitId::new).collect()),
            None => Err(VcsError::Parse(format!("no rev-list output for {}", commit))),
        }
    }

    fn list_tree(&self, commit: &CommitId) -> Result<Tree> {
        let stdout = self.git_cmd(&["ls-tree", "-r", "-z", "--full-tree", commit.as_str()])?;
        parse_ls_tree(&stdout)
    }
}

/// Parse `git ls-tree -r -z` output into a path → blob map.
///
/// Entries are `<mode> SP <type> SP <object> TAB <path> NUL`. Only blobs are
/// kept; submodule (`commit`) entries have no content to diff.
fn parse_ls_tree(stdout: &[u8]) -> Result<Tree> {
    let mut tree = Tree::new();
    for entry in stdout.split(|b| *b == 0).filter(|e| !e.is_empty()) {
        let entry = std::str::from_utf8(entry)
            .map_err(|e| VcsError::Parse(format!("non-UTF-8 tree entry: {}", e)))?;
        let (meta, path) = entry
            .split_once('\t')
            .ok_or_else(|| VcsError::Parse(format!("malformed tree entry: {}", entry)))?;
        let mut fields = meta.split(' ');
        let (_mode, kind, object) = match (fields.next(), fields.next(), fields.next()) {
            (Some(mode), Some(kind), Some(object)) => (mode, kind, object),
            _ => return Err(VcsError::Parse(format!("malformed tree entry: {}", entry))),
        };
        if kind == "blob" {
            tree.insert(path.to_string(), BlobId::new(object));
        }
    }
    Ok(tree)
}

impl CommitProvider for GitRepository {
    fn parents(&self, commit: &CommitId) -> std::result::Result<Vec<CommitId>, ChangeSetError> {
        self.list_parents(commit).map_err(|e| match e {
            VcsError::CommandFailed { .. } => ChangeSetError::UnknownCommit(commit.to_string()),
            other => other.into(),
        })
    }

    fn tree(&self, commit: &CommitId) -> std::result::Result<Tree, ChangeSetError> {
        self.list_tree(commit).map_err(|e| match e {
            VcsError::CommandFailed { .. } => ChangeSetError::UnknownCommit(commit.to_string()),
            other => other.into(),
        })
    }

    fn blob_content(&self, blob: &BlobId) -> std::result::Result<Vec<u8>, ChangeSetError> {
        self.git_cmd(&["cat-file", "blob", blob.as_str()])
            .map_err(|e| match e {
                VcsError::CommandFailed { .. } => ChangeSetError::UnknownBlob(blob.to_string()),
                other => other.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revgate_changeset::{common_ancestor, diff_trees, FileStatus};
    use tempfile::tempdir;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit_all(dir: &Path, message: &str) -> String {
        git(dir, &["add", "-A"]);
        git(dir, &["commit", "-q", "--allow-empty", "-m", message]);
        git(dir, &["rev-parse", "HEAD"])
    }

    fn init_git_repo(dir: &Path) -> String {
        git(dir, &["init", "-q"]);
        git(dir, &["config", "user.name", "Test User"]);
        git(dir, &["config", "user.email", "test@example.com"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        std::fs::write(dir.join("README.md"), "# Test\n").unwrap();
        commit_all(dir, "Initial commit")
    }

    #[test]
    fn open_rejects_plain_directory() {
        let dir = tempdir().unwrap();
        let err = GitRepository::open(dir.path()).err().unwrap();
        assert!(matches!(err, VcsError::NotARepository(_)));
    }

    #[test]
    fn resolves_branches_and_reads_history() {
        let dir = tempdir().unwrap();
        let root = init_git_repo(dir.path());
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/doc-1.md"), "hello\n").unwrap();
        let second = commit_all(dir.path(), "Add doc");

        let repo = GitRepository::open(dir.path()).unwrap();
        let head = repo.resolve("main").unwrap();
        assert_eq!(head.as_str(), second);
        assert_eq!(repo.parents(&head).unwrap(), vec![CommitId::new(root.clone())]);
        assert!(repo.parents(&CommitId::new(root)).unwrap().is_empty());

        let tree = repo.tree(&head).unwrap();
        let blob = tree.get("docs/doc-1.md").unwrap();
        assert_eq!(repo.blob_content(blob).unwrap(), b"hello\n");
        assert!(tree.contains_key("README.md"));
    }

    #[test]
    fn unknown_objects_map_to_lookup_errors() {
        let dir = tempdir().unwrap();
        init_git_repo(dir.path());
        let repo = GitRepository::open(dir.path()).unwrap();

        let missing = CommitId::new("0000000000000000000000000000000000000000");
        assert!(matches!(
            repo.parents(&missing),
            Err(ChangeSetError::UnknownCommit(_))
        ));
        assert!(matches!(
            repo.blob_content(&BlobId::new("0000000000000000000000000000000000000000")),
            Err(ChangeSetError::UnknownBlob(_))
        ));
        assert!(repo.resolve("no-such-branch").is_err());
    }

    #[test]
    fn diverged_branches_diff_from_common_ancestor() {
        let dir = tempdir().unwrap();
        let root = init_git_repo(dir.path());

        git(dir.path(), &["checkout", "-q", "-b", "feature"]);
        std::fs::write(dir.path().join("feature.txt"), "f\n").unwrap();
        commit_all(dir.path(), "Feature work");

        git(dir.path(), &["checkout", "-q", "main"]);
        std::fs::write(dir.path().join("main.txt"), "m\n").unwrap();
        commit_all(dir.path(), "Main work");

        let repo = GitRepository::open(dir.path()).unwrap();
        let base = repo.resolve("main").unwrap();
        let head = repo.resolve("feature").unwrap();
        let ancestor = common_ancestor(&base, &head, |c| repo.parents(c)).unwrap();
        assert_eq!(ancestor.as_str(), root);

        let files = diff_trees(
            &repo,
            &repo.tree(&ancestor).unwrap(),
            &repo.tree(&head).unwrap(),
        );
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "feature.txt");
        assert_eq!(files[0].status, FileStatus::Added);
        assert_eq!(files[0].contents.as_deref(), Some("f\n"));
    }

    #[test]
    fn parses_ls_tree_entries_and_skips_submodules() {
        let raw = b"100644 blob aaaa\tdocs/a b.md\0160000 commit bbbb\tvendor/sub\0100755 blob cccc\trun.sh\0";
        let tree = parse_ls_tree(raw).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree["docs/a b.md"], BlobId::new("aaaa"));
        assert_eq!(tree["run.sh"], BlobId::new("cccc"));
    }

    #[test]
    fn malformed_ls_tree_entry_is_parse_error() {
        assert!(matches!(parse_ls_tree(b"garbage\0"), Err(VcsError::Parse(_))));
    }
}
