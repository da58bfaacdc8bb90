// memory.rs — In-memory commit store.
//
// Holds a small hand-built history so the walker, differ, and policy
// pipeline can be exercised without a git checkout. Blobs are addressed by
// the SHA-256 of their bytes, so identical content shares one blob id.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::error::ChangeSetError;
use crate::provider::{BlobId, CommitId, CommitProvider, Tree};

#[derive(Debug, Clone)]
struct MemoryCommit {
    parents: Vec<CommitId>,
    tree: Tree,
}

/// A commit graph kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    commits: HashMap<CommitId, MemoryCommit>,
    blobs: HashMap<BlobId, Vec<u8>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes and return their blob id.
    pub fn insert_blob(&mut self, bytes: impl Into<Vec<u8>>) -> BlobId {
        let bytes = bytes.into();
        let id = BlobId::new(format!("{:x}", Sha256::digest(&bytes)));
        self.blobs.entry(id.clone()).or_insert(bytes);
        id
    }

    /// Record a commit with the given parents and a full snapshot of text files.
    ///
    /// Overwrites any existing commit with the same id.
    pub fn commit(&mut self, id: &str, parents: &[&str], files: &[(&str, &str)]) -> CommitId {
        let tree = files
            .iter()
            .map(|(path, text)| (path.to_string(), self.insert_blob(text.as_bytes())))
            .collect();
        self.commit_tree(id, parents, tree)
    }

    /// Record a commit with a prebuilt tree (useful for binary blobs).
    pub fn commit_tree(&mut self, id: &str, parents: &[&str], tree: Tree) -> CommitId {
        let commit_id = CommitId::new(id);
        self.commits.insert(
            commit_id.clone(),
            MemoryCommit {
                parents: parents.iter().map(|p| CommitId::new(*p)).collect(),
                tree,
            },
        );
        commit_id
    }

    fn lookup(&self, commit: &CommitId) -> Result<&MemoryCommit, ChangeSetError> {
        self.commits
            .get(commit)
            .ok_or_else(|| ChangeSetError::UnknownCommit(commit.to_string()))
    }
}

impl CommitProvider for MemoryRepository {
    fn parents(&self, commit: &CommitId) -> Result<Vec<CommitId>, ChangeSetError> {
        Ok(self.lookup(commit)?.parents.clone())
    }

    fn tree(&self, commit: &CommitId) -> Result<Tree, ChangeSetError> {
        Ok(self.lookup(commit)?.tree.clone())
    }

    fn blob_content(&self, blob: &BlobId) -> Result<Vec<u8>, ChangeSetError> {
        self.blobs
            .get(blob)
            .cloned()
            .ok_or_else(|| ChangeSetError::UnknownBlob(blob.to_string()))
    }
}
