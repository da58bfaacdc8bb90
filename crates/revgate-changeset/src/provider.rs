// provider.rs — Boundary between the engine and a commit/tree store.
//
// The engine never holds a concrete repository handle. Everything it needs
// from history is expressed by three lookups: parents of a commit, the flat
// tree of a commit, and the raw bytes of a blob.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChangeSetError;

/// Identifier of a commit (a full or abbreviated object name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content identity of a blob. Two paths with equal ids have equal bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A flattened commit tree: repository-relative path → blob identity.
///
/// `BTreeMap` keeps paths sorted, which is what makes diff output deterministic.
pub type Tree = BTreeMap<String, BlobId>;

/// Read-only access to commits, trees, and blobs.
///
/// Implemented by the git transport adapter and by [`crate::MemoryRepository`].
pub trait CommitProvider {
    /// Ordered parents of a commit. The first entry is the first parent;
    /// an empty list marks a root commit.
    fn parents(&self, commit: &CommitId) -> Result<Vec<CommitId>, ChangeSetError>;

    /// Every file reachable from the commit's root tree.
    fn tree(&self, commit: &CommitId) -> Result<Tree, ChangeSetError>;

    /// Raw bytes of a blob.
    fn blob_content(&self, blob: &BlobId) -> Result<Vec<u8>, ChangeSetError>;
}
