//! # revgate-changeset
//!
//! History and diff data model for the revgate review policy engine.
//!
//! Given two branch tips, [`common_ancestor`] resolves the first-parent merge
//! base and [`diff_trees`] turns the ancestor and head trees into a list of
//! changed [`File`] records. Both only talk to the repository through the
//! narrow [`CommitProvider`] boundary, so the same code runs against a real
//! git checkout or the in-memory [`MemoryRepository`] used in tests.
//!
//! ## Key invariants
//!
//! - **First parent only**: the ancestor walk never follows a merge commit's
//!   second parent. Histories that only meet through one yield
//!   [`ChangeSetError::NoCommonAncestor`].
//! - **One record per changed path**: identical paths are omitted, every
//!   differing path is emitted exactly once, in path order.
//! - **Unreadable content is not fatal**: binary or missing blobs decode to
//!   empty text instead of failing the diff.

pub mod differ;
pub mod error;
pub mod file;
pub mod memory;
pub mod provider;
pub mod walker;

pub use differ::diff_trees;
pub use error::ChangeSetError;
pub use file::{bytes_digest, content_digest, File, FileStatus};
pub use memory::MemoryRepository;
pub use provider::{BlobId, CommitId, CommitProvider, Tree};
pub use walker::common_ancestor;
