//! Git transport for the revgate review policy engine.
//!
//! [`GitRepository`] implements the [`revgate_changeset::CommitProvider`]
//! boundary by shelling out to the `git` binary in a local checkout. Fetching
//! and cloning are the caller's job; this crate only reads objects that are
//! already present.

pub mod error;
pub mod git;

pub use error::{Result, VcsError};
pub use git::GitRepository;
