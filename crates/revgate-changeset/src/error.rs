// error.rs — Error types for history and diff operations.

use thiserror::Error;

/// Errors that can occur while walking history or reading trees.
#[derive(Debug, Error)]
pub enum ChangeSetError {
    /// The two tips share no commit on their first-parent chains.
    #[error("no common ancestor between '{base}' and '{head}' on first-parent history")]
    NoCommonAncestor { base: String, head: String },

    /// The provider does not know the requested commit.
    #[error("unknown commit '{0}'")]
    UnknownCommit(String),

    /// The provider does not know the requested blob.
    #[error("unknown blob '{0}'")]
    UnknownBlob(String),

    /// The underlying repository lookup failed (transport, I/O, parse).
    #[error("repository lookup failed: {0}")]
    Lookup(String),
}
