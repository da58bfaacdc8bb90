//! Errors from git operations

use revgate_changeset::ChangeSetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("not a git repository: {0}")]
    NotARepository(String),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unexpected git output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VcsError>;

impl From<VcsError> for ChangeSetError {
    fn from(e: VcsError) -> Self {
        ChangeSetError::Lookup(e.to_string())
    }
}
