// error.rs — Error types for the review policy engine.

use std::path::PathBuf;

use revgate_changeset::ChangeSetError;
use thiserror::Error;

/// Process exit code for a run whose rules are all satisfied.
pub const EXIT_PASSED: i32 = 0;

/// Process exit code for a run that still has pending rules.
pub const EXIT_NOT_PASSED: i32 = 1;

/// Errors that can occur while evaluating review policy.
///
/// Everything except `ContentUnavailable` aborts the run; no partial verdict
/// is ever produced.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Base and head share no first-parent history.
    #[error("no common ancestor between '{base}' and '{head}'")]
    NoCommonAncestor { base: String, head: String },

    /// A pending rule reached the report without a file to anchor it to.
    #[error("pending rule '{rule}' has no file annotation")]
    MissingFileAnnotation { rule: String },

    /// A required configuration or input file does not exist.
    #[error("config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// A configuration or input file exists but cannot be parsed.
    #[error("failed to parse {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// A settings pattern cannot be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A rule predicate failed. Its contribution cannot be dropped silently.
    #[error("predicate '{predicate}' failed: {reason}")]
    RuleEvaluation { predicate: String, reason: String },

    /// File content could not be read. Absorbed by predicates, never fatal.
    #[error("content unavailable for '{path}': {reason}")]
    ContentUnavailable { path: String, reason: String },

    /// A commit or tree lookup failed.
    #[error("repository error: {0}")]
    Provider(String),
}

/// Coarse error category, used by the binary to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NoCommonAncestor,
    Provider,
    ContentUnavailable,
    RuleEvaluation,
    MissingFileAnnotation,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::NoCommonAncestor => 3,
            ErrorKind::Provider | ErrorKind::ContentUnavailable => 4,
            ErrorKind::RuleEvaluation | ErrorKind::MissingFileAnnotation => 5,
        }
    }
}

impl PolicyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::NoCommonAncestor { .. } => ErrorKind::NoCommonAncestor,
            PolicyError::MissingFileAnnotation { .. } => ErrorKind::MissingFileAnnotation,
            PolicyError::ConfigNotFound { .. }
            | PolicyError::ConfigParse { .. }
            | PolicyError::InvalidPattern { .. } => ErrorKind::Config,
            PolicyError::RuleEvaluation { .. } => ErrorKind::RuleEvaluation,
            PolicyError::ContentUnavailable { .. } => ErrorKind::ContentUnavailable,
            PolicyError::Provider(_) => ErrorKind::Provider,
        }
    }

    /// Whether this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PolicyError::ContentUnavailable { .. })
    }
}

impl From<ChangeSetError> for PolicyError {
    fn from(e: ChangeSetError) -> Self {
        match e {
            ChangeSetError::NoCommonAncestor { base, head } => {
                PolicyError::NoCommonAncestor { base, head }
            }
            other => PolicyError::Provider(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestor_failure_keeps_its_kind() {
        let err: PolicyError = ChangeSetError::NoCommonAncestor {
            base: "a".into(),
            head: "b".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NoCommonAncestor);
        assert_eq!(err.kind().exit_code(), 3);
    }

    #[test]
    fn lookup_failure_maps_to_provider() {
        let err: PolicyError = ChangeSetError::UnknownCommit("abc".into()).into();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn only_content_errors_are_non_fatal() {
        let soft = PolicyError::ContentUnavailable {
            path: "x".into(),
            reason: "gone".into(),
        };
        assert!(!soft.is_fatal());
        let hard = PolicyError::MissingFileAnnotation { rule: "new".into() };
        assert!(hard.is_fatal());
        assert_eq!(hard.kind().exit_code(), 5);
    }

    #[test]
    fn exit_codes_do_not_collide_with_verdicts() {
        for kind in [
            ErrorKind::Config,
            ErrorKind::NoCommonAncestor,
            ErrorKind::Provider,
            ErrorKind::RuleEvaluation,
        ] {
            assert_ne!(kind.exit_code(), EXIT_PASSED);
            assert_ne!(kind.exit_code(), EXIT_NOT_PASSED);
        }
    }
}
