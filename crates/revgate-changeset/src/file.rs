// file.rs — One changed path between the ancestor and head trees.
//
// A File is the unit every rule predicate looks at. It records how the path
// changed and, where the diff step could read them, the text on each side.
// Rename detection is left to callers that correlate paths themselves; the
// tree differ only produces added, removed, and modified records.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How a path changed between the ancestor and head trees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
}

impl FileStatus {
    /// True when the path exists on the head side.
    pub fn exists_on_head(self) -> bool {
        !matches!(self, FileStatus::Removed)
    }

    /// True when the path (or its source) exists on the ancestor side.
    pub fn exists_on_ancestor(self) -> bool {
        !matches!(self, FileStatus::Added)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileStatus::Added => "added",
            FileStatus::Removed => "removed",
            FileStatus::Modified => "modified",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
        };
        f.write_str(s)
    }
}

/// A changed file record.
///
/// Invariants: `Added` has no `previous_contents`; `Removed` has no
/// `contents`; `Modified`/`Renamed` carry both once content has been read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct File {
    pub status: FileStatus,

    /// Path on the head side (the removed path for `Removed`).
    pub filename: String,

    /// Source path for renames and copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,

    /// Head-side text. `None` when the path is absent on head or not yet fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,

    /// Ancestor-side text. `None` when the path is absent on the ancestor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_contents: Option<String>,

    /// SHA-256 of the newest side's content. The tree differ hashes the raw
    /// blob bytes, so binary files get distinct digests.
    pub sha: String,
}

impl File {
    /// A path present only on head.
    pub fn added(filename: impl Into<String>, contents: String) -> Self {
        Self {
            status: FileStatus::Added,
            filename: filename.into(),
            previous_filename: None,
            sha: content_digest(&contents),
            contents: Some(contents),
            previous_contents: None,
        }
    }

    /// A path present only on the ancestor.
    pub fn removed(filename: impl Into<String>, previous_contents: String) -> Self {
        Self {
            status: FileStatus::Removed,
            filename: filename.into(),
            previous_filename: None,
            sha: content_digest(&previous_contents),
            contents: None,
            previous_contents: Some(previous_contents),
        }
    }

    /// A path present on both sides with different content.
    pub fn modified(
        filename: impl Into<String>,
        previous_contents: String,
        contents: String,
    ) -> Self {
        Self {
            status: FileStatus::Modified,
            filename: filename.into(),
            previous_filename: None,
            sha: content_digest(&contents),
            contents: Some(contents),
            previous_contents: Some(previous_contents),
        }
    }

    /// A path moved from `previous_filename`, possibly with edits.
    pub fn renamed(
        previous_filename: impl Into<String>,
        filename: impl Into<String>,
        previous_contents: String,
        contents: String,
    ) -> Self {
        Self {
            status: FileStatus::Renamed,
            previous_filename: Some(previous_filename.into()),
            ..Self::modified(filename, previous_contents, contents)
        }
    }

    /// The path this file had on the ancestor side.
    pub fn ancestor_path(&self) -> &str {
        self.previous_filename.as_deref().unwrap_or(&self.filename)
    }
}

/// Hex SHA-256 of a piece of text.
pub fn content_digest(text: &str) -> String {
    bytes_digest(text.as_bytes())
}

/// Hex SHA-256 of raw content.
pub fn bytes_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_file_has_no_previous_contents() {
        let file = File::added("docs/doc-1.md", "hello".to_string());
        assert_eq!(file.status, FileStatus::Added);
        assert!(file.previous_contents.is_none());
        assert_eq!(file.contents.as_deref(), Some("hello"));
        assert_eq!(file.sha.len(), 64); // SHA-256 hex length
    }

    #[test]
    fn removed_file_has_no_contents() {
        let file = File::removed("docs/doc-1.md", "bye".to_string());
        assert!(file.contents.is_none());
        assert_eq!(file.previous_contents.as_deref(), Some("bye"));
        assert_eq!(file.sha, content_digest("bye"));
    }

    #[test]
    fn renamed_file_keeps_ancestor_path() {
        let file = File::renamed("docs/a.md", "docs/b.md", "x".into(), "y".into());
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(file.ancestor_path(), "docs/a.md");
        assert_eq!(file.filename, "docs/b.md");
        assert!(file.contents.is_some() && file.previous_contents.is_some());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&FileStatus::Modified).unwrap();
        assert_eq!(json, "\"modified\"");
        assert_eq!(FileStatus::Copied.to_string(), "copied");
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(content_digest("abc"), content_digest("abc"));
        assert_ne!(content_digest("abc"), content_digest("abd"));
    }
}
