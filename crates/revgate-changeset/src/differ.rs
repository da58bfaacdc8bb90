// differ.rs — File-level diff between an ancestor tree and a head tree.
//
// Classification per path:
//   only in head            → Added
//   only in ancestor        → Removed
//   in both, different blob → Modified
//   in both, same blob      → omitted
//
// Rename detection is not attempted here; a moved file shows up as a
// Removed + Added pair. Content is read only for the sides that have the
// path. Blobs that cannot be read or are not UTF-8 text decode to an empty
// string so a single unreadable entry never fails the whole diff. The `sha`
// on each record is taken over the raw blob bytes, not the decoded text.

use std::collections::BTreeSet;

use crate::file::{bytes_digest, File};
use crate::provider::{BlobId, CommitProvider, Tree};

/// Diff two trees into one [`File`] record per differing path, sorted by path.
pub fn diff_trees<P>(provider: &P, ancestor: &Tree, head: &Tree) -> Vec<File>
where
    P: CommitProvider + ?Sized,
{
    let paths: BTreeSet<&String> = ancestor.keys().chain(head.keys()).collect();
    let mut files = Vec::new();

    for path in paths {
        let file = match (ancestor.get(path), head.get(path)) {
            (None, Some(blob)) => {
                let new = read_blob(provider, path, blob);
                File {
                    sha: new.sha,
                    ..File::added(path.as_str(), new.text)
                }
            }
            (Some(blob), None) => {
                let old = read_blob(provider, path, blob);
                File {
                    sha: old.sha,
                    ..File::removed(path.as_str(), old.text)
                }
            }
            (Some(old), Some(new)) if old != new => {
                let old = read_blob(provider, path, old);
                let new = read_blob(provider, path, new);
                File {
                    sha: new.sha,
                    ..File::modified(path.as_str(), old.text, new.text)
                }
            }
            _ => continue,
        };
        files.push(file);
    }

    tracing::debug!(changed = files.len(), "tree diff complete");
    files
}

/// One side of a changed path: its text and the digest of its raw bytes.
struct BlobText {
    text: String,
    sha: String,
}

/// Read a blob, substituting empty text when it can't be read or isn't text.
fn read_blob<P>(provider: &P, path: &str, blob: &BlobId) -> BlobText
where
    P: CommitProvider + ?Sized,
{
    match provider.blob_content(blob) {
        Ok(bytes) => {
            let sha = bytes_digest(&bytes);
            let text = decode_text(bytes).unwrap_or_else(|| {
                tracing::debug!(path, "binary content, using empty text");
                String::new()
            });
            BlobText { text, sha }
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "content unavailable, using empty text");
            BlobText {
                text: String::new(),
                sha: bytes_digest(&[]),
            }
        }
    }
}

/// Decode bytes as text. NUL bytes or invalid UTF-8 mean binary.
fn decode_text(bytes: Vec<u8>) -> Option<String> {
    if bytes.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}
