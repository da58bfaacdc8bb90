// snapshot.rs — The pull request review state a run is evaluated against.
//
// Supplied by the caller as JSON (the engine never talks to a forge API).
// Review states accept both the short names (REQUEST_CHANGES, COMMENT) and
// the names GitHub's REST API returns (CHANGES_REQUESTED, COMMENTED).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// The state of one submitted review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    #[serde(alias = "CHANGES_REQUESTED")]
    RequestChanges,
    #[serde(alias = "COMMENTED")]
    Comment,
    Dismissed,
    Pending,
    #[serde(other)]
    Other,
}

impl ReviewState {
    /// States that count as engagement for label purposes.
    pub fn is_engagement(self) -> bool {
        matches!(
            self,
            ReviewState::Approved | ReviewState::RequestChanges | ReviewState::Comment
        )
    }
}

/// One review event on the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub user: String,
    pub state: ReviewState,
    /// Head commit the review was submitted against.
    pub commit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Everything the reconciler needs to know about the pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
    /// PR author account.
    pub author: String,

    /// Current head commit. Reviews against other commits are stale for labels.
    /// Empty when the snapshot leaves it out.
    #[serde(default)]
    pub head_commit: String,

    #[serde(default)]
    pub reviews: Vec<ReviewEvent>,

    /// Accounts with an outstanding review request.
    #[serde(default)]
    pub requested_reviewers: Vec<String>,

    /// Labels currently applied to the PR.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ReviewSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PolicyError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => PolicyError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        serde_json::from_str(&text).map_err(|e| PolicyError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reviews in chronological order.
    ///
    /// When every review carries a timestamp they are stably sorted by it;
    /// otherwise the given order is taken as chronological.
    pub fn chronological_reviews(&self) -> Vec<ReviewEvent> {
        let mut reviews = self.reviews.clone();
        if reviews.iter().all(|r| r.submitted_at.is_some()) {
            reviews.sort_by_key(|r| r.submitted_at);
        }
        reviews
    }
}
