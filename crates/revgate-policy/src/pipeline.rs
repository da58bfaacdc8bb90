// pipeline.rs — End-to-end evaluation: ancestor → diff → rules → reconcile → report.
//
// Every stage consumes the previous stage's output plus read-only
// configuration. Any fatal error aborts the run; there is no partial outcome.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use revgate_changeset::{common_ancestor, diff_trees, BlobId, CommitId, CommitProvider, File, Tree};

use crate::config::{GroupConfig, PolicySettings};
use crate::document::DocumentLayout;
use crate::error::{PolicyError, EXIT_NOT_PASSED, EXIT_PASSED};
use crate::predicates::{ContentLookup, PolicyContext, PredicateRegistry};
use crate::reconcile::{reconcile, LabelDelta};
use crate::report::Report;
use crate::rule::RuleProcessed;
use crate::snapshot::ReviewSnapshot;

/// What the caller should do with the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// No rule is pending.
    pub passed: bool,

    pub labels_to_add: BTreeSet<String>,

    pub labels_to_remove: BTreeSet<String>,

    pub reviewers_to_request: BTreeSet<String>,

    /// Markdown explanation of the pending rules.
    pub report: String,

    /// The pending rules behind the report.
    pub pending: Vec<RuleProcessed>,
}

impl Outcome {
    /// Restrict the label delta to actual changes given the applied labels.
    pub fn filtered_against(mut self, applied: &[String]) -> Self {
        let delta = LabelDelta {
            add: std::mem::take(&mut self.labels_to_add),
            remove: std::mem::take(&mut self.labels_to_remove),
        }
        .filtered_against(applied);
        self.labels_to_add = delta.add;
        self.labels_to_remove = delta.remove;
        self
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed {
            EXIT_PASSED
        } else {
            EXIT_NOT_PASSED
        }
    }
}

/// Head-side content backed by the head commit's tree.
struct TreeLookup<'a, P: CommitProvider + ?Sized> {
    provider: &'a P,
    tree: &'a Tree,
}

impl<P: CommitProvider + ?Sized> ContentLookup for TreeLookup<'_, P> {
    fn head_contents(&self, path: &str) -> Result<Option<String>, PolicyError> {
        let Some(blob) = self.tree.get(path) else {
            return Ok(None);
        };
        let bytes = read_blob(self.provider, path, blob)?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| PolicyError::ContentUnavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

fn read_blob<P: CommitProvider + ?Sized>(
    provider: &P,
    path: &str,
    blob: &BlobId,
) -> Result<Vec<u8>, PolicyError> {
    provider
        .blob_content(blob)
        .map_err(|e| PolicyError::ContentUnavailable {
            path: path.to_string(),
            reason: e.to_string(),
        })
}

/// The review policy engine with its settings and predicate set.
pub struct ReviewPipeline {
    registry: PredicateRegistry,
    settings: PolicySettings,
    layout: DocumentLayout,
}

impl ReviewPipeline {
    /// A pipeline with the standard predicate set.
    pub fn new(settings: PolicySettings) -> Result<Self, PolicyError> {
        let layout = DocumentLayout::new(&settings.layout)?;
        Ok(Self {
            registry: PredicateRegistry::standard(),
            settings,
            layout,
        })
    }

    /// Replace the predicate set.
    pub fn with_registry(mut self, registry: PredicateRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// Resolve the first-parent common ancestor of `base` and `head`.
    pub fn ancestor<P: CommitProvider + ?Sized>(
        &self,
        provider: &P,
        base: &CommitId,
        head: &CommitId,
    ) -> Result<CommitId, PolicyError> {
        let ancestor = common_ancestor(base, head, |c| provider.parents(c))?;
        tracing::info!(%base, %head, %ancestor, "resolved common ancestor");
        Ok(ancestor)
    }

    /// Files changed on `head` since its common ancestor with `base`.
    pub fn changed_files<P: CommitProvider + ?Sized>(
        &self,
        provider: &P,
        base: &CommitId,
        head: &CommitId,
    ) -> Result<Vec<File>, PolicyError> {
        let ancestor = self.ancestor(provider, base, head)?;
        let ancestor_tree = provider.tree(&ancestor)?;
        let head_tree = provider.tree(head)?;
        Ok(diff_trees(provider, &ancestor_tree, &head_tree))
    }

    /// Evaluate the pull request from `base` to `head`.
    pub fn run<P: CommitProvider + ?Sized>(
        &self,
        provider: &P,
        base: &CommitId,
        head: &CommitId,
        groups: &GroupConfig,
        snapshot: &ReviewSnapshot,
    ) -> Result<Outcome, PolicyError> {
        let ancestor = self.ancestor(provider, base, head)?;
        let ancestor_tree = provider.tree(&ancestor)?;
        let head_tree = provider.tree(head)?;
        let files = diff_trees(provider, &ancestor_tree, &head_tree);
        tracing::info!(files = files.len(), "computed change set");

        let lookup = TreeLookup {
            provider,
            tree: &head_tree,
        };
        self.run_files(&files, &lookup, groups, snapshot)
    }

    /// Evaluate an already-computed change set.
    pub fn run_files(
        &self,
        files: &[File],
        lookup: &dyn ContentLookup,
        groups: &GroupConfig,
        snapshot: &ReviewSnapshot,
    ) -> Result<Outcome, PolicyError> {
        let ctx = PolicyContext {
            groups,
            settings: &self.settings,
            layout: &self.layout,
            lookup,
        };
        let rules = self.registry.evaluate(&ctx, files)?;
        tracing::debug!(rules = rules.len(), "predicates produced rules");

        let reconciliation = reconcile(rules, snapshot, &self.settings.labels.pending_response);
        let report = Report::build(&reconciliation.pending)?;

        tracing::info!(
            passed = reconciliation.passed,
            pending = reconciliation.pending.len(),
            satisfied = reconciliation.satisfied.len(),
            "review policy evaluated"
        );

        Ok(Outcome {
            passed: reconciliation.passed,
            labels_to_add: reconciliation.labels.add,
            labels_to_remove: reconciliation.labels.remove,
            reviewers_to_request: reconciliation.reviewers_to_request,
            report: report.to_markdown(),
            pending: reconciliation.pending,
        })
    }
}
