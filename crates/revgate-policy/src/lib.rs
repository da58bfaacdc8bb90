//! # revgate-policy
//!
//! Reviewer-approval policy engine for pull requests against a repository of
//! proposal documents.
//!
//! A run takes the files a pull request changes, asks a fixed set of
//! [`RulePredicate`]s which reviewers must approve each of them, folds the
//! pull request's reviews into those requirements, and produces an
//! [`Outcome`]: a pass/fail verdict, the labels to add and remove, the
//! reviewers to request, and a Markdown report of what is still missing.
//!
//! ## Key invariants
//!
//! - **No partial verdicts**: any fatal [`PolicyError`] aborts the run.
//! - **Conservative degradation**: unreadable content never drops a file;
//!   predicates fall back to requiring editors.
//! - **Normalized accounts**: account identifiers are lowercased once at
//!   ingestion and compared exactly afterwards.
//! - **Deterministic output**: predicates run in a fixed order and every set
//!   in the outcome is sorted.

pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod predicates;
pub mod reconcile;
pub mod report;
pub mod rule;
pub mod snapshot;

pub use config::{normalize_account, GroupConfig, PolicySettings};
pub use document::{DocumentLayout, FrontMatter, PathKind};
pub use error::{ErrorKind, PolicyError, EXIT_NOT_PASSED, EXIT_PASSED};
pub use pipeline::{Outcome, ReviewPipeline};
pub use predicates::{
    ContentLookup, NoLookup, PolicyContext, PredicateCategory, PredicateRegistry, RulePredicate,
};
pub use reconcile::{reconcile, ApprovalState, LabelDelta, Reconciliation};
pub use report::{Report, ALL_SATISFIED};
pub use rule::{Annotation, Rule, RuleProcessed};
pub use snapshot::{ReviewEvent, ReviewSnapshot, ReviewState};
