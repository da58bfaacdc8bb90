//! predicates — Rule predicates that turn changed files into reviewer requirements.
//!
//! Every predicate implements one capability, [`RulePredicate::evaluate`],
//! over the same read-only inputs: the [`PolicyContext`] and the full list of
//! changed files. Predicates never see each other's output. The
//! [`PredicateRegistry`] runs them in a fixed order and concatenates their
//! rules without deduplication; overlapping rules are expected and get
//! collapsed later by the report.
//!
//! Predicates that need file content must tolerate it being missing and
//! fall back to the most conservative rule rather than skipping the file.

use serde::{Deserialize, Serialize};

use revgate_changeset::File;

use crate::config::{GroupConfig, PolicySettings};
use crate::document::{DocumentLayout, FrontMatter};
use crate::error::PolicyError;
use crate::rule::Rule;

pub mod assets;
pub mod documents;
pub mod unmatched;

/// The matching strategy a predicate implements. Doubles as the rule name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateCategory {
    /// A binary asset of a document changed.
    Assets,
    /// A document's author list changed.
    Authors,
    /// A new document was added.
    New,
    /// A document's lifecycle status changed.
    Status,
    /// A stagnant document was touched.
    Stagnant,
    /// A document in a terminal status changed.
    Terminal,
    /// A document's content was edited.
    Edit,
    /// The file matched nothing else.
    Unmatched,
}

impl PredicateCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PredicateCategory::Assets => "assets",
            PredicateCategory::Authors => "authors",
            PredicateCategory::New => "new",
            PredicateCategory::Status => "status",
            PredicateCategory::Stagnant => "stagnant",
            PredicateCategory::Terminal => "terminal",
            PredicateCategory::Edit => "edit",
            PredicateCategory::Unmatched => "unmatched",
        }
    }
}

impl std::fmt::Display for PredicateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head-side content for paths that may not be part of the diff.
pub trait ContentLookup {
    /// Text of `path` on the head commit, `Ok(None)` if the path doesn't exist.
    fn head_contents(&self, path: &str) -> Result<Option<String>, PolicyError>;
}

/// A lookup that knows nothing. Every path reads as absent.
pub struct NoLookup;

impl ContentLookup for NoLookup {
    fn head_contents(&self, _path: &str) -> Result<Option<String>, PolicyError> {
        Ok(None)
    }
}

/// Read-only inputs shared by every predicate.
pub struct PolicyContext<'a> {
    pub groups: &'a GroupConfig,
    pub settings: &'a PolicySettings,
    pub layout: &'a DocumentLayout,
    pub lookup: &'a dyn ContentLookup,
}

impl<'a> PolicyContext<'a> {
    /// Editors responsible for a document: its category group if configured,
    /// otherwise the default group.
    pub fn editors_for(&self, front: Option<&FrontMatter>) -> Vec<String> {
        let category_group = front
            .and_then(FrontMatter::category)
            .map(str::to_lowercase)
            .and_then(|name| self.groups.group(&name))
            .filter(|accounts| !accounts.is_empty());

        match category_group.or_else(|| self.groups.group(&self.settings.groups.default)) {
            Some(accounts) => accounts.to_vec(),
            None => {
                tracing::warn!(
                    group = %self.settings.groups.default,
                    "default reviewer group is not configured; rule cannot be satisfied"
                );
                Vec::new()
            }
        }
    }

    /// A rule requiring editor approval for `file`.
    pub fn editor_rule(
        &self,
        category: PredicateCategory,
        file: &str,
        front: Option<&FrontMatter>,
    ) -> Rule {
        Rule::new(
            category.as_str(),
            file,
            self.editors_for(front),
            self.settings.approvals.editors,
        )
        .with_label(&self.settings.labels.editor_review)
    }

    /// A rule requiring approval from document authors for `file`.
    pub fn author_rule(&self, category: PredicateCategory, file: &str, authors: Vec<String>) -> Rule {
        Rule::new(category.as_str(), file, authors, self.settings.approvals.authors)
            .with_label(&self.settings.labels.author_review)
            .with_pr_approval()
    }
}

/// One independent reviewer-requirement strategy.
pub trait RulePredicate: Send + Sync {
    fn category(&self) -> PredicateCategory;

    /// Rules this predicate requires for the given changes.
    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError>;
}

/// Ordered set of predicates.
pub struct PredicateRegistry {
    predicates: Vec<Box<dyn RulePredicate>>,
}

impl PredicateRegistry {
    /// An empty registry (produces no rules).
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// The standard predicate set, in evaluation order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(assets::AssetsPredicate));
        registry.register(Box::new(documents::AuthorsPredicate));
        registry.register(Box::new(documents::NewDocumentPredicate));
        registry.register(Box::new(documents::StatusPredicate));
        registry.register(Box::new(documents::StagnantPredicate));
        registry.register(Box::new(documents::TerminalPredicate));
        registry.register(Box::new(documents::EditPredicate));
        registry.register(Box::new(unmatched::UnmatchedPredicate));
        registry
    }

    pub fn register(&mut self, predicate: Box<dyn RulePredicate>) {
        self.predicates.push(predicate);
    }

    pub fn categories(&self) -> Vec<PredicateCategory> {
        self.predicates.iter().map(|p| p.category()).collect()
    }

    /// Run every predicate and concatenate their rules in registry order.
    ///
    /// A failing predicate aborts the whole evaluation.
    pub fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for predicate in &self.predicates {
            let category = predicate.category();
            let produced = predicate.evaluate(ctx, files).map_err(|e| match e {
                PolicyError::RuleEvaluation { .. } => e,
                other => PolicyError::RuleEvaluation {
                    predicate: category.to_string(),
                    reason: other.to_string(),
                },
            })?;
            tracing::debug!(predicate = %category, rules = produced.len(), "predicate evaluated");
            rules.extend(produced);
        }
        Ok(rules)
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Front matter of both sides of a changed file, where parseable.
pub(crate) fn front_matter_sides(file: &File) -> (Option<FrontMatter>, Option<FrontMatter>) {
    (
        file.previous_contents.as_deref().and_then(FrontMatter::parse),
        file.contents.as_deref().and_then(FrontMatter::parse),
    )
}
