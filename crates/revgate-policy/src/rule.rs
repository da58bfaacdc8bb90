// rule.rs — Reviewer requirements emitted by predicates.
//
// A Rule says "at least `min` distinct accounts from `reviewers` must approve
// because of `annotation.file`". `labels` are markers applied while the rule
// is still waiting on reviewers; `exclude_labels` are forced off meanwhile.
//
// RuleProcessed adds `label_min`, a second counter that tracks any reviewer
// engagement on the current head commit and drives label transitions
// independently from merge gating.

use serde::{Deserialize, Serialize};

use crate::config::normalize_account;

/// Where a rule is anchored, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// A reviewer-approval requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Predicate category that produced this rule.
    pub name: String,

    /// Accounts whose approval counts, in display order.
    pub reviewers: Vec<String>,

    /// Distinct approvals still required. `<= 0` means satisfied.
    pub min: i64,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub exclude_labels: Vec<String>,

    /// Whether the PR author's own membership in `reviewers` counts as an approval.
    #[serde(default)]
    pub pr_approval: bool,

    #[serde(default)]
    pub annotation: Annotation,
}

impl Rule {
    /// Create a rule anchored to `file`.
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        reviewers: Vec<String>,
        min: i64,
    ) -> Self {
        Self {
            name: name.into(),
            reviewers,
            min,
            labels: Vec::new(),
            exclude_labels: Vec::new(),
            pr_approval: false,
            annotation: Annotation {
                file: Some(file.into()),
            },
        }
    }

    /// Add a pending-state label and return self.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Add a label forced off while pending and return self.
    pub fn with_exclude_label(mut self, label: impl Into<String>) -> Self {
        self.exclude_labels.push(label.into());
        self
    }

    /// Let the PR author's membership count as an approval.
    pub fn with_pr_approval(mut self) -> Self {
        self.pr_approval = true;
        self
    }

    pub fn file(&self) -> Option<&str> {
        self.annotation.file.as_deref()
    }

    /// Whether an already-normalized account is one of this rule's reviewers.
    pub fn requires(&self, account: &str) -> bool {
        self.reviewers.iter().any(|r| r == account)
    }

    /// Reviewer set as a sorted, comma-joined string. Equal for equal sets.
    pub fn canonical_reviewers(&self) -> String {
        let mut sorted: Vec<&str> = self.reviewers.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.join(",")
    }

    /// Lowercase reviewers and drop duplicates, keeping first-seen order.
    pub fn normalized(mut self) -> Self {
        let mut reviewers: Vec<String> = Vec::with_capacity(self.reviewers.len());
        for account in self.reviewers.iter().map(|r| normalize_account(r)) {
            if !account.is_empty() && !reviewers.contains(&account) {
                reviewers.push(account);
            }
        }
        self.reviewers = reviewers;
        self
    }
}

/// A rule together with its label-activity counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleProcessed {
    #[serde(flatten)]
    pub rule: Rule,

    /// Reviewer engagements on the head commit still needed before the
    /// rule's labels come off. `<= 0` means label-satisfied.
    pub label_min: i64,
}

impl RuleProcessed {
    pub fn new(rule: Rule) -> Self {
        let label_min = rule.min;
        Self { rule, label_min }
    }

    /// Still blocking the merge.
    pub fn is_pending(&self) -> bool {
        self.rule.min > 0
    }

    pub fn is_label_satisfied(&self) -> bool {
        self.label_min <= 0
    }
}

impl From<Rule> for RuleProcessed {
    fn from(rule: Rule) -> Self {
        Self::new(rule)
    }
}
