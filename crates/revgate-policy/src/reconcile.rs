// reconcile.rs — Fold review events into the rule set.
//
// Stages, each returning new values:
//   1. ingestion        — normalize rule reviewers and review accounts
//   2. self-approval    — the PR author approves their own `pr_approval` rules
//   3. review folding   — approvals decrement `min`; head-commit engagement
//                         decrements `label_min`
//   4. partition        — pending vs satisfied, label delta, pending marker
//   5. pruning          — drop approved accounts from pending reviewer lists
//
// Each account counts at most once per rule for each counter. Counters may
// go negative; only `<= 0` is ever consulted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::normalize_account;
use crate::rule::{Rule, RuleProcessed};
use crate::snapshot::{ReviewEvent, ReviewSnapshot, ReviewState};

/// Who has engaged with the pull request so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalState {
    /// Accounts with an APPROVED review, plus the PR author when self-approval applied.
    pub approved_by: BTreeSet<String>,

    /// Accounts that submitted any review.
    pub reviewed_by: BTreeSet<String>,

    /// Accounts with an outstanding review request.
    pub requested_reviewers: BTreeSet<String>,
}

/// Labels to add and remove, before filtering against what is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDelta {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl LabelDelta {
    /// The change a caller actually has to make given the labels already
    /// applied: add only what is missing, remove only what is present.
    pub fn filtered_against(&self, applied: &[String]) -> LabelDelta {
        let applied: BTreeSet<&str> = applied.iter().map(String::as_str).collect();
        LabelDelta {
            add: self
                .add
                .iter()
                .filter(|l| !applied.contains(l.as_str()))
                .cloned()
                .collect(),
            remove: self
                .remove
                .iter()
                .filter(|l| applied.contains(l.as_str()))
                .cloned()
                .collect(),
        }
    }
}

/// Result of reconciling rules against a review snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Rules still blocking the merge, reviewers pruned of approvers.
    pub pending: Vec<RuleProcessed>,

    /// Rules whose approval requirement is met.
    pub satisfied: Vec<RuleProcessed>,

    pub labels: LabelDelta,

    /// Accounts the caller should request a review from.
    pub reviewers_to_request: BTreeSet<String>,

    pub state: ApprovalState,

    /// No rule is pending.
    pub passed: bool,
}

/// A rule being folded, with the accounts already counted against each counter.
#[derive(Debug, Clone)]
struct Tally {
    processed: RuleProcessed,
    approvals: BTreeSet<String>,
    engagements: BTreeSet<String>,
}

impl Tally {
    fn new(rule: Rule) -> Self {
        Self {
            processed: RuleProcessed::new(rule.normalized()),
            approvals: BTreeSet::new(),
            engagements: BTreeSet::new(),
        }
    }

    fn approve(&mut self, account: &str) {
        if self.approvals.insert(account.to_string()) {
            self.processed.rule.min -= 1;
        }
    }

    fn engage(&mut self, account: &str) {
        if self.engagements.insert(account.to_string()) {
            self.processed.label_min -= 1;
        }
    }
}

/// Reconcile `rules` against the review snapshot.
///
/// `pending_response_label` is the marker added when the run fails but would
/// otherwise add no label.
pub fn reconcile(
    rules: Vec<Rule>,
    snapshot: &ReviewSnapshot,
    pending_response_label: &str,
) -> Reconciliation {
    let author = normalize_account(&snapshot.author);
    let events: Vec<ReviewEvent> = snapshot
        .chronological_reviews()
        .into_iter()
        .map(|mut event| {
            event.user = normalize_account(&event.user);
            event
        })
        .collect();

    let mut state = ApprovalState {
        requested_reviewers: snapshot
            .requested_reviewers
            .iter()
            .map(|r| normalize_account(r))
            .filter(|r| !r.is_empty())
            .collect(),
        ..ApprovalState::default()
    };

    let tallies: Vec<Tally> = rules.into_iter().map(Tally::new).collect();
    let tallies = apply_self_approval(tallies, &author, &mut state);
    let tallies = fold_reviews(tallies, &events, &snapshot.head_commit, &mut state);

    let (pending, satisfied): (Vec<RuleProcessed>, Vec<RuleProcessed>) = tallies
        .into_iter()
        .map(|t| t.processed)
        .partition(RuleProcessed::is_pending);

    let passed = pending.is_empty();
    let labels = compose_labels(&pending, &satisfied, passed, pending_response_label);
    let pending = prune_approved(pending, &state.approved_by);

    let reviewers_to_request = pending
        .iter()
        .flat_map(|p| p.rule.reviewers.iter())
        .filter(|r| {
            !state.approved_by.contains(*r)
                && !state.requested_reviewers.contains(*r)
                && !state.reviewed_by.contains(*r)
                && **r != author
        })
        .cloned()
        .collect();

    tracing::debug!(
        pending = pending.len(),
        satisfied = satisfied.len(),
        approved_by = state.approved_by.len(),
        "reconciled reviews"
    );

    Reconciliation {
        pending,
        satisfied,
        labels,
        reviewers_to_request,
        state,
        passed,
    }
}

fn apply_self_approval(tallies: Vec<Tally>, author: &str, state: &mut ApprovalState) -> Vec<Tally> {
    if author.is_empty() {
        return tallies;
    }
    tallies
        .into_iter()
        .map(|mut tally| {
            let rule = &tally.processed.rule;
            if rule.pr_approval && rule.requires(author) {
                tally.approve(author);
                tally.engage(author);
                state.approved_by.insert(author.to_string());
            }
            tally
        })
        .collect()
}

fn fold_reviews(
    mut tallies: Vec<Tally>,
    events: &[ReviewEvent],
    head_commit: &str,
    state: &mut ApprovalState,
) -> Vec<Tally> {
    for event in events.iter().filter(|e| !e.user.is_empty()) {
        state.reviewed_by.insert(event.user.clone());
        let approved = event.state == ReviewState::Approved;
        if approved {
            state.approved_by.insert(event.user.clone());
        }
        let engaged = event.state.is_engagement() && event.commit_id == head_commit;

        for tally in tallies.iter_mut() {
            if !tally.processed.rule.requires(&event.user) {
                continue;
            }
            if approved {
                tally.approve(&event.user);
            }
            if engaged {
                tally.engage(&event.user);
            }
        }
    }
    tallies
}

fn compose_labels(
    pending: &[RuleProcessed],
    satisfied: &[RuleProcessed],
    passed: bool,
    pending_response_label: &str,
) -> LabelDelta {
    let (label_open, label_done): (Vec<&RuleProcessed>, Vec<&RuleProcessed>) = pending
        .iter()
        .chain(satisfied.iter())
        .partition(|p| !p.is_label_satisfied());

    let excluded: BTreeSet<String> = label_open
        .iter()
        .flat_map(|p| p.rule.exclude_labels.iter().cloned())
        .collect();

    let mut add: BTreeSet<String> = label_open
        .iter()
        .flat_map(|p| p.rule.labels.iter().cloned())
        .filter(|l| !excluded.contains(l))
        .collect();

    let mut remove: BTreeSet<String> = label_done
        .iter()
        .flat_map(|p| p.rule.labels.iter().cloned())
        .filter(|l| !add.contains(l))
        .collect();
    remove.extend(excluded);

    if !pending_response_label.is_empty() {
        if !passed && add.is_empty() {
            add.insert(pending_response_label.to_string());
            remove.remove(pending_response_label);
        } else if !add.contains(pending_response_label) {
            remove.insert(pending_response_label.to_string());
        }
    }

    LabelDelta { add, remove }
}

fn prune_approved(pending: Vec<RuleProcessed>, approved_by: &BTreeSet<String>) -> Vec<RuleProcessed> {
    pending
        .into_iter()
        .map(|mut p| {
            p.rule.reviewers.retain(|r| !approved_by.contains(r));
            p
        })
        .collect()
}
