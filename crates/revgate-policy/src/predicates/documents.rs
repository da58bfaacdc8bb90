// documents.rs — Predicates over document files.
//
// Each predicate looks at a different aspect of a changed document:
//   authors  — the author handle set changed
//   new      — the document is new
//   status   — the lifecycle status changed (removal counts as a change)
//   stagnant — the document was or becomes stagnant
//   terminal — the document was in a terminal status before the change
//   edit     — the document was edited and its authors must sign off
//
// Documents whose needed front matter can't be parsed are left to the
// unmatched predicate, which requires editors for them.

use std::collections::BTreeSet;

use revgate_changeset::{File, FileStatus};

use super::{front_matter_sides, PolicyContext, PredicateCategory, RulePredicate};
use crate::document::{FrontMatter, PathKind};
use crate::error::PolicyError;
use crate::rule::Rule;

fn is_document(ctx: &PolicyContext<'_>, file: &File) -> bool {
    ctx.layout.classify(&file.filename) == PathKind::Document
}

fn is_edit(file: &File) -> bool {
    matches!(file.status, FileStatus::Modified | FileStatus::Renamed)
}

/// Author list modified → editors.
pub struct AuthorsPredicate;

impl RulePredicate for AuthorsPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Authors
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for file in files.iter().filter(|f| is_edit(f) && is_document(ctx, f)) {
            let (Some(before), Some(after)) = front_matter_sides(file) else {
                continue;
            };
            let old: BTreeSet<String> = ctx.layout.authors(&before).into_iter().collect();
            let new: BTreeSet<String> = ctx.layout.authors(&after).into_iter().collect();
            if old != new {
                rules.push(ctx.editor_rule(self.category(), &file.filename, Some(&after)));
            }
        }
        Ok(rules)
    }
}

/// New document added → editors.
pub struct NewDocumentPredicate;

impl RulePredicate for NewDocumentPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::New
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let rules = files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Added | FileStatus::Copied))
            .filter(|f| is_document(ctx, f))
            .map(|file| {
                let (_, after) = front_matter_sides(file);
                ctx.editor_rule(self.category(), &file.filename, after.as_ref())
                    .with_exclude_label(&ctx.settings.labels.author_review)
            })
            .collect();
        Ok(rules)
    }
}

/// Lifecycle status changed → editors.
pub struct StatusPredicate;

impl RulePredicate for StatusPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Status
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for file in files.iter().filter(|f| is_document(ctx, f)) {
            let (before, after) = front_matter_sides(file);
            let Some(before) = before else {
                continue;
            };
            let current = match file.status {
                FileStatus::Removed => None,
                FileStatus::Modified | FileStatus::Renamed => match &after {
                    Some(after) => after.status(),
                    None => continue,
                },
                FileStatus::Added | FileStatus::Copied => continue,
            };
            let previous = before.status();
            let changed = match (previous, current) {
                (Some(p), Some(c)) => !p.eq_ignore_ascii_case(c),
                (p, c) => p.is_some() != c.is_some(),
            };
            if changed {
                tracing::debug!(
                    file = %file.filename,
                    from = previous.unwrap_or("-"),
                    to = current.unwrap_or("-"),
                    "status change"
                );
                let front = after.as_ref().unwrap_or(&before);
                rules.push(ctx.editor_rule(self.category(), &file.filename, Some(front)));
            }
        }
        Ok(rules)
    }
}

/// A stagnant document touched (or a document marked stagnant) → editors.
pub struct StagnantPredicate;

impl RulePredicate for StagnantPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Stagnant
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let is_stagnant = |front: &Option<FrontMatter>| {
            front
                .as_ref()
                .and_then(FrontMatter::status)
                .is_some_and(|s| ctx.settings.is_stagnant(s))
        };

        let mut rules = Vec::new();
        for file in files.iter().filter(|f| is_edit(f) && is_document(ctx, f)) {
            let (before, after) = front_matter_sides(file);
            if is_stagnant(&before) || is_stagnant(&after) {
                let front = after.as_ref().or(before.as_ref());
                rules.push(ctx.editor_rule(self.category(), &file.filename, front));
            }
        }
        Ok(rules)
    }
}

/// A document in a terminal status changed or removed → editors.
pub struct TerminalPredicate;

impl RulePredicate for TerminalPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Terminal
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for file in files.iter().filter(|f| is_document(ctx, f)) {
            if !(is_edit(file) || file.status == FileStatus::Removed) {
                continue;
            }
            let (before, _) = front_matter_sides(file);
            let Some(before) = before else {
                continue;
            };
            if before.status().is_some_and(|s| ctx.settings.is_terminal(s)) {
                let mut rule = ctx.editor_rule(self.category(), &file.filename, Some(&before));
                rule.min = ctx.settings.approvals.terminal;
                rules.push(rule.with_exclude_label(&ctx.settings.labels.author_review));
            }
        }
        Ok(rules)
    }
}

/// Document edited → its previous authors (editors if it lists none).
pub struct EditPredicate;

impl RulePredicate for EditPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Edit
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for file in files.iter().filter(|f| is_edit(f) && is_document(ctx, f)) {
            let (Some(before), _) = front_matter_sides(file) else {
                continue;
            };
            if before.status().is_some_and(|s| ctx.settings.is_terminal(s)) {
                continue;
            }
            let authors = ctx.layout.authors(&before);
            let rule = if authors.is_empty() {
                ctx.editor_rule(self.category(), &file.filename, Some(&before))
            } else {
                ctx.author_rule(self.category(), &file.filename, authors)
            };
            rules.push(rule);
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::NoLookup;
    use super::*;

    fn modified(before: String, after: String) -> Vec<File> {
        vec![File::modified("docs/doc-1.md", before, after)]
    }

    fn renamed(before: String, after: String) -> Vec<File> {
        vec![File::renamed("docs/old.md", "docs/doc-1.md", before, after)]
    }

    // ── authors ──────────────────────────────────────────────────

    #[test]
    fn author_change_requires_editors() {
        let files = modified(doc("Draft", "A (@alice)"), doc("Draft", "A (@alice), B (@bob)"));
        let rules = run(&AuthorsPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "authors");
        assert_eq!(rules[0].reviewers, ["ed1", "ed2"]);
        assert_eq!(rules[0].labels, ["e-review"]);
    }

    #[test]
    fn reordered_authors_are_not_a_change() {
        let files = modified(
            doc("Draft", "A (@alice), B (@bob)"),
            doc("Draft", "B (@Bob), A (@alice)"),
        );
        assert!(run(&AuthorsPredicate, &files, &NoLookup).is_empty());
    }

    #[test]
    fn author_change_across_rename_is_anchored_to_new_path() {
        let files = renamed(doc("Draft", "A (@alice)"), doc("Draft", "A (@alice), B (@bob)"));
        let rules = run(&AuthorsPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].file(), Some("docs/doc-1.md"));
    }

    // ── new ──────────────────────────────────────────────────────

    #[test]
    fn new_document_requires_category_editors() {
        let files = vec![File::added("docs/doc-9.md", core_doc("Draft", "A (@alice)"))];
        let rules = run(&NewDocumentPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].reviewers, ["core-ed"]);
        assert_eq!(rules[0].exclude_labels, ["a-review"]);
        assert!(!rules[0].pr_approval);
    }

    #[test]
    fn new_non_document_is_ignored() {
        let files = vec![File::added("README.md", "hi".to_string())];
        assert!(run(&NewDocumentPredicate, &files, &NoLookup).is_empty());
    }

    // ── status ───────────────────────────────────────────────────

    #[test]
    fn status_change_requires_editors() {
        let files = modified(doc("Draft", "A (@alice)"), doc("Review", "A (@alice)"));
        let rules = run(&StatusPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "status");
    }

    #[test]
    fn status_change_across_rename_requires_editors() {
        let files = renamed(doc("Draft", "A (@alice)"), doc("Review", "A (@alice)"));
        let rules = run(&StatusPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].file(), Some("docs/doc-1.md"));
    }

    #[test]
    fn status_case_change_is_not_a_change() {
        let files = modified(doc("Draft", "A (@alice)"), doc("draft", "A (@alice)"));
        assert!(run(&StatusPredicate, &files, &NoLookup).is_empty());
    }

    #[test]
    fn removal_counts_as_status_change() {
        let files = vec![File::removed("docs/doc-1.md", doc("Draft", "A (@alice)"))];
        let rules = run(&StatusPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn unparseable_head_is_left_to_unmatched() {
        let files = modified(doc("Draft", "A (@alice)"), String::new());
        assert!(run(&StatusPredicate, &files, &NoLookup).is_empty());
    }

    // ── stagnant ─────────────────────────────────────────────────

    #[test]
    fn reviving_stagnant_document_requires_editors() {
        let files = modified(doc("Stagnant", "A (@alice)"), doc("Draft", "A (@alice)"));
        let rules = run(&StagnantPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "stagnant");
    }

    #[test]
    fn renaming_stagnant_document_requires_editors() {
        let files = renamed(doc("Stagnant", "A (@alice)"), doc("Stagnant", "A (@alice)"));
        assert_eq!(run(&StagnantPredicate, &files, &NoLookup).len(), 1);
    }

    #[test]
    fn active_document_is_not_stagnant() {
        let files = modified(doc("Draft", "A (@alice)"), doc("Review", "A (@alice)"));
        assert!(run(&StagnantPredicate, &files, &NoLookup).is_empty());
    }

    // ── terminal ─────────────────────────────────────────────────

    #[test]
    fn final_document_change_requires_editors() {
        let files = modified(doc("Final", "A (@alice)"), doc("Final", "A (@alice)") + "typo");
        let rules = run(&TerminalPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].min, 1);
        assert_eq!(rules[0].exclude_labels, ["a-review"]);
    }

    #[test]
    fn becoming_final_is_not_terminal_yet() {
        let files = modified(doc("Last Call", "A (@alice)"), doc("Final", "A (@alice)"));
        assert!(run(&TerminalPredicate, &files, &NoLookup).is_empty());
    }

    #[test]
    fn removing_living_document_is_terminal() {
        let files = vec![File::removed("docs/doc-1.md", doc("Living", "A (@alice)"))];
        assert_eq!(run(&TerminalPredicate, &files, &NoLookup).len(), 1);
    }

    // ── edit ─────────────────────────────────────────────────────

    #[test]
    fn edit_requires_previous_authors_with_self_approval() {
        let files = modified(
            doc("Draft", "A (@Alice), B (@bob)"),
            doc("Draft", "A (@Alice)") + "more",
        );
        let rules = run(&EditPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].reviewers, ["alice", "bob"]);
        assert!(rules[0].pr_approval);
        assert_eq!(rules[0].labels, ["a-review"]);
    }

    #[test]
    fn renamed_document_is_an_edit_for_previous_authors() {
        let files = renamed(doc("Draft", "A (@alice)"), doc("Draft", "A (@alice), B (@bob)"));
        let rules = run(&EditPredicate, &files, &NoLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].reviewers, ["alice"]);
        assert_eq!(rules[0].file(), Some("docs/doc-1.md"));
    }

    #[test]
    fn edit_without_handles_falls_back_to_editors() {
        let files = modified(doc("Draft", "Anon <a@example.org>"), doc("Draft", "x"));
        let rules = run(&EditPredicate, &files, &NoLookup);
        assert_eq!(rules[0].reviewers, ["ed1", "ed2"]);
        assert!(!rules[0].pr_approval);
    }

    #[test]
    fn terminal_documents_are_not_author_edits() {
        let files = modified(doc("Final", "A (@alice)"), doc("Final", "A (@alice)") + "x");
        assert!(run(&EditPredicate, &files, &NoLookup).is_empty());
    }
}
