// unmatched.rs — Catch-all: files no other predicate can reason about need editors.
//
// That covers every path that is neither a document nor an asset, plus
// documents whose front matter is missing on a side the document predicates
// would need to read. Without this predicate such changes would slip through
// with no reviewer requirement at all.

use revgate_changeset::{File, FileStatus};

use super::{front_matter_sides, PolicyContext, PredicateCategory, RulePredicate};
use crate::document::PathKind;
use crate::error::PolicyError;
use crate::rule::Rule;

pub struct UnmatchedPredicate;

impl RulePredicate for UnmatchedPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Unmatched
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for file in files {
            match ctx.layout.classify(&file.filename) {
                PathKind::Asset { .. } => {}
                PathKind::Other => {
                    rules.push(ctx.editor_rule(self.category(), &file.filename, None));
                }
                PathKind::Document => {
                    let (before, after) = front_matter_sides(file);
                    let unreadable = match file.status {
                        FileStatus::Added | FileStatus::Copied => after.is_none(),
                        FileStatus::Removed => before.is_none(),
                        FileStatus::Modified | FileStatus::Renamed => {
                            before.is_none() || after.is_none()
                        }
                    };
                    if unreadable {
                        tracing::debug!(file = %file.filename, "document front matter unreadable");
                        let front = after.as_ref().or(before.as_ref());
                        rules.push(ctx.editor_rule(self.category(), &file.filename, front));
                    }
                }
            }
        }
        Ok(rules)
    }
}
