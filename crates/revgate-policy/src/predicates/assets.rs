// assets.rs — Asset changes need approval from the owning document's authors.

use revgate_changeset::File;

use super::{PolicyContext, PredicateCategory, RulePredicate};
use crate::document::{FrontMatter, PathKind};
use crate::error::PolicyError;
use crate::rule::Rule;

/// A file under a document's asset folder changed → that document's authors.
///
/// The owning document is read from the change set when it changed too,
/// otherwise from the head tree. If its authors can't be determined the
/// rule falls back to editors.
pub struct AssetsPredicate;

impl AssetsPredicate {
    fn owning_front_matter(
        ctx: &PolicyContext<'_>,
        files: &[File],
        document: &str,
    ) -> Option<FrontMatter> {
        if let Some(changed) = files.iter().find(|f| f.filename == document) {
            let text = changed
                .contents
                .as_deref()
                .or(changed.previous_contents.as_deref());
            return text.and_then(FrontMatter::parse);
        }

        match ctx.lookup.head_contents(document) {
            Ok(text) => text.as_deref().and_then(FrontMatter::parse),
            Err(e) => {
                tracing::warn!(document, error = %e, "owning document unreadable, requiring editors");
                None
            }
        }
    }
}

impl RulePredicate for AssetsPredicate {
    fn category(&self) -> PredicateCategory {
        PredicateCategory::Assets
    }

    fn evaluate(&self, ctx: &PolicyContext<'_>, files: &[File]) -> Result<Vec<Rule>, PolicyError> {
        let mut rules = Vec::new();
        for file in files {
            let PathKind::Asset { document } = ctx.layout.classify(&file.filename) else {
                continue;
            };
            let front = Self::owning_front_matter(ctx, files, &document);
            let authors = front
                .as_ref()
                .map(|f| ctx.layout.authors(f))
                .unwrap_or_default();

            let rule = if authors.is_empty() {
                ctx.editor_rule(self.category(), &file.filename, front.as_ref())
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
    use std::collections::HashMap;

    use super::super::test_support::*;
    use super::super::{ContentLookup, NoLookup};
    use super::*;

    struct MapLookup(HashMap<&'static str, String>);

    impl ContentLookup for MapLookup {
        fn head_contents(&self, path: &str) -> Result<Option<String>, PolicyError> {
            Ok(self.0.get(path).cloned())
        }
    }

    struct BrokenLookup;

    impl ContentLookup for BrokenLookup {
        fn head_contents(&self, path: &str) -> Result<Option<String>, PolicyError> {
            Err(PolicyError::ContentUnavailable {
                path: path.to_string(),
                reason: "blob missing".to_string(),
            })
        }
    }

    #[test]
    fn asset_requires_authors_from_head_document() {
        let lookup = MapLookup(HashMap::from([(
            "docs/doc-3.md",
            doc("Draft", "A (@alice), B (@bob)"),
        )]));
        let files = vec![File::added("assets/doc-3/diagram.svg", "<svg/>".to_string())];

        let rules = run(&AssetsPredicate, &files, &lookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "assets");
        assert_eq!(rules[0].reviewers, ["alice", "bob"]);
        assert!(rules[0].pr_approval);
        assert_eq!(rules[0].file(), Some("assets/doc-3/diagram.svg"));
    }

    #[test]
    fn document_in_change_set_takes_precedence() {
        let lookup = MapLookup(HashMap::from([("docs/doc-3.md", doc("Draft", "A (@alice)"))]));
        let files = vec![
            File::modified(
                "docs/doc-3.md",
                doc("Draft", "A (@alice)"),
                doc("Draft", "C (@carol)"),
            ),
            File::modified("assets/doc-3/data.csv", "a".to_string(), "b".to_string()),
        ];

        let rules = run(&AssetsPredicate, &files, &lookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].reviewers, ["carol"]);
    }

    #[test]
    fn missing_document_falls_back_to_editors() {
        let files = vec![File::added("assets/doc-4/x.png", String::new())];
        let rules = run(&AssetsPredicate, &files, &NoLookup);
        assert_eq!(rules[0].reviewers, EDITORS);
        assert_eq!(rules[0].labels, ["e-review"]);
        assert!(!rules[0].pr_approval);
    }

    #[test]
    fn unreadable_document_falls_back_to_editors() {
        let files = vec![File::added("assets/doc-4/x.png", String::new())];
        let rules = run(&AssetsPredicate, &files, &BrokenLookup);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].reviewers, EDITORS);
    }

    #[test]
    fn non_assets_are_ignored() {
        let files = vec![File::added("docs/doc-4.md", doc("Draft", "A (@alice)"))];
        assert!(run(&AssetsPredicate, &files, &NoLookup).is_empty());
    }
}
