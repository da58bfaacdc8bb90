// report.rs — Human-readable explanation of pending rules.
//
// Pending rules are grouped by the file they are anchored to, in the order
// files are first encountered. Within a file, rules with the same reviewer
// set collapse into one line. Duplicates are resolved pairwise: the first
// rule is paired with the next rule sharing its reviewer set, the pair
// reports the larger `min`, and any further duplicates are skipped. With
// three or more duplicates the reported `min` is therefore not necessarily
// the largest of them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::rule::RuleProcessed;

/// Report text when no rule is pending.
pub const ALL_SATISFIED: &str = "All reviewers have approved.";

/// One deduplicated requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Remaining approvers, in display order.
    pub reviewers: Vec<String>,

    /// Approvals still required.
    pub min: i64,

    /// Predicates that produced the line.
    pub rules: Vec<String>,
}

/// Pending requirements for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub file: String,
    pub lines: Vec<ReportLine>,
}

/// The full explanation, one section per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub sections: Vec<ReportSection>,
}

impl Report {
    /// Build the report from the merge-gating-pending rules.
    ///
    /// Fails with `MissingFileAnnotation` before producing anything if any
    /// rule lacks a file.
    pub fn build(pending: &[RuleProcessed]) -> Result<Self, PolicyError> {
        let mut anchored: Vec<(&str, &RuleProcessed)> = Vec::with_capacity(pending.len());
        for processed in pending {
            match processed.rule.file().filter(|f| !f.is_empty()) {
                Some(file) => anchored.push((file, processed)),
                None => {
                    return Err(PolicyError::MissingFileAnnotation {
                        rule: processed.rule.name.clone(),
                    })
                }
            }
        }

        let mut groups: Vec<(&str, Vec<&RuleProcessed>)> = Vec::new();
        for (file, processed) in anchored {
            match groups.iter_mut().find(|(f, _)| *f == file) {
                Some((_, rules)) => rules.push(processed),
                None => groups.push((file, vec![processed])),
            }
        }

        let sections = groups
            .into_iter()
            .map(|(file, rules)| ReportSection {
                file: file.to_string(),
                lines: dedup_lines(&rules),
            })
            .collect();
        Ok(Self { sections })
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        self.to_string()
    }
}

fn dedup_lines(rules: &[&RuleProcessed]) -> Vec<ReportLine> {
    let keys: Vec<String> = rules.iter().map(|p| p.rule.canonical_reviewers()).collect();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut lines = Vec::new();

    for (i, processed) in rules.iter().enumerate() {
        let key = keys[i].as_str();
        if reported.contains(key) {
            continue;
        }
        let partner = (i + 1..rules.len()).find(|&j| keys[j] == key);

        let mut line = ReportLine {
            reviewers: processed.rule.reviewers.clone(),
            min: processed.rule.min,
            rules: vec![processed.rule.name.clone()],
        };
        if let Some(j) = partner {
            let other = &rules[j].rule;
            line.min = line.min.max(other.min);
            if !line.rules.contains(&other.name) {
                line.rules.push(other.name.clone());
            }
        }
        reported.insert(key);
        lines.push(line);
    }
    lines
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.min == 1 { "approval" } else { "approvals" };
        if self.reviewers.is_empty() {
            write!(
                f,
                "- Requires {} more {} but no eligible reviewers are configured ({})",
                self.min,
                noun,
                self.rules.join(", ")
            )
        } else {
            let handles: Vec<String> = self.reviewers.iter().map(|r| format!("@{}", r)).collect();
            write!(
                f,
                "- Requires {} more {} from: {} ({})",
                self.min,
                noun,
                handles.join(", "),
                self.rules.join(", ")
            )
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sections.is_empty() {
            return writeln!(f, "{}", ALL_SATISFIED);
        }
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "## {}", section.file)?;
            writeln!(f)?;
            for line in &section.lines {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}
