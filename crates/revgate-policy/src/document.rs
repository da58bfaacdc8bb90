// document.rs — Document front matter and repository layout.
//
// Documents are `<docs_dir>/<name>.md` files that open with a front matter
// block:
//
//   ---
//   title: Faster sync: a proposal
//   status: Draft
//   author: Alice (@alice), Bob <bob@example.org>
//   category: Core
//   ---
//
// Parsing is line-based rather than YAML because titles routinely contain
// colons. Assets live under `<assets_dir>/<name>/...` and belong to the
// document with the same name.

use std::collections::BTreeMap;

use glob::{MatchOptions, Pattern};
use regex::Regex;

use crate::config::{normalize_account, LayoutSettings};
use crate::error::PolicyError;

/// Parsed `key: value` pairs from a document's leading front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    /// Parse the front matter block at the top of `text`.
    ///
    /// Returns `None` when there is no block or it is never closed.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.trim_start_matches('\u{feff}').lines();
        if lines.next()?.trim() != "---" {
            return None;
        }

        let mut fields = BTreeMap::new();
        for line in lines {
            if line.trim() == "---" {
                return Some(Self { fields });
            }
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_lowercase();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    continue;
                }
                let value = value.trim().trim_matches('"').trim_matches('\'');
                fields.insert(key, value.to_string());
            }
        }
        None
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn status(&self) -> Option<&str> {
        self.get("status")
    }

    pub fn category(&self) -> Option<&str> {
        self.get("category")
    }
}

/// What a changed path is, as far as the predicates care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    /// A document file.
    Document,
    /// A file inside a document's asset folder; carries the owning document path.
    Asset { document: String },
    /// Anything else.
    Other,
}

/// Compiled path rules for the governed repository.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    docs_dir: String,
    assets_prefix: String,
    document_pattern: Pattern,
    author_handle: Regex,
}

impl DocumentLayout {
    pub fn new(settings: &LayoutSettings) -> Result<Self, PolicyError> {
        let docs_dir = settings.docs_dir.trim_matches('/').to_string();
        let assets_dir = settings.assets_dir.trim_matches('/');

        let raw = format!("{}/*.md", Pattern::escape(&docs_dir));
        let document_pattern = Pattern::new(&raw).map_err(|e| PolicyError::InvalidPattern {
            pattern: raw.clone(),
            reason: e.to_string(),
        })?;

        let handle = r"\(@([A-Za-z0-9][A-Za-z0-9-]*)\)";
        let author_handle = Regex::new(handle).map_err(|e| PolicyError::InvalidPattern {
            pattern: handle.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            docs_dir,
            assets_prefix: format!("{}/", assets_dir),
            document_pattern,
            author_handle,
        })
    }

    /// Classify a repository-relative path.
    pub fn classify(&self, path: &str) -> PathKind {
        let opts = MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };
        if self.document_pattern.matches_with(path, opts) {
            return PathKind::Document;
        }

        match path
            .strip_prefix(&self.assets_prefix)
            .and_then(|rest| rest.split_once('/'))
        {
            Some((name, file)) if !name.is_empty() && !file.is_empty() => PathKind::Asset {
                document: self.document_path(name),
            },
            _ => PathKind::Other,
        }
    }

    /// Path of the document called `name`.
    pub fn document_path(&self, name: &str) -> String {
        format!("{}/{}.md", self.docs_dir, name)
    }

    /// Forge handles listed in the `author` field, normalized, in listed order.
    pub fn authors(&self, front: &FrontMatter) -> Vec<String> {
        let mut authors = Vec::new();
        if let Some(field) = front.get("author") {
            for caps in self.author_handle.captures_iter(field) {
                let handle = normalize_account(&caps[1]);
                if !authors.contains(&handle) {
                    authors.push(handle);
                }
            }
        }
        authors
    }
}
