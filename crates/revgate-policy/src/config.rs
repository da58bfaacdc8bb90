// config.rs — Reviewer groups and policy settings.
//
// Two files drive a run:
//   - the group config (YAML): group name → ordered list of accounts
//   - the policy settings (TOML): repository layout, label names, group
//     defaults, and approval counts. Every field has a default, so a missing
//     settings file means "use the defaults".
//
// Account identifiers are normalized once here (lowercased, leading '@'
// stripped) so nothing downstream has to compare case-insensitively. Group
// names are lowercased too; groups that collide after that are merged.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Normalize an account identifier for comparison and display.
pub fn normalize_account(account: &str) -> String {
    account.trim().trim_start_matches('@').to_lowercase()
}

/// Read-only mapping from group name to its accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupConfig {
    groups: BTreeMap<String, Vec<String>>,
}

impl GroupConfig {
    /// Build from `(group, accounts)` pairs, normalizing accounts.
    pub fn from_groups<I, G, A>(groups: I) -> Self
    where
        I: IntoIterator<Item = (G, Vec<A>)>,
        G: Into<String>,
        A: AsRef<str>,
    {
        let groups = groups
            .into_iter()
            .map(|(name, accounts)| {
                (
                    name.into(),
                    accounts.iter().map(|a| a.as_ref().to_string()).collect(),
                )
            })
            .collect();
        Self { groups }.normalized()
    }

    /// Parse YAML group config text.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let raw: Option<BTreeMap<String, Vec<String>>> = serde_yaml::from_str(text)?;
        Ok(Self {
            groups: raw.unwrap_or_default(),
        }
        .normalized())
    }

    /// Load the group config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = read_config(path)?;
        let config = Self::from_yaml_str(&text).map_err(|e| PolicyError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), groups = config.groups.len(), "loaded group config");
        Ok(config)
    }

    /// Accounts in a group, in configured order. Names match case-insensitively.
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups
            .get(&name.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn normalized(self) -> Self {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, accounts) in self.groups {
            let seen = groups.entry(name.trim().to_lowercase()).or_default();
            for account in accounts.iter().map(|a| normalize_account(a)) {
                if !account.is_empty() && !seen.contains(&account) {
                    seen.push(account);
                }
            }
        }
        Self { groups }
    }
}

/// Policy settings from `revgate.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySettings {
    #[serde(default)]
    pub layout: LayoutSettings,

    #[serde(default)]
    pub labels: LabelSettings,

    #[serde(default)]
    pub groups: GroupSettings,

    #[serde(default)]
    pub approvals: ApprovalSettings,

    /// Statuses after which a document is considered settled.
    #[serde(default = "default_terminal_statuses")]
    pub terminal_statuses: Vec<String>,

    /// Status marking an abandoned document.
    #[serde(default = "default_stagnant_status")]
    pub stagnant_status: String,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            labels: LabelSettings::default(),
            groups: GroupSettings::default(),
            approvals: ApprovalSettings::default(),
            terminal_statuses: default_terminal_statuses(),
            stagnant_status: default_stagnant_status(),
        }
    }
}

/// Where documents and their assets live in the governed repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Directory holding `<name>.md` documents.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Directory holding `<name>/...` asset folders.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            assets_dir: default_assets_dir(),
        }
    }
}

/// Label names the engine adds and removes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSettings {
    /// Applied while editors still need to approve.
    #[serde(default = "default_editor_review")]
    pub editor_review: String,

    /// Applied while document authors still need to approve.
    #[serde(default = "default_author_review")]
    pub author_review: String,

    /// Fallback marker for a failing run that would add no other label.
    #[serde(default = "default_pending_response")]
    pub pending_response: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            editor_review: default_editor_review(),
            author_review: default_author_review(),
            pending_response: default_pending_response(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Group used when a document names no category group.
    #[serde(default = "default_group")]
    pub default: String,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            default: default_group(),
        }
    }
}

/// Required approval counts per kind of rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSettings {
    #[serde(default = "default_one")]
    pub editors: i64,

    #[serde(default = "default_one")]
    pub authors: i64,

    /// Changes to documents in a terminal status.
    #[serde(default = "default_one")]
    pub terminal: i64,
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            editors: default_one(),
            authors: default_one(),
            terminal: default_one(),
        }
    }
}

// Serde default functions
fn default_docs_dir() -> String {
    "docs".to_string()
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

fn default_editor_review() -> String {
    "e-review".to_string()
}

fn default_author_review() -> String {
    "a-review".to_string()
}

fn default_pending_response() -> String {
    "w-response".to_string()
}

fn default_group() -> String {
    "all".to_string()
}

fn default_one() -> i64 {
    1
}

fn default_terminal_statuses() -> Vec<String> {
    vec!["Final".to_string(), "Living".to_string(), "Withdrawn".to_string()]
}

fn default_stagnant_status() -> String {
    "Stagnant".to_string()
}

impl PolicySettings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = read_config(path)?;
        toml::from_str(&text).map_err(|e| PolicyError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load settings, falling back to defaults when the file doesn't exist.
    ///
    /// A file that exists but doesn't parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, PolicyError> {
        match Self::load(path) {
            Err(PolicyError::ConfigNotFound { .. }) => {
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Whether `status` is one of the terminal statuses (case-insensitive).
    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal_statuses
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status))
    }

    /// Whether `status` is the stagnant status (case-insensitive).
    pub fn is_stagnant(&self, status: &str) -> bool {
        self.stagnant_status.eq_ignore_ascii_case(status)
    }
}

fn read_config(path: &Path) -> Result<String, PolicyError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => PolicyError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => PolicyError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })
}
