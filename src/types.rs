//! Core types shared by the loader, the checks and the reporters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linter configuration, normally read from `docs-lint.yaml`.
///
/// Every field is optional in the file; absent fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown root, relative to the project root.
    pub docs_dir: String,
    /// Image root, relative to the project root.
    pub assets_dir: String,
    /// Navigation document name (looked up in `docs_dir`, then the root).
    pub summary: String,
    /// Redirect map file, relative to the project root.
    pub redirects: String,
    /// Directory names skipped during markdown discovery.
    pub exclude: Vec<String>,
    pub checks: ChecksConfig,
    pub og: Option<OgConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: "docs".to_string(),
            assets_dir: "assets".to_string(),
            summary: "SUMMARY.md".to_string(),
            redirects: "redirects.yaml".to_string(),
            exclude: vec!["deprecated".to_string()],
            checks: ChecksConfig::default(),
            og: None,
        }
    }
}

/// The `checks:` section: global switches plus opaque per-check settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    pub disable: Vec<String>,
    pub warn_only: Vec<String>,
    /// Keyed by check id; each check deserializes its own entry.
    #[serde(flatten)]
    pub settings: BTreeMap<String, serde_yaml::Value>,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            disable: Vec::new(),
            warn_only: vec!["image-alt".to_string(), "orphan-pages".to_string()],
            settings: BTreeMap::new(),
        }
    }
}

/// Social card styling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OgConfig {
    pub brand: Option<String>,
    pub color: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A problem found by a check. Severity belongs to the check, not the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Issue {
    pub fn new(file: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// `file:line` when the line is known, otherwise just the file.
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.file, line),
            None => self.file.clone(),
        }
    }
}

/// Outcome of one check over the whole docs tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub check_id: String,
    pub name: String,
    pub severity: Severity,
    pub issues: Vec<Issue>,
    pub files_checked: usize,
}

impl CheckResult {
    /// True when this result should fail the run.
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Error && !self.issues.is_empty()
    }
}
