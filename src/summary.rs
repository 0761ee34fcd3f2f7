//! Navigation document (`SUMMARY.md`) parsing.

use crate::discovery::read_optional;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

static HTTP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

/// One `[title](path)` line of the navigation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub title: String,
    pub path: String,
    pub line: usize,
}

impl NavEntry {
    pub fn is_markdown(&self) -> bool {
        self.path.ends_with(".md")
    }
}

/// Parse the navigation document, one entry per line (first link only).
///
/// A missing document yields no entries; callers treat that as
/// "not applicable".
pub fn parse_summary(path: &Path) -> Vec<NavEntry> {
    match read_optional(path) {
        Some(content) => parse_summary_str(&content),
        None => Vec::new(),
    }
}

pub fn parse_summary_str(content: &str) -> Vec<NavEntry> {
    content
        .split('\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let caps = ENTRY_RE.captures(line)?;
            let path = caps[2].to_string();
            if HTTP_RE.is_match(&path) {
                return None;
            }
            Some(NavEntry {
                title: caps[1].trim().to_string(),
                path,
                line: i + 1,
            })
        })
        .collect()
}

/// The declared document set.
pub fn summary_paths(entries: &[NavEntry]) -> HashSet<&str> {
    entries.iter().map(|e| e.path.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parses_entries_with_line_numbers() {
        let content = "\
# Table of contents

* [Overview](README.md)
* [Getting Started](getting-started/README.md)
  * [Setup](getting-started/setup.md) see also [Other](other.md)
* [Website](https://example.com)
";
        let entries = parse_summary_str(content);
        assert_eq!(
            entries,
            vec![
                NavEntry { title: "Overview".into(), path: "README.md".into(), line: 3 },
                NavEntry {
                    title: "Getting Started".into(),
                    path: "getting-started/README.md".into(),
                    line: 4
                },
                NavEntry { title: "Setup".into(), path: "getting-started/setup.md".into(), line: 5 },
            ]
        );
    }

    #[test]
    fn missing_document_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(parse_summary(&tmp.path().join("SUMMARY.md")).is_empty());
    }

    #[test]
    fn declared_paths() {
        let entries = parse_summary_str("* [A](a.md)\n* [B](b/)\n");
        let paths = summary_paths(&entries);
        assert!(paths.contains("a.md"));
        assert!(paths.contains("b/"));
        assert!(entries[0].is_markdown());
        assert!(!entries[1].is_markdown());
    }
}
