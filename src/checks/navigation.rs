//! Checks driven by the navigation document and the redirect map.

use super::Outcome;
use crate::discovery::{LintContext, read_optional};
use crate::markdown::extract_h1;
use crate::summary::{parse_summary, summary_paths};
use crate::types::Issue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").unwrap());

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub fn ampersand_summary(ctx: &LintContext) -> Outcome {
    let Some(content) = read_optional(&ctx.summary_path) else {
        return Outcome::default();
    };

    let mut issues = Vec::new();
    for (i, line) in content.split('\n').enumerate() {
        let Some(caps) = TITLE_RE.captures(line) else {
            continue;
        };
        if caps[1].contains(" & ") {
            issues.push(Issue::new(
                ctx.config.summary.as_str(),
                Some(i + 1),
                "Title contains ' & ' \u{2014} use 'and' instead",
            ));
        }
    }
    Outcome {
        issues,
        files_checked: 1,
    }
}

pub fn summary_sync(ctx: &LintContext) -> Outcome {
    let entries = parse_summary(&ctx.summary_path);
    if entries.is_empty() {
        return Outcome::default();
    }
    let declared = summary_paths(&entries);
    let on_disk: BTreeSet<&str> = ctx
        .files
        .iter()
        .map(String::as_str)
        .filter(|f| !ctx.is_summary(f))
        .collect();

    let mut issues = Vec::new();
    for file in &on_disk {
        if !declared.contains(file) {
            issues.push(Issue::new(*file, None, format!("Not in {}", ctx.config.summary)));
        }
    }

    for entry in entries.iter().filter(|e| e.is_markdown()) {
        if !ctx.doc_path(&entry.path).is_file() {
            issues.push(Issue::new(
                ctx.config.summary.as_str(),
                Some(entry.line),
                format!("Missing on disk: {}", entry.path),
            ));
        }
    }

    Outcome {
        issues,
        files_checked: on_disk.len(),
    }
}

/// Strip bold, italic and code markup, collapse whitespace, ignore case.
pub fn normalize_title(title: &str) -> String {
    let t = BOLD_RE.replace_all(title, "$1");
    let t = ITALIC_RE.replace_all(&t, "$1");
    let t = CODE_RE.replace_all(&t, "$1");
    WS_RE.replace_all(&t, " ").trim().to_lowercase()
}

pub fn title_mismatch(ctx: &LintContext) -> Outcome {
    let entries = parse_summary(&ctx.summary_path);
    if entries.is_empty() {
        return Outcome::default();
    }

    let mut issues = Vec::new();
    let mut checked = 0;
    for entry in entries.iter().filter(|e| e.is_markdown()) {
        let Some(content) = ctx.read(&entry.path) else {
            continue;
        };
        checked += 1;
        let Some(h1) = extract_h1(&content) else {
            continue;
        };
        if normalize_title(&entry.title) != normalize_title(&h1) {
            issues.push(
                Issue::new(
                    entry.path.as_str(),
                    None,
                    format!("{} title \"{}\" != H1 \"{}\"", ctx.config.summary, entry.title, h1),
                )
                .with_detail(format!("{}:{}", ctx.config.summary, entry.line)),
            );
        }
    }

    Outcome {
        issues,
        files_checked: checked,
    }
}

pub fn redirects(ctx: &LintContext) -> Outcome {
    let Some(content) = read_optional(&ctx.redirects_path) else {
        return Outcome::default();
    };
    let file = ctx.config.redirects.as_str();

    let data: serde_yaml::Value = match serde_yaml::from_str(&content) {
        Ok(data) => data,
        Err(e) => {
            let line = e.location().map(|loc| loc.line());
            return Outcome {
                issues: vec![
                    Issue::new(file, line, "Invalid YAML in redirects file").with_detail(e.to_string()),
                ],
                files_checked: 1,
            };
        }
    };

    let map = match data.get("redirects") {
        None | Some(serde_yaml::Value::Null) => return Outcome::default(),
        Some(serde_yaml::Value::Mapping(map)) => map,
        Some(_) => {
            return Outcome {
                issues: vec![Issue::new(
                    file,
                    None,
                    "Malformed redirects map: `redirects` must be a mapping",
                )],
                files_checked: 1,
            };
        }
    };

    let mut issues = Vec::new();
    for (_, target) in map {
        let target = match target {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        if !target.ends_with(".md") {
            continue;
        }
        if !ctx.doc_path(&target).is_file() {
            issues.push(Issue::new(file, None, format!("Redirect target missing: {}", target)));
        }
    }

    Outcome {
        issues,
        files_checked: map.len(),
    }
}
