//! Link-graph checks: pages nothing links to, and pages that link nowhere.

use super::Outcome;
use crate::discovery::LintContext;
use crate::links::INDEX_DOC;
use crate::markdown::extract_frontmatter;
use crate::types::Issue;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct OrphanPagesSettings {
    #[serde(default)]
    entry_points: Vec<String>,
}

/// Whether the frontmatter marks the page `hidden: true`.
fn is_hidden(content: &str) -> bool {
    let Some(fm) = extract_frontmatter(content) else {
        return false;
    };
    serde_yaml::from_str::<serde_yaml::Value>(fm.yaml)
        .ok()
        .and_then(|data| data.get("hidden").and_then(serde_yaml::Value::as_bool))
        .unwrap_or(false)
}

fn is_index(file: &str) -> bool {
    file.ends_with(INDEX_DOC)
}

pub fn orphan_pages(ctx: &LintContext) -> Outcome {
    let entry_points = ctx
        .config
        .check_settings::<OrphanPagesSettings>("orphan-pages")
        .unwrap_or_default()
        .entry_points;
    let graph = ctx.link_graph();

    let mut issues = Vec::new();
    for file in &ctx.files {
        if ctx.is_summary(file) || is_index(file) || entry_points.contains(file) {
            continue;
        }
        if graph.has_incoming(file) {
            continue;
        }
        if ctx.read(file).is_some_and(|content| is_hidden(&content)) {
            continue;
        }
        issues.push(Issue::new(file.as_str(), None, "No incoming links from other docs"));
    }

    Outcome {
        issues,
        files_checked: ctx.files.len(),
    }
}

pub fn dead_end_pages(ctx: &LintContext) -> Outcome {
    let graph = ctx.link_graph();

    let mut issues = Vec::new();
    for file in &ctx.files {
        if ctx.is_summary(file) || is_index(file) || file.contains("deprecated") {
            continue;
        }
        if ctx.read(file).is_none() {
            continue;
        }
        if !graph.has_outgoing(file) {
            issues.push(Issue::new(file.as_str(), None, "No outgoing links to other docs"));
        }
    }

    Outcome {
        issues,
        files_checked: ctx.files.len(),
    }
}
