//! Link and image target checks.

use super::{Outcome, scan_docs};
use crate::discovery::LintContext;
use crate::links::{image_exists, is_external, is_image_href, link_target_exists};
use crate::markdown::{content_lines, extract_links, strip_inline_code};
use crate::types::Issue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static MD_IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap());

static HTML_SRC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\bsrc=["']([^"']+)["']"#).unwrap());

const BROKEN_REFERENCE: &str = "broken-reference";

#[derive(Debug, Default, Deserialize)]
struct DeprecatedLinksSettings {
    #[serde(default)]
    exclude_files: Vec<String>,
}

pub fn deprecated_links(ctx: &LintContext) -> Outcome {
    let exclude_files = ctx
        .config
        .check_settings::<DeprecatedLinksSettings>("deprecated-links")
        .unwrap_or_default()
        .exclude_files;

    scan_docs(ctx, |file, content, issues| {
        if ctx.is_summary(file) || file.contains("deprecated") {
            return;
        }
        if exclude_files.iter().any(|pattern| file.contains(pattern.as_str())) {
            return;
        }
        for link in extract_links(content) {
            if is_external(&link.href) {
                continue;
            }
            if link.href.to_lowercase().contains("deprecated") {
                issues.push(Issue::new(
                    file,
                    Some(link.line),
                    format!("Link to deprecated: [{}]({})", link.text, link.href),
                ));
            }
        }
    })
}

/// Templated or placeholder targets that are not meant to resolve.
fn is_placeholder(href: &str) -> bool {
    href.contains("{{") || href.contains('<') || href.starts_with(BROKEN_REFERENCE)
}

pub fn broken_links(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        for link in extract_links(content) {
            if link.href.is_empty() || link.is_image || is_external(&link.href) {
                continue;
            }
            if is_image_href(&link.href) || is_placeholder(&link.href) {
                continue;
            }
            if !link_target_exists(&ctx.docs_dir, file, &link.href) {
                issues.push(Issue::new(
                    file,
                    Some(link.line),
                    format!("Broken link: [{}]({})", link.text, link.href),
                ));
            }
        }
    })
}

/// A local image referenced by markdown or an HTML `src` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: String,
    pub line: usize,
}

pub fn extract_image_refs(content: &str) -> Vec<ImageRef> {
    let mut refs = Vec::new();
    for rec in content_lines(content) {
        let line = strip_inline_code(rec.text);
        let markdown = MD_IMAGE_RE
            .captures_iter(&line)
            .map(|caps| caps[1].split('#').next().unwrap_or("").trim().to_string());
        let html = HTML_SRC_RE
            .captures_iter(&line)
            .map(|caps| caps[1].trim().to_string());
        for path in markdown.chain(html) {
            if !path.is_empty() && !path.starts_with("http") && is_image_href(&path) {
                refs.push(ImageRef {
                    path,
                    line: rec.number,
                });
            }
        }
    }
    refs
}

pub fn missing_images(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        for image in extract_image_refs(content) {
            if !image_exists(&ctx.docs_dir, &ctx.assets_dir, file, &image.path) {
                issues.push(Issue::new(
                    file,
                    Some(image.line),
                    format!("Missing image: {}", image.path),
                ));
            }
        }
    })
}
