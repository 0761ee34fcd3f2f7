//! Per-document content checks: frontmatter, headings, placeholders, alt
//! text and absolute self-links.

use super::{Outcome, scan_docs};
use crate::discovery::LintContext;
use crate::markdown::{AltText, content_lines, extract_frontmatter, extract_img_tags, heading_level, is_h1};
use crate::types::Issue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static EMPTY_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{2,6}\s*$").unwrap());

static BROKEN_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]\(broken-reference").unwrap());

static EMPTY_MD_ALT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[\]\([^)]+\)").unwrap());

const DEFAULT_DOMAINS: &[&str] = &["docs.aidbox.app", "www.health-samurai.io/docs"];

/// Parser message without its position, which is relative to the block.
fn yaml_reason(e: &serde_yaml::Error) -> String {
    let text = e.to_string();
    match text.find(" at line ") {
        Some(i) => text[..i].to_string(),
        None => text,
    }
}

pub fn frontmatter_yaml(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        let Some(fm) = extract_frontmatter(content) else {
            return;
        };
        if fm.yaml.trim().is_empty() {
            return;
        }
        if let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(fm.yaml) {
            let line = e.location().map(|loc| loc.line() + fm.line_offset);
            issues.push(Issue::new(
                file,
                line,
                format!("Invalid YAML frontmatter: {}", yaml_reason(&e)),
            ));
        }
    })
}

pub fn h1_headers(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        let h1_lines: Vec<usize> = content_lines(content)
            .filter(|rec| is_h1(rec.text))
            .map(|rec| rec.number)
            .collect();
        if h1_lines.len() > 1 {
            issues.push(Issue::new(
                file,
                Some(h1_lines[1]),
                format!("Multiple H1 headers ({} found)", h1_lines.len()),
            ));
        }
    })
}

pub fn empty_headers(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        for rec in content_lines(content) {
            if EMPTY_HEADER_RE.is_match(rec.text) {
                issues.push(Issue::new(
                    file,
                    Some(rec.number),
                    format!("Empty header: {}", rec.text.trim()),
                ));
            }
        }
    })
}

pub fn broken_references(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        for rec in content_lines(content) {
            if BROKEN_REF_RE.is_match(rec.text) {
                issues.push(Issue::new(file, Some(rec.number), "Link points to broken-reference"));
            }
        }
    })
}

pub fn image_alt(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        for rec in content_lines(content) {
            if EMPTY_MD_ALT_RE.is_match(rec.text) {
                issues.push(Issue::new(file, Some(rec.number), "Markdown image without alt text"));
            }
        }
        for tag in extract_img_tags(content) {
            let message = match tag.alt() {
                AltText::Empty => "img tag with empty alt",
                AltText::Missing => "img tag without alt attribute",
                AltText::Present => continue,
            };
            issues.push(Issue::new(file, Some(tag.line), message));
        }
    })
}

#[derive(Debug, Deserialize)]
struct AbsoluteLinksSettings {
    #[serde(default)]
    domains: Option<Vec<String>>,
}

pub fn absolute_links(ctx: &LintContext) -> Outcome {
    let domains: Vec<String> = ctx
        .config
        .check_settings::<AbsoluteLinksSettings>("absolute-links")
        .and_then(|s| s.domains)
        .unwrap_or_else(|| DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect());

    let patterns: Vec<Regex> = domains
        .iter()
        .filter_map(|d| Regex::new(&format!("(?i)https?://{}", regex::escape(d))).ok())
        .collect();

    scan_docs(ctx, |file, content, issues| {
        for rec in content_lines(content) {
            if let Some(m) = patterns.iter().find_map(|p| p.find(rec.text)) {
                issues.push(
                    Issue::new(file, Some(rec.number), "Absolute link to documentation domain")
                        .with_detail(m.as_str()),
                );
            }
        }
    })
}

pub fn heading_order(ctx: &LintContext) -> Outcome {
    scan_docs(ctx, |file, content, issues| {
        let mut last_level = 0usize;
        for rec in content_lines(content) {
            let Some((level, _)) = heading_level(rec.text) else {
                continue;
            };
            // A bare marker line is an empty header, not a level.
            if !rec.text[level..].starts_with(char::is_whitespace) {
                continue;
            }
            if last_level > 0 && level > last_level + 1 {
                issues.push(Issue::new(
                    file,
                    Some(rec.number),
                    format!(
                        "Heading level skipped: h{} -> h{} (expected h{} or lower)",
                        last_level,
                        level,
                        last_level + 1
                    ),
                ));
            }
            last_level = level;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{context, context_with, write};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn lines(outcome: &Outcome) -> Vec<Option<usize>> {
        outcome.issues.iter().map(|i| i.line).collect()
    }

    // --- frontmatter-yaml ---

    #[test]
    fn frontmatter_valid_and_absent() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "---\ntitle: A\ntags: [x, y]\n---\n# A\n");
        write(tmp.path(), "docs/b.md", "# B\n");
        let outcome = frontmatter_yaml(&context(tmp.path()));
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.files_checked, 2);
    }

    #[test]
    fn frontmatter_invalid_reports_document_line() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "---\ntitle: A\nkey: value\n  bad: x\n---\n# A\n");
        let outcome = frontmatter_yaml(&context(tmp.path()));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].line, Some(4));
        let message = &outcome.issues[0].message;
        assert!(message.starts_with("Invalid YAML frontmatter: "), "{}", message);
        assert!(!message.contains(" at line "), "{}", message);
    }

    #[test]
    fn second_h1_reported() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# One\n\n## Sub\n\n```\n# code\n```\n# Two\n# Three\n");
        let outcome = h1_headers(&context(tmp.path()));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].line, Some(8));
        assert_eq!(outcome.issues[0].message, "Multiple H1 headers (3 found)");
    }

    #[test]
    fn single_h1_ok() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# One\n## Two\n### Three\n##```\n");
        assert!(h1_headers(&context(tmp.path())).issues.is_empty());
    }

    // --- empty-headers ---

    #[test]
    fn empty_headers_found() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# A\n##\n### Fine\n####   \n```\n##\n```\n");
        let outcome = empty_headers(&context(tmp.path()));
        assert_eq!(lines(&outcome), vec![Some(2), Some(4)]);
        assert_eq!(outcome.issues[0].message, "Empty header: ##");
    }

    // --- broken-references ---

    #[test]
    fn broken_reference_placeholder() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# A\nSee [this](broken-reference).\n[ok](b.md)\n");
        let outcome = broken_references(&context(tmp.path()));
        assert_eq!(lines(&outcome), vec![Some(2)]);
    }

    // --- image-alt ---

    #[test]
    fn image_alt_markdown_and_html() {
        let tmp = TempDir::new().unwrap();
        let content = "\
# A
![](a.png)
![Described](b.png)
<img src=\"c.png\">
<img src=\"d.png\" alt=\"\">
<img
  src=\"e.png\"
>
<img src=\"f.png\" alt=\"F\">
Inline `<img src=\"g.png\">` example.
";
        write(tmp.path(), "docs/a.md", content);
        let outcome = image_alt(&context(tmp.path()));
        let got: Vec<(Option<usize>, &str)> = outcome
            .issues
            .iter()
            .map(|i| (i.line, i.message.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Some(2), "Markdown image without alt text"),
                (Some(4), "img tag without alt attribute"),
                (Some(5), "img tag with empty alt"),
                (Some(6), "img tag without alt attribute"),
            ]
        );
    }

    // --- absolute-links ---

    #[test]
    fn absolute_links_default_domains() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "docs/a.md",
            "# A\n[x](https://docs.aidbox.app/setup)\n[y](https://example.com)\n[z](HTTP://www.health-samurai.io/docs/a)\n",
        );
        let outcome = absolute_links(&context(tmp.path()));
        assert_eq!(lines(&outcome), vec![Some(2), Some(4)]);
        assert_eq!(outcome.issues[0].detail.as_deref(), Some("https://docs.aidbox.app"));
    }

    #[test]
    fn absolute_links_configured_domains() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "[x](https://docs.aidbox.app/a)\n[y](https://docs.acme.dev/b)\n");
        let ctx = context_with(tmp.path(), "checks:\n  absolute-links:\n    domains: [docs.acme.dev]\n");
        let outcome = absolute_links(&ctx);
        assert_eq!(lines(&outcome), vec![Some(2)]);
    }

    // --- heading-order ---

    #[test]
    fn heading_level_skips() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# A\n### Skipped\n## Back\n### Fine\n##### Skipped again\n# Top\n");
        let outcome = heading_order(&context(tmp.path()));
        assert_eq!(lines(&outcome), vec![Some(2), Some(5)]);
        assert_eq!(
            outcome.issues[0].message,
            "Heading level skipped: h1 -> h3 (expected h2 or lower)"
        );
    }

    #[test]
    fn bare_heading_marker_is_not_a_level() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# A\n###\n## B\n");
        assert!(heading_order(&context(tmp.path())).issues.is_empty());
    }
}
