//! Social preview cards for navigation pages.

use crate::discovery::LintContext;
use crate::markdown::{extract_frontmatter, extract_h1};
use crate::summary::parse_summary;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_BRAND: &str = "Docs";
pub const DEFAULT_COLOR: &str = "#D95640";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 630;
const TITLE_LIMIT: usize = 80;
const TITLE_LINE_CHARS: usize = 32;
const DESCRIPTION_LIMIT: usize = 120;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub dry_run: bool,
    /// Only pages touched by the last commit.
    pub diff_only: bool,
}

/// `guide/setup.md` -> `guide-setup`, `guide/README.md` -> `guide-index`.
pub fn page_slug(path: &str) -> String {
    let stem = path.strip_suffix(".md").unwrap_or(path).replace('/', "-");
    match stem.strip_suffix("README") {
        Some(prefix) => format!("{}index", prefix),
        None => stem,
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit - 3).collect();
    format!("{}...", kept)
}

pub fn card_title(title: &str) -> String {
    truncate(title, TITLE_LIMIT)
}

/// The configured color when it is a valid hex triplet, else the default.
pub fn brand_color(color: Option<&str>) -> &str {
    match color {
        Some(c) if HEX_COLOR_RE.is_match(c) => c,
        Some(c) => {
            log::warn!("invalid og.color {:?}, using {}", c, DEFAULT_COLOR);
            DEFAULT_COLOR
        }
        None => DEFAULT_COLOR,
    }
}

/// Markdown files changed since `HEAD~1`. Empty when git is unavailable or fails.
pub fn changed_files(root: &Path) -> HashSet<String> {
    let output = Command::new("git")
        .args(["diff", "--name-only", "HEAD~1"])
        .current_dir(root)
        .output();
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .filter(|f| f.ends_with(".md"))
            .map(String::from)
            .collect(),
        Ok(out) => {
            log::debug!("git diff exited with {}", out.status);
            HashSet::new()
        }
        Err(e) => {
            log::debug!("git unavailable: {}", e);
            HashSet::new()
        }
    }
}

fn description(content: &str) -> Option<String> {
    let fm = extract_frontmatter(content)?;
    let data: serde_yaml::Value = serde_yaml::from_str(fm.yaml).ok()?;
    data.get("description")?.as_str().map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub brand: String,
    pub color: String,
    pub logo: Option<String>,
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Greedy word wrap on character count.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Render a 1200x630 SVG card.
pub fn render_svg(card: &Card) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##);
    let _ = writeln!(svg, r#"  <rect x="80" y="60" width="8" height="40" rx="4" fill="{}"/>"#, card.color);
    let _ = writeln!(
        svg,
        r##"  <text x="104" y="90" font-family="Inter, sans-serif" font-size="28" font-weight="600" fill="#666666">{}</text>"##,
        escape_xml(&card.brand)
    );
    if let Some(logo) = &card.logo {
        let _ = writeln!(
            svg,
            r#"  <image href="{}" x="1040" y="50" width="80" height="60" preserveAspectRatio="xMaxYMid meet"/>"#,
            escape_xml(logo)
        );
    }

    let _ = writeln!(
        svg,
        r##"  <text x="80" y="260" font-family="Inter, sans-serif" font-size="60" font-weight="700" fill="#1a1a1a">"##
    );
    for (i, line) in wrap(&card.title, TITLE_LINE_CHARS).iter().enumerate() {
        let dy = if i == 0 { 0 } else { 72 };
        let _ = writeln!(svg, r#"    <tspan x="80" dy="{}">{}</tspan>"#, dy, escape_xml(line));
    }
    let _ = writeln!(svg, "  </text>");

    if let Some(desc) = &card.description {
        let _ = writeln!(
            svg,
            r##"  <text x="80" y="500" font-family="Inter, sans-serif" font-size="28" fill="#666666">{}</text>"##,
            escape_xml(&truncate(desc, DESCRIPTION_LIMIT))
        );
    }
    let _ = writeln!(
        svg,
        r#"  <rect x="0" y="{}" width="{}" height="8" fill="{}"/>"#,
        HEIGHT - 8,
        WIDTH,
        card.color
    );
    svg.push_str("</svg>\n");
    svg
}

/// Write a card for each navigation page. Returns the number of cards
/// written (or planned, in a dry run).
pub fn generate(ctx: &LintContext, options: &GenerateOptions) -> Result<usize> {
    let og = ctx.config.og.clone().unwrap_or_default();
    let brand = og.brand.unwrap_or_else(|| DEFAULT_BRAND.to_string());
    let color = brand_color(og.color.as_deref()).to_string();
    let out_dir = ctx.assets_dir.join("og");

    let entries = parse_summary(&ctx.summary_path);
    if entries.is_empty() {
        println!("No {} entries found", ctx.config.summary);
        return Ok(0);
    }

    let mut pages: Vec<_> = entries.iter().filter(|e| e.is_markdown()).collect();
    if options.diff_only {
        let changed = changed_files(&ctx.root);
        pages.retain(|e| {
            let under_root = format!("{}/{}", ctx.config.docs_dir.trim_end_matches('/'), e.path);
            changed.contains(&under_root) || changed.contains(&e.path)
        });
        if pages.is_empty() {
            println!("No changed docs since last commit");
            return Ok(0);
        }
    }

    println!("Generating OG images for {} pages\n", pages.len());
    if !options.dry_run {
        std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    }

    let mut generated = 0;
    for entry in pages {
        let slug = page_slug(&entry.path);
        let out_path: PathBuf = out_dir.join(format!("{}.svg", slug));

        let content = ctx.read(&entry.path);
        let title = content
            .as_deref()
            .and_then(extract_h1)
            .unwrap_or_else(|| entry.title.clone());
        let card = Card {
            title: card_title(&title),
            description: content.as_deref().and_then(description),
            brand: brand.clone(),
            color: color.clone(),
            logo: og.logo.clone(),
        };

        if options.dry_run {
            println!("  Would generate: {}", out_path.display());
            println!("    Title: {}", card.title);
            generated += 1;
            continue;
        }

        match std::fs::write(&out_path, render_svg(&card)) {
            Ok(()) => {
                println!("  {}.svg ({})", slug, card.title);
                generated += 1;
            }
            Err(e) => eprintln!("  Error generating {}: {}", slug, e),
        }
    }

    println!(
        "\nDone: {} OG image(s) {}generated",
        generated,
        if options.dry_run { "would be " } else { "" }
    );
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{context, context_with, write};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn slugs() {
        assert_eq!(page_slug("getting-started/run-locally.md"), "getting-started-run-locally");
        assert_eq!(page_slug("README.md"), "index");
        assert_eq!(page_slug("guide/README.md"), "guide-index");
        assert_eq!(page_slug("intro.md"), "intro");
    }

    #[test]
    fn long_titles_truncated() {
        let long = "x".repeat(100);
        let title = card_title(&long);
        assert_eq!(title.chars().count(), 80);
        assert!(title.ends_with("..."));
        assert_eq!(card_title("Short"), "Short");
        assert_eq!(card_title(&"y".repeat(80)), "y".repeat(80));
    }

    #[test]
    fn colors_validated() {
        assert_eq!(brand_color(Some("#0af")), "#0af");
        assert_eq!(brand_color(Some("#00AAFF")), "#00AAFF");
        assert_eq!(brand_color(Some("red")), DEFAULT_COLOR);
        assert_eq!(brand_color(None), DEFAULT_COLOR);
    }

    #[test]
    fn svg_escapes_text() {
        let card = Card {
            title: "Auth <and> \"Access\"".into(),
            description: Some("Tokens & keys".into()),
            brand: "Acme".into(),
            color: "#123456".into(),
            logo: None,
        };
        let svg = render_svg(&card);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="1200" height="630""#));
        assert!(svg.contains("Auth &lt;and&gt; &quot;Access&quot;"));
        assert!(svg.contains("Tokens &amp; keys"));
        assert!(svg.contains("#123456"));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn title_wraps_on_words() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("", 10), Vec::<String>::new());
    }

    #[test]
    fn git_failure_yields_no_changes() {
        assert!(changed_files(Path::new("/nonexistent/docs-lint-root")).is_empty());
    }

    #[test]
    fn generates_cards_for_navigation_pages() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "docs/SUMMARY.md",
            "* [Home](README.md)\n* [Setup Guide](guide/setup.md)\n* [Site](https://example.com)\n",
        );
        write(root, "docs/README.md", "---\ndescription: Start here\n---\n# Welcome\n");
        write(root, "docs/guide/setup.md", "no heading\n");

        let ctx = context_with(root, "og:\n  brand: Acme\n  color: nope\n");
        let n = generate(&ctx, &GenerateOptions::default()).unwrap();
        assert_eq!(n, 2);

        let index = fs::read_to_string(root.join("assets/og/index.svg")).unwrap();
        assert!(index.contains("Welcome"));
        assert!(index.contains("Start here"));
        assert!(index.contains("Acme"));
        assert!(index.contains(DEFAULT_COLOR));

        let setup = fs::read_to_string(root.join("assets/og/guide-setup.svg")).unwrap();
        assert!(setup.contains("Setup Guide"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "docs/SUMMARY.md", "* [A](a.md)\n");
        write(root, "docs/a.md", "# A\n");

        let options = GenerateOptions { dry_run: true, ..Default::default() };
        assert_eq!(generate(&context(root), &options).unwrap(), 1);
        assert!(!root.join("assets/og").exists());
    }
}
