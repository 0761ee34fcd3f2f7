//! Markdown scanning: fence-aware line walking and structural extraction.
//!
//! Nothing here parses markdown fully. Each helper is a line-oriented scan
//! that skips fenced code blocks so examples in code never produce issues.

use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";

static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(.+)$").unwrap());

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)]+)\)").unwrap());

static FRONTMATTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---").unwrap());

static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());

static IMG_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

static EMPTY_ALT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\balt\s*=\s*["']\s*["']"#).unwrap());

static ALT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\balt\s*=").unwrap());

/// One physical line of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub text: &'a str,
    /// 1-based.
    pub number: usize,
    /// Fence state after this line; an opening fence line is already inside.
    pub in_fence: bool,
}

impl LineRecord<'_> {
    pub fn is_fence_marker(&self) -> bool {
        self.text.trim_start().starts_with(FENCE)
    }
}

/// Walk every line, tracking fenced code block state.
///
/// The iterator borrows `content` and is cheap to recreate, so callers that
/// need a second pass simply call this again.
pub fn walk_lines(content: &str) -> impl Iterator<Item = LineRecord<'_>> {
    let mut in_fence = false;
    content.split('\n').enumerate().map(move |(i, text)| {
        if text.trim_start().starts_with(FENCE) {
            in_fence = !in_fence;
        }
        LineRecord {
            text,
            number: i + 1,
            in_fence,
        }
    })
}

/// Lines outside fenced code blocks, fence markers themselves excluded.
pub fn content_lines(content: &str) -> impl Iterator<Item = LineRecord<'_>> {
    walk_lines(content).filter(|rec| !rec.in_fence && !rec.is_fence_marker())
}

/// A leading `---` block and the offset that maps its lines to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    pub yaml: &'a str,
    /// Add to a 1-based frontmatter line to get the 1-based document line.
    pub line_offset: usize,
}

pub fn extract_frontmatter(content: &str) -> Option<Frontmatter<'_>> {
    if !content.starts_with("---") {
        return None;
    }
    let caps = FRONTMATTER_RE.captures(content)?;
    let yaml = caps.get(1)?.as_str();
    Some(Frontmatter { yaml, line_offset: 1 })
}

/// Return the heading level (1–6) and title text for a markdown heading line.
pub fn heading_level(line: &str) -> Option<(usize, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some((hashes, rest.trim()))
    } else {
        None
    }
}

/// True for a level-1 heading line: exactly one `#` then whitespace.
pub fn is_h1(line: &str) -> bool {
    !line.starts_with("##") && H1_RE.is_match(line)
}

/// The first top-level heading outside code fences.
pub fn extract_h1(content: &str) -> Option<String> {
    content_lines(content).find_map(|rec| {
        if rec.text.starts_with("##") {
            return None;
        }
        H1_RE
            .captures(rec.text)
            .map(|caps| caps[1].trim().to_string())
    })
}

/// A markdown link or image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    /// Target with any `#fragment` removed; empty for same-page anchors.
    pub href: String,
    pub line: usize,
    pub is_image: bool,
}

/// Extract `[text](href)` and `![alt](src)` references outside code fences.
pub fn extract_links(content: &str) -> Vec<Link> {
    let mut links = Vec::new();
    for rec in content_lines(content) {
        for caps in LINK_RE.captures_iter(rec.text) {
            let href = caps[3].split('#').next().unwrap_or("").to_string();
            links.push(Link {
                text: caps[2].to_string(),
                href,
                line: rec.number,
                is_image: &caps[1] == "!",
            });
        }
    }
    links
}

/// Remove single-backtick code spans from a line.
pub fn strip_inline_code(line: &str) -> std::borrow::Cow<'_, str> {
    INLINE_CODE_RE.replace_all(line, "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltText {
    Missing,
    Empty,
    Present,
}

/// An HTML `<img>` tag, possibly spanning several source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImgTag {
    pub tag: String,
    /// Line of the opening `<img`.
    pub line: usize,
}

impl ImgTag {
    pub fn alt(&self) -> AltText {
        if EMPTY_ALT_RE.is_match(&self.tag) {
            AltText::Empty
        } else if ALT_RE.is_match(&self.tag) {
            AltText::Present
        } else {
            AltText::Missing
        }
    }
}

/// Extract `<img>` tags outside fences and inline code spans.
pub fn extract_img_tags(content: &str) -> Vec<ImgTag> {
    let mut numbers = Vec::new();
    let mut stripped = Vec::new();
    for rec in content_lines(content) {
        numbers.push(rec.number);
        stripped.push(strip_inline_code(rec.text));
    }
    let joined = stripped.join("\n");

    IMG_TAG_RE
        .find_iter(&joined)
        .map(|m| {
            let idx = joined[..m.start()].matches('\n').count();
            ImgTag {
                tag: m.as_str().to_string(),
                line: numbers.get(idx).copied().unwrap_or(1),
            }
        })
        .collect()
}
