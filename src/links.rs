//! Link target resolution and the document link graph.

use crate::discovery::LintContext;
use crate::markdown::extract_links;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

static EXTERNAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?://|mailto:|ftp://|#)").unwrap());

static IMAGE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(png|jpg|jpeg|gif|svg|webp|bmp|tiff)$").unwrap());

/// Index document of a directory.
pub const INDEX_DOC: &str = "README.md";

/// Scheme-qualified, mail or same-page anchor targets.
pub fn is_external(href: &str) -> bool {
    EXTERNAL_RE.is_match(href)
}

pub fn is_image_href(href: &str) -> bool {
    IMAGE_EXT_RE.is_match(href)
}

/// Decode `%XX` escapes. Malformed input is returned unchanged.
pub fn percent_decode(input: &str) -> String {
    fn decode(input: &str) -> Option<String> {
        let bytes = input.as_bytes();
        let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
        let mut i = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'%' => {
                    let hi = (*bytes.get(i + 1)? as char).to_digit(16)? as u8;
                    let lo = (*bytes.get(i + 2)? as char).to_digit(16)? as u8;
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        String::from_utf8(out).ok()
    }
    decode(input).unwrap_or_else(|| input.to_string())
}

/// Lexically normalize a `/`-separated relative path.
///
/// `.` and empty segments are dropped, `..` pops a segment (or is kept when
/// nothing is left to pop) and a trailing separator is preserved.
pub fn normalize_rel(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            _ => parts.push(seg),
        }
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    let mut out = parts.join("/");
    if path.ends_with('/') {
        out.push('/');
    }
    out
}

/// Directory part of a docs-relative file path, empty for top-level files.
fn parent_dir(source: &str) -> &str {
    source.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve `target` against the directory of `source`, both docs-relative.
///
/// A leading `/` anchors the target at the docs root.
pub fn resolve_rel(source: &str, target: &str) -> String {
    if let Some(rooted) = target.strip_prefix('/') {
        return normalize_rel(rooted);
    }
    let dir = parent_dir(source);
    if dir.is_empty() {
        normalize_rel(target)
    } else {
        normalize_rel(&format!("{}/{}", dir, target))
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Whether a relative link from `source` reaches an existing file.
///
/// Tried in order: exact file, `.md` appended, directory index,
/// `name/` as `name.md` or `name/name.md`, then `%20` read as a space.
pub fn link_target_exists(docs_dir: &Path, source: &str, raw_href: &str) -> bool {
    if raw_href.is_empty() {
        return true;
    }

    let resolved = docs_dir.join(resolve_rel(source, &percent_decode(raw_href)));
    if resolved.is_file() {
        return true;
    }

    if !raw_href.ends_with(".md") && with_suffix(&resolved, ".md").is_file() {
        return true;
    }

    if resolved.join(INDEX_DOC).is_file() {
        return true;
    }

    if let Some(base) = raw_href.strip_suffix('/') {
        let base_md = resolve_rel(source, &percent_decode(&format!("{}.md", base)));
        if docs_dir.join(base_md).is_file() {
            return true;
        }
        let dir_name = base.rsplit('/').next().unwrap_or("");
        if !dir_name.is_empty() {
            let inner = resolve_rel(source, &percent_decode(&format!("{}/{}.md", base, dir_name)));
            if docs_dir.join(inner).is_file() {
                return true;
            }
        }
    }

    let resolved_str = resolved.to_string_lossy();
    if resolved_str.contains("%20") {
        let with_spaces = PathBuf::from(resolved_str.replace("%20", " "));
        if with_spaces.is_file() {
            return true;
        }
    }

    false
}

/// Whether an image reference resolves next to the document or, by file
/// name, inside the assets directory.
pub fn image_exists(docs_dir: &Path, assets_dir: &Path, source: &str, image_path: &str) -> bool {
    let decoded = percent_decode(image_path);

    let relative = docs_dir.join(resolve_rel(source, &decoded));
    if relative.is_file() {
        return true;
    }

    let filename = decoded.rsplit('/').next().unwrap_or(&decoded);
    if !filename.is_empty() && assets_dir.join(filename).is_file() {
        return true;
    }

    let spaced = docs_dir.join(resolve_rel(source, &image_path.replace("%20", " ")));
    spaced != relative && spaced.is_file()
}

/// Canonical docs-relative path of a link target, for graph edges.
///
/// Returns `None` for external, anchor-only and empty targets. A trailing
/// separator maps to the directory's index document.
pub fn normalize_link_target(source: &str, href: &str) -> Option<String> {
    let no_anchor = href.split('#').next().unwrap_or("");
    if no_anchor.is_empty() || is_external(no_anchor) {
        return None;
    }
    let mut resolved = resolve_rel(source, &percent_decode(no_anchor));
    if resolved.ends_with('/') {
        resolved.push_str(INDEX_DOC);
    }
    Some(resolved)
}

/// Incoming and outgoing internal links across the docs tree.
#[derive(Debug, Default)]
pub struct LinkGraph {
    /// Documents linked from some other document.
    incoming: HashSet<String>,
    outgoing: HashMap<String, usize>,
}

impl LinkGraph {
    /// One pass over every document's links.
    pub fn build(ctx: &LintContext) -> Self {
        let mut graph = LinkGraph::default();
        for file in &ctx.files {
            let Some(content) = ctx.read(file) else {
                continue;
            };
            for link in extract_links(&content) {
                if link.is_image || is_external(&link.href) || is_image_href(&link.href) {
                    continue;
                }
                let Some(target) = normalize_link_target(file, &link.href) else {
                    continue;
                };
                *graph.outgoing.entry(file.clone()).or_default() += 1;
                if !target.ends_with(".md") || &target == file {
                    continue;
                }
                graph.incoming.insert(target);
            }
        }
        log::debug!(
            "link graph: {} linked documents, {} linking documents",
            graph.incoming.len(),
            graph.outgoing.len()
        );
        graph
    }

    pub fn has_incoming(&self, doc: &str) -> bool {
        self.incoming.contains(doc)
    }

    pub fn has_outgoing(&self, doc: &str) -> bool {
        self.outgoing.get(doc).is_some_and(|n| *n > 0)
    }
}
