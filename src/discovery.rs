//! Project discovery: find the project root, the markdown files, and build
//! the shared context every check runs against.

use crate::config::CONFIG_FILENAME;
use crate::links::LinkGraph;
use crate::types::Config;
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Find the project root by walking up from `start`.
///
/// - Pass 1: nearest directory holding `docs-lint.yaml`
/// - Pass 2: nearest directory holding `.git`
/// - Pass 3: fall back to `start`
pub fn find_root(start: &Path) -> PathBuf {
    for marker in [CONFIG_FILENAME, ".git"] {
        let mut dir = start;
        loop {
            if dir.join(marker).exists() {
                return dir.to_path_buf();
            }
            match dir.parent() {
                Some(p) if p != dir => dir = p,
                _ => break,
            }
        }
    }

    log::warn!("no project root marker found, using {}", start.display());
    start.to_path_buf()
}

/// All markdown files under `docs_dir`, relative to it with `/` separators.
///
/// Files with any path segment named in `exclude` are skipped, as are
/// dot-files and dot-directories. Sorted.
pub fn find_markdown_files(docs_dir: &Path, exclude: &[String]) -> Vec<String> {
    let pattern = format!(
        "{}/**/*.md",
        glob::Pattern::escape(&docs_dir.to_string_lossy())
    );
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };

    let entries = match glob::glob_with(&pattern, options) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("invalid docs path {}: {}", docs_dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<String> = entries
        .flatten()
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let rel = path.strip_prefix(docs_dir).ok()?;
            Some(rel.to_string_lossy().replace('\\', "/"))
        })
        .filter(|rel| !rel.split('/').any(|seg| exclude.iter().any(|ex| ex == seg)))
        .collect();
    files.sort();
    files
}

/// Read-only state shared by every check in one run.
#[derive(Debug)]
pub struct LintContext {
    pub root: PathBuf,
    pub docs_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub summary_path: PathBuf,
    pub redirects_path: PathBuf,
    pub config: Config,
    /// Markdown files relative to `docs_dir`.
    pub files: Vec<String>,
    contents: HashMap<String, OnceCell<Option<String>>>,
    graph: OnceCell<LinkGraph>,
}

impl LintContext {
    pub fn new(root: &Path, config: Config) -> Self {
        let docs_dir = root.join(&config.docs_dir);
        let assets_dir = root.join(&config.assets_dir);
        let mut summary_path = docs_dir.join(&config.summary);
        if !summary_path.is_file() {
            summary_path = root.join(&config.summary);
        }
        let redirects_path = root.join(&config.redirects);
        let files = find_markdown_files(&docs_dir, &config.exclude);
        log::debug!("{} markdown files under {}", files.len(), docs_dir.display());

        let contents = files
            .iter()
            .map(|f| (f.clone(), OnceCell::new()))
            .collect();

        Self {
            root: root.to_path_buf(),
            docs_dir,
            assets_dir,
            summary_path,
            redirects_path,
            config,
            files,
            contents,
            graph: OnceCell::new(),
        }
    }

    /// Absolute path of a docs-relative document.
    pub fn doc_path(&self, rel: &str) -> PathBuf {
        self.docs_dir.join(rel.trim_start_matches('/'))
    }

    /// Document text, or `None` if it cannot be read.
    ///
    /// Enumerated documents are read once and cached for the run; any other
    /// path is read on demand.
    pub fn read(&self, rel: &str) -> Option<Cow<'_, str>> {
        match self.contents.get(rel) {
            Some(cell) => cell
                .get_or_init(|| read_optional(&self.doc_path(rel)))
                .as_deref()
                .map(Cow::Borrowed),
            None => read_optional(&self.doc_path(rel)).map(Cow::Owned),
        }
    }

    /// The link graph, built on first use.
    pub fn link_graph(&self) -> &LinkGraph {
        self.graph.get_or_init(|| LinkGraph::build(self))
    }

    /// Whether `rel` names the navigation document.
    pub fn is_summary(&self, rel: &str) -> bool {
        rel == self.config.summary
    }
}

/// Read a file, treating any failure as absent.
pub fn read_optional(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::debug!("skipping {}: {}", path.display(), e);
            None
        }
    }
}
