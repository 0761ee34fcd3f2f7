//! The check registry and executor.
//!
//! Every check is a variant of [`Check`]; the registry is the fixed,
//! ordered [`ALL_CHECKS`] list. Checks are independent: each reads the shared
//! [`LintContext`] and returns its own issues.

mod content;
mod graph;
mod navigation;
mod references;

use crate::discovery::LintContext;
use crate::error::LintError;
use crate::types::{CheckResult, Config, Issue, Severity};

/// What a single check produced before severity is applied.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub issues: Vec<Issue>,
    pub files_checked: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    FrontmatterYaml,
    H1Headers,
    EmptyHeaders,
    BrokenReferences,
    ImageAlt,
    DeprecatedLinks,
    AbsoluteLinks,
    AmpersandSummary,
    SummarySync,
    TitleMismatch,
    Redirects,
    BrokenLinks,
    MissingImages,
    OrphanPages,
    DeadEndPages,
    HeadingOrder,
}

/// Registration order, which is also report order.
pub const ALL_CHECKS: &[Check] = &[
    Check::FrontmatterYaml,
    Check::H1Headers,
    Check::EmptyHeaders,
    Check::BrokenReferences,
    Check::ImageAlt,
    Check::DeprecatedLinks,
    Check::AbsoluteLinks,
    Check::AmpersandSummary,
    Check::SummarySync,
    Check::TitleMismatch,
    Check::Redirects,
    Check::BrokenLinks,
    Check::MissingImages,
    Check::OrphanPages,
    Check::DeadEndPages,
    Check::HeadingOrder,
];

impl Check {
    pub fn id(self) -> &'static str {
        match self {
            Check::FrontmatterYaml => "frontmatter-yaml",
            Check::H1Headers => "h1-headers",
            Check::EmptyHeaders => "empty-headers",
            Check::BrokenReferences => "broken-references",
            Check::ImageAlt => "image-alt",
            Check::DeprecatedLinks => "deprecated-links",
            Check::AbsoluteLinks => "absolute-links",
            Check::AmpersandSummary => "ampersand-summary",
            Check::SummarySync => "summary-sync",
            Check::TitleMismatch => "title-mismatch",
            Check::Redirects => "redirects",
            Check::BrokenLinks => "broken-links",
            Check::MissingImages => "missing-images",
            Check::OrphanPages => "orphan-pages",
            Check::DeadEndPages => "dead-end-pages",
            Check::HeadingOrder => "heading-order",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Check::FrontmatterYaml => "Frontmatter YAML",
            Check::H1Headers => "H1 Headers",
            Check::EmptyHeaders => "Empty Headers",
            Check::BrokenReferences => "Broken References",
            Check::ImageAlt => "Image Alt Text",
            Check::DeprecatedLinks => "Deprecated Links",
            Check::AbsoluteLinks => "Absolute Links",
            Check::AmpersandSummary => "Ampersand in Summary",
            Check::SummarySync => "Summary vs Files",
            Check::TitleMismatch => "Title Mismatch",
            Check::Redirects => "Redirects",
            Check::BrokenLinks => "Broken Links",
            Check::MissingImages => "Missing Images",
            Check::OrphanPages => "Orphan Pages",
            Check::DeadEndPages => "Dead-end Pages",
            Check::HeadingOrder => "Heading Order",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            Check::ImageAlt | Check::OrphanPages | Check::DeadEndPages | Check::HeadingOrder => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn from_id(id: &str) -> Option<Check> {
        ALL_CHECKS.iter().copied().find(|c| c.id() == id)
    }

    /// Severity after configuration. `warn_only` can only downgrade.
    pub fn effective_severity(self, config: &Config) -> Severity {
        if config.is_warn_only(self.id()) {
            Severity::Warning
        } else {
            self.default_severity()
        }
    }

    pub fn run(self, ctx: &LintContext) -> Outcome {
        match self {
            Check::FrontmatterYaml => content::frontmatter_yaml(ctx),
            Check::H1Headers => content::h1_headers(ctx),
            Check::EmptyHeaders => content::empty_headers(ctx),
            Check::BrokenReferences => content::broken_references(ctx),
            Check::ImageAlt => content::image_alt(ctx),
            Check::DeprecatedLinks => references::deprecated_links(ctx),
            Check::AbsoluteLinks => content::absolute_links(ctx),
            Check::AmpersandSummary => navigation::ampersand_summary(ctx),
            Check::SummarySync => navigation::summary_sync(ctx),
            Check::TitleMismatch => navigation::title_mismatch(ctx),
            Check::Redirects => navigation::redirects(ctx),
            Check::BrokenLinks => references::broken_links(ctx),
            Check::MissingImages => references::missing_images(ctx),
            Check::OrphanPages => graph::orphan_pages(ctx),
            Check::DeadEndPages => graph::dead_end_pages(ctx),
            Check::HeadingOrder => content::heading_order(ctx),
        }
    }
}

/// Checks to run: enabled ones, optionally narrowed to a single id.
pub fn select_checks(config: &Config, only: Option<&str>) -> Result<Vec<Check>, LintError> {
    if let Some(id) = only {
        let check = Check::from_id(id).ok_or_else(|| LintError::UnknownCheck(id.to_string()))?;
        if config.is_disabled(id) {
            log::warn!("check {} is disabled in configuration", id);
            return Ok(Vec::new());
        }
        return Ok(vec![check]);
    }
    Ok(ALL_CHECKS
        .iter()
        .copied()
        .filter(|c| !config.is_disabled(c.id()))
        .collect())
}

/// Run checks in order, one result per check.
pub fn run_checks(checks: &[Check], ctx: &LintContext) -> Vec<CheckResult> {
    checks
        .iter()
        .map(|check| {
            log::debug!("running {}", check.id());
            let outcome = check.run(ctx);
            CheckResult {
                check_id: check.id().to_string(),
                name: check.name().to_string(),
                severity: check.effective_severity(&ctx.config),
                issues: outcome.issues,
                files_checked: outcome.files_checked,
            }
        })
        .collect()
}

/// Apply `f` to every readable document; unreadable ones are skipped.
fn scan_docs(ctx: &LintContext, mut f: impl FnMut(&str, &str, &mut Vec<Issue>)) -> Outcome {
    let mut issues = Vec::new();
    for file in &ctx.files {
        let Some(content) = ctx.read(file) else {
            continue;
        };
        f(file.as_str(), content.as_ref(), &mut issues);
    }
    Outcome {
        issues,
        files_checked: ctx.files.len(),
    }
}
