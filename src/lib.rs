//! Documentation-quality linting for markdown trees: links, navigation sync,
//! titles, images and frontmatter.

mod checks;
mod config;
mod discovery;
mod error;
mod hook;
mod links;
mod markdown;
mod output;
mod summary;
mod types;

pub mod images;
pub mod og;

pub use checks::{ALL_CHECKS, Check, select_checks};
pub use config::{CONFIG_FILENAME, LoadedConfig, load_config, parse_config};
pub use discovery::{LintContext, find_root};
pub use error::LintError;
pub use hook::install_pre_push_hook;
pub use output::{JsonReport, has_errors, print_check_list, render_json};
pub use types::{CheckResult, Config, Issue, OgConfig, Severity};

use anyhow::Result;
use std::path::Path;

/// How a lint run reports.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Run only this check id.
    pub only: Option<String>,
    pub json: bool,
}

fn config_result(problems: Vec<Issue>) -> CheckResult {
    CheckResult {
        check_id: "config".to_string(),
        name: "Configuration".to_string(),
        severity: Severity::Error,
        issues: problems,
        files_checked: 1,
    }
}

/// Run the selected checks under `root` and collect their results.
///
/// A configuration file that fails to parse does not abort the run; it shows
/// up as a leading `config` result and the defaults are used.
pub fn lint(root: &Path, only: Option<&str>) -> Result<(LintContext, Vec<CheckResult>)> {
    let LoadedConfig { config, problems } = load_config(root);
    let checks = select_checks(&config, only)?;
    let ctx = LintContext::new(root, config);

    let mut results = Vec::with_capacity(checks.len() + 1);
    if !problems.is_empty() {
        results.push(config_result(problems));
    }
    results.extend(checks::run_checks(&checks, &ctx));
    Ok((ctx, results))
}

/// Lint and print the report. Returns `true` when an error-severity check
/// found issues.
pub fn run(root: &Path, options: &LintOptions) -> Result<bool> {
    let (ctx, results) = lint(root, options.only.as_deref())?;

    if options.json {
        println!("{}", render_json(&results)?);
    } else {
        output::print_banner(
            &ctx.root.display().to_string(),
            &ctx.config.docs_dir,
            ctx.files.len(),
        );
        for result in &results {
            output::print_result(result);
        }
        output::print_summary(&results);
    }

    Ok(has_errors(&results))
}
