//! Console and JSON reporting.

use crate::checks::ALL_CHECKS;
use crate::types::{CheckResult, Severity};
use colored::Colorize;
use serde::Serialize;

/// Issues listed per check before the rest are summarized.
const ISSUE_LIMIT: usize = 10;

/// Machine-readable report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub results: &'a [CheckResult],
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl<'a> JsonReport<'a> {
    pub fn new(results: &'a [CheckResult]) -> Self {
        Self {
            results,
            total_errors: count_with_issues(results, Severity::Error),
            total_warnings: count_with_issues(results, Severity::Warning),
        }
    }
}

/// Number of checks of `severity` that found anything.
fn count_with_issues(results: &[CheckResult], severity: Severity) -> usize {
    results
        .iter()
        .filter(|r| r.severity == severity && !r.issues.is_empty())
        .count()
}

/// True when any error-severity check found issues.
pub fn has_errors(results: &[CheckResult]) -> bool {
    results.iter().any(CheckResult::is_failure)
}

pub fn render_json(results: &[CheckResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(results))
}

pub fn print_banner(root: &str, docs_dir: &str, file_count: usize) {
    println!("{}", "=== docs-lint ===".bold());
    println!("Root: {}", root);
    println!("Docs: {}/ ({} files)", docs_dir, file_count);
}

pub fn print_result(result: &CheckResult) {
    println!("\n{} {}", "[check]".dimmed(), result.name.bold());

    if result.issues.is_empty() {
        println!(
            "        {} {} files checked, no issues",
            "\u{2713}".green(),
            result.files_checked
        );
        return;
    }

    let marker = match result.severity {
        Severity::Warning => "\u{26a0}".yellow(),
        Severity::Error => "\u{2717}".red(),
    };
    println!(
        "        {} Found {} {}(s):",
        marker,
        result.issues.len(),
        result.severity.as_str()
    );

    for issue in result.issues.iter().take(ISSUE_LIMIT) {
        println!("          {} {}: {}", "-".dimmed(), issue.location(), issue.message);
        if let Some(detail) = &issue.detail {
            println!("            {}", detail.dimmed());
        }
    }
    if result.issues.len() > ISSUE_LIMIT {
        println!(
            "          {} ... and {} more",
            "-".dimmed(),
            result.issues.len() - ISSUE_LIMIT
        );
    }
}

pub fn print_summary(results: &[CheckResult]) {
    let passed = results.iter().filter(|r| r.issues.is_empty()).count();
    let warnings = count_with_issues(results, Severity::Warning);
    let errors = count_with_issues(results, Severity::Error);

    println!("\n{}", "=== Summary ===".bold());
    if passed > 0 {
        println!("{} {} check(s) passed", "\u{2713}".green(), passed);
    }
    if warnings > 0 {
        println!("{} {} warning(s)", "\u{26a0}".yellow(), warnings);
    }
    if errors > 0 {
        println!("{} {} check(s) failed", "\u{2717}".red(), errors);
    }
}

pub fn print_check_list() {
    println!("Available checks:\n");
    for check in ALL_CHECKS {
        let sev = match check.default_severity() {
            Severity::Warning => "(warning)",
            Severity::Error => "",
        };
        println!("  {:<24} {} {}", check.id(), check.name(), sev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Issue;
    use pretty_assertions::assert_eq;

    fn result(id: &str, severity: Severity, issues: usize) -> CheckResult {
        CheckResult {
            check_id: id.to_string(),
            name: id.to_string(),
            severity,
            issues: (0..issues)
                .map(|i| Issue::new("a.md", Some(i + 1), "problem"))
                .collect(),
            files_checked: 3,
        }
    }

    #[test]
    fn totals_count_checks_not_issues() {
        let results = vec![
            result("broken-links", Severity::Error, 4),
            result("h1-headers", Severity::Error, 0),
            result("orphan-pages", Severity::Warning, 2),
        ];
        let report = JsonReport::new(&results);
        assert_eq!(report.total_errors, 1);
        assert_eq!(report.total_warnings, 1);
        assert!(has_errors(&results));
        assert!(!has_errors(&results[1..]));
    }

    #[test]
    fn json_shape() {
        let mut results = vec![result("broken-links", Severity::Error, 1)];
        results[0].issues[0].detail = Some("more".to_string());
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "results": [{
                    "checkId": "broken-links",
                    "name": "broken-links",
                    "severity": "error",
                    "issues": [{"file": "a.md", "line": 1, "message": "problem", "detail": "more"}],
                    "filesChecked": 3
                }],
                "totalErrors": 1,
                "totalWarnings": 0
            })
        );
    }
}
