//! Output formatting for review results.
//!
//! Supports:
//! - Report files: `review_report.json`, `review_report.html`, `review_report.md`
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output on stdout for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::issue::{Issue, Severity};
use crate::metrics::Metrics;

pub const JSON_REPORT: &str = "review_report.json";
pub const HTML_REPORT: &str = "review_report.html";
pub const MARKDOWN_REPORT: &str = "review_report.md";

// =============================================================================
// Report model
// =============================================================================

/// Complete result of a review run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub summary: Summary,
    pub issues: Vec<Issue>,
    pub metrics: MetricsComparison,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsComparison {
    pub before: Metrics,
    pub after: Metrics,
}

/// Aggregate counts over all issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_issues: usize,
    pub issues_by_type: BTreeMap<String, usize>,
    pub issues_by_severity: BTreeMap<String, usize>,
    /// Distinct files with at least one issue.
    pub files_processed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_metrics: Option<ImprovementMetrics>,
}

/// Deltas between the before and after snapshots. Negative means regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementMetrics {
    pub complexity_reduction: i64,
    pub security_fixes: i64,
    pub performance_improvements: i64,
}

impl Summary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut issues_by_type = BTreeMap::new();
        let mut issues_by_severity = BTreeMap::new();

        for issue in issues {
            *issues_by_type
                .entry(issue.issue_type.to_string())
                .or_insert(0) += 1;
            *issues_by_severity
                .entry(issue.severity.to_string())
                .or_insert(0) += 1;
        }

        let files: HashSet<&str> = issues.iter().map(|i| i.file_path.as_str()).collect();

        Self {
            total_issues: issues.len(),
            issues_by_type,
            issues_by_severity,
            files_processed: files.len(),
            improvement_metrics: None,
        }
    }
}

impl ImprovementMetrics {
    pub fn between(before: &Metrics, after: &Metrics) -> Self {
        Self {
            complexity_reduction: before.cyclomatic_complexity as i64
                - after.cyclomatic_complexity as i64,
            security_fixes: before.security_issues as i64 - after.security_issues as i64,
            performance_improvements: before.performance_issues as i64
                - after.performance_issues as i64,
        }
    }
}

impl ReviewReport {
    pub fn new(issues: Vec<Issue>, before: Metrics, after: Metrics) -> Self {
        let mut summary = Summary::from_issues(&issues);
        summary.improvement_metrics = Some(ImprovementMetrics::between(&before, &after));

        Self {
            summary,
            issues,
            metrics: MetricsComparison { before, after },
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }

    fn improvement(&self) -> ImprovementMetrics {
        self.summary
            .improvement_metrics
            .clone()
            .unwrap_or_else(|| ImprovementMetrics::between(&self.metrics.before, &self.metrics.after))
    }
}

/// Write the JSON, HTML and Markdown reports into `dir`.
pub fn write_reports(report: &ReviewReport, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let json_path = dir.join(JSON_REPORT);
    fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

    let html_path = dir.join(HTML_REPORT);
    fs::write(&html_path, render_html(report))?;

    let md_path = dir.join(MARKDOWN_REPORT);
    fs::write(&md_path, render_markdown(report))?;

    tracing::info!(
        json = %json_path.display(),
        html = %html_path.display(),
        markdown = %md_path.display(),
        "reports generated"
    );

    Ok(vec![json_path, html_path, md_path])
}

// =============================================================================
// HTML Format
// =============================================================================

const HTML_STYLE: &str = r#"        body { font-family: Arial, sans-serif; margin: 20px; }
        .header { background-color: #f0f0f0; padding: 20px; }
        .summary { margin: 20px 0; }
        .issue { border: 1px solid #ddd; margin: 10px 0; padding: 15px; }
        .high { border-left: 5px solid #ff0000; }
        .medium { border-left: 5px solid #ff9900; }
        .low { border-left: 5px solid #00aa00; }
        .metrics { display: flex; gap: 20px; }
        .metric-box { border: 1px solid #ccc; padding: 15px; flex: 1; }
"#;

/// Render the HTML report.
pub fn render_html(report: &ReviewReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <title>Code Review Report</title>\n");
    html.push_str("    <style>\n");
    html.push_str(HTML_STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");

    let _ = writeln!(
        html,
        "    <div class=\"header\">\n        <h1>Code Review Report</h1>\n        <p>Generated: {}</p>\n    </div>",
        escape_html(&report.generated_at)
    );

    let _ = writeln!(
        html,
        "    <div class=\"summary\">\n        <h2>Summary</h2>\n        <p>Total Issues Found: {}</p>\n        <p>Files Processed: {}</p>\n    </div>",
        report.summary.total_issues, report.summary.files_processed
    );

    html.push_str("    <div class=\"metrics\">\n");
    write_metric_box(&mut html, "Before Review", &report.metrics.before);
    write_metric_box(&mut html, "After Review", &report.metrics.after);
    html.push_str("    </div>\n");

    html.push_str("    <div class=\"issues\">\n        <h2>Issues Found</h2>\n");
    for issue in &report.issues {
        let _ = writeln!(html, "        <div class=\"issue {}\">", issue.severity);
        let _ = writeln!(
            html,
            "            <h4>{}: {}</h4>",
            title_case(issue.issue_type.as_str()),
            escape_html(&issue.description)
        );
        let _ = writeln!(
            html,
            "            <p><strong>File:</strong> {} (Line {})</p>",
            escape_html(&issue.file_path),
            issue.line_number
        );
        let _ = writeln!(
            html,
            "            <p><strong>Severity:</strong> {}</p>",
            title_case(issue.severity.as_str())
        );
        let _ = writeln!(
            html,
            "            <p><strong>Suggestion:</strong> {}</p>",
            escape_html(&issue.suggestion)
        );
        if !issue.original_code.is_empty() {
            let _ = writeln!(
                html,
                "            <pre><code>{}</code></pre>",
                escape_html(&issue.original_code)
            );
        }
        html.push_str("        </div>\n");
    }
    html.push_str("    </div>\n</body>\n</html>\n");

    html
}

fn write_metric_box(html: &mut String, title: &str, metrics: &Metrics) {
    let _ = writeln!(
        html,
        "        <div class=\"metric-box\">\n            <h3>{}</h3>\n            <p>Lines of Code: {}</p>\n            <p>Cyclomatic Complexity: {}</p>\n            <p>Security Issues: {}</p>\n        </div>",
        title, metrics.lines_of_code, metrics.cyclomatic_complexity, metrics.security_issues
    );
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Markdown Format
// =============================================================================

/// Render the Markdown report.
pub fn render_markdown(report: &ReviewReport) -> String {
    let mut md = String::new();
    let before = &report.metrics.before;
    let after = &report.metrics.after;
    let improvement = report.improvement();

    let _ = writeln!(md, "# Code Review Report\n");
    let _ = writeln!(md, "**Generated:** {}\n", report.generated_at);
    let _ = writeln!(md, "## Summary\n");
    let _ = writeln!(md, "- **Total Issues Found:** {}", report.summary.total_issues);
    let _ = writeln!(md, "- **Files Processed:** {}\n", report.summary.files_processed);

    let _ = writeln!(md, "### Issues by Type");
    for (issue_type, count) in &report.summary.issues_by_type {
        let _ = writeln!(md, "- {}: {}", title_case(issue_type), count);
    }

    let _ = writeln!(md, "\n### Issues by Severity");
    for (severity, count) in &report.summary.issues_by_severity {
        let _ = writeln!(md, "- {}: {}", title_case(severity), count);
    }

    let _ = writeln!(md, "\n## Metrics Comparison\n");
    let _ = writeln!(md, "| Metric | Before | After | Improvement |");
    let _ = writeln!(md, "|--------|--------|-------|-------------|");
    let _ = writeln!(
        md,
        "| Lines of Code | {} | {} | - |",
        before.lines_of_code, after.lines_of_code
    );
    let _ = writeln!(
        md,
        "| Cyclomatic Complexity | {} | {} | {} |",
        before.cyclomatic_complexity, after.cyclomatic_complexity, improvement.complexity_reduction
    );
    let _ = writeln!(
        md,
        "| Security Issues | {} | {} | {} |",
        before.security_issues, after.security_issues, improvement.security_fixes
    );
    let _ = writeln!(
        md,
        "| Performance Issues | {} | {} | {} |",
        before.performance_issues, after.performance_issues, improvement.performance_improvements
    );
    let _ = writeln!(
        md,
        "| Documentation Coverage | {:.0}% | {:.0}% | - |",
        before.documentation_coverage * 100.0,
        after.documentation_coverage * 100.0
    );

    let _ = writeln!(md, "\n## Issues Details\n");
    for issue in &report.issues {
        let _ = writeln!(
            md,
            "### {}: {}\n",
            title_case(issue.issue_type.as_str()),
            issue.description
        );
        let _ = writeln!(md, "- **File:** {} (Line {})", issue.file_path, issue.line_number);
        let _ = writeln!(md, "- **Severity:** {}", title_case(issue.severity.as_str()));
        let _ = writeln!(md, "- **Suggestion:** {}\n", issue.suggestion);
        if !issue.original_code.is_empty() {
            let _ = writeln!(md, "```\n{}\n```\n", issue.original_code);
        }
    }

    md
}

/// `analysis_error` -> `Analysis Error`.
fn title_case(s: &str) -> String {
    s.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// =============================================================================
// Terminal output (analyze command)
// =============================================================================

/// JSON document printed by the analyze command.
#[derive(Serialize, Deserialize)]
pub struct JsonAnalysis {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub summary: Summary,
    pub issues: Vec<Issue>,
}

/// Write analysis results as JSON to stdout.
pub fn write_json(path: &str, files_scanned: usize, issues: &[Issue]) -> anyhow::Result<()> {
    let analysis = JsonAnalysis {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_scanned,
        summary: Summary::from_issues(issues),
        issues: issues.to_vec(),
    };
    let json = serde_json::to_string_pretty(&analysis)?;
    println!("{}", json);
    Ok(())
}

/// Write analysis results in pretty (human-readable) format.
pub fn write_pretty(path: &str, files_scanned: usize, issues: &[Issue]) {
    println!();
    print!("  ");
    print!("{}", "codereview".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{} ({} files)", path, files_scanned);
    println!();

    if issues.is_empty() {
        println!("  {}", "✓ No issues found".green());
        println!();
        return;
    }

    println!("  {} ({}):", "Issues".bold(), issues.len());
    println!();

    for issue in issues {
        write_severity_tag(&issue.severity);
        print!("   ");
        print!("{:<16}", issue.issue_type.as_str().dimmed());
        print!("{}", issue.file_path.blue());
        print!("{}", format!(":{}", issue.line_number).dimmed());
        println!();
        println!("            {}", issue.description);
        println!("            {}", issue.suggestion.dimmed());
        println!();
    }

    write_severity_totals(&Summary::from_issues(issues));
    println!();
}

/// Write a short summary after a review run.
pub fn write_review_summary(report: &ReviewReport, output_dir: &Path) {
    let improvement = report.improvement();

    println!();
    println!("  {}", "✓ Code review completed".green().bold());
    println!();
    println!("  {:<24}{}", "Issues found:".dimmed(), report.summary.total_issues);
    println!(
        "  {:<24}{}",
        "Complexity reduction:".dimmed(),
        improvement.complexity_reduction
    );
    println!("  {:<24}{}", "Security fixes:".dimmed(), improvement.security_fixes);
    println!();
    println!("  Output:  {}", output_dir.display().to_string().blue());
    println!(
        "  Report:  {}",
        output_dir.join(HTML_REPORT).display().to_string().blue()
    );
    println!();
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::High => print!("    {} ", "HIGH".red()),
        Severity::Medium => print!("    {} ", "MED ".yellow()),
        Severity::Low => print!("    {} ", "LOW ".blue()),
    }
}

fn write_severity_totals(summary: &Summary) {
    print!("  {}", "Totals:".bold());
    for severity in [Severity::High, Severity::Medium, Severity::Low] {
        if let Some(count) = summary.issues_by_severity.get(severity.as_str()) {
            print!("  {} {}", count, severity);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueType;
    use tempfile::TempDir;

    fn sample_issues() -> Vec<Issue> {
        vec![
            Issue::new(
                "src/a.py",
                3,
                IssueType::Security,
                Severity::High,
                "Use of eval() function is dangerous",
                "Use ast.literal_eval() or safer alternatives",
            )
            .with_original_code("x = eval(\"<b>\")"),
            Issue::new(
                "src/a.py",
                1,
                IssueType::AnalysisError,
                Severity::Low,
                "Could not analyze file: boom",
                "Check file encoding and syntax",
            ),
            Issue::new("src/b.go", 9, IssueType::Maintenance, Severity::Low, "TODO/FIXME comment found", ""),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_issues(&sample_issues());
        assert_eq!(summary.total_issues, 3);
        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.issues_by_severity["low"], 2);
        assert_eq!(summary.issues_by_type["analysis_error"], 1);
    }

    #[test]
    fn test_improvement_metrics() {
        let before = Metrics {
            cyclomatic_complexity: 12,
            security_issues: 3,
            performance_issues: 1,
            ..Default::default()
        };
        let after = Metrics {
            cyclomatic_complexity: 12,
            performance_issues: 1,
            ..Default::default()
        };
        let report = ReviewReport::new(sample_issues(), before, after);
        let delta = report.summary.improvement_metrics.unwrap();
        assert_eq!(delta.complexity_reduction, 0);
        assert_eq!(delta.security_fixes, 3);
        assert_eq!(delta.performance_improvements, 0);
    }

    #[test]
    fn test_html_escapes_code() {
        let report = ReviewReport::new(sample_issues(), Metrics::default(), Metrics::default());
        let html = render_html(&report);
        assert!(html.contains("x = eval(&quot;&lt;b&gt;&quot;)"));
        assert!(html.contains("<div class=\"issue high\">"));
        assert!(html.contains("<h4>Analysis Error: Could not analyze file: boom</h4>"));
    }

    #[test]
    fn test_markdown_sections() {
        let report = ReviewReport::new(sample_issues(), Metrics::default(), Metrics::default());
        let md = render_markdown(&report);
        assert!(md.starts_with("# Code Review Report\n"));
        assert!(md.contains("- Security: 1\n"));
        assert!(md.contains("| Security Issues | 0 | 0 | 0 |"));
        assert!(md.contains("```\nx = eval(\"<b>\")\n```"));
    }

    #[test]
    fn test_write_reports_creates_all_files() {
        let temp = TempDir::new().unwrap();
        let report = ReviewReport::new(sample_issues(), Metrics::default(), Metrics::default());
        let written = write_reports(&report, temp.path()).unwrap();
        assert_eq!(written.len(), 3);
        for name in [JSON_REPORT, HTML_REPORT, MARKDOWN_REPORT] {
            assert!(temp.path().join(name).is_file(), "missing {}", name);
        }

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join(JSON_REPORT)).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_issues"], 3);
        assert_eq!(json["issues"][0]["issue_type"], "security");
        assert!(json["metrics"]["before"]["documentation_coverage"].is_number());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("analysis_error"), "Analysis Error");
        assert_eq!(title_case("high"), "High");
    }
}
