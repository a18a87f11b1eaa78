//! Code quality metrics for a set of files.
//!
//! `MetricsCollector` measures size and structural complexity. The issue
//! counts and documentation coverage are derived from analysis results by
//! the caller through [`Metrics::with_issues`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyze::PythonSyntax;
use crate::issue::{Issue, IssueType};
use crate::language::{Language, Strategy};

/// Aggregate snapshot for a file set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Non-blank lines.
    pub lines_of_code: usize,
    /// Summed over structured-syntax files.
    pub cyclomatic_complexity: u64,
    pub code_smells: usize,
    pub security_issues: usize,
    pub performance_issues: usize,
    /// Fraction of files without a documentation issue, 0.0 to 1.0.
    pub documentation_coverage: f64,
}

impl Metrics {
    /// Derive the issue-based fields from an analysis of `file_count` files.
    pub fn with_issues(self, issues: &[Issue], file_count: usize) -> Self {
        let count = |ty: IssueType| issues.iter().filter(|i| i.issue_type == ty).count();

        let undocumented: HashSet<&str> = issues
            .iter()
            .filter(|i| i.issue_type == IssueType::Documentation)
            .map(|i| i.file_path.as_str())
            .collect();

        let documentation_coverage = if file_count == 0 {
            0.0
        } else {
            file_count.saturating_sub(undocumented.len()) as f64 / file_count as f64
        };

        Self {
            code_smells: issues.iter().filter(|i| i.issue_type.is_code_smell()).count(),
            security_issues: count(IssueType::Security),
            performance_issues: count(IssueType::Performance),
            documentation_coverage,
            ..self
        }
    }
}

/// Measures line counts and complexity across files.
#[derive(Default)]
pub struct MetricsCollector {
    syntax: PythonSyntax,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect metrics from files on disk. Unreadable files are logged and skipped.
    pub fn collect<P: AsRef<Path>>(&self, files: &[P]) -> Metrics {
        let mut metrics = Metrics::default();

        for file in files {
            let path = file.as_ref();
            match fs::read(path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    self.measure(path, &content, &mut metrics);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping file in metrics");
                }
            }
        }

        metrics
    }

    /// Collect metrics from in-memory `(path, content)` pairs.
    pub fn collect_contents<P: AsRef<Path>>(&self, files: &[(P, String)]) -> Metrics {
        let mut metrics = Metrics::default();
        for (path, content) in files {
            self.measure(path.as_ref(), content, &mut metrics);
        }
        metrics
    }

    fn measure(&self, path: &Path, content: &str, metrics: &mut Metrics) {
        metrics.lines_of_code += content
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .count();

        let structured = Language::from_path(path)
            .map(|l| l.strategy() == Strategy::StructuredSyntax)
            .unwrap_or(false);
        if !structured {
            return;
        }

        match self.syntax.source_complexity(content) {
            Ok(complexity) => metrics.cyclomatic_complexity += u64::from(complexity),
            Err(e) => {
                debug!(file = %path.display(), error = %e, "no complexity for unparsable file");
            }
        }
    }
}
