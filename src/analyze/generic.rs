//! Generic strategy for every other supported language.

use crate::issue::Issue;
use crate::rules::{GENERIC_LONG_LINE, GENERIC_MAX_LINE, TODO_COMMENT};

/// Detect issues in a generic source file.
pub(crate) fn detect(file: &str, lines: &[&str]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        let upper = line.to_uppercase();
        if upper.contains("TODO") || upper.contains("FIXME") {
            issues.push(TODO_COMMENT.issue(file, line_number).with_original_code(*line));
        }

        if line.chars().count() > GENERIC_MAX_LINE {
            issues.push(GENERIC_LONG_LINE.issue(file, line_number).with_original_code(*line));
        }
    }

    issues
}
