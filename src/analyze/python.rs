//! Structured-syntax strategy for Python files.

use crate::issue::Issue;
use crate::rules::{
    self, EVAL_CALL, EVAL_USAGE, HIGH_COMPLEXITY, LONG_LINE, MISSING_DOCSTRING,
    STRING_CONCATENATION, STRUCTURED_MAX_LINE, SYNTAX_ERROR,
};

use super::syntax::PythonSyntax;
use super::AnalyzeError;

/// Detect issues in a Python file.
///
/// A file that does not parse yields exactly one syntax issue and nothing else.
pub(crate) fn detect(
    file: &str,
    content: &str,
    lines: &[&str],
    syntax: &PythonSyntax,
    max_complexity: u32,
) -> Result<Vec<Issue>, AnalyzeError> {
    let tree = match syntax.parse(content) {
        Ok(tree) => tree,
        Err(AnalyzeError::Parse { line, message }) => {
            let line = line.clamp(1, lines.len().max(1));
            return Ok(vec![SYNTAX_ERROR.issue_with_detail(file, line, &message)]);
        }
        Err(e) => return Err(e),
    };

    let mut issues = scan_lines(file, lines);

    let complexity = syntax.complexity(&tree, content)?;
    if complexity > max_complexity {
        issues.push(HIGH_COMPLEXITY.issue_with_detail(file, 1, &complexity.to_string()));
    }

    Ok(issues)
}

/// Per-line checks. A line may trigger several of them.
fn scan_lines(file: &str, lines: &[&str]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        if line.chars().count() > STRUCTURED_MAX_LINE {
            issues.push(LONG_LINE.issue(file, line_number).with_original_code(*line));
        }

        // The last line has no follower, so it cannot be followed by a docstring.
        if is_definition(line) && !lines.get(idx + 1).is_some_and(|next| rules::starts_doc_block(next)) {
            issues.push(MISSING_DOCSTRING.issue(file, line_number).with_original_code(*line));
        }

        if EVAL_CALL.is_match(line) {
            issues.push(EVAL_USAGE.issue(file, line_number).with_original_code(*line));
        }

        if is_string_concatenation(line) {
            issues.push(STRING_CONCATENATION.issue(file, line_number).with_original_code(*line));
        }
    }

    issues
}

fn is_definition(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("def ") || trimmed.starts_with("class ")
}

/// Loose heuristic: any `+=` on a line mentioning "str" in any case.
fn is_string_concatenation(line: &str) -> bool {
    line.contains("+=") && line.to_lowercase().contains("str")
}
