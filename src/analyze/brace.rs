//! Brace-language strategy (JavaScript), line heuristics only.

use crate::issue::Issue;
use crate::rules::{MISSING_SEMICOLON, VAR_DECLARATION, VAR_KEYWORD};

/// Line endings that do not need a terminator.
const STATEMENT_ENDINGS: &[char] = &[';', '{', '}', ')', ','];

/// Line prefixes that open a block rather than a statement.
const BLOCK_PREFIXES: &[&str] = &["if", "for", "while", "function", "class"];

/// Detect issues in a brace-language file.
pub(crate) fn detect(file: &str, lines: &[&str]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        if VAR_DECLARATION.is_match(line) {
            issues.push(VAR_KEYWORD.issue(file, line_number).with_original_code(*line));
        }

        if is_missing_semicolon(line) {
            issues.push(MISSING_SEMICOLON.issue(file, line_number).with_original_code(*line));
        }
    }

    issues
}

/// Prefix match only, so `format(x)` counts as a block opener. Multi-line
/// expressions and comments are flagged too.
fn is_missing_semicolon(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.ends_with(STATEMENT_ENDINGS)
        && !BLOCK_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}
