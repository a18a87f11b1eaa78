//! Line-level fixes keyed by issue type and description.

use std::path::Path;

use chrono::NaiveDate;

use crate::issue::{Issue, IssueType};
use crate::rules::{EVAL_CALL, STRUCTURED_MAX_LINE, VAR_DECLARATION};

/// Placeholder inserted below undocumented definitions.
pub const DOCSTRING_PLACEHOLDER: &str = "\"\"\"Add description here\"\"\"";

/// Attribution written into generated file headers.
pub const HEADER_AUTHOR: &str = "Code Review Agent";

/// The deterministic transformation for one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fix {
    /// Split a long line at its commas.
    SplitLongLine,
    /// Swap dynamic evaluation for literal evaluation.
    SafeEval,
    /// Replace `var` with `const`. Never `let`, even for reassigned bindings.
    ConstDeclaration,
    AppendSemicolon,
    InsertDocstring,
}

impl Fix {
    /// Select the fix for an issue, if the catalog has one.
    pub fn for_issue(issue: &Issue) -> Option<Self> {
        match issue.issue_type {
            IssueType::Style if issue.description.contains("Line too long") => {
                Some(Fix::SplitLongLine)
            }
            IssueType::Style if issue.description.contains("Missing semicolon") => {
                Some(Fix::AppendSemicolon)
            }
            IssueType::Security => Some(Fix::SafeEval),
            IssueType::Modernization => Some(Fix::ConstDeclaration),
            IssueType::Documentation if issue.description.contains("Missing docstring") => {
                Some(Fix::InsertDocstring)
            }
            _ => None,
        }
    }

    /// Apply the fix. Returns `None` when the line does not need changing.
    ///
    /// The result may span several lines joined with `\n`.
    pub fn apply(&self, line: &str) -> Option<String> {
        match self {
            Fix::SplitLongLine => split_long_line(line),
            Fix::SafeEval => EVAL_CALL
                .is_match(line)
                .then(|| EVAL_CALL.replace_all(line, "ast.literal_eval(").into_owned()),
            Fix::ConstDeclaration => VAR_DECLARATION
                .is_match(line)
                .then(|| VAR_DECLARATION.replace_all(line, "const${1}").into_owned()),
            Fix::AppendSemicolon => {
                let trimmed = line.trim_end();
                (!trimmed.ends_with(';')).then(|| format!("{};", trimmed))
            }
            Fix::InsertDocstring => Some(format!(
                "{}\n{}{}",
                line,
                " ".repeat(indent_width(line) + 4),
                DOCSTRING_PLACEHOLDER
            )),
        }
    }
}

/// Apply the catalog fix for an issue, passing the line through otherwise.
pub fn apply_fix(line: &str, issue: &Issue) -> String {
    Fix::for_issue(issue)
        .and_then(|fix| fix.apply(line))
        .unwrap_or_else(|| line.to_string())
}

/// Only lines over the limit that contain a comma are split; there is no
/// fallback wrapping.
fn split_long_line(line: &str) -> Option<String> {
    if line.chars().count() <= STRUCTURED_MAX_LINE || !line.contains(',') {
        return None;
    }

    let continuation = " ".repeat(indent_width(line) + 4);
    let mut parts = line.split(',');
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.map(|part| format!("{}{}", continuation, part.trim()));

    Some(std::iter::once(first).chain(rest).collect::<Vec<_>>().join(",\n"))
}

/// Number of leading whitespace characters.
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Documentation header prepended to structured-syntax files.
pub fn file_header(path: &Path, date: NaiveDate) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    Some(format!(
        "\"\"\"\n{}\n\nModule description goes here.\n\nAuthor: {}\nDate: {}\n\"\"\"\n",
        name,
        HEADER_AUTHOR,
        date.format("%Y-%m-%d")
    ))
}
