//! Best-effort rewriting of flagged lines.
//!
//! Fixes are applied in descending line order. A fix may expand one line
//! into several, which shifts every line below it; working bottom-up keeps
//! the line numbers of the remaining issues valid.

mod fixes;

pub use fixes::{apply_fix, file_header, Fix, DOCSTRING_PLACEHOLDER, HEADER_AUTHOR};

use std::path::Path;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ReviewConfig;
use crate::issue::{Issue, IssueType};
use crate::language::{Language, Strategy};
use crate::rules;

/// Errors that can occur while improving a file.
#[derive(Error, Debug)]
pub enum ImproveError {
    #[error("issue has invalid line number 0: {0}")]
    InvalidLineNumber(String),
    #[error("cannot build a file header for {0}: path has no file name")]
    MissingFileName(String),
}

/// Applies catalog fixes to file content.
pub struct Improver {
    include_documentation: bool,
    fix_security_issues: bool,
    date: NaiveDate,
}

impl Improver {
    /// Create an improver that stamps headers with today's local date.
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            include_documentation: config.include_documentation,
            fix_security_issues: config.fix_security_issues,
            date: Local::now().date_naive(),
        }
    }

    /// Set the date used in generated file headers.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Improve file content. On any failure the original content is returned.
    pub fn improve(&self, path: &Path, content: &str, issues: &[Issue]) -> String {
        match self.try_improve(path, content, issues) {
            Ok(improved) => improved,
            Err(e) => {
                error!(file = %path.display(), error = %e, "improvement failed, keeping original");
                content.to_string()
            }
        }
    }

    /// Improve file content, surfacing failures to the caller.
    pub fn try_improve(
        &self,
        path: &Path,
        content: &str,
        issues: &[Issue],
    ) -> Result<String, ImproveError> {
        let Some(language) = Language::from_path(path) else {
            return Ok(content.to_string());
        };

        if let Some(bad) = issues.iter().find(|i| i.line_number == 0) {
            return Err(ImproveError::InvalidLineNumber(bad.description.clone()));
        }

        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

        // Stable sort keeps detection order among issues on the same line.
        let mut ordered: Vec<&Issue> = issues.iter().filter(|i| self.is_enabled(i)).collect();
        ordered.sort_by(|a, b| b.line_number.cmp(&a.line_number));

        let mut applied = 0;
        let mut start = 0;
        while start < ordered.len() {
            let line_number = ordered[start].line_number;
            let end = ordered[start..]
                .iter()
                .position(|i| i.line_number != line_number)
                .map_or(ordered.len(), |offset| start + offset);
            let group = &ordered[start..end];
            start = end;

            if line_number > lines.len() {
                debug!(file = %path.display(), line = line_number, "issue beyond end of file, skipped");
                continue;
            }

            let idx = line_number - 1;
            let fixed = group
                .iter()
                .fold(lines[idx].clone(), |text, issue| apply_fix(&text, issue));

            if fixed != lines[idx] {
                applied += 1;
                let replacement: Vec<String> = fixed.split('\n').map(str::to_string).collect();
                lines.splice(idx..=idx, replacement);
            }
        }

        if language.strategy() == Strategy::StructuredSyntax
            && self.include_documentation
            && !rules::DOC_MARKERS.iter().any(|m| content.starts_with(m))
        {
            let header = file_header(path, self.date)
                .ok_or_else(|| ImproveError::MissingFileName(path.display().to_string()))?;
            lines.insert(0, header);
        }

        debug!(file = %path.display(), fixed_lines = applied, "improved file");

        Ok(lines.join("\n"))
    }

    /// Record on each issue the text its fix produces for the original line.
    ///
    /// Issues without an applicable fix keep an empty `improved_code`.
    pub fn annotate(&self, issues: &mut [Issue]) {
        for issue in issues.iter_mut() {
            if issue.original_code.is_empty() || !self.is_enabled(issue) {
                continue;
            }
            let fixed = apply_fix(&issue.original_code, issue);
            if fixed != issue.original_code {
                issue.improved_code = fixed;
            }
        }
    }

    fn is_enabled(&self, issue: &Issue) -> bool {
        match issue.issue_type {
            IssueType::Security => self.fix_security_issues,
            IssueType::Documentation => self.include_documentation,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use crate::rules::{EVAL_USAGE, MISSING_DOCSTRING, MISSING_SEMICOLON, VAR_KEYWORD};

    fn improver() -> Improver {
        Improver::new(&ReviewConfig::default())
            .with_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    }

    #[test]
    fn test_empty_issue_list_leaves_non_python_unchanged() {
        let content = "var a = 1\nconsole.log(a)\n";
        assert_eq!(improver().improve(Path::new("a.js"), content, &[]), content);
    }

    #[test]
    fn test_empty_issue_list_still_adds_python_header() {
        let content = "x = 1\n";
        let improved = improver().improve(Path::new("pkg/mod.py"), content, &[]);
        assert!(improved.starts_with("\"\"\"\nmod.py\n"));
        assert!(improved.ends_with("\"\"\"\n\nx = 1\n"));

        let documented = "\"\"\"Docs.\"\"\"\nx = 1\n";
        assert_eq!(improver().improve(Path::new("mod.py"), documented, &[]), documented);
    }

    #[test]
    fn test_eval_fix_on_line_five() {
        let content = "\"\"\"M.\"\"\"\nimport ast\n\n\nx = eval(user_input)\nprint(x)";
        let issue = EVAL_USAGE
            .issue("m.py", 5)
            .with_original_code("x = eval(user_input)");
        let improved = improver().improve(Path::new("m.py"), content, &[issue]);
        let lines: Vec<&str> = improved.split('\n').collect();
        assert_eq!(lines[4], "x = ast.literal_eval(user_input)");
        assert_eq!(lines[5], "print(x)");
    }

    #[test]
    fn test_descending_order_with_line_insertion() {
        let content = "\"\"\"M.\"\"\"\nx = eval(a)\ndef f():\n    return x";
        let issues = vec![
            EVAL_USAGE.issue("m.py", 2),
            MISSING_DOCSTRING.issue("m.py", 3),
        ];
        let improved = improver().improve(Path::new("m.py"), content, &issues);
        assert_eq!(
            improved,
            "\"\"\"M.\"\"\"\nx = ast.literal_eval(a)\ndef f():\n    \"\"\"Add description here\"\"\"\n    return x"
        );
    }

    #[test]
    fn test_issues_beyond_end_are_skipped() {
        let content = "let a = 1";
        let issues = vec![MISSING_SEMICOLON.issue("a.js", 1), MISSING_SEMICOLON.issue("a.js", 7)];
        assert_eq!(improver().improve(Path::new("a.js"), content, &issues), "let a = 1;");
    }

    #[test]
    fn test_multiple_fixes_on_one_line() {
        let content = "var total = 0";
        let issues = vec![VAR_KEYWORD.issue("a.js", 1), MISSING_SEMICOLON.issue("a.js", 1)];
        assert_eq!(
            improver().improve(Path::new("a.js"), content, &issues),
            "const total = 0;"
        );
    }

    #[test]
    fn test_invalid_line_number_returns_original() {
        let content = "var a = 1";
        let mut issue = VAR_KEYWORD.issue("a.js", 1);
        issue.line_number = 0;
        let improver = improver();
        assert!(improver.try_improve(Path::new("a.js"), content, &[issue.clone()]).is_err());
        assert_eq!(improver.improve(Path::new("a.js"), content, &[issue]), content);
    }

    #[test]
    fn test_toggles_disable_fixes() {
        let config = ReviewConfig {
            fix_security_issues: false,
            include_documentation: false,
            ..Default::default()
        };
        let improver = Improver::new(&config);
        let content = "def f(a):\n    return eval(a)";
        let issues = vec![MISSING_DOCSTRING.issue("f.py", 1), EVAL_USAGE.issue("f.py", 2)];
        assert_eq!(improver.improve(Path::new("f.py"), content, &issues), content);
    }

    #[test]
    fn test_annotate_fills_improved_code() {
        let mut issues = vec![
            VAR_KEYWORD.issue("a.js", 1).with_original_code("var a = 1;"),
            Issue::new("a.js", 1, IssueType::Complexity, Severity::High, "High cyclomatic complexity: 12", ""),
        ];
        improver().annotate(&mut issues);
        assert_eq!(issues[0].improved_code, "const a = 1;");
        assert!(issues[1].improved_code.is_empty());
    }
}
