//! Declarative catalog of the issues each strategy can report.
//!
//! Detectors build issues from these rules so that descriptions stay in
//! sync with the improver, which keys its fixes on type and description.

use lazy_static::lazy_static;
use regex::Regex;

use crate::issue::{Issue, IssueType, Severity};
use crate::language::Strategy;

/// Line length limit for structured-syntax files.
pub const STRUCTURED_MAX_LINE: usize = 100;

/// Line length limit for generic files.
pub const GENERIC_MAX_LINE: usize = 120;

/// Markers that open a documentation block.
pub const DOC_MARKERS: &[&str] = &["\"\"\"", "'''"];

lazy_static! {
    /// Dynamic evaluation call. `literal_eval(` does not match.
    pub static ref EVAL_CALL: Regex = Regex::new(r"\beval\(").unwrap();

    /// Legacy function-scoped declaration, e.g. `var count = 0`.
    pub static ref VAR_DECLARATION: Regex = Regex::new(r"\bvar(\s+\w)").unwrap();
}

/// Definition of one detectable issue.
#[derive(Debug)]
pub struct Rule {
    pub id: &'static str,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: &'static str,
    pub suggestion: &'static str,
}

impl Rule {
    /// Build an issue for this rule at a 1-indexed line.
    pub fn issue(&self, file: &str, line_number: usize) -> Issue {
        Issue::new(
            file,
            line_number,
            self.issue_type,
            self.severity,
            self.description,
            self.suggestion,
        )
    }

    /// Build an issue whose description carries a detail, e.g. `Syntax error: ...`.
    pub fn issue_with_detail(&self, file: &str, line_number: usize, detail: &str) -> Issue {
        Issue::new(
            file,
            line_number,
            self.issue_type,
            self.severity,
            format!("{}: {}", self.description, detail),
            self.suggestion,
        )
    }
}

pub const LONG_LINE: Rule = Rule {
    id: "long_line",
    issue_type: IssueType::Style,
    severity: Severity::Low,
    description: "Line too long (>100 characters)",
    suggestion: "Break line into multiple lines",
};

pub const MISSING_DOCSTRING: Rule = Rule {
    id: "missing_docstring",
    issue_type: IssueType::Documentation,
    severity: Severity::Medium,
    description: "Missing docstring",
    suggestion: "Add descriptive docstring",
};

pub const EVAL_USAGE: Rule = Rule {
    id: "eval_usage",
    issue_type: IssueType::Security,
    severity: Severity::High,
    description: "Use of eval() function is dangerous",
    suggestion: "Use ast.literal_eval() or safer alternatives",
};

pub const STRING_CONCATENATION: Rule = Rule {
    id: "string_concatenation",
    issue_type: IssueType::Performance,
    severity: Severity::Medium,
    description: "Inefficient string concatenation",
    suggestion: "Use join() or f-strings for better performance",
};

pub const HIGH_COMPLEXITY: Rule = Rule {
    id: "high_complexity",
    issue_type: IssueType::Complexity,
    severity: Severity::High,
    description: "High cyclomatic complexity",
    suggestion: "Consider breaking down into smaller functions",
};

pub const SYNTAX_ERROR: Rule = Rule {
    id: "syntax_error",
    issue_type: IssueType::Syntax,
    severity: Severity::High,
    description: "Syntax error",
    suggestion: "Fix syntax error",
};

pub const VAR_KEYWORD: Rule = Rule {
    id: "var_keyword",
    issue_type: IssueType::Modernization,
    severity: Severity::Medium,
    description: "Use of 'var' keyword",
    suggestion: "Use 'let' or 'const' instead of 'var'",
};

pub const MISSING_SEMICOLON: Rule = Rule {
    id: "missing_semicolon",
    issue_type: IssueType::Style,
    severity: Severity::Low,
    description: "Missing semicolon",
    suggestion: "Add semicolon at end of statement",
};

pub const TODO_COMMENT: Rule = Rule {
    id: "todo_comment",
    issue_type: IssueType::Maintenance,
    severity: Severity::Low,
    description: "TODO/FIXME comment found",
    suggestion: "Complete the pending task",
};

pub const GENERIC_LONG_LINE: Rule = Rule {
    id: "generic_long_line",
    issue_type: IssueType::Style,
    severity: Severity::Low,
    description: "Line too long",
    suggestion: "Break into multiple lines",
};

pub const ANALYSIS_ERROR: Rule = Rule {
    id: "analysis_error",
    issue_type: IssueType::AnalysisError,
    severity: Severity::Low,
    description: "Could not analyze file",
    suggestion: "Check file encoding and syntax",
};

static STRUCTURED_RULES: &[&Rule] = &[
    &LONG_LINE,
    &MISSING_DOCSTRING,
    &EVAL_USAGE,
    &STRING_CONCATENATION,
    &HIGH_COMPLEXITY,
    &SYNTAX_ERROR,
];

static BRACE_RULES: &[&Rule] = &[&VAR_KEYWORD, &MISSING_SEMICOLON];

static GENERIC_RULES: &[&Rule] = &[&TODO_COMMENT, &GENERIC_LONG_LINE];

/// The rule set a strategy draws from.
pub fn rules_for(strategy: Strategy) -> &'static [&'static Rule] {
    match strategy {
        Strategy::StructuredSyntax => STRUCTURED_RULES,
        Strategy::BraceLanguage => BRACE_RULES,
        Strategy::Generic => GENERIC_RULES,
    }
}

/// Whether a line (after trimming) opens a documentation block.
pub fn starts_doc_block(line: &str) -> bool {
    let trimmed = line.trim_start();
    DOC_MARKERS.iter().any(|m| trimmed.starts_with(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_pattern_skips_literal_eval() {
        assert!(EVAL_CALL.is_match("x = eval(user_input)"));
        assert!(EVAL_CALL.is_match("return eval(expr)"));
        assert!(!EVAL_CALL.is_match("x = ast.literal_eval(user_input)"));
        assert!(!EVAL_CALL.is_match("evaluate(x)"));
    }

    #[test]
    fn test_var_pattern() {
        assert!(VAR_DECLARATION.is_match("var count = 0;"));
        assert!(VAR_DECLARATION.is_match("  for (var i = 0; i < n; i++) {"));
        assert!(!VAR_DECLARATION.is_match("const variance = 2;"));
        assert!(!VAR_DECLARATION.is_match("let myvar = 1;"));
    }

    #[test]
    fn test_issue_with_detail() {
        let issue = HIGH_COMPLEXITY.issue_with_detail("a.py", 1, "13");
        assert_eq!(issue.description, "High cyclomatic complexity: 13");
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.original_code.is_empty());
    }

    #[test]
    fn test_rule_ids_are_unique() {
        let mut ids: Vec<&str> = [
            Strategy::StructuredSyntax,
            Strategy::BraceLanguage,
            Strategy::Generic,
        ]
        .iter()
        .flat_map(|s| rules_for(*s).iter().map(|r| r.id))
        .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
