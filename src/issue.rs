//! Core types for detected issues.

use serde::{Deserialize, Serialize};

/// Severity levels for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Fixed vocabulary of issue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Style,
    Documentation,
    Security,
    Performance,
    Complexity,
    Syntax,
    Modernization,
    Maintenance,
    AnalysisError,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Style => "style",
            IssueType::Documentation => "documentation",
            IssueType::Security => "security",
            IssueType::Performance => "performance",
            IssueType::Complexity => "complexity",
            IssueType::Syntax => "syntax",
            IssueType::Modernization => "modernization",
            IssueType::Maintenance => "maintenance",
            IssueType::AnalysisError => "analysis_error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "style" => Some(IssueType::Style),
            "documentation" => Some(IssueType::Documentation),
            "security" => Some(IssueType::Security),
            "performance" => Some(IssueType::Performance),
            "complexity" => Some(IssueType::Complexity),
            "syntax" => Some(IssueType::Syntax),
            "modernization" => Some(IssueType::Modernization),
            "maintenance" => Some(IssueType::Maintenance),
            "analysis_error" => Some(IssueType::AnalysisError),
            _ => None,
        }
    }

    /// Whether issues of this type count as code smells in the metrics.
    pub fn is_code_smell(&self) -> bool {
        matches!(
            self,
            IssueType::Style
                | IssueType::Modernization
                | IssueType::Maintenance
                | IssueType::Complexity
        )
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::parse(s).ok_or_else(|| format!("unknown issue type: {}", s))
    }
}

/// One detected problem occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub file_path: String,
    /// 1-indexed line the issue was detected on.
    pub line_number: usize,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
    /// Verbatim source line; empty for file-level issues.
    #[serde(default)]
    pub original_code: String,
    /// Filled in by the improver.
    #[serde(default)]
    pub improved_code: String,
}

impl Issue {
    pub fn new(
        file_path: impl Into<String>,
        line_number: usize,
        issue_type: IssueType,
        severity: Severity,
        description: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line_number,
            issue_type,
            severity,
            description: description.into(),
            suggestion: suggestion.into(),
            original_code: String::new(),
            improved_code: String::new(),
        }
    }

    /// Attach the source line the issue was found on.
    pub fn with_original_code(mut self, code: impl Into<String>) -> Self {
        self.original_code = code.into();
        self
    }

    /// Create a unique key for this issue (for deduplication/comparison).
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.issue_type, self.file_path, self.line_number, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_round_trips_through_str() {
        for ty in [
            IssueType::Style,
            IssueType::Documentation,
            IssueType::AnalysisError,
        ] {
            assert_eq!(ty.as_str().parse::<IssueType>().unwrap(), ty);
        }
        assert!("bogus".parse::<IssueType>().is_err());
    }

    #[test]
    fn test_issue_serializes_snake_case() {
        let issue = Issue::new(
            "a.py",
            1,
            IssueType::AnalysisError,
            Severity::Low,
            "Could not analyze file: boom",
            "Check file encoding and syntax",
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["issue_type"], "analysis_error");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["original_code"], "");
        assert_eq!(json["improved_code"], "");
    }

    #[test]
    fn test_severity_from_str_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("critical".parse::<Severity>().is_err());
    }
}
