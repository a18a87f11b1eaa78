//! Per-file issue detection.
//!
//! The analyzer selects exactly one strategy per file from its extension and
//! returns issues in detection order. Failures never escape: a file that
//! cannot be read or decoded yields a single `analysis_error` issue.

mod brace;
mod generic;
mod python;
mod syntax;

pub use syntax::PythonSyntax;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, error};

use crate::config::ReviewConfig;
use crate::issue::Issue;
use crate::language::{Language, Strategy};
use crate::rules::ANALYSIS_ERROR;

/// Errors that can occur while analyzing a file.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8: {source}")]
    Decode {
        path: String,
        source: std::string::FromUtf8Error,
    },
    #[error("syntax error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("grammar unavailable: {0}")]
    Grammar(String),
}

/// Applies the detection strategy matching each file's language.
pub struct Analyzer {
    max_complexity: u32,
    syntax: PythonSyntax,
}

impl Analyzer {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            max_complexity: config.max_complexity,
            syntax: PythonSyntax::new(),
        }
    }

    /// Analyze file content. Unsupported extensions yield no issues.
    pub fn analyze(&self, path: &Path, content: &str) -> Vec<Issue> {
        match self.try_analyze(path, content) {
            Ok(issues) => issues,
            Err(e) => {
                error!(file = %path.display(), error = %e, "analysis failed");
                vec![analysis_error(path, &e)]
            }
        }
    }

    /// Read and analyze a file from disk.
    pub fn analyze_file(&self, path: &Path) -> Vec<Issue> {
        if Language::from_path(path).is_none() {
            debug!(file = %path.display(), "skipping unsupported file");
            return Vec::new();
        }

        match read_source(path) {
            Ok(content) => self.analyze(path, &content),
            Err(e) => {
                error!(file = %path.display(), error = %e, "could not read file");
                vec![analysis_error(path, &e)]
            }
        }
    }

    /// Analyze content, surfacing unexpected failures to the caller.
    pub fn try_analyze(&self, path: &Path, content: &str) -> Result<Vec<Issue>, AnalyzeError> {
        let Some(language) = Language::from_path(path) else {
            return Ok(Vec::new());
        };

        let file = path.to_string_lossy();
        let lines: Vec<&str> = content.split('\n').collect();

        let issues = match language.strategy() {
            Strategy::StructuredSyntax => {
                python::detect(&file, content, &lines, &self.syntax, self.max_complexity)?
            }
            Strategy::BraceLanguage => brace::detect(&file, &lines),
            Strategy::Generic => generic::detect(&file, &lines),
        };

        debug!(
            file = %file,
            language = %language,
            issues = issues.len(),
            "analyzed file"
        );

        Ok(issues)
    }

    /// Parser shared with the metrics collector.
    pub fn syntax(&self) -> &PythonSyntax {
        &self.syntax
    }
}

/// Read a source file as strict UTF-8.
pub fn read_source(path: &Path) -> Result<String, AnalyzeError> {
    let bytes = fs::read(path).map_err(|source| AnalyzeError::Read {
        path: path.display().to_string(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| AnalyzeError::Decode {
        path: path.display().to_string(),
        source,
    })
}

fn analysis_error(path: &Path, err: &AnalyzeError) -> Issue {
    ANALYSIS_ERROR.issue_with_detail(&path.to_string_lossy(), 1, &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueType, Severity};
    use tempfile::TempDir;

    fn analyzer() -> Analyzer {
        Analyzer::new(&ReviewConfig::default())
    }

    #[test]
    fn test_dispatch_runs_one_strategy() {
        let a = analyzer();
        // `var` only means something to the brace strategy
        let content = "var x = 1\n";
        assert_eq!(a.analyze(Path::new("x.js"), content).len(), 2);
        assert!(a.analyze(Path::new("x.go"), content).is_empty());
        assert!(a
            .analyze(Path::new("x.py"), content)
            .iter()
            .all(|i| i.issue_type != IssueType::Modernization));
    }

    #[test]
    fn test_unsupported_extension_is_not_analyzed() {
        let a = analyzer();
        assert!(a.analyze(Path::new("notes.txt"), "TODO: everything").is_empty());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let a = analyzer();
        let content = "def f(x):\n    return eval(x)\n# todo\n";
        let first = a.analyze(Path::new("f.py"), content);
        let second = a.analyze(Path::new("f.py"), content);
        assert_eq!(first, second);
    }

    #[test]
    fn test_undecodable_file_yields_analysis_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.py");
        std::fs::write(&path, [0x66u8, 0x6f, 0xff, 0xfe, 0x0a]).unwrap();

        let issues = analyzer().analyze_file(&path);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::AnalysisError);
        assert_eq!(issues[0].severity, Severity::Low);
        assert_eq!(issues[0].line_number, 1);
        assert!(issues[0].description.starts_with("Could not analyze file: "));
    }

    #[test]
    fn test_missing_file_yields_analysis_error() {
        let temp = TempDir::new().unwrap();
        let issues = analyzer().analyze_file(&temp.path().join("gone.rb"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::AnalysisError);
    }
}
