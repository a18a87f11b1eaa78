//! codereview - rule-based code review agent.
//!
//! Walks a code base, flags style, security, performance, documentation and
//! complexity issues, rewrites flagged lines with fixed templates and reports
//! before/after quality metrics.
//!
//! # Architecture
//!
//! - `language`: extension table and per-language detection strategy
//! - `rules`: the issue catalog (texts, severities, thresholds)
//! - `analyze`: per-file detection; Python goes through tree-sitter
//! - `improve`: applies catalog fixes bottom-up and adds file headers
//! - `metrics`: line counts, complexity and issue-derived aggregates
//! - `review`: orchestrates a run over a directory or file
//! - `report`: JSON, HTML and Markdown reports plus terminal output
//! - `config`: YAML configuration

pub mod analyze;
pub mod cli;
pub mod config;
pub mod improve;
pub mod issue;
pub mod language;
pub mod metrics;
pub mod report;
pub mod review;
pub mod rules;

pub use analyze::{AnalyzeError, Analyzer, PythonSyntax};
pub use config::ReviewConfig;
pub use improve::{ImproveError, Improver};
pub use issue::{Issue, IssueType, Severity};
pub use language::{Language, Strategy};
pub use metrics::{Metrics, MetricsCollector};
pub use report::ReviewReport;
pub use review::{ReviewOutcome, Reviewer};
