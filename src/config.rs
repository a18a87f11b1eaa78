//! Review configuration.
//!
//! A config is built once per run (from defaults, a YAML file, CLI flags)
//! and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codereview.yaml", ".codereview.yaml"];

/// Per-run configuration for the review process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewConfig {
    /// Review priorities, most important first.
    #[serde(default = "default_priorities")]
    pub priorities: Vec<String>,
    /// Paths containing any of these substrings are skipped.
    #[serde(default = "default_excluded_patterns")]
    pub excluded_patterns: Vec<String>,
    #[serde(default = "default_style_guide")]
    pub style_guide: String,
    /// Cyclomatic complexity above which a file is flagged.
    #[serde(default = "default_max_complexity")]
    pub max_complexity: u32,
    #[serde(default = "default_true")]
    pub include_documentation: bool,
    #[serde(default = "default_true")]
    pub fix_security_issues: bool,
    #[serde(default = "default_true")]
    pub optimize_performance: bool,
}

fn default_priorities() -> Vec<String> {
    vec![
        "security".to_string(),
        "performance".to_string(),
        "readability".to_string(),
    ]
}

fn default_excluded_patterns() -> Vec<String> {
    vec![
        "__pycache__".to_string(),
        ".git".to_string(),
        ".venv".to_string(),
        "node_modules".to_string(),
    ]
}

fn default_style_guide() -> String {
    "pep8".to_string()
}

fn default_max_complexity() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            priorities: default_priorities(),
            excluded_patterns: default_excluded_patterns(),
            style_guide: default_style_guide(),
            max_complexity: default_max_complexity(),
            include_documentation: true,
            fix_security_issues: true,
            optimize_performance: true,
        }
    }
}

impl ReviewConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn parse_str(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ReviewConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Check if a path should be excluded (substring match on the full path).
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excluded_patterns
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
    }

    /// Rank of a priority in the configured order, if present.
    pub fn priority_rank(&self, priority: &str) -> Option<usize> {
        self.priorities.iter().position(|p| p == priority)
    }
}

/// Look for a config file in the given directory.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Validate a config for correctness.
pub fn validate(config: &ReviewConfig) -> anyhow::Result<()> {
    if config.max_complexity == 0 {
        anyhow::bail!("max_complexity must be at least 1");
    }

    if config.priorities.is_empty() {
        anyhow::bail!("priorities must not be empty");
    }

    if let Some(p) = config.priorities.iter().find(|p| p.trim().is_empty()) {
        anyhow::bail!("invalid priority {:?}", p);
    }

    // An empty substring would match every path.
    if config.excluded_patterns.iter().any(|p| p.is_empty()) {
        anyhow::bail!("excluded_patterns must not contain an empty pattern");
    }

    if config.style_guide.trim().is_empty() {
        anyhow::bail!("style_guide must not be empty");
    }

    Ok(())
}
