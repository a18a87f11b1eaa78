//! Review orchestration over a file tree.
//!
//! Sequences discovery, metrics, analysis and improvement, then hands the
//! results to the report writers. Per-file failures never abort a run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::analyze::{read_source, Analyzer};
use crate::config::ReviewConfig;
use crate::improve::Improver;
use crate::issue::Issue;
use crate::language;
use crate::metrics::MetricsCollector;
use crate::report::{self, ReviewReport};

/// Name of the directory holding rewritten sources inside the output directory.
pub const IMPROVED_DIR: &str = "improved_code";

/// Callback invoked after each file is improved.
pub type ProgressFn = Box<dyn Fn(&Path) + Send + Sync>;

/// Result of a completed review run.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub output_dir: PathBuf,
    pub files_reviewed: usize,
    pub report: ReviewReport,
}

/// Runs analysis and improvement over a code base.
pub struct Reviewer {
    config: ReviewConfig,
    analyzer: Analyzer,
    improver: Improver,
    collector: MetricsCollector,
    progress: Option<ProgressFn>,
}

impl Reviewer {
    pub fn new(config: ReviewConfig) -> Self {
        Self {
            analyzer: Analyzer::new(&config),
            improver: Improver::new(&config),
            collector: MetricsCollector::new(),
            progress: None,
            config,
        }
    }

    /// Replace the improver, e.g. to pin the header date.
    pub fn with_improver(mut self, improver: Improver) -> Self {
        self.improver = improver;
        self
    }

    /// Register a callback invoked after each file is improved.
    pub fn on_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Analyze files in parallel. Issues are returned in file order.
    pub fn analyze_files(&self, files: &[PathBuf]) -> Vec<Issue> {
        files
            .par_iter()
            .map(|path| self.analyzer.analyze_file(path))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Review `input` (a directory or single file) and write results to `output`.
    ///
    /// Without an explicit output, results go to `<input>_improved` next to
    /// the input.
    pub fn review(&self, input: &Path, output: Option<&Path>) -> anyhow::Result<ReviewOutcome> {
        let metadata = fs::metadata(input)
            .map_err(|e| anyhow::anyhow!("cannot access {}: {}", input.display(), e))?;

        let output_dir = match output {
            Some(dir) => dir.to_path_buf(),
            None => default_output_dir(input)?,
        };

        let (root, files) = if metadata.is_dir() {
            let files = discover_files(input, &self.config, Some(&output_dir));
            (input.to_path_buf(), files)
        } else {
            if !language::is_supported(input) {
                anyhow::bail!("unsupported file type: {}", input.display());
            }
            let root = input.parent().unwrap_or(Path::new(".")).to_path_buf();
            (root, vec![input.to_path_buf()])
        };

        info!(
            input = %input.display(),
            output = %output_dir.display(),
            files = files.len(),
            "starting review"
        );

        let improved_root = output_dir.join(IMPROVED_DIR);
        fs::create_dir_all(&improved_root)?;

        let metrics_before = self.collector.collect(&files);

        let mut issues = self.analyze_files(&files);
        info!(issues = issues.len(), "analysis complete");

        let mut by_file: HashMap<&str, Vec<Issue>> = HashMap::new();
        for issue in &issues {
            by_file
                .entry(issue.file_path.as_str())
                .or_default()
                .push(issue.clone());
        }

        let mut improved: Vec<(PathBuf, String)> = Vec::with_capacity(files.len());
        let mut after_issues: Vec<Issue> = Vec::new();

        for path in &files {
            let relative = path.strip_prefix(&root).unwrap_or(path);
            let dest = improved_root.join(relative);

            match read_source(path) {
                Ok(content) => {
                    let key = path.to_string_lossy();
                    let file_issues = by_file.get(&*key).map(Vec::as_slice).unwrap_or(&[]);
                    let new_content = self.improver.improve(path, &content, file_issues);
                    match write_file(&dest, &new_content) {
                        Ok(()) => {
                            after_issues.extend(self.analyzer.analyze(path, &new_content));
                            improved.push((dest.clone(), new_content));
                        }
                        Err(e) => {
                            warn!(file = %dest.display(), error = %e, "could not write improved file");
                        }
                    }
                }
                Err(e) => {
                    // Already reported as an analysis error; pass the bytes through.
                    warn!(file = %path.display(), error = %e, "copying file unchanged");
                    if let Err(e) = copy_file(path, &dest) {
                        warn!(file = %path.display(), error = %e, "could not copy file");
                    }
                }
            }

            if let Some(progress) = &self.progress {
                progress(path);
            }
        }

        let metrics_before = metrics_before.with_issues(&issues, files.len());
        let metrics_after = self
            .collector
            .collect_contents(&improved)
            .with_issues(&after_issues, improved.len());

        self.improver.annotate(&mut issues);

        if metadata.is_dir() {
            copy_non_code_files(input, &improved_root, &self.config, &output_dir);
        }

        let review_report = ReviewReport::new(issues, metrics_before, metrics_after);
        report::write_reports(&review_report, &output_dir)?;

        info!(output = %output_dir.display(), "review complete");

        Ok(ReviewOutcome {
            output_dir,
            files_reviewed: files.len(),
            report: review_report,
        })
    }
}

/// `<parent>/<name>_improved` for an input path.
///
/// Paths without a final component (`.`, `..`) are resolved first, so
/// `.` inside `/work/project` gives `/work/project_improved`.
pub fn default_output_dir(input: &Path) -> anyhow::Result<PathBuf> {
    let resolved = if input.file_name().is_some() {
        input.to_path_buf()
    } else {
        input
            .canonicalize()
            .map_err(|e| anyhow::anyhow!("cannot resolve {}: {}", input.display(), e))?
    };

    let name = resolved
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("cannot derive output name from {}", input.display()))?;
    let parent = resolved.parent().unwrap_or(Path::new("."));
    Ok(parent.join(format!("{}_improved", name.to_string_lossy())))
}

/// Collect supported, non-excluded source files under `root`, sorted by path.
///
/// Anything under `skip` (typically the output directory) is ignored.
pub fn discover_files(root: &Path, config: &ReviewConfig, skip: Option<&Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk(root, config, skip)
        .into_iter()
        .filter(|path| language::is_supported(path) && !config.is_path_excluded(path))
        .collect();
    files.sort();
    files
}

/// Collect regular files under `root`, pruning `skip` and excluded directories.
///
/// Unreadable entries (dangling symlinks, loops, permission errors) are
/// logged and skipped.
fn walk(root: &Path, config: &ReviewConfig, skip: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if skip.is_some_and(|s| e.path() == s) {
                return false;
            }
            e.depth() == 0 || !config.is_path_excluded(e.path())
        })
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "skipping unreadable entry"),
        }
    }

    files
}

fn write_file(dest: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, content)
}

fn copy_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest).map(|_| ())
}

/// Mirror files the analyzer does not handle into the improved tree.
fn copy_non_code_files(root: &Path, dest_root: &Path, config: &ReviewConfig, output_dir: &Path) {
    for path in walk(root, config, Some(output_dir)) {
        if language::is_supported(&path) || config.is_path_excluded(&path) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        if let Err(e) = copy_file(&path, &dest_root.join(relative)) {
            warn!(file = %path.display(), error = %e, "could not copy file");
        }
    }
}
