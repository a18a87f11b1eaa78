//! Command-line interface for codereview.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::config::{self, ReviewConfig};
use crate::issue::Severity;
use crate::language::{Language, Strategy};
use crate::report;
use crate::review::{self, Reviewer};
use crate::rules;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Rule-based code review agent.
///
/// Scans a code base for style, security, performance, documentation and
/// complexity issues, writes an improved copy of every source file and
/// produces JSON, HTML and Markdown reports.
#[derive(Parser)]
#[command(name = "codereview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review a directory or file and write improved code plus reports
    Review(ReviewArgs),
    /// Report issues without writing anything
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// List the rules applied to each language family
    Rules,
    /// Write a default configuration file
    Init(InitArgs),
}

/// Options shared by commands that load a configuration.
#[derive(Parser)]
pub struct ConfigArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cyclomatic complexity threshold
    #[arg(long)]
    pub max_complexity: Option<u32>,

    /// Extra path substrings to exclude (repeatable)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
}

/// Arguments for the review command.
#[derive(Parser)]
pub struct ReviewArgs {
    /// Path to review (file or directory)
    pub path: PathBuf,

    /// Output directory (default: <path>_improved)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Review priorities, comma separated
    #[arg(long, value_delimiter = ',')]
    pub priorities: Vec<String>,

    /// Style guide name
    #[arg(long)]
    pub style_guide: Option<String>,

    /// Do not insert docstrings or file headers
    #[arg(long)]
    pub no_docs: bool,

    /// Do not rewrite security issues
    #[arg(long)]
    pub no_security_fixes: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codereview.yaml")]
    pub output: PathBuf,
}

/// Resolve the configuration: explicit file, discovered file, or defaults,
/// then command-line overrides.
fn load_config(args: &ConfigArgs, target: &Path) -> anyhow::Result<ReviewConfig> {
    let search_dir = if target.is_dir() {
        target.to_path_buf()
    } else {
        target.parent().unwrap_or(Path::new(".")).to_path_buf()
    };

    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => config::discover(&search_dir).or_else(|| config::discover(Path::new("."))),
    };

    let mut cfg = match &path {
        Some(p) => {
            tracing::debug!(config = %p.display(), "loading config");
            ReviewConfig::parse_file(p)
                .map_err(|e| anyhow::anyhow!("error parsing config {}: {}", p.display(), e))?
        }
        None => ReviewConfig::default(),
    };

    if let Some(max) = args.max_complexity {
        cfg.max_complexity = max;
    }
    cfg.excluded_patterns.extend(args.exclude.iter().cloned());

    Ok(cfg)
}

/// Run the review command.
pub fn run_review(args: &ReviewArgs) -> anyhow::Result<i32> {
    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let mut cfg = match load_config(&args.config, &args.path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if !args.priorities.is_empty() {
        cfg.priorities = args.priorities.clone();
    }
    if let Some(style) = &args.style_guide {
        cfg.style_guide = style.clone();
    }
    if args.no_docs {
        cfg.include_documentation = false;
    }
    if args.no_security_fixes {
        cfg.fix_security_issues = false;
    }

    if let Err(e) = config::validate(&cfg) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let mut reviewer = Reviewer::new(cfg);

    let bar = if args.no_progress {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("  {spinner} {pos} files  {wide_msg}")?);
        Some(bar)
    };

    if let Some(bar) = &bar {
        let bar = bar.clone();
        reviewer = reviewer.on_progress(Box::new(move |path: &Path| {
            bar.inc(1);
            bar.set_message(path.display().to_string());
        }));
    }

    let outcome = reviewer.review(&args.path, args.output.as_deref());

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let outcome = outcome?;
    report::write_review_summary(&outcome.report, &outcome.output_dir);

    Ok(EXIT_SUCCESS)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let cfg = match load_config(&args.config, &args.path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Err(e) = config::validate(&cfg) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let files = if metadata.is_dir() {
        review::discover_files(&args.path, &cfg, None)
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let reviewer = Reviewer::new(cfg);
    let issues = reviewer.analyze_files(&files);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, files.len(), &issues)?,
        _ => report::write_pretty(&path_str, files.len(), &issues),
    }

    if issues.iter().any(|i| i.severity == Severity::High) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    let families = [
        (Strategy::StructuredSyntax, "Structured syntax"),
        (Strategy::BraceLanguage, "Brace languages"),
        (Strategy::Generic, "Generic"),
    ];

    for (strategy, title) in families {
        let extensions: Vec<&str> = Language::all()
            .iter()
            .filter(|l| l.strategy() == strategy)
            .map(|l| l.as_str())
            .collect();

        println!("{} ({}):", title, extensions.join(", "));
        for rule in rules::rules_for(strategy) {
            println!(
                "  {:<22} {:<14} {:<7} {}",
                rule.id,
                rule.issue_type.as_str(),
                rule.severity.as_str(),
                rule.description
            );
        }
        println!();
    }

    println!("All languages:");
    let rule = &rules::ANALYSIS_ERROR;
    println!(
        "  {:<22} {:<14} {:<7} {}",
        rule.id,
        rule.issue_type.as_str(),
        rule.severity.as_str(),
        rule.description
    );

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let yaml = serde_yaml::to_string(&ReviewConfig::default())?;
    if let Err(e) = std::fs::write(&args.output, yaml) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: codereview review . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

