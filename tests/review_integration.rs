//! Integration tests for a full review run over the sample project.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use codereview::review::IMPROVED_DIR;
use codereview::{Improver, IssueType, ReviewConfig, Reviewer};
use tempfile::TempDir;

fn sample_project() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("sample_project")
}

fn reviewer(config: ReviewConfig) -> Reviewer {
    let improver =
        Improver::new(&config).with_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    Reviewer::new(config).with_improver(improver)
}

#[test]
fn test_review_writes_improved_tree_and_reports() {
    let out = TempDir::new().unwrap();
    let outcome = reviewer(ReviewConfig::default())
        .review(&sample_project(), Some(out.path()))
        .expect("review should succeed");

    assert_eq!(outcome.files_reviewed, 3);

    let improved = out.path().join(IMPROVED_DIR);
    let app = fs::read_to_string(improved.join("app.py")).unwrap();
    assert!(app.starts_with("\"\"\"\napp.py\n"));
    assert!(app.contains("Date: 2024-01-02\n"));
    assert!(app.contains("    return ast.literal_eval(user_input)\n"));
    assert!(app.contains("    def greet(self, name):\n        \"\"\"Add description here\"\"\"\n"));

    assert_eq!(
        fs::read_to_string(improved.join("static/app.js")).unwrap(),
        "const count = 0;\nfunction tick() {\n  count += 1;\n  return count;\n}\n"
    );
    // No fix exists for TODO comments.
    assert_eq!(
        fs::read_to_string(improved.join("cmd/main.go")).unwrap(),
        fs::read_to_string(sample_project().join("cmd/main.go")).unwrap()
    );
    assert!(improved.join("README.md").is_file());

    for name in ["review_report.json", "review_report.html", "review_report.md"] {
        assert!(out.path().join(name).is_file(), "missing {}", name);
    }
}

#[test]
fn test_review_report_contents() {
    let out = TempDir::new().unwrap();
    let outcome = reviewer(ReviewConfig::default())
        .review(&sample_project(), Some(out.path()))
        .unwrap();
    let report = &outcome.report;

    // app.py: 2 docstrings, eval, concatenation; app.js: var, semicolon; main.go: TODO
    assert_eq!(report.summary.total_issues, 7);
    assert_eq!(report.summary.files_processed, 3);
    assert_eq!(report.summary.issues_by_type["documentation"], 2);
    assert_eq!(report.summary.issues_by_severity["high"], 1);

    let eval = report
        .issues
        .iter()
        .find(|i| i.issue_type == IssueType::Security)
        .unwrap();
    assert_eq!(eval.line_number, 5);
    assert_eq!(eval.improved_code, "    return ast.literal_eval(user_input)");

    let before = &report.metrics.before;
    let after = &report.metrics.after;
    assert_eq!(before.security_issues, 1);
    assert_eq!(after.security_issues, 0);
    assert_eq!(before.cyclomatic_complexity, 1);
    assert!(after.lines_of_code > before.lines_of_code);
    assert!((before.documentation_coverage - 2.0 / 3.0).abs() < 1e-9);
    assert!((after.documentation_coverage - 1.0).abs() < 1e-9);

    let delta = report.summary.improvement_metrics.as_ref().unwrap();
    assert_eq!(delta.security_fixes, 1);
    assert_eq!(delta.complexity_reduction, 0);

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.path().join("review_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["summary"]["total_issues"], 7);
    assert_eq!(json["metrics"]["after"]["security_issues"], 0);
}

#[test]
fn test_review_respects_toggles() {
    let config = ReviewConfig {
        include_documentation: false,
        fix_security_issues: false,
        ..Default::default()
    };
    let out = TempDir::new().unwrap();
    reviewer(config)
        .review(&sample_project(), Some(out.path()))
        .unwrap();

    let app = fs::read_to_string(out.path().join(IMPROVED_DIR).join("app.py")).unwrap();
    assert_eq!(
        app,
        fs::read_to_string(sample_project().join("app.py")).unwrap()
    );
}

#[test]
fn test_review_single_file_and_default_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("job.js");
    fs::write(&input, "var x = 1\n").unwrap();

    let outcome = reviewer(ReviewConfig::default()).review(&input, None).unwrap();
    assert_eq!(outcome.output_dir, temp.path().join("job.js_improved"));
    assert_eq!(
        fs::read_to_string(outcome.output_dir.join(IMPROVED_DIR).join("job.js")).unwrap(),
        "const x = 1;\n"
    );
}

#[test]
fn test_review_rejects_unsupported_single_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.txt");
    fs::write(&input, "hello\n").unwrap();
    assert!(reviewer(ReviewConfig::default()).review(&input, None).is_err());
}

#[test]
fn test_review_survives_bad_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    fs::create_dir_all(root.join("node_modules/dep")).unwrap();
    fs::write(root.join("bad.py"), [0xffu8, 0xfe, 0x00, 0x41]).unwrap();
    fs::write(root.join("broken.py"), "def f(:\n").unwrap();
    fs::write(root.join("node_modules/dep/index.js"), "var skipped\n").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let outcome = reviewer(ReviewConfig::default())
        .on_progress(Box::new(move |_: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .review(&root, None)
        .unwrap();

    assert_eq!(outcome.files_reviewed, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let types: Vec<IssueType> = outcome.report.issues.iter().map(|i| i.issue_type).collect();
    assert_eq!(types, vec![IssueType::AnalysisError, IssueType::Syntax]);

    let improved = outcome.output_dir.join(IMPROVED_DIR);
    assert_eq!(
        fs::read(improved.join("bad.py")).unwrap(),
        vec![0xffu8, 0xfe, 0x00, 0x41]
    );
    assert!(!improved.join("node_modules").exists());
}

#[cfg(unix)]
#[test]
fn test_review_survives_dangling_symlinks() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    fs::create_dir_all(root.join("node_modules/.bin")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    std::os::unix::fs::symlink("/nonexistent", root.join("node_modules/.bin/tool")).unwrap();
    std::os::unix::fs::symlink("/nonexistent/guide.md", root.join("docs/guide.md")).unwrap();
    fs::write(root.join("main.js"), "let ready = true;\n").unwrap();

    let outcome = reviewer(ReviewConfig::default()).review(&root, None).unwrap();
    assert_eq!(outcome.files_reviewed, 1);
    assert!(outcome.report.issues.is_empty());
    assert_eq!(
        fs::read_to_string(outcome.output_dir.join(IMPROVED_DIR).join("main.js")).unwrap(),
        "let ready = true;\n"
    );
}
