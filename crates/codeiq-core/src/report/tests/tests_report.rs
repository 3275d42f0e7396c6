//! Tests for report writing and summaries

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;

use chrono::Utc;
use rstest::rstest;
use tempfile::TempDir;

use crate::config::ConfigError;
use crate::orchestrator::{ScanMetadata, ScanReport, ScoreOutcome};
use crate::report::{summarize, write_report, OutputFormat};
use crate::scanner::{FileResult, FileResults, ScannerResults};
use crate::score::{CategoryScore, FileScoreSummary, RepoScoreSnapshot};

/// Health and knowledge contributions, nothing for security
fn scored_file() -> FileScoreSummary {
    let contributed = |name: &str| {
        CategoryScore::from_contributions(BTreeMap::from([(name.to_string(), FileResult::clean())]))
    };
    FileScoreSummary {
        health: contributed("Linter"),
        knowledge: contributed("Todos"),
        ..FileScoreSummary::default()
    }
}

fn sample_report() -> ScanReport {
    let linter: FileResults = BTreeMap::from([
        ("/repo/a.py".to_string(), FileResult::clean()),
        ("/repo/b.py".to_string(), FileResult::failed("Linting timeout (60s)")),
    ]);
    let scanner_results: ScannerResults = BTreeMap::from([
        ("Linter".to_string(), linter),
        ("Secrets".to_string(), FileResults::new()),
    ]);
    ScanReport {
        metadata: ScanMetadata {
            path_scanned: "/repo".to_string(),
            scanners_run: vec!["Linter".to_string(), "Secrets".to_string()],
            total_scan_time: 1.25,
            timestamp: Utc::now(),
        },
        scanner_results,
        failures: BTreeMap::from([("Secrets".to_string(), "trufflehog missing".to_string())]),
    }
}

#[rstest]
#[case("json")]
#[case("JSON")]
fn test_json_format_parses(#[case] input: &str) {
    assert_eq!(input.parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
}

#[rstest]
#[case("yaml")]
#[case("")]
fn test_unknown_format_is_config_error(#[case] input: &str) {
    assert!(matches!(
        input.parse::<OutputFormat>(),
        Err(ConfigError::UnknownFormat(name)) if name == input
    ));
}

#[test]
fn test_write_report_appends_extension() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let stem = temp_dir.path().join("scan.results");

    let path = write_report(&sample_report(), None, &stem, OutputFormat::Json).expect("write");

    assert_eq!(path, temp_dir.path().join("scan.results.json"));
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(written["metadata"]["path_scanned"], "/repo");
    assert_eq!(written["scanner_results"]["Linter"]["/repo/a.py"]["score"], 100.0);
    assert_eq!(written["failures"]["Secrets"], "trufflehog missing");
    assert!(written.get("scores").is_none());
}

#[test]
fn test_write_report_includes_scores() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let scores = ScoreOutcome {
        files: BTreeMap::new(),
        repo: RepoScoreSnapshot {
            health_score: Some(9.5),
            trend: Some(1.0),
            ..RepoScoreSnapshot::default()
        },
    };

    let path = write_report(
        &sample_report(),
        Some(&scores),
        &temp_dir.path().join("out"),
        OutputFormat::Json,
    )
    .expect("write");

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("json");
    assert_eq!(written["scores"]["repo"]["health_score"], 9.5);
}

#[test]
fn test_write_report_into_missing_directory_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let stem = temp_dir.path().join("missing").join("out");

    assert!(write_report(&sample_report(), None, &stem, OutputFormat::Json).is_err());
}

#[test]
fn test_summary_marks_scanner_outcomes() {
    let scores = ScoreOutcome {
        files: BTreeMap::from([("a.py".to_string(), scored_file())]),
        repo: RepoScoreSnapshot {
            health_score: Some(7.25),
            security_score: None,
            knowledge_score: Some(10.0),
            trend: Some(-0.5),
        },
    };

    let summary = summarize(&sample_report(), Some(&scores));

    assert!(summary.contains("Path: /repo"));
    assert!(summary.contains("Total scan time: 1.25s"));
    assert!(summary.contains("Files scanned: 2"));
    assert!(summary.contains("✓ Linter: 2 files"));
    assert!(summary.contains("✗ Secrets: trufflehog missing"));
    assert!(summary.contains("health: 7.2/10") || summary.contains("health: 7.3/10"));
    assert!(summary.contains("security: n/a"));
    assert!(summary.contains("trend: -0.50"));
}

#[test]
fn test_summary_separates_uncovered_category_from_zero() {
    let scores = ScoreOutcome {
        files: BTreeMap::from([("a.py".to_string(), scored_file())]),
        repo: RepoScoreSnapshot {
            health_score: Some(10.0),
            security_score: Some(0.0),
            knowledge_score: Some(10.0),
            trend: None,
        },
    };

    let summary = summarize(&sample_report(), Some(&scores));

    assert!(summary.contains("health: 10.0/10"));
    assert!(summary.contains("security: no scanners"));
    assert!(summary.contains("trend: n/a"));
    assert!(summary.ends_with(&"=".repeat(60)));
}
