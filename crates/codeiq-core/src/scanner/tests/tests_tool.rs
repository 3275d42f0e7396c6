//! Tests for external tool invocation

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use crate::discovery::FileHandle;
use crate::scanner::{demultiplex, fail_all, ExternalTool, FileResult, ToolError};

fn sh(script: &str) -> ExternalTool {
    ExternalTool::new("sh", ["-c", script, "tool"])
}

#[tokio::test]
async fn test_run_captures_output_and_exit_code() {
    let tool = sh("echo out; echo err >&2; exit 1").with_allowed_exit_codes(vec![0, 1]);

    let output = tool
        .run(&[], Duration::from_secs(10))
        .await
        .expect("tool should run");

    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
    assert_eq!(output.code, 1);
}

#[tokio::test]
async fn test_targets_are_appended() {
    let tool = sh(r#"for f in "$@"; do echo "$f"; done"#);

    let output = tool
        .run(&["a.py".to_string(), "b.py".to_string()], Duration::from_secs(10))
        .await
        .expect("tool should run");

    assert_eq!(output.stdout, "a.py\nb.py\n");
}

#[tokio::test]
async fn test_disallowed_exit_code_is_a_crash() {
    let tool = sh("echo 'fatal: bad config' >&2; exit 3").with_allowed_exit_codes(vec![0, 1]);

    let err = tool
        .run(&[], Duration::from_secs(10))
        .await
        .expect_err("exit 3 should be a crash");

    assert!(matches!(err, ToolError::Crash { code: Some(3), .. }));
    assert_eq!(err.crash_message(), "fatal: bad config");
}

#[tokio::test]
async fn test_crash_without_stderr_names_the_tool() {
    let err = sh("exit 2")
        .run(&[], Duration::from_secs(10))
        .await
        .expect_err("exit 2 should be a crash");

    assert_eq!(err.crash_message(), "sh crash");
}

#[tokio::test]
async fn test_timeout() {
    let err = sh("sleep 5")
        .run(&[], Duration::from_millis(200))
        .await
        .expect_err("sleep should time out");

    assert!(matches!(err, ToolError::Timeout { .. }));
}

#[tokio::test]
async fn test_missing_program_is_a_spawn_error() {
    let tool = ExternalTool::new("codeiq-definitely-not-installed", Vec::<String>::new());

    let err = tool
        .run(&[], Duration::from_secs(1))
        .await
        .expect_err("missing program should fail");

    assert!(matches!(err, ToolError::Spawn { .. }));
}

#[test]
fn test_demultiplex_routes_findings_and_fills_clean_results() {
    let a = FileHandle::local("a.py");
    let b = FileHandle::local("b.py");
    let files = vec![&a, &b];
    let findings = vec![
        ("a.py".to_string(), "a.py:1:1 x".to_string()),
        ("a.py".to_string(), "a.py:2:1 y".to_string()),
        ("elsewhere.py".to_string(), "elsewhere.py:1:1 z".to_string()),
    ];

    let results = demultiplex(&files, findings);

    assert_eq!(results.len(), 2);
    assert_eq!(results["a.py"].score, Some(98.0));
    assert_eq!(results["a.py"].raw, "a.py:1:1 x\na.py:2:1 y");
    assert_eq!(results["b.py"], FileResult::clean());
}

#[test]
fn test_fail_all() {
    let a = FileHandle::local("a.py");
    let b = FileHandle::local("b.py");

    let results = fail_all(&[&a, &b], "boom");

    assert_eq!(results.len(), 2);
    assert!(results.values().all(|r| *r == FileResult::failed("boom")));
}
