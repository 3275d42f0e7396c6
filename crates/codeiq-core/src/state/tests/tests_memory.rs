//! Tests for MemoryStateStore

#![allow(clippy::expect_used)]

use crate::score::{FileScoreRecord, FileScoreSummary, RepoScoreSnapshot};
use crate::state::{JobStatus, MemoryStateStore, ScanJobState, ScanStateStore};

#[tokio::test]
async fn test_state_round_trip() {
    let store = MemoryStateStore::new();
    assert!(store.get_state("scan-1").await.expect("read").is_none());

    let state = ScanJobState::running(["Linter"]);
    store.set_state("scan-1", &state).await.expect("write");

    let stored = store.get_state("scan-1").await.expect("read");
    assert_eq!(stored, Some(state));
    assert_eq!(stored.map(|s| s.status), Some(JobStatus::Running));
}

#[tokio::test]
async fn test_snapshot_replaced_by_update() {
    let store = MemoryStateStore::new();
    let previous = RepoScoreSnapshot {
        health_score: Some(5.0),
        ..RepoScoreSnapshot::default()
    };
    store.seed_snapshot("repo", previous.clone()).await;
    assert_eq!(
        store.get_snapshot("repo").await.expect("read"),
        Some(previous)
    );

    let next = RepoScoreSnapshot {
        health_score: Some(7.0),
        trend: Some(2.0),
        ..RepoScoreSnapshot::default()
    };
    store.update_repo_scores("repo", &next).await.expect("write");

    assert_eq!(store.get_snapshot("repo").await.expect("read"), Some(next));
    assert_eq!(store.get_snapshot("other").await.expect("read"), None);
}

#[tokio::test]
async fn test_file_scores_upsert_by_path() {
    let store = MemoryStateStore::new();
    let record = |hash: &str| FileScoreRecord {
        path: "src/a.py".to_string(),
        content_hash: Some(hash.to_string()),
        summary: FileScoreSummary::default(),
    };

    store.upsert_file_score("repo", &record("one")).await.expect("write");
    store.upsert_file_score("repo", &record("two")).await.expect("write");

    let scores = store.file_scores("repo").await;
    assert_eq!(scores.len(), 1);
    assert_eq!(scores["src/a.py"].content_hash.as_deref(), Some("two"));
    assert!(store.file_scores("missing").await.is_empty());
}
