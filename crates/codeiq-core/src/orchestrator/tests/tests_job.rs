//! Tests for ScanJob

#![allow(clippy::expect_used)]

use tempfile::TempDir;

use crate::orchestrator::ScanJob;

#[test]
fn test_new_defaults() {
    let job = ScanJob::new("/repo");

    assert_eq!(job.repo_id, "/repo");
    assert_eq!(job.root.to_str(), Some("/repo"));
    assert!(uuid::Uuid::parse_str(&job.scan_id).is_ok());
    assert_eq!(job.commit_sha, None);
    assert_eq!(job.branch, None);
}

#[test]
fn test_builder_methods() {
    let job = ScanJob::new("/repo")
        .with_scan_id("scan-1")
        .with_repo_id("repo-1")
        .with_commit("abc123")
        .with_branch("main");

    assert_eq!(job.scan_id, "scan-1");
    assert_eq!(job.repo_id, "repo-1");
    assert_eq!(job.commit_sha.as_deref(), Some("abc123"));
    assert_eq!(job.branch.as_deref(), Some("main"));
}

#[test]
fn test_git_info_outside_repository_is_unchanged() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let job = ScanJob::new(temp_dir.path()).with_git_info();

    // The temp dir may live inside a repository on some hosts
    if git2::Repository::discover(temp_dir.path()).is_err() {
        assert_eq!(job.commit_sha, None);
    }
}

#[test]
fn test_git_info_reads_head() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo = git2::Repository::init(temp_dir.path()).expect("init repo");
    std::fs::write(temp_dir.path().join("a.py"), "x = 1\n").expect("write file");

    let mut index = repo.index().expect("index");
    index
        .add_path(std::path::Path::new("a.py"))
        .expect("add file");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let signature = git2::Signature::now("Test", "test@example.com").expect("signature");
    let oid = repo
        .commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
        .expect("commit");

    let job = ScanJob::new(temp_dir.path()).with_git_info();

    assert_eq!(job.commit_sha, Some(oid.to_string()));
    assert!(job.branch.is_some());
}
