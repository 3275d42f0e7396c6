//! Scan job builder and git integration

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One orchestrated scan of a repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    /// Key of the state document in the store
    pub scan_id: String,
    /// Key of the repository snapshot the scores roll up into
    pub repo_id: String,
    pub root: PathBuf,
    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScanJob {
    /// Create a job with a fresh scan id; the repo id defaults to the root
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            scan_id: Uuid::new_v4().to_string(),
            repo_id: root.display().to_string(),
            root,
            commit_sha: None,
            branch: None,
            created_at: Utc::now(),
        }
    }

    /// Set the scan id
    #[must_use]
    pub fn with_scan_id(mut self, scan_id: impl Into<String>) -> Self {
        self.scan_id = scan_id.into();
        self
    }

    /// Set the repository id
    #[must_use]
    pub fn with_repo_id(mut self, repo_id: impl Into<String>) -> Self {
        self.repo_id = repo_id.into();
        self
    }

    /// Set the commit SHA
    #[must_use]
    pub fn with_commit(mut self, sha: impl Into<String>) -> Self {
        self.commit_sha = Some(sha.into());
        self
    }

    /// Set the branch
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Try to populate git info from the repository
    #[must_use]
    pub fn with_git_info(mut self) -> Self {
        if let Ok(repo) = git2::Repository::discover(&self.root) {
            if let Ok(head) = repo.head() {
                if let Some(oid) = head.target() {
                    self.commit_sha = Some(oid.to_string());
                }
                if let Some(name) = head.shorthand() {
                    self.branch = Some(name.to_string());
                }
            }
        }
        self
    }

    /// Get the scan root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
