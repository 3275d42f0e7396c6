//! In-process state store

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ScanJobState, ScanStateStore, StoreError};
use crate::score::{FileScoreRecord, RepoScoreSnapshot};

/// State store backed by in-memory maps
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<String, ScanJobState>>,
    snapshots: RwLock<HashMap<String, RepoScoreSnapshot>>,
    file_scores: RwLock<HashMap<String, BTreeMap<String, FileScoreRecord>>>,
}

impl MemoryStateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the latest snapshot of a repository
    pub async fn seed_snapshot(&self, repo_id: impl Into<String>, snapshot: RepoScoreSnapshot) {
        self.snapshots.write().await.insert(repo_id.into(), snapshot);
    }

    /// File records stored for a repository, keyed by path
    pub async fn file_scores(&self, repo_id: &str) -> BTreeMap<String, FileScoreRecord> {
        self.file_scores
            .read()
            .await
            .get(repo_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScanStateStore for MemoryStateStore {
    async fn get_state(&self, scan_id: &str) -> Result<Option<ScanJobState>, StoreError> {
        Ok(self.states.read().await.get(scan_id).cloned())
    }

    async fn set_state(&self, scan_id: &str, state: &ScanJobState) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(scan_id.to_string(), state.clone());
        Ok(())
    }

    async fn get_snapshot(&self, repo_id: &str) -> Result<Option<RepoScoreSnapshot>, StoreError> {
        Ok(self.snapshots.read().await.get(repo_id).cloned())
    }

    async fn upsert_file_score(
        &self,
        repo_id: &str,
        record: &FileScoreRecord,
    ) -> Result<(), StoreError> {
        self.file_scores
            .write()
            .await
            .entry(repo_id.to_string())
            .or_default()
            .insert(record.path.clone(), record.clone());
        Ok(())
    }

    async fn update_repo_scores(
        &self,
        repo_id: &str,
        snapshot: &RepoScoreSnapshot,
    ) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .await
            .insert(repo_id.to_string(), snapshot.clone());
        Ok(())
    }
}
