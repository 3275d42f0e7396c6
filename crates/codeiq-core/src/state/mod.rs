//! State module: Scan lifecycle state and the stores that persist it
//!
//! The store is a plain key-value interface with no partial-update
//! guarantees. [`LifecycleTracker`] provides the exclusive read-modify-write
//! section that keeps concurrent scanner transitions from overwriting each
//! other.

mod lifecycle;
mod memory;
mod neo4j;
mod tracker;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::score::{FileScoreRecord, RepoScoreSnapshot};

pub use lifecycle::{ScannerLifecycleState, ScannerPhase, TransitionError};
pub use memory::MemoryStateStore;
pub use neo4j::{Neo4jConfig, Neo4jStateStore};
pub use tracker::{LifecycleTracker, TrackerError};

/// Errors that can occur while reading or writing scan state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    Invalid(String),

    #[error("Store unavailable: {0}")]
    Backend(String),
}

/// Overall status of a scan job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Initializing,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for JobStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initializing" => Ok(Self::Initializing),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(StoreError::Invalid(format!("job status {other:?}"))),
        }
    }
}

/// The persisted state document of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJobState {
    pub status: JobStatus,
    pub states: ScannerLifecycleState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanJobState {
    /// A running job with every scanner waiting
    #[must_use]
    pub fn running<I, S>(scanners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: JobStatus::Running,
            states: ScannerLifecycleState::new(scanners),
            completed_at: None,
            error: None,
        }
    }
}

/// Durable scan state, previous snapshots and score records
///
/// Calls may be remote and slow. Implementations need not make partial
/// updates atomic; callers serialize read-modify-write cycles themselves.
#[async_trait]
pub trait ScanStateStore: Send + Sync {
    /// Read the state document of a scan
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    async fn get_state(&self, scan_id: &str) -> Result<Option<ScanJobState>, StoreError>;

    /// Replace the state document of a scan
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    async fn set_state(&self, scan_id: &str, state: &ScanJobState) -> Result<(), StoreError>;

    /// Latest repository snapshot, if any
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    async fn get_snapshot(&self, repo_id: &str) -> Result<Option<RepoScoreSnapshot>, StoreError>;

    /// Insert or replace the score record of one file
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    async fn upsert_file_score(
        &self,
        repo_id: &str,
        record: &FileScoreRecord,
    ) -> Result<(), StoreError>;

    /// Store `snapshot` as the repository's latest scores
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    async fn update_repo_scores(
        &self,
        repo_id: &str,
        snapshot: &RepoScoreSnapshot,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests;
