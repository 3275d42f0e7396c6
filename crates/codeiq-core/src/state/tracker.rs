//! Exclusive read-modify-write over a scan's state document

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::{JobStatus, ScanJobState, ScanStateStore, StoreError, TransitionError};

/// Errors from a tracked state update
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Lifecycle error: {0}")]
    Transition(#[from] TransitionError),

    #[error("No state recorded for scan {0}")]
    Missing(String),
}

/// Serializes every state update of one scan through a single lock
///
/// Each update reads the whole document, mutates it and writes it back while
/// holding the lock, so concurrent scanners never overwrite each other's
/// transitions. The lock is only held for that span, never during a scan.
///
/// A store with conditional writes could replace the lock with a
/// compare-and-swap retry loop on a document version.
pub struct LifecycleTracker {
    store: Arc<dyn ScanStateStore>,
    scan_id: String,
    lock: Mutex<()>,
}

impl LifecycleTracker {
    /// Track the state document of `scan_id`
    #[must_use]
    pub fn new(store: Arc<dyn ScanStateStore>, scan_id: impl Into<String>) -> Self {
        Self {
            store,
            scan_id: scan_id.into(),
            lock: Mutex::new(()),
        }
    }

    /// Get the scan id
    #[must_use]
    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    /// Write a running job with every scanner waiting
    ///
    /// # Errors
    /// Returns an error if the store write fails.
    pub async fn initialize<I, S>(&self, scanners: I) -> Result<ScanJobState, TrackerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let _guard = self.lock.lock().await;
        let state = ScanJobState::running(scanners);
        self.store.set_state(&self.scan_id, &state).await?;
        Ok(state)
    }

    /// Read, mutate and write the state document as one exclusive unit
    ///
    /// # Errors
    /// Returns an error if the state is missing, the mutation is rejected,
    /// or the store fails.
    pub async fn update<F>(&self, mutate: F) -> Result<ScanJobState, TrackerError>
    where
        F: FnOnce(&mut ScanJobState) -> Result<(), TransitionError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut state = self
            .store
            .get_state(&self.scan_id)
            .await?
            .ok_or_else(|| TrackerError::Missing(self.scan_id.clone()))?;
        mutate(&mut state)?;
        self.store.set_state(&self.scan_id, &state).await?;
        Ok(state)
    }

    /// Move `scanner` from waiting to inProgress
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn start(&self, scanner: &str) -> Result<ScanJobState, TrackerError> {
        debug!("Scan {}: {} -> inProgress", self.scan_id, scanner);
        self.update(|state| state.states.start(scanner)).await
    }

    /// Move `scanner` from inProgress to completed
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn complete(&self, scanner: &str) -> Result<ScanJobState, TrackerError> {
        debug!("Scan {}: {} -> completed", self.scan_id, scanner);
        self.update(|state| state.states.complete(scanner)).await
    }

    /// Move `scanner` to failed
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn fail(&self, scanner: &str) -> Result<ScanJobState, TrackerError> {
        debug!("Scan {}: {} -> failed", self.scan_id, scanner);
        self.update(|state| state.states.fail(scanner)).await
    }

    /// Mark the whole job completed
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn mark_completed(&self) -> Result<ScanJobState, TrackerError> {
        self.update(|state| {
            state.status = JobStatus::Completed;
            state.completed_at = Some(Utc::now());
            Ok(())
        })
        .await
    }

    /// Mark the whole job failed with `error`
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn mark_failed(&self, error: impl Into<String>) -> Result<ScanJobState, TrackerError> {
        let error = error.into();
        self.update(move |state| {
            state.status = JobStatus::Failed;
            state.error = Some(error);
            Ok(())
        })
        .await
    }
}
