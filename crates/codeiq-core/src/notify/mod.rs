//! Notify module: Best-effort lifecycle notifications
//!
//! Notifications are fire-and-forget. Callers log failures and move on; a
//! notification is never retried and never fails a scan.

mod http;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use http::HttpNotifier;

/// Errors from delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid notifier configuration: {0}")]
    Config(String),
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    Started,
    Finished,
    Failed,
    ScanComplete,
}

impl LifecycleEventKind {
    /// Path the event is posted to, relative to the backend base URL
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Started => "scan/individual_start",
            Self::Finished => "scan/individual_finish",
            Self::Failed => "scan/individual_failed",
            Self::ScanComplete => "scan/complete",
        }
    }
}

/// A scanner or scan lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleEvent {
    #[serde(skip)]
    pub kind: LifecycleEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub scan_id: String,
}

impl LifecycleEvent {
    /// A scanner-level event
    #[must_use]
    pub fn scanner(
        kind: LifecycleEventKind,
        scanner: impl Into<String>,
        path: impl Into<String>,
        scan_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            scanner: Some(scanner.into()),
            path: Some(path.into()),
            scan_id: scan_id.into(),
        }
    }

    /// The whole scan finished
    #[must_use]
    pub fn scan_complete(scan_id: impl Into<String>) -> Self {
        Self {
            kind: LifecycleEventKind::ScanComplete,
            scanner: None,
            path: None,
            scan_id: scan_id.into(),
        }
    }
}

/// Sink for lifecycle events
#[async_trait]
pub trait LifecycleNotifier: Send + Sync {
    /// Deliver `event`
    ///
    /// # Errors
    /// Returns an error if delivery fails; callers only log it.
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), NotifyError>;
}

/// Notifier used when no backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl LifecycleNotifier for NoopNotifier {
    async fn notify(&self, _event: &LifecycleEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
