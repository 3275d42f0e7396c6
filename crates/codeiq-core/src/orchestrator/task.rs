//! One scanner's lifecycle within a run

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::discovery::FileLister;
use crate::notify::{LifecycleEvent, LifecycleEventKind, LifecycleNotifier};
use crate::scanner::{FileResults, Scanner, ScannerError};
use crate::state::{LifecycleTracker, ScanJobState, ScannerPhase, TrackerError};

/// Records a scanner's transitions and announces them
///
/// Store and notification failures are logged and swallowed.
#[derive(Clone)]
pub(super) struct LifecycleReporter {
    pub name: String,
    pub root: PathBuf,
    pub tracker: Arc<LifecycleTracker>,
    pub notifier: Arc<dyn LifecycleNotifier>,
}

impl LifecycleReporter {
    pub async fn started(&self) {
        let result = self.tracker.start(&self.name).await;
        self.log_rejected(ScannerPhase::InProgress, result);
        self.notify(LifecycleEventKind::Started).await;
    }

    pub async fn finished(&self) {
        let result = self.tracker.complete(&self.name).await;
        self.log_rejected(ScannerPhase::Completed, result);
        self.notify(LifecycleEventKind::Finished).await;
    }

    pub async fn failed(&self) {
        let result = self.tracker.fail(&self.name).await;
        self.log_rejected(ScannerPhase::Failed, result);
        self.notify(LifecycleEventKind::Failed).await;
    }

    fn log_rejected(&self, to: ScannerPhase, result: Result<ScanJobState, TrackerError>) {
        if let Err(e) = result {
            warn!(
                "Scan {}: could not record {} as {}: {}",
                self.tracker.scan_id(),
                self.name,
                to,
                e
            );
        }
    }

    async fn notify(&self, kind: LifecycleEventKind) {
        let event = LifecycleEvent::scanner(
            kind,
            self.name.clone(),
            self.root.display().to_string(),
            self.tracker.scan_id(),
        );
        if let Err(e) = self.notifier.notify(&event).await {
            warn!("Notification {:?} failed for {}: {}", kind, self.name, e);
        }
    }
}

/// Runs one scanner between its lifecycle transitions
pub(super) struct ScannerTask {
    pub reporter: LifecycleReporter,
    pub scanner: Arc<dyn Scanner>,
    pub lister: Arc<dyn FileLister>,
}

impl ScannerTask {
    /// start -> scan -> complete | fail; only the scan's own error is returned
    pub async fn execute(self) -> Result<FileResults, String> {
        self.reporter.started().await;

        let outcome = AssertUnwindSafe(self.scan())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ScannerError::Other(panic_message(&*panic))));

        match outcome {
            Ok(results) => {
                info!("✓ {} completed ({} files)", self.reporter.name, results.len());
                self.reporter.finished().await;
                Ok(results)
            }
            Err(scan_error) => {
                error!("✗ {} failed: {}", self.reporter.name, scan_error);
                self.reporter.failed().await;
                Err(scan_error.to_string())
            }
        }
    }

    async fn scan(&self) -> Result<FileResults, ScannerError> {
        let files = self
            .lister
            .list(&self.reporter.root, &self.scanner.extensions())
            .await?;
        debug!("{} scanning {} files", self.reporter.name, files.len());
        self.scanner.scan(files).await
    }
}

/// Text of a caught panic payload
fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("scanner panicked: {detail}")
}
