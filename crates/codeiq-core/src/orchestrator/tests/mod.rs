//! Orchestrator tests and the fakes they share

#![allow(clippy::panic)]
#![allow(clippy::expect_used)]

mod tests_job;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ScanConfig;
use crate::discovery::{ExtensionFilter, FileHandle, StaticFileLister};
use crate::notify::{LifecycleEvent, LifecycleNotifier, NotifyError};
use crate::orchestrator::ScanOrchestrator;
use crate::scanner::{FileResult, FileResults, Scanner, ScannerError};
use crate::score::{FileScoreRecord, RepoScoreSnapshot};
use crate::state::{MemoryStateStore, ScanJobState, ScanStateStore, StoreError};

/// What a scripted scanner does when asked to scan
#[derive(Debug, Clone, Copy)]
pub(super) enum Script {
    /// Score every file with this many findings
    Findings(usize),
    Fail,
    Panic,
}

/// Scanner following a script, optionally tracking how many run at once
pub(super) struct ScriptedScanner {
    pub name: &'static str,
    pub script: Script,
    pub delay: Duration,
    pub gauge: Option<Arc<Gauge>>,
}

impl ScriptedScanner {
    pub fn new(name: &'static str, script: Script) -> Self {
        Self {
            name,
            script,
            delay: Duration::ZERO,
            gauge: None,
        }
    }
}

#[async_trait]
impl Scanner for ScriptedScanner {
    fn name(&self) -> &str {
        self.name
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::Any
    }

    async fn scan(&self, files: Vec<FileHandle>) -> Result<FileResults, ScannerError> {
        if let Some(gauge) = &self.gauge {
            gauge.enter();
        }
        tokio::time::sleep(self.delay).await;
        if let Some(gauge) = &self.gauge {
            gauge.leave();
        }

        match self.script {
            Script::Findings(n) => Ok(files
                .iter()
                .map(|f| {
                    let findings = vec![format!("{}: finding", f.key()); n];
                    (f.key(), FileResult::from_findings(&findings))
                })
                .collect()),
            Script::Fail => Err(ScannerError::Other(format!("{} exploded", self.name))),
            Script::Panic => panic!("{} panicked", self.name),
        }
    }
}

/// Current and peak number of concurrent scans
#[derive(Debug, Default)]
pub(super) struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Memory store that keeps every state document written
#[derive(Default)]
pub(super) struct RecordingStore {
    pub inner: MemoryStateStore,
    pub writes: Mutex<Vec<ScanJobState>>,
}

impl RecordingStore {
    pub fn writes(&self) -> Vec<ScanJobState> {
        self.writes.lock().expect("writes lock").clone()
    }
}

#[async_trait]
impl ScanStateStore for RecordingStore {
    async fn get_state(&self, scan_id: &str) -> Result<Option<ScanJobState>, StoreError> {
        self.inner.get_state(scan_id).await
    }

    async fn set_state(&self, scan_id: &str, state: &ScanJobState) -> Result<(), StoreError> {
        self.writes.lock().expect("writes lock").push(state.clone());
        tokio::task::yield_now().await;
        self.inner.set_state(scan_id, state).await
    }

    async fn get_snapshot(&self, repo_id: &str) -> Result<Option<RepoScoreSnapshot>, StoreError> {
        self.inner.get_snapshot(repo_id).await
    }

    async fn upsert_file_score(
        &self,
        repo_id: &str,
        record: &FileScoreRecord,
    ) -> Result<(), StoreError> {
        self.inner.upsert_file_score(repo_id, record).await
    }

    async fn update_repo_scores(
        &self,
        repo_id: &str,
        snapshot: &RepoScoreSnapshot,
    ) -> Result<(), StoreError> {
        self.inner.update_repo_scores(repo_id, snapshot).await
    }
}

/// Store that is always down
pub(super) struct BrokenStore;

#[async_trait]
impl ScanStateStore for BrokenStore {
    async fn get_state(&self, _scan_id: &str) -> Result<Option<ScanJobState>, StoreError> {
        Err(StoreError::Backend("down".to_string()))
    }

    async fn set_state(&self, _scan_id: &str, _state: &ScanJobState) -> Result<(), StoreError> {
        Err(StoreError::Backend("down".to_string()))
    }

    async fn get_snapshot(&self, _repo_id: &str) -> Result<Option<RepoScoreSnapshot>, StoreError> {
        Err(StoreError::Backend("down".to_string()))
    }

    async fn upsert_file_score(
        &self,
        _repo_id: &str,
        _record: &FileScoreRecord,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("down".to_string()))
    }

    async fn update_repo_scores(
        &self,
        _repo_id: &str,
        _snapshot: &RepoScoreSnapshot,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("down".to_string()))
    }
}

/// Notifier that records every event, optionally failing each delivery
#[derive(Default)]
pub(super) struct RecordingNotifier {
    pub events: Mutex<Vec<LifecycleEvent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

#[async_trait]
impl LifecycleNotifier for RecordingNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), NotifyError> {
        self.events.lock().expect("events lock").push(event.clone());
        if self.fail {
            Err(NotifyError::Config("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Handles for `a.py` and `b.py` under `root`
pub(super) fn two_files(root: &Path) -> Vec<FileHandle> {
    vec![
        FileHandle::local(root.join("a.py")),
        FileHandle::local(root.join("b.py")),
    ]
}

pub(super) fn orchestrator(
    store: Arc<dyn ScanStateStore>,
    notifier: Arc<dyn LifecycleNotifier>,
    files: Vec<FileHandle>,
    max_concurrent_scanners: usize,
) -> ScanOrchestrator {
    let config = ScanConfig::default().with_max_concurrent_scanners(max_concurrent_scanners);
    ScanOrchestrator::new(
        store,
        notifier,
        Arc::new(StaticFileLister::new(files)),
        config,
    )
}
