//! Orchestrator module: Concurrent scanner execution and score generation
//!
//! Scanners run concurrently up to `max_concurrent_scanners`. Each scanner's
//! transitions go through one [`LifecycleTracker`] per job, so the state
//! document only ever changes inside an exclusive read-modify-write section.
//! Store and notification failures are logged and never abort a run.

mod job;
mod outcome;
mod task;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::discovery::{FileHandle, FileLister};
use crate::notify::{LifecycleEvent, LifecycleNotifier};
use crate::scanner::{Category, FileResults, Scanner, ScannerRegistry, ScannerResults};
use crate::score::{FileScoreRecord, RepoScoreSnapshot, RepoScores, ScoreAggregator};
use crate::state::{LifecycleTracker, ScanStateStore};

pub use job::ScanJob;
pub use outcome::{ScanMetadata, ScanReport, ScoreOutcome};

use task::{LifecycleReporter, ScannerTask};

/// Runs registered scanners over a job and reduces their results
pub struct ScanOrchestrator {
    registry: ScannerRegistry,
    store: Arc<dyn ScanStateStore>,
    notifier: Arc<dyn LifecycleNotifier>,
    lister: Arc<dyn FileLister>,
    config: ScanConfig,
}

impl ScanOrchestrator {
    /// Create an orchestrator with no scanners
    #[must_use]
    pub fn new(
        store: Arc<dyn ScanStateStore>,
        notifier: Arc<dyn LifecycleNotifier>,
        lister: Arc<dyn FileLister>,
        config: ScanConfig,
    ) -> Self {
        Self {
            registry: ScannerRegistry::new(),
            store,
            notifier,
            lister,
            config,
        }
    }

    /// Register `scanner` under `category`
    pub fn register_scanner(&mut self, scanner: Arc<dyn Scanner>, category: Category) {
        debug!("Registering {} under {}", scanner.name(), category);
        self.registry.register(scanner, category);
    }

    /// Get the scanner registry
    #[must_use]
    pub const fn registry(&self) -> &ScannerRegistry {
        &self.registry
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the selected scanners (all registered when `None`) over `job`
    ///
    /// Waits for every dispatched scanner. A scanner that fails or panics is
    /// recorded as failed and contributes an empty result map.
    pub async fn run(&self, job: &ScanJob, selection: Option<&[String]>) -> ScanReport {
        let started = Instant::now();
        let selected = self.select(selection);
        let tracker = Arc::new(LifecycleTracker::new(
            Arc::clone(&self.store),
            job.scan_id.clone(),
        ));

        if let Err(e) = tracker.initialize(selected.iter().cloned()).await {
            warn!("Scan {}: could not initialize state: {}", job.scan_id, e);
        }
        if selected.is_empty() {
            warn!("Scan {}: no registered scanner selected", job.scan_id);
            if let Err(e) = tracker.mark_failed("no scanners selected").await {
                warn!("Scan {}: could not mark job failed: {}", job.scan_id, e);
            }
        }

        info!("Starting scan of {}", job.root.display());
        info!("Running {} scanners: {}", selected.len(), selected.join(", "));

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_scanners.max(1)));
        let mut handles = Vec::with_capacity(selected.len());
        for name in &selected {
            let Some(scanner) = self.registry.get(name) else {
                continue;
            };
            let reporter = LifecycleReporter {
                name: name.clone(),
                root: job.root.clone(),
                tracker: Arc::clone(&tracker),
                notifier: Arc::clone(&self.notifier),
            };
            let task = ScannerTask {
                reporter: reporter.clone(),
                scanner,
                lister: Arc::clone(&self.lister),
            };
            let semaphore = Arc::clone(&semaphore);
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                task.execute().await
            });
            handles.push((reporter, handle));
        }

        let mut scanner_results = ScannerResults::new();
        let mut failures = BTreeMap::new();
        for (reporter, handle) in handles {
            let name = reporter.name.clone();
            match handle.await {
                Ok(Ok(results)) => {
                    scanner_results.insert(name, results);
                }
                Ok(Err(message)) => {
                    scanner_results.insert(name.clone(), FileResults::new());
                    failures.insert(name, message);
                }
                Err(join_error) => {
                    error!("✗ {} task aborted: {}", name, join_error);
                    reporter.failed().await;
                    scanner_results.insert(name.clone(), FileResults::new());
                    failures.insert(name, format!("scanner task aborted: {join_error}"));
                }
            }
        }

        let total_scan_time = started.elapsed().as_secs_f64();
        info!(
            "Scan {} finished in {:.2}s ({} failed)",
            job.scan_id,
            total_scan_time,
            failures.len()
        );

        ScanReport {
            metadata: ScanMetadata {
                path_scanned: job.root.display().to_string(),
                scanners_run: selected,
                total_scan_time,
                timestamp: Utc::now(),
            },
            scanner_results,
            failures,
        }
    }

    /// Aggregate, persist and announce the scores of a finished run
    ///
    /// Persists one record per file and the repository snapshot, marks the
    /// job completed and sends the scan-complete notification. Store and
    /// notification failures are logged; the computed scores are returned
    /// regardless.
    pub async fn generate_scores(&self, job: &ScanJob, report: &ScanReport) -> ScoreOutcome {
        let aggregator = ScoreAggregator::new(&job.root);
        let files = aggregator.aggregate(&report.scanner_results, &self.registry.membership());
        info!("Scored {} files", files.len());

        for (path, summary) in &files {
            let content_hash = FileHandle::local(job.root.join(path))
                .compute_hash()
                .await
                .ok();
            let record = FileScoreRecord {
                path: path.clone(),
                content_hash,
                summary: summary.clone(),
            };
            if let Err(e) = self.store.upsert_file_score(&job.repo_id, &record).await {
                warn!("Could not store scores for {}: {}", path, e);
            }
        }

        let scores = RepoScores::from_files(&files);

        let tracker = LifecycleTracker::new(Arc::clone(&self.store), job.scan_id.clone());
        if let Err(e) = tracker.mark_completed().await {
            warn!("Scan {}: could not mark job completed: {}", job.scan_id, e);
        }

        let previous = match self.store.get_snapshot(&job.repo_id).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Could not read previous snapshot of {}: {}", job.repo_id, e);
                None
            }
        };
        let repo = RepoScoreSnapshot::new(&scores, previous.as_ref());
        if let Err(e) = self.store.update_repo_scores(&job.repo_id, &repo).await {
            warn!("Could not store repository scores of {}: {}", job.repo_id, e);
        }

        if let Err(e) = self
            .notifier
            .notify(&LifecycleEvent::scan_complete(job.scan_id.clone()))
            .await
        {
            warn!("Scan-complete notification failed for {}: {}", job.scan_id, e);
        }

        ScoreOutcome { files, repo }
    }

    /// Registered names from `selection`, deduplicated, in order
    fn select(&self, selection: Option<&[String]>) -> Vec<String> {
        let requested = selection.map_or_else(|| self.registry.names(), <[String]>::to_vec);
        let mut selected: Vec<String> = Vec::with_capacity(requested.len());
        for name in requested {
            if self.registry.get(&name).is_none() {
                warn!("Unknown scanner {}, skipping", name);
            } else if !selected.contains(&name) {
                selected.push(name);
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests;
