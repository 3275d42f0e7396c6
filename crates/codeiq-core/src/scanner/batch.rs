//! Batch runner: bounded worker pool over consecutive file batches

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{FileResult, FileResults};
use crate::config::{default_max_workers, ScanConfig, DEFAULT_BATCH_SIZE};
use crate::discovery::FileHandle;

/// Splits a file set into batches and scans each batch on a bounded pool
///
/// Every input file yields exactly one entry in the output. A scan function
/// that errors or panics for one file produces `FileResult::failed` for that
/// file only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRunner {
    batch_size: usize,
    max_workers: usize,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, default_max_workers())
    }
}

impl BatchRunner {
    /// Create a runner; zero bounds are raised to 1
    #[must_use]
    pub fn new(batch_size: usize, max_workers: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_workers: max_workers.max(1),
        }
    }

    /// Create a runner from the scan configuration
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.batch_size, config.max_workers)
    }

    /// Get the batch size
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Get the worker bound
    #[must_use]
    pub const fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Scan `files` with `scan_fn`, one batch at a time
    pub async fn run<F, Fut, E>(&self, files: Vec<FileHandle>, scan_fn: F) -> FileResults
    where
        F: Fn(FileHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FileResult, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let scan_fn = Arc::new(scan_fn);
        let mut results = FileResults::new();

        for (index, batch) in files.chunks(self.batch_size).enumerate() {
            debug!("Scanning batch {} ({} files)", index + 1, batch.len());
            let permits = Arc::new(Semaphore::new(self.max_workers));

            let tasks: Vec<(String, JoinHandle<Result<FileResult, String>>)> = batch
                .iter()
                .map(|file| {
                    let file = file.clone();
                    let key = file.key();
                    let scan_fn = Arc::clone(&scan_fn);
                    let permits = Arc::clone(&permits);
                    let task = tokio::spawn(async move {
                        let _permit = permits.acquire_owned().await.ok();
                        (*scan_fn)(file).await.map_err(|e| e.to_string())
                    });
                    (key, task)
                })
                .collect();

            for (key, task) in tasks {
                let result = match task.await {
                    Ok(Ok(result)) => result,
                    Ok(Err(error)) => FileResult::failed(error),
                    Err(join_error) => {
                        FileResult::failed(format!("scan task aborted: {join_error}"))
                    }
                };
                results.insert(key, result);
            }
        }

        results
    }
}
