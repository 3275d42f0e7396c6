//! Scanner module: Scanner contracts, per-file results and batching
//!
//! A scanner inspects the files matching its extension filter and emits one
//! [`FileResult`] per file. Scanners either scan file by file (driven by the
//! [`BatchRunner`] worker pool) or batch at the tool-invocation level and
//! demultiplex the tool's combined output back to files.

mod batch;
mod lint;
mod registry;
mod secrets;
mod todo;
mod tool;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::discovery::{DiscoveryError, ExtensionFilter, FileHandle};

pub use batch::BatchRunner;
pub use lint::LintScanner;
pub use registry::{Category, CategoryMembership, ScannerRegistry};
pub use secrets::SecretScanner;
pub use todo::TodoScanner;
pub use tool::{demultiplex, fail_all, ExternalTool, ToolError, ToolOutput};

/// Results of one scanner, keyed by file path
pub type FileResults = BTreeMap<String, FileResult>;

/// Results of every scanner, keyed by scanner name
pub type ScannerResults = BTreeMap<String, FileResults>;

/// Score given to a file with no findings
pub const FULL_SCORE: f64 = 100.0;

/// The outcome of scanning one file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileResult {
    /// Free-form diagnostic output
    #[serde(default)]
    pub raw: String,
    /// Errors hit while scanning this file
    #[serde(default)]
    pub errors: Vec<String>,
    /// Scanner-defined score, typically 0-100; may go negative
    #[serde(default)]
    pub score: Option<f64>,
}

impl FileResult {
    /// Full marks, no findings
    #[must_use]
    pub fn clean() -> Self {
        Self {
            raw: String::new(),
            errors: Vec::new(),
            score: Some(FULL_SCORE),
        }
    }

    /// One point off per finding; `raw` is the findings joined by newline
    #[must_use]
    pub fn from_findings(findings: &[String]) -> Self {
        Self {
            raw: findings.join("\n"),
            errors: Vec::new(),
            score: Some(FULL_SCORE - findings.len() as f64),
        }
    }

    /// A failed scan of this file: score 0 and the error text
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            raw: String::new(),
            errors: vec![error.into()],
            score: Some(0.0),
        }
    }

    /// Score used for aggregation (absent counts as 0)
    #[must_use]
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Errors that abort a whole scanner run
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("File discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

/// A unit that scans a file set and scores every file
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Unique scanner name
    fn name(&self) -> &str;

    /// Extensions this scanner handles
    fn extensions(&self) -> ExtensionFilter;

    /// Scan `files`, returning one result per file
    ///
    /// # Errors
    /// Returns an error if the scanner cannot run at all.
    async fn scan(&self, files: Vec<FileHandle>) -> Result<FileResults, ScannerError>;
}

/// A scanner that handles one file at a time
#[async_trait]
pub trait FileScanner: Send + Sync + 'static {
    /// Unique scanner name
    fn name(&self) -> &str;

    /// Extensions this scanner handles
    fn extensions(&self) -> ExtensionFilter;

    /// Scan a single file
    ///
    /// # Errors
    /// Returns an error if the file cannot be scanned.
    async fn scan_file(&self, file: &FileHandle) -> Result<FileResult, ScannerError>;
}

/// Adapts a [`FileScanner`] into a [`Scanner`] driven by a [`BatchRunner`]
pub struct PerFileScanner<S> {
    inner: Arc<S>,
    runner: BatchRunner,
}

impl<S: FileScanner> PerFileScanner<S> {
    /// Wrap `inner`, scanning through `runner`
    #[must_use]
    pub fn new(inner: S, runner: BatchRunner) -> Self {
        Self {
            inner: Arc::new(inner),
            runner,
        }
    }
}

#[async_trait]
impl<S: FileScanner> Scanner for PerFileScanner<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn extensions(&self) -> ExtensionFilter {
        self.inner.extensions()
    }

    async fn scan(&self, files: Vec<FileHandle>) -> Result<FileResults, ScannerError> {
        let inner = Arc::clone(&self.inner);
        Ok(self
            .runner
            .run(files, move |file| {
                let inner = Arc::clone(&inner);
                async move { inner.scan_file(&file).await }
            })
            .await)
    }
}

#[cfg(test)]
mod tests;
