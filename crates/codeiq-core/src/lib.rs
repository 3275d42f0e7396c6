//! codeiq-core: Concurrent code scanning and score aggregation
//!
//! Runs independent scanners (lint quality, secret detection, TODO
//! extraction) over a discovered file set, tracks each scanner's lifecycle
//! in a shared state store, and reduces the raw per-file output into
//! health, security and knowledge scores.
//!
//! # Scanner categories
//!
//! - **health** - lint findings (flake8)
//! - **security** - leaked secrets and PII (trufflehog)
//! - **knowledge** - TODO / FIXME markers

pub mod config;
pub mod discovery;
pub mod notify;
pub mod orchestrator;
pub mod report;
pub mod scanner;
pub mod score;
pub mod state;

// Re-export commonly used types
pub use config::{ConfigError, ScanConfig};
pub use discovery::{ExtensionFilter, FileHandle, FileLister, LocalFileLister};
pub use notify::{HttpNotifier, LifecycleEvent, LifecycleNotifier, NoopNotifier};
pub use orchestrator::{ScanJob, ScanOrchestrator, ScanReport, ScoreOutcome};
pub use scanner::{Category, FileResult, FileResults, Scanner, ScannerResults};
pub use score::{FileScoreSummary, RepoScoreSnapshot, ScoreAggregator};
pub use state::{MemoryStateStore, ScanStateStore, ScannerLifecycleState};
