//! Run and scoring outcomes

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scanner::ScannerResults;
use crate::score::{FileScoreSummary, RepoScoreSnapshot};

/// Facts about one orchestrated run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub path_scanned: String,
    pub scanners_run: Vec<String>,
    /// Wall-clock seconds
    pub total_scan_time: f64,
    pub timestamp: DateTime<Utc>,
}

/// Everything a run produced
///
/// A failed scanner still has an entry in `scanner_results`, with no files,
/// and its error in `failures`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub metadata: ScanMetadata,
    pub scanner_results: ScannerResults,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failures: BTreeMap<String, String>,
}

impl ScanReport {
    /// Names of the scanners that completed
    #[must_use]
    pub fn succeeded(&self) -> Vec<&str> {
        self.scanner_results
            .keys()
            .filter(|name| !self.failures.contains_key(*name))
            .map(String::as_str)
            .collect()
    }

    /// Number of distinct file keys across all scanners
    #[must_use]
    pub fn file_count(&self) -> usize {
        let mut keys: Vec<&String> = self.scanner_results.values().flat_map(|f| f.keys()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

/// Aggregated scores of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub files: BTreeMap<String, FileScoreSummary>,
    pub repo: RepoScoreSnapshot,
}
