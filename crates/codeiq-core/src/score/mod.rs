//! Score module: Reduction of raw scanner output into category scores
//!
//! Per file, each category score is the mean of the contributing scanners'
//! scores mapped from 0-100 onto 0-10. Per repository, each category is
//! averaged across files and compared with the previous snapshot to yield a
//! trend.

mod aggregator;
mod repo;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scanner::{Category, FileResult};

pub use aggregator::ScoreAggregator;
pub use repo::{RepoScoreSnapshot, RepoScores};

/// Divisor mapping a 0-100 scanner score onto a 0-10 category score
pub const CATEGORY_SCALE: f64 = 10.0;

/// Score of one category for one file
///
/// A category with no contributing scanner is a defined zero: `score` is 0
/// and `scanners` is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: f64,
    /// Raw results of the scanners that contributed, keyed by scanner name
    pub scanners: BTreeMap<String, FileResult>,
}

impl CategoryScore {
    /// Mean of the contributing scores (absent counts as 0), divided by 10
    #[must_use]
    pub fn from_contributions(scanners: BTreeMap<String, FileResult>) -> Self {
        if scanners.is_empty() {
            return Self::default();
        }
        let total: f64 = scanners.values().map(FileResult::score_or_zero).sum();
        let score = total / scanners.len() as f64 / CATEGORY_SCALE;
        Self { score, scanners }
    }

    /// True when at least one scanner contributed
    #[must_use]
    pub fn has_contributions(&self) -> bool {
        !self.scanners.is_empty()
    }
}

/// All three category scores of one file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileScoreSummary {
    pub health: CategoryScore,
    pub security: CategoryScore,
    pub knowledge: CategoryScore,
}

impl FileScoreSummary {
    /// Score entry for `category`
    #[must_use]
    pub const fn get(&self, category: Category) -> &CategoryScore {
        match category {
            Category::Health => &self.health,
            Category::Security => &self.security,
            Category::Knowledge => &self.knowledge,
        }
    }

    fn set(&mut self, category: Category, score: CategoryScore) {
        match category {
            Category::Health => self.health = score,
            Category::Security => self.security = score,
            Category::Knowledge => self.knowledge = score,
        }
    }
}

/// Persisted per-file score record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileScoreRecord {
    /// Path relative to the scan root
    pub path: String,
    /// SHA-256 of the content, when it could be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub summary: FileScoreSummary,
}

#[cfg(test)]
mod tests;
