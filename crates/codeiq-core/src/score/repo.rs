//! Repository-level reduction and trend

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FileScoreSummary;
use crate::scanner::Category;

/// Category averages across the files of one scan
///
/// Every file carries a score for every category (zero when no scanner of
/// that category contributed), so a category average is only absent when no
/// file was scored at all. A category with no registered scanner therefore
/// averages to 0, the same as a category whose scanners all scored 0. The two
/// cases are not distinguished here; see `FileScoreSummary` contributions
/// when the difference matters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RepoScores {
    pub health: Option<f64>,
    pub security: Option<f64>,
    pub knowledge: Option<f64>,
}

impl RepoScores {
    /// Average each category across `files`
    #[must_use]
    pub fn from_files(files: &BTreeMap<String, FileScoreSummary>) -> Self {
        let average = |category: Category| {
            if files.is_empty() {
                return None;
            }
            let total: f64 = files.values().map(|f| f.get(category).score).sum();
            Some(total / files.len() as f64)
        };
        Self {
            health: average(Category::Health),
            security: average(Category::Security),
            knowledge: average(Category::Knowledge),
        }
    }

    /// Average of `category`, if any file was scored
    #[must_use]
    pub const fn get(&self, category: Category) -> Option<f64> {
        match category {
            Category::Health => self.health,
            Category::Security => self.security,
            Category::Knowledge => self.knowledge,
        }
    }

    /// Mean of the category averages that exist
    #[must_use]
    pub fn overall(&self) -> Option<f64> {
        let present: Vec<f64> = Category::ALL
            .iter()
            .filter_map(|c| self.get(*c))
            .collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}

/// Persisted repository scores with the trend against the previous snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepoScoreSnapshot {
    pub health_score: Option<f64>,
    pub security_score: Option<f64>,
    pub knowledge_score: Option<f64>,
    pub trend: Option<f64>,
}

impl RepoScoreSnapshot {
    /// Snapshot of `scores`, trending against `previous` (none means 0)
    ///
    /// The trend is unset when no file was scored.
    #[must_use]
    pub fn new(scores: &RepoScores, previous: Option<&Self>) -> Self {
        let before = previous.map_or(0.0, Self::overall_or_zero);
        Self {
            health_score: scores.health,
            security_score: scores.security,
            knowledge_score: scores.knowledge,
            trend: scores.overall().map(|current| current - before),
        }
    }

    /// Mean of the three category scores, unset categories counting as 0
    #[must_use]
    pub fn overall_or_zero(&self) -> f64 {
        let sum = self.health_score.unwrap_or(0.0)
            + self.security_score.unwrap_or(0.0)
            + self.knowledge_score.unwrap_or(0.0);
        sum / Category::ALL.len() as f64
    }
}
