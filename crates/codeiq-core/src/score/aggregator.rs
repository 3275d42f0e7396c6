//! Per-file aggregation

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CategoryScore, FileScoreSummary};
use crate::scanner::{Category, CategoryMembership, FileResult, ScannerResults};

/// Reduces scanner results into per-file category scores
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
}

impl ScoreAggregator {
    /// Create an aggregator normalizing keys against `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let canonical_root = std::fs::canonicalize(&root).ok();
        Self {
            root,
            canonical_root,
        }
    }

    /// Get the scan root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `key` relative to the root, or `key` unchanged if that fails
    #[must_use]
    pub fn normalize_key(&self, key: &str) -> String {
        let path = Path::new(key);

        if let Some(relative) = relative_to(path, &self.root) {
            return relative;
        }

        let canonical = self
            .canonical_root
            .as_ref()
            .zip(std::fs::canonicalize(path).ok())
            .and_then(|(root, path)| relative_to(&path, root));

        canonical.unwrap_or_else(|| key.to_string())
    }

    /// Per-file summaries keyed by normalized path
    ///
    /// Every file reported by any scanner gets an entry, and every entry has
    /// all three categories.
    #[must_use]
    pub fn aggregate(
        &self,
        results: &ScannerResults,
        membership: &CategoryMembership,
    ) -> BTreeMap<String, FileScoreSummary> {
        let mut by_file: BTreeMap<String, BTreeMap<&str, &FileResult>> = BTreeMap::new();
        for (scanner, files) in results {
            for (key, result) in files {
                by_file
                    .entry(self.normalize_key(key))
                    .or_default()
                    .insert(scanner.as_str(), result);
            }
        }
        debug!("Aggregating scores for {} files", by_file.len());

        by_file
            .into_iter()
            .map(|(path, scanners)| {
                let mut summary = FileScoreSummary::default();
                for category in Category::ALL {
                    let contributions = membership
                        .get(&category)
                        .into_iter()
                        .flatten()
                        .filter_map(|name| {
                            scanners
                                .get(name.as_str())
                                .map(|result| (name.clone(), (*result).clone()))
                        })
                        .collect();
                    summary.set(category, CategoryScore::from_contributions(contributions));
                }
                (path, summary)
            })
            .collect()
    }
}

fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.display().to_string())
}
