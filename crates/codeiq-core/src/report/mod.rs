//! Report module: Writing scan results to disk and summarizing them

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::ConfigError;
use crate::orchestrator::{ScanReport, ScoreOutcome};
use crate::scanner::Category;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// On-disk report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
}

impl OutputFormat {
    /// File extension written for this format
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    #[serde(flatten)]
    report: &'a ScanReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    scores: Option<&'a ScoreOutcome>,
}

/// Write `report` (and `scores`, when computed) to `<stem>.<format>`
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn write_report(
    report: &ScanReport,
    scores: Option<&ScoreOutcome>,
    stem: &Path,
    format: OutputFormat,
) -> Result<PathBuf, ReportError> {
    let mut target = stem.as_os_str().to_owned();
    target.push(".");
    target.push(format.extension());
    let target = PathBuf::from(target);

    let body = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&ReportDocument { report, scores })?,
    };
    std::fs::write(&target, body).map_err(|source| ReportError::Io {
        path: target.display().to_string(),
        source,
    })?;

    info!("Wrote report to {}", target.display());
    Ok(target)
}

/// Human-readable summary of a run
///
/// A category that no scanner contributed to in any file reads
/// "no scanners" rather than a defined zero.
#[must_use]
pub fn summarize(report: &ScanReport, scores: Option<&ScoreOutcome>) -> String {
    let rule = "=".repeat(60);
    let mut lines = vec![
        rule.clone(),
        "CODE SCAN SUMMARY".to_string(),
        rule.clone(),
        format!("Path: {}", report.metadata.path_scanned),
        format!("Total scan time: {:.2}s", report.metadata.total_scan_time),
        format!("Files scanned: {}", report.file_count()),
        String::new(),
        "Scanner Results:".to_string(),
    ];
    lines.extend(report.scanner_results.iter().map(|(name, files)| {
        report.failures.get(name).map_or_else(
            || format!("  ✓ {name}: {} files", files.len()),
            |error| format!("  ✗ {name}: {error}"),
        )
    }));

    if let Some(scores) = scores {
        lines.push(String::new());
        lines.push("Scores:".to_string());
        lines.extend(Category::ALL.iter().map(|category| category_line(scores, *category)));
        let trend = scores
            .repo
            .trend
            .map_or_else(|| "n/a".to_string(), |trend| format!("{trend:+.2}"));
        lines.push(format!("  trend: {trend}"));
    }

    lines.push(rule);
    lines.join("\n")
}

fn category_line(scores: &ScoreOutcome, category: Category) -> String {
    let repo = &scores.repo;
    let average = match category {
        Category::Health => repo.health_score,
        Category::Security => repo.security_score,
        Category::Knowledge => repo.knowledge_score,
    };
    let contributed = scores
        .files
        .values()
        .any(|file| file.get(category).has_contributions());

    match average {
        None => format!("  {category}: n/a"),
        Some(_) if !contributed => format!("  {category}: no scanners"),
        Some(score) => format!("  {category}: {score:.1}/10"),
    }
}

#[cfg(test)]
mod tests;
