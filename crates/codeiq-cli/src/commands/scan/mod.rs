//! Scan command: Run the scanners over a repository and score it
//!
//! Configuration errors (unknown report format, invalid bounds, missing
//! store credentials) fail the command before anything runs. Once the scan
//! starts, scanner failures are reported but never fail the command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use codeiq_core::discovery::LocalFileLister;
use codeiq_core::notify::{HttpNotifier, LifecycleNotifier, NoopNotifier};
use codeiq_core::orchestrator::{ScanJob, ScanOrchestrator, ScanReport, ScoreOutcome};
use codeiq_core::report::{summarize, write_report, OutputFormat};
use codeiq_core::scanner::{
    BatchRunner, Category, LintScanner, PerFileScanner, SecretScanner, TodoScanner,
};
use codeiq_core::state::{MemoryStateStore, Neo4jStateStore, ScanStateStore};
use codeiq_core::ScanConfig;
use tracing::info;

use super::types::{Neo4jArgs, ScanArgs, StoreKind};

/// What a finished scan command produced
#[derive(Debug)]
pub struct ScanOutput {
    pub report: ScanReport,
    pub scores: Option<ScoreOutcome>,
    pub summary: String,
    pub report_path: Option<std::path::PathBuf>,
}

/// Run the scan command
///
/// # Errors
/// Returns an error if the configuration is invalid, the store cannot be
/// reached, or the report cannot be written.
pub async fn run(args: &ScanArgs) -> Result<ScanOutput> {
    let format: OutputFormat = args.format.parse()?;
    let config = build_config(args)?;

    let abs_path = args
        .path
        .canonicalize()
        .with_context(|| format!("Cannot scan {}", args.path.display()))?;
    let job = create_job(&abs_path, args);
    log_job_info(&job);

    let store = connect_store(args.store, &args.neo4j).await?;
    let notifier = build_notifier(args.backend_url.as_deref(), config.notify_timeout)?;
    let lister = Arc::new(LocalFileLister::new(config.exclude_patterns.clone()));

    let mut orchestrator = ScanOrchestrator::new(store, notifier, lister, config);
    register_default_scanners(&mut orchestrator)?;

    let selection = (!args.scanners.is_empty()).then_some(args.scanners.as_slice());
    let report = orchestrator.run(&job, selection).await;

    let scores = if report.scanner_results.is_empty() {
        None
    } else {
        Some(orchestrator.generate_scores(&job, &report).await)
    };

    let report_path = match &args.output {
        Some(stem) => Some(write_report(&report, scores.as_ref(), stem, format)?),
        None => None,
    };

    info!(
        "✓ Scan {} completed: {} scanners, {} failed",
        job.scan_id,
        report.scanner_results.len(),
        report.failures.len()
    );

    let summary = summarize(&report, scores.as_ref());
    Ok(ScanOutput {
        report,
        scores,
        summary,
        report_path,
    })
}

/// Scan configuration from the command flags
///
/// # Errors
/// Returns an error if a bound is zero.
pub fn build_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = ScanConfig::new()
        .with_max_concurrent_scanners(args.max_concurrent_scanners)
        .with_batch_size(args.batch_size)
        .with_tool_timeout(Duration::from_secs(args.tool_timeout));
    if let Some(workers) = args.max_workers {
        config = config.with_max_workers(workers);
    }
    if !args.exclude.is_empty() {
        let mut patterns = config.exclude_patterns.clone();
        patterns.extend(args.exclude.iter().cloned());
        config = config.with_exclude_patterns(patterns);
    }
    config.validate()?;
    Ok(config)
}

/// Linter (health), Secrets (security) and Todos (knowledge)
///
/// # Errors
/// Returns an error if a scanner rejects its configuration.
pub fn register_default_scanners(orchestrator: &mut ScanOrchestrator) -> Result<()> {
    let config = orchestrator.config().clone();

    orchestrator.register_scanner(Arc::new(LintScanner::flake8(&config)?), Category::Health);
    orchestrator.register_scanner(
        Arc::new(SecretScanner::trufflehog(&config)),
        Category::Security,
    );
    orchestrator.register_scanner(
        Arc::new(PerFileScanner::new(
            TodoScanner::new()?,
            BatchRunner::from_config(&config),
        )),
        Category::Knowledge,
    );
    Ok(())
}

fn create_job(abs_path: &Path, args: &ScanArgs) -> ScanJob {
    let mut job = ScanJob::new(abs_path).with_git_info();
    if let Some(scan_id) = &args.scan_id {
        job = job.with_scan_id(scan_id);
    }
    if let Some(repo_id) = &args.repo_id {
        job = job.with_repo_id(repo_id);
    }
    job
}

fn log_job_info(job: &ScanJob) {
    info!(
        "Created scan {} for {} (commit: {}, branch: {:?})",
        job.scan_id,
        job.repo_id,
        job.commit_sha.as_deref().unwrap_or("none"),
        job.branch
    );
}

async fn connect_store(kind: StoreKind, neo4j: &Neo4jArgs) -> Result<Arc<dyn ScanStateStore>> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(MemoryStateStore::new())),
        StoreKind::Neo4j => {
            let Some(config) = neo4j.config() else {
                bail!("--neo4j-password (or NEO4J_PASSWORD) is required for the neo4j store");
            };
            Ok(Arc::new(Neo4jStateStore::connect(&config).await?))
        }
    }
}

fn build_notifier(
    backend_url: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LifecycleNotifier>> {
    match backend_url {
        Some(url) => Ok(Arc::new(HttpNotifier::new(url, timeout)?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}

#[cfg(test)]
mod tests;
