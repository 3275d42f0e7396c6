//! Scan configuration

use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;

/// Directory names skipped during discovery unless overridden
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "__pycache__",
    ".git",
    ".pytest_cache",
    "node_modules",
    ".venv",
    "venv",
    ".env",
    "build",
    "dist",
    ".tox",
    ".mypy_cache",
];

/// Files per batch handed to a worker pool or a single tool invocation
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Scanners allowed to run at the same time
pub const DEFAULT_MAX_CONCURRENT_SCANNERS: usize = 2;

/// Errors raised for configuration the scan cannot start with
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported output format: {0}")]
    UnknownFormat(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("No command configured for file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Tunables shared by the orchestrator and the scanners it runs
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub max_concurrent_scanners: usize,
    pub batch_size: usize,
    pub max_workers: usize,
    pub exclude_patterns: Vec<String>,
    pub tool_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scanners: DEFAULT_MAX_CONCURRENT_SCANNERS,
            batch_size: DEFAULT_BATCH_SIZE,
            max_workers: default_max_workers(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            tool_timeout: Duration::from_secs(60),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

impl ScanConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many scanners may run concurrently
    #[must_use]
    pub fn with_max_concurrent_scanners(mut self, n: usize) -> Self {
        self.max_concurrent_scanners = n;
        self
    }

    /// Set the batch size
    #[must_use]
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Set the per-scanner worker bound
    #[must_use]
    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    /// Replace the exclusion patterns
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Set the external tool timeout (per batch invocation)
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Set the notification request timeout
    #[must_use]
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Reject values the orchestrator cannot run with
    ///
    /// # Errors
    /// Returns an error if a bound is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("max_concurrent_scanners", self.max_concurrent_scanners),
            ("batch_size", self.batch_size),
            ("max_workers", self.max_workers),
        ];
        for (field, value) in bounds {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if self.tool_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "tool_timeout",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// `min(32, available_parallelism + 4)`
#[must_use]
pub fn default_max_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    (cpus + 4).min(32)
}

/// Render a timeout the way tool error messages quote it
#[must_use]
pub fn format_timeout(timeout: Duration) -> String {
    if timeout.subsec_millis() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}
