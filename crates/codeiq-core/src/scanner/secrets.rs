//! Secret scanner: trufflehog over each batch, findings matched by file

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::tool::split_local;
use super::{demultiplex, fail_all, ExternalTool, FileResults, Scanner, ScannerError, ToolError};
use crate::config::{format_timeout, ScanConfig};
use crate::discovery::{ExtensionFilter, FileHandle};

/// Scores files by the number of detected secrets
#[derive(Debug, Clone)]
pub struct SecretScanner {
    name: String,
    tool: ExternalTool,
    batch_size: usize,
    timeout: Duration,
}

impl SecretScanner {
    /// Create a secret scanner around a JSON-lines emitting tool
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        tool: ExternalTool,
        batch_size: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            tool,
            batch_size: batch_size.max(1),
            timeout,
        }
    }

    /// `trufflehog filesystem --json <paths>`
    #[must_use]
    pub fn trufflehog(config: &ScanConfig) -> Self {
        let tool = ExternalTool::new("trufflehog", ["filesystem", "--json"])
            .with_allowed_exit_codes(vec![0, 183]);
        Self::new("Secrets", tool, config.batch_size, config.tool_timeout)
    }

    async fn scan_batch(&self, batch: &[&FileHandle]) -> Result<FileResults, ScannerError> {
        let (local, mut results) = split_local(self.tool.program(), batch);
        if local.is_empty() {
            return Ok(results);
        }

        let targets: Vec<String> = local.iter().map(|f| f.key()).collect();
        match self.tool.run(&targets, self.timeout).await {
            Ok(output) => {
                let findings = output
                    .stdout
                    .lines()
                    .chain(output.stderr.lines())
                    .filter_map(|line| finding_path(line).map(|path| (path, line.to_string())));
                results.extend(demultiplex(&local, findings));
            }
            Err(ToolError::Timeout { .. }) => {
                warn!("{} timed out on {} files", self.tool.program(), local.len());
                let message = format!(
                    "Secrets scanning timeout ({})",
                    format_timeout(self.timeout)
                );
                results.extend(fail_all(&local, &message));
            }
            Err(error @ ToolError::Crash { .. }) => {
                warn!("{} crashed: {}", self.tool.program(), error);
                results.extend(fail_all(&local, &error.crash_message()));
            }
            Err(error) => return Err(error.into()),
        }
        Ok(results)
    }
}

/// File named by a finding's `SourceMetadata.Data.Filesystem.file`
///
/// Lines that are not JSON, or JSON without that field, are not findings.
#[must_use]
pub fn finding_path(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let info: Value = serde_json::from_str(line).ok()?;
    info.pointer("/SourceMetadata/Data/Filesystem/file")
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Scanner for SecretScanner {
    fn name(&self) -> &str {
        &self.name
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::Any
    }

    async fn scan(&self, files: Vec<FileHandle>) -> Result<FileResults, ScannerError> {
        let mut results = FileResults::new();
        for batch in files.chunks(self.batch_size) {
            let batch: Vec<&FileHandle> = batch.iter().collect();
            debug!("Scanning {} files for secrets", batch.len());
            results.extend(self.scan_batch(&batch).await?);
        }
        Ok(results)
    }
}
