//! Lint scanner: one linter invocation per batch and extension group

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::tool::split_local;
use super::{fail_all, ExternalTool, FileResults, Scanner, ScannerError, ToolError};
use crate::config::{format_timeout, ConfigError, ScanConfig};
use crate::discovery::{ExtensionFilter, FileHandle};

/// flake8 output format; every line starts with the file path
const FLAKE8_FORMAT: &str = "--format=%(path)s:%(row)d:%(col)d [%(code)s]: %(text)s";

/// Scores files by the number of linter findings
#[derive(Debug, Clone)]
pub struct LintScanner {
    name: String,
    commands: BTreeMap<String, ExternalTool>,
    batch_size: usize,
    timeout: Duration,
}

impl LintScanner {
    /// Create a lint scanner from an extension -> tool mapping
    ///
    /// # Errors
    /// Returns an error if no command is configured.
    pub fn new(
        name: impl Into<String>,
        commands: BTreeMap<String, ExternalTool>,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if commands.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "commands",
                reason: "at least one extension must map to a lint command".to_string(),
            });
        }
        let commands = commands
            .into_iter()
            .map(|(ext, tool)| (ext.trim_start_matches('.').to_lowercase(), tool))
            .collect();
        Ok(Self {
            name: name.into(),
            commands,
            batch_size: batch_size.max(1),
            timeout,
        })
    }

    /// flake8 over `.py` files; exit codes 0 and 1 are normal runs
    ///
    /// # Errors
    /// Returns an error if the configuration is rejected.
    pub fn flake8(config: &ScanConfig) -> Result<Self, ConfigError> {
        let tool = ExternalTool::new("flake8", [FLAKE8_FORMAT]).with_allowed_exit_codes(vec![0, 1]);
        let commands = BTreeMap::from([("py".to_string(), tool)]);
        Self::new("Linter", commands, config.batch_size, config.tool_timeout)
    }

    async fn lint_group(
        &self,
        tool: &ExternalTool,
        files: &[&FileHandle],
    ) -> Result<FileResults, ScannerError> {
        let (local, mut results) = split_local(tool.program(), files);
        if local.is_empty() {
            return Ok(results);
        }

        let targets: Vec<String> = local.iter().map(|f| f.key()).collect();
        match tool.run(&targets, self.timeout).await {
            Ok(output) => {
                let findings = output
                    .stdout
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(|line| (finding_path(line).to_string(), line.to_string()));
                results.extend(super::demultiplex(&local, findings));
            }
            Err(ToolError::Timeout { .. }) => {
                warn!("{} timed out on {} files", tool.program(), local.len());
                let message = format!("Linting timeout ({})", format_timeout(self.timeout));
                results.extend(fail_all(&local, &message));
            }
            Err(error @ ToolError::Crash { .. }) => {
                warn!("{} crashed: {}", tool.program(), error);
                results.extend(fail_all(&local, &error.crash_message()));
            }
            Err(error) => return Err(error.into()),
        }
        Ok(results)
    }
}

/// Path part of a `path:row:col [code]: text` line
fn finding_path(line: &str) -> &str {
    line.split(':').next().unwrap_or(line)
}

#[async_trait]
impl Scanner for LintScanner {
    fn name(&self) -> &str {
        &self.name
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::from_list(self.commands.keys())
    }

    async fn scan(&self, files: Vec<FileHandle>) -> Result<FileResults, ScannerError> {
        let mut results = FileResults::new();

        for batch in files.chunks(self.batch_size) {
            let mut groups: BTreeMap<String, Vec<&FileHandle>> = BTreeMap::new();
            for file in batch {
                groups.entry(file.extension()).or_default().push(file);
            }

            for (extension, group) in groups {
                let tool = self
                    .commands
                    .get(&extension)
                    .ok_or_else(|| ConfigError::UnsupportedExtension(extension.clone()))?;
                debug!("Linting {} .{} files", group.len(), extension);
                results.extend(self.lint_group(tool, &group).await?);
            }
        }

        Ok(results)
    }
}
