//! External tool invocation and output demultiplexing

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;

use super::{FileResult, FileResults};
use crate::discovery::FileHandle;

/// Errors from running an external tool over a batch
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {code:?}: {stderr}")]
    Crash {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl ToolError {
    /// Message recorded against every file of a crashed batch
    #[must_use]
    pub fn crash_message(&self) -> String {
        match self {
            Self::Crash {
                program, stderr, ..
            } => {
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("{program} crash")
                } else {
                    stderr.to_string()
                }
            }
            other => other.to_string(),
        }
    }
}

/// Captured output of a tool run that exited with an allowed code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

/// A command template; target paths are appended on each run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: String,
    args: Vec<String>,
    allowed_exit_codes: Vec<i32>,
}

impl ExternalTool {
    /// Create a tool that only treats exit code 0 as success
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            allowed_exit_codes: vec![0],
        }
    }

    /// Set the exit codes that mean "ran normally" (findings included)
    #[must_use]
    pub fn with_allowed_exit_codes(mut self, codes: Vec<i32>) -> Self {
        self.allowed_exit_codes = codes;
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool with `targets` appended, killing it after `timeout`
    ///
    /// # Errors
    /// Returns an error if the tool cannot start, times out, or exits with a
    /// code outside the allowed set.
    pub async fn run(&self, targets: &[String], timeout: Duration) -> Result<ToolOutput, ToolError> {
        let child = async_process::Command::new(&self.program)
            .args(&self.args)
            .args(targets)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(timeout, child.output()).await {
            Ok(output) => output.map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ToolError::Timeout {
                    program: self.program.clone(),
                    timeout,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match output.status.code() {
            Some(code) if self.allowed_exit_codes.contains(&code) => Ok(ToolOutput {
                stdout,
                stderr,
                code,
            }),
            code => Err(ToolError::Crash {
                program: self.program.clone(),
                code,
                stderr,
            }),
        }
    }
}

/// Route `(path, finding)` pairs back to `files`
///
/// Files with no finding get a clean result; findings for paths outside
/// `files` are dropped.
#[must_use]
pub fn demultiplex<I>(files: &[&FileHandle], findings: I) -> FileResults
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut per_file: HashMap<String, Vec<String>> = HashMap::new();
    for (path, line) in findings {
        per_file.entry(path).or_default().push(line);
    }

    files
        .iter()
        .map(|file| {
            let key = file.key();
            let result = per_file
                .remove(&key)
                .map_or_else(FileResult::clean, |lines| FileResult::from_findings(&lines));
            (key, result)
        })
        .collect()
}

/// The same failure for every file of a batch
#[must_use]
pub fn fail_all(files: &[&FileHandle], error: &str) -> FileResults {
    files
        .iter()
        .map(|file| (file.key(), FileResult::failed(error)))
        .collect()
}

/// Local handles as tool arguments; remote handles fail with a per-file error
pub(super) fn split_local<'a>(
    program: &str,
    files: &[&'a FileHandle],
) -> (Vec<&'a FileHandle>, FileResults) {
    let mut local = Vec::new();
    let mut rejected = FileResults::new();
    for file in files {
        if file.is_local() {
            local.push(*file);
        } else {
            rejected.insert(
                file.key(),
                FileResult::failed(format!("{program} requires a local file")),
            );
        }
    }
    (local, rejected)
}
