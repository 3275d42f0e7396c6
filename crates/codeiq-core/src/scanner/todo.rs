//! TODO scanner: per-file extraction of TODO / FIXME markers

use async_trait::async_trait;
use regex::Regex;

use super::{FileResult, FileScanner, ScannerError};
use crate::config::ConfigError;
use crate::discovery::{ExtensionFilter, FileHandle};

/// Comment and docstring shapes that carry a marker
const PATTERNS: &[&str] = &[
    r"(?i)#.*?TODO.*",
    r#"(?i)""".*?TODO.*?""""#,
    r"(?i)'''.*?TODO.*?'''",
    r"(?i)#.*?FIXME.*",
    r"(?i)//.*?TODO.*",
    r"(?i)/\*.*?TODO.*?\*/",
];

/// Scores files by the number of open markers
#[derive(Debug, Clone)]
pub struct TodoScanner {
    patterns: Vec<Regex>,
}

impl TodoScanner {
    /// Compile the marker patterns
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, ConfigError> {
        let patterns = PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// `"<line number>: <trimmed line>"` once per matching pattern
    #[must_use]
    pub fn find_markers(&self, content: &str) -> Vec<String> {
        let mut markers = Vec::new();
        for (index, line) in content.lines().enumerate() {
            for pattern in &self.patterns {
                if pattern.is_match(line) {
                    markers.push(format!("{}: {}", index + 1, line.trim()));
                }
            }
        }
        markers
    }
}

#[async_trait]
impl FileScanner for TodoScanner {
    fn name(&self) -> &str {
        "Todos"
    }

    fn extensions(&self) -> ExtensionFilter {
        ExtensionFilter::Any
    }

    async fn scan_file(&self, file: &FileHandle) -> Result<FileResult, ScannerError> {
        match file.read_to_string().await {
            Ok(content) => Ok(FileResult::from_findings(&self.find_markers(&content))),
            Err(e) => Ok(FileResult::failed(format!("Error reading file: {e}"))),
        }
    }
}
