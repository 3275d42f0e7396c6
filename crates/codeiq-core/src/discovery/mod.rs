//! Discovery module: File listing and extension filtering
//!
//! Responsible for producing the set of file handles a scanner runs over,
//! honouring the extension filter of the scanner and the configured
//! directory exclusion patterns.

mod extension;
mod handle;
mod walker;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use extension::ExtensionFilter;
pub use handle::{compute_content_hash, FileHandle, FileSource};
pub use walker::{LocalFileLister, StaticFileLister};

/// Errors that can occur while listing or reading files
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Walk error: {0}")]
    Walk(String),
}

/// Lists the scannable files under a root
#[async_trait]
pub trait FileLister: Send + Sync {
    /// List files under `root` matching `extensions`
    ///
    /// # Errors
    /// Returns an error if the root cannot be listed.
    async fn list(
        &self,
        root: &Path,
        extensions: &ExtensionFilter,
    ) -> Result<Vec<FileHandle>, DiscoveryError>;
}

/// True when any component of `path` equals one of `patterns`
#[must_use]
pub fn is_excluded(path: &Path, patterns: &[String]) -> bool {
    path.components().any(|component| {
        let part = component.as_os_str().to_string_lossy();
        patterns.iter().any(|p| *p == part)
    })
}

#[cfg(test)]
mod tests;
