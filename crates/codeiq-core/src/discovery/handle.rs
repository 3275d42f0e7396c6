//! File handles: an addressable file plus a way to read it

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::extension::normalize_extension;
use super::DiscoveryError;

/// Where a file's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read from the local filesystem
    Local,
    /// Fetched over HTTP from an object store
    Remote { url: String },
}

/// A file discovered for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub source: FileSource,
}

impl FileHandle {
    /// A file on the local filesystem
    #[must_use]
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Local,
        }
    }

    /// A file whose content lives behind `url`
    #[must_use]
    pub fn remote(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Remote { url: url.into() },
        }
    }

    /// Key used for this file in scanner results
    #[must_use]
    pub fn key(&self) -> String {
        self.path.display().to_string()
    }

    /// Lowercase extension without the dot, empty when there is none
    #[must_use]
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(normalize_extension)
            .unwrap_or_default()
    }

    /// True when external tools can be pointed at the path directly
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.source, FileSource::Local)
    }

    /// Get the path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file content as UTF-8 text
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fetched.
    pub async fn read_to_string(&self) -> Result<String, DiscoveryError> {
        match &self.source {
            FileSource::Local => {
                tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|source| DiscoveryError::Io {
                        path: self.key(),
                        source,
                    })
            }
            FileSource::Remote { url } => fetch(url).await,
        }
    }

    /// Compute the SHA-256 hash of the file content
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fetched.
    pub async fn compute_hash(&self) -> Result<String, DiscoveryError> {
        let content = self.read_to_string().await?;
        Ok(compute_content_hash(&content))
    }
}

/// SHA-256 hex digest of `content`
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn fetch(url: &str) -> Result<String, DiscoveryError> {
    let to_error = |source: reqwest::Error| DiscoveryError::Fetch {
        url: url.to_string(),
        source,
    };
    reqwest::get(url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(to_error)?
        .text()
        .await
        .map_err(to_error)
}
