//! File walkers: Discover files in a directory tree or a fixed listing

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;

use super::{is_excluded, DiscoveryError, ExtensionFilter, FileHandle, FileLister};

/// Lists files from the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFileLister {
    exclude_patterns: Vec<String>,
}

impl LocalFileLister {
    /// Create a lister that skips any path containing one of `exclude_patterns`
    #[must_use]
    pub fn new(exclude_patterns: Vec<String>) -> Self {
        Self { exclude_patterns }
    }

    /// Walk `root` synchronously and return matching files sorted by path
    ///
    /// # Errors
    /// Returns an error if `root` does not exist.
    pub fn walk(
        &self,
        root: &Path,
        extensions: &ExtensionFilter,
    ) -> Result<Vec<FileHandle>, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::Walk(format!(
                "root does not exist: {}",
                root.display()
            )));
        }

        let mut paths: Vec<PathBuf> = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|path| {
                let relative = path.strip_prefix(root).unwrap_or(path);
                !is_excluded(relative, &self.exclude_patterns) && extensions.matches(path)
            })
            .collect();

        paths.sort();
        Ok(paths.into_iter().map(FileHandle::local).collect())
    }
}

#[async_trait]
impl FileLister for LocalFileLister {
    async fn list(
        &self,
        root: &Path,
        extensions: &ExtensionFilter,
    ) -> Result<Vec<FileHandle>, DiscoveryError> {
        let lister = self.clone();
        let root = root.to_path_buf();
        let extensions = extensions.clone();
        tokio::task::spawn_blocking(move || lister.walk(&root, &extensions))
            .await
            .map_err(|e| DiscoveryError::Walk(e.to_string()))?
    }
}

/// Lists from a fixed set of handles, such as an object-store listing
#[derive(Debug, Clone, Default)]
pub struct StaticFileLister {
    files: Vec<FileHandle>,
    exclude_patterns: Vec<String>,
}

impl StaticFileLister {
    /// Create a lister over `files`
    #[must_use]
    pub fn new(files: Vec<FileHandle>) -> Self {
        Self {
            files,
            exclude_patterns: Vec::new(),
        }
    }

    /// Skip handles containing one of `patterns`
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }
}

#[async_trait]
impl FileLister for StaticFileLister {
    async fn list(
        &self,
        root: &Path,
        extensions: &ExtensionFilter,
    ) -> Result<Vec<FileHandle>, DiscoveryError> {
        Ok(self
            .files
            .iter()
            .filter(|file| file.path.starts_with(root) || root.as_os_str().is_empty())
            .filter(|file| {
                let relative = file.path.strip_prefix(root).unwrap_or(&file.path);
                !is_excluded(relative, &self.exclude_patterns) && extensions.matches(&file.path)
            })
            .cloned()
            .collect())
    }
}
