//! Extension filtering

use std::collections::BTreeSet;
use std::path::Path;

/// Which file extensions a scanner handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// Every file
    Any,
    /// Only files whose lowercase extension (without dot) is in the set
    Only(BTreeSet<String>),
}

impl ExtensionFilter {
    /// Build a filter from a list such as `[".py", "js"]`
    ///
    /// `"*"` anywhere in the list, or an empty list, selects every file.
    #[must_use]
    pub fn from_list<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for ext in extensions {
            let ext = ext.as_ref().trim();
            if ext == "*" {
                return Self::Any;
            }
            let normalized = normalize_extension(ext);
            if !normalized.is_empty() {
                set.insert(normalized);
            }
        }
        if set.is_empty() {
            Self::Any
        } else {
            Self::Only(set)
        }
    }

    /// Check whether a path passes the filter
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            Self::Any => true,
            Self::Only(set) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| set.contains(&ext.to_lowercase())),
        }
    }

    /// True when the filter accepts every file
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Lowercase an extension and strip its leading dots
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

impl std::fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Only(set) => {
                let list: Vec<String> = set.iter().map(|e| format!(".{e}")).collect();
                write!(f, "{}", list.join(", "))
            }
        }
    }
}
