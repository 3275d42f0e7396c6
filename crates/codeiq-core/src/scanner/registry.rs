//! Scanner registry keyed by category

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Scanner;

/// Grouping of scanners whose scores are averaged together
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Health,
    Security,
    Knowledge,
}

impl Category {
    /// Every category, in reporting order
    pub const ALL: [Self; 3] = [Self::Health, Self::Security, Self::Knowledge];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Health => "health",
            Self::Security => "security",
            Self::Knowledge => "knowledge",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health" => Ok(Self::Health),
            "security" => Ok(Self::Security),
            "knowledge" => Ok(Self::Knowledge),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Scanner names registered under each category
pub type CategoryMembership = BTreeMap<Category, Vec<String>>;

/// Registered scanners in registration order
#[derive(Default)]
pub struct ScannerRegistry {
    entries: Vec<(String, Category, Arc<dyn Scanner>)>,
}

impl ScannerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scanner` under `category`, replacing any scanner of the same name
    pub fn register(&mut self, scanner: Arc<dyn Scanner>, category: Category) {
        let name = scanner.name().to_string();
        self.entries.retain(|(existing, _, _)| *existing != name);
        self.entries.push((name, category, scanner));
    }

    /// Look up a scanner by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Scanner>> {
        self.entries
            .iter()
            .find(|(existing, _, _)| existing == name)
            .map(|(_, _, scanner)| Arc::clone(scanner))
    }

    /// Category a scanner is registered under
    #[must_use]
    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.entries
            .iter()
            .find(|(existing, _, _)| existing == name)
            .map(|(_, category, _)| *category)
    }

    /// Registered names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _, _)| name.clone()).collect()
    }

    /// Scanner names per category; every category is present
    #[must_use]
    pub fn membership(&self) -> CategoryMembership {
        let mut membership: CategoryMembership =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for (name, category, _) in &self.entries {
            membership.entry(*category).or_default().push(name.clone());
        }
        membership
    }

    /// Number of registered scanners
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ScannerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, category, _)| (name, category)))
            .finish()
    }
}
