//! Scanner lifecycle partition

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a scanner is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerPhase {
    Waiting,
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for ScannerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Waiting => "waiting",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A lifecycle move that is not allowed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Scanner {0} is not part of this scan")]
    Unknown(String),

    #[error("Scanner {scanner} cannot move from {from} to {to}")]
    Illegal {
        scanner: String,
        from: ScannerPhase,
        to: ScannerPhase,
    },
}

/// Four disjoint sets of scanner names
///
/// Moves are strictly forward: waiting -> inProgress -> completed | failed.
/// A scanner may also fail straight from waiting when it never got to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerLifecycleState {
    #[serde(default)]
    pub waiting: BTreeSet<String>,
    #[serde(default)]
    pub in_progress: BTreeSet<String>,
    #[serde(default)]
    pub completed: BTreeSet<String>,
    #[serde(default)]
    pub failed: BTreeSet<String>,
}

impl ScannerLifecycleState {
    /// Every name starts out waiting
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            waiting: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// waiting -> inProgress
    ///
    /// # Errors
    /// Returns an error if the scanner is unknown or not waiting.
    pub fn start(&mut self, scanner: &str) -> Result<(), TransitionError> {
        self.advance(scanner, &[ScannerPhase::Waiting], ScannerPhase::InProgress)
    }

    /// inProgress -> completed
    ///
    /// # Errors
    /// Returns an error if the scanner is unknown or not in progress.
    pub fn complete(&mut self, scanner: &str) -> Result<(), TransitionError> {
        self.advance(scanner, &[ScannerPhase::InProgress], ScannerPhase::Completed)
    }

    /// waiting | inProgress -> failed
    ///
    /// # Errors
    /// Returns an error if the scanner is unknown or already settled.
    pub fn fail(&mut self, scanner: &str) -> Result<(), TransitionError> {
        self.advance(
            scanner,
            &[ScannerPhase::Waiting, ScannerPhase::InProgress],
            ScannerPhase::Failed,
        )
    }

    /// Current phase of `scanner`
    #[must_use]
    pub fn phase_of(&self, scanner: &str) -> Option<ScannerPhase> {
        [
            ScannerPhase::Waiting,
            ScannerPhase::InProgress,
            ScannerPhase::Completed,
            ScannerPhase::Failed,
        ]
        .into_iter()
        .find(|phase| self.set(*phase).contains(scanner))
    }

    /// Union of all four sets
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.waiting
            .iter()
            .chain(&self.in_progress)
            .chain(&self.completed)
            .chain(&self.failed)
            .cloned()
            .collect()
    }

    /// True when the sets are pairwise disjoint and their union is `names`
    #[must_use]
    pub fn is_partition_of(&self, names: &BTreeSet<String>) -> bool {
        let total = self.waiting.len() + self.in_progress.len() + self.completed.len() + self.failed.len();
        let union = self.names();
        total == union.len() && union == *names
    }

    /// True when nothing is waiting or in progress
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.waiting.is_empty() && self.in_progress.is_empty()
    }

    fn advance(
        &mut self,
        scanner: &str,
        allowed: &[ScannerPhase],
        to: ScannerPhase,
    ) -> Result<(), TransitionError> {
        let from = self
            .phase_of(scanner)
            .ok_or_else(|| TransitionError::Unknown(scanner.to_string()))?;
        if !allowed.contains(&from) {
            return Err(TransitionError::Illegal {
                scanner: scanner.to_string(),
                from,
                to,
            });
        }
        self.set_mut(from).remove(scanner);
        self.set_mut(to).insert(scanner.to_string());
        Ok(())
    }

    const fn set(&self, phase: ScannerPhase) -> &BTreeSet<String> {
        match phase {
            ScannerPhase::Waiting => &self.waiting,
            ScannerPhase::InProgress => &self.in_progress,
            ScannerPhase::Completed => &self.completed,
            ScannerPhase::Failed => &self.failed,
        }
    }

    fn set_mut(&mut self, phase: ScannerPhase) -> &mut BTreeSet<String> {
        match phase {
            ScannerPhase::Waiting => &mut self.waiting,
            ScannerPhase::InProgress => &mut self.in_progress,
            ScannerPhase::Completed => &mut self.completed,
            ScannerPhase::Failed => &mut self.failed,
        }
    }
}
