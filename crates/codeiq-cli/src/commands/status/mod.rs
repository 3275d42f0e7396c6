//! Status command: Show the lifecycle partition of a scan

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use codeiq_core::state::{Neo4jStateStore, ScanJobState, ScanStateStore};

use super::types::Neo4jArgs;

/// Run the status command, returning the rendered state
///
/// # Errors
/// Returns an error if the store cannot be reached or the scan is unknown.
pub async fn run(scan_id: &str, neo4j: &Neo4jArgs) -> Result<String> {
    let Some(config) = neo4j.config() else {
        bail!("--neo4j-password (or NEO4J_PASSWORD) is required");
    };
    let store = Neo4jStateStore::connect(&config).await?;
    match store.get_state(scan_id).await? {
        Some(state) => Ok(format_state(scan_id, &state)),
        None => bail!("No state recorded for scan {scan_id}"),
    }
}

/// One line per lifecycle set
#[must_use]
pub fn format_state(scan_id: &str, state: &ScanJobState) -> String {
    let join = |names: &BTreeSet<String>| names.iter().cloned().collect::<Vec<_>>().join(", ");
    let states = &state.states;

    let mut lines = vec![
        format!("Scan {scan_id}: {}", state.status),
        format!("  waiting:    {}", join(&states.waiting)),
        format!("  inProgress: {}", join(&states.in_progress)),
        format!("  completed:  {}", join(&states.completed)),
        format!("  failed:     {}", join(&states.failed)),
    ];
    if let Some(at) = state.completed_at {
        lines.push(format!("  completed at {}", at.to_rfc3339()));
    }
    if let Some(error) = &state.error {
        lines.push(format!("  error: {error}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests;
