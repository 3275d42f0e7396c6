//! Command arguments shared between main and library

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use codeiq_core::config::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_CONCURRENT_SCANNERS};
use codeiq_core::state::Neo4jConfig;

/// Where scan state and scores are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// In-process maps; state is lost when the command exits
    Memory,
    /// Neo4j graph
    Neo4j,
}

/// Neo4j connection flags
#[derive(Debug, Clone, Args)]
pub struct Neo4jArgs {
    /// Neo4j connection URI
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    pub neo4j_uri: String,

    /// Neo4j username
    #[arg(long, env = "NEO4J_USER", default_value = "neo4j")]
    pub neo4j_user: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD")]
    pub neo4j_password: Option<String>,
}

impl Neo4jArgs {
    /// Connection config, if a password was given
    #[must_use]
    pub fn config(&self) -> Option<Neo4jConfig> {
        self.neo4j_password
            .as_ref()
            .map(|password| Neo4jConfig::new(&self.neo4j_uri, &self.neo4j_user, password))
    }
}

/// Flags of the scan command
#[derive(Debug, Clone, Parser)]
#[command(name = "scan")]
pub struct ScanArgs {
    /// Path to the repository to scan
    pub path: PathBuf,

    /// Scan id of the state document (defaults to a fresh UUID)
    #[arg(long)]
    pub scan_id: Option<String>,

    /// Repository id the scores roll up into (defaults to the path)
    #[arg(long)]
    pub repo_id: Option<String>,

    /// Scanners to run, comma separated (defaults to all)
    #[arg(long, value_delimiter = ',')]
    pub scanners: Vec<String>,

    /// Scanners allowed to run at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_SCANNERS)]
    pub max_concurrent_scanners: usize,

    /// Worker bound per scanner (defaults to min(32, cores + 4))
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Files per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Timeout per external tool invocation, in seconds
    #[arg(long, default_value_t = 60)]
    pub tool_timeout: u64,

    /// Extra directory names to exclude, on top of the defaults
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Backend base URL for lifecycle notifications
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// State store backend
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    #[command(flatten)]
    pub neo4j: Neo4jArgs,

    /// Write the report to <OUTPUT>.<format>
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "json")]
    pub format: String,
}
