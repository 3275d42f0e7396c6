//! Neo4j-backed state store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::{ConfigBuilder, Graph, Query, Row};

use super::{JobStatus, ScanJobState, ScanStateStore, StoreError};
use crate::score::{FileScoreRecord, RepoScoreSnapshot};

/// Configuration for Neo4j connection
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
}

impl Neo4jConfig {
    /// Create a new Neo4j configuration
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: None,
        }
    }

    /// Set the database name
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// State store persisting scans, snapshots and file scores as graph nodes
///
/// - `(:Scan {id})` holds the job status and the lifecycle sets as JSON
/// - `(:RepoSnapshot {repo_id})` holds the latest category scores and trend
/// - `(:FileSnapshot {repo_id, path})-[:IN_SNAPSHOT]->(:RepoSnapshot)`
pub struct Neo4jStateStore {
    graph: Arc<Graph>,
}

impl Neo4jStateStore {
    /// Connect to Neo4j and ensure indexes exist
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, StoreError> {
        let mut builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password);

        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }

        let neo_config = builder
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let graph = Graph::connect(neo_config).await?;

        let store = Self {
            graph: Arc::new(graph),
        };
        store.ensure_indexes().await?;

        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let indexes = [
            "CREATE INDEX scan_id IF NOT EXISTS FOR (s:Scan) ON (s.id)",
            "CREATE INDEX repo_snapshot_repo IF NOT EXISTS FOR (r:RepoSnapshot) ON (r.repo_id)",
            "CREATE INDEX file_snapshot_path IF NOT EXISTS FOR (f:FileSnapshot) ON (f.repo_id, f.path)",
        ];

        for index_stmt in indexes {
            self.graph.run(Query::new(index_stmt.to_string())).await?;
        }

        Ok(())
    }
}

/// Optional number as a pair of parameters: `CASE WHEN $has_x THEN $x ELSE null END`
fn score_params(query: Query, name: &str, score: Option<f64>) -> Query {
    query
        .param(name, score.unwrap_or(0.0))
        .param(&format!("has_{name}"), score.is_some())
}

fn scan_state_from_row(row: &Row) -> Result<ScanJobState, StoreError> {
    let status: String = row.get("status").unwrap_or_default();
    let states: String = row.get("states").unwrap_or_default();
    let completed_at: String = row.get("completed_at").unwrap_or_default();
    let error: String = row.get("error").unwrap_or_default();

    let completed_at = if completed_at.is_empty() {
        None
    } else {
        let parsed = DateTime::parse_from_rfc3339(&completed_at)
            .map_err(|e| StoreError::Invalid(format!("completed_at {completed_at:?}: {e}")))?;
        Some(parsed.with_timezone(&Utc))
    };

    Ok(ScanJobState {
        status: status.parse::<JobStatus>()?,
        states: if states.is_empty() {
            Default::default()
        } else {
            serde_json::from_str(&states)?
        },
        completed_at,
        error: Some(error).filter(|e| !e.is_empty()),
    })
}

#[async_trait]
impl ScanStateStore for Neo4jStateStore {
    async fn get_state(&self, scan_id: &str) -> Result<Option<ScanJobState>, StoreError> {
        let query = Query::new(
            r#"
            MATCH (s:Scan {id: $id})
            RETURN s.status as status,
                   s.states as states,
                   s.completed_at as completed_at,
                   s.error as error
            LIMIT 1
            "#
            .to_string(),
        )
        .param("id", scan_id);

        let mut result = self.graph.execute(query).await?;
        match result.next().await? {
            Some(row) => scan_state_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn set_state(&self, scan_id: &str, state: &ScanJobState) -> Result<(), StoreError> {
        let query = Query::new(
            r#"
            MERGE (s:Scan {id: $id})
            SET s.status = $status,
                s.states = $states,
                s.completed_at = $completed_at,
                s.error = $error,
                s.updated_at = datetime()
            "#
            .to_string(),
        )
        .param("id", scan_id)
        .param("status", state.status.to_string())
        .param("states", serde_json::to_string(&state.states)?)
        .param(
            "completed_at",
            state
                .completed_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
        )
        .param("error", state.error.clone().unwrap_or_default());

        self.graph.run(query).await?;
        Ok(())
    }

    async fn get_snapshot(&self, repo_id: &str) -> Result<Option<RepoScoreSnapshot>, StoreError> {
        let query = Query::new(
            r#"
            MATCH (r:RepoSnapshot {repo_id: $repo_id})
            RETURN r.health_score as health_score,
                   r.security_score as security_score,
                   r.knowledge_score as knowledge_score,
                   r.trend as trend
            LIMIT 1
            "#
            .to_string(),
        )
        .param("repo_id", repo_id);

        let mut result = self.graph.execute(query).await?;
        Ok(result.next().await?.map(|row| RepoScoreSnapshot {
            health_score: row.get::<f64>("health_score").ok(),
            security_score: row.get::<f64>("security_score").ok(),
            knowledge_score: row.get::<f64>("knowledge_score").ok(),
            trend: row.get::<f64>("trend").ok(),
        }))
    }

    async fn upsert_file_score(
        &self,
        repo_id: &str,
        record: &FileScoreRecord,
    ) -> Result<(), StoreError> {
        let query = Query::new(
            r#"
            MERGE (r:RepoSnapshot {repo_id: $repo_id})
            MERGE (f:FileSnapshot {repo_id: $repo_id, path: $path})
            SET f.content_hash = $content_hash,
                f.health_score = $health_score,
                f.security_score = $security_score,
                f.knowledge_score = $knowledge_score,
                f.summary = $summary,
                f.updated_at = datetime()
            MERGE (f)-[:IN_SNAPSHOT]->(r)
            "#
            .to_string(),
        )
        .param("repo_id", repo_id)
        .param("path", record.path.clone())
        .param("content_hash", record.content_hash.clone().unwrap_or_default())
        .param("health_score", record.summary.health.score)
        .param("security_score", record.summary.security.score)
        .param("knowledge_score", record.summary.knowledge.score)
        .param("summary", serde_json::to_string(&record.summary)?);

        self.graph.run(query).await?;
        Ok(())
    }

    async fn update_repo_scores(
        &self,
        repo_id: &str,
        snapshot: &RepoScoreSnapshot,
    ) -> Result<(), StoreError> {
        let query = Query::new(
            r#"
            MERGE (r:RepoSnapshot {repo_id: $repo_id})
            SET r.health_score = CASE WHEN $has_health_score THEN $health_score ELSE null END,
                r.security_score = CASE WHEN $has_security_score THEN $security_score ELSE null END,
                r.knowledge_score = CASE WHEN $has_knowledge_score THEN $knowledge_score ELSE null END,
                r.trend = CASE WHEN $has_trend THEN $trend ELSE null END,
                r.updated_at = datetime()
            "#
            .to_string(),
        )
        .param("repo_id", repo_id);
        let query = score_params(query, "trend", snapshot.trend);
        let query = score_params(query, "health_score", snapshot.health_score);
        let query = score_params(query, "security_score", snapshot.security_score);
        let query = score_params(query, "knowledge_score", snapshot.knowledge_score);

        self.graph.run(query).await?;
        Ok(())
    }
}
