use crate::models::{MatchRecord, MatchResult, MatchStatus};
use crate::services::{MatchRepository, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Column representation of a match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum StatusColumn {
    Pending,
    Accepted,
    Rejected,
}

impl From<MatchStatus> for StatusColumn {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Pending => StatusColumn::Pending,
            MatchStatus::Accepted => StatusColumn::Accepted,
            MatchStatus::Rejected => StatusColumn::Rejected,
        }
    }
}

impl From<StatusColumn> for MatchStatus {
    fn from(value: StatusColumn) -> Self {
        match value {
            StatusColumn::Pending => MatchStatus::Pending,
            StatusColumn::Accepted => MatchStatus::Accepted,
            StatusColumn::Rejected => MatchStatus::Rejected,
        }
    }
}

const RETURNING_COLUMNS: &str = "id, user1_id, user2_id, compatibility_score, interest_score, \
     personality_score, motivation_score, location_score, status, created_at, updated_at";

/// PostgreSQL-backed match repository
///
/// Each unordered user pair has at most one row; regenerating matches
/// refreshes the scores of an existing row and leaves its status alone.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Insert or refresh the match for a user pair
    pub async fn save_match(
        &self,
        user1_id: &str,
        user2_id: &str,
        scores: &MatchResult,
    ) -> Result<MatchRecord, PostgresError> {
        if user1_id == user2_id {
            return Err(PostgresError::InvalidInput(format!(
                "cannot match user {} with itself",
                user1_id
            )));
        }

        let query = format!(
            r#"
            INSERT INTO matches (
                id, user1_id, user2_id, compatibility_score, interest_score,
                personality_score, motivation_score, location_score, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', NOW(), NOW())
            ON CONFLICT ((LEAST(user1_id, user2_id)), (GREATEST(user1_id, user2_id)))
            DO UPDATE SET
                compatibility_score = EXCLUDED.compatibility_score,
                interest_score = EXCLUDED.interest_score,
                personality_score = EXCLUDED.personality_score,
                motivation_score = EXCLUDED.motivation_score,
                location_score = EXCLUDED.location_score,
                updated_at = NOW()
            RETURNING {}
            "#,
            RETURNING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(user1_id)
            .bind(user2_id)
            .bind(scores.compatibility_score)
            .bind(scores.interest_score)
            .bind(scores.personality_score)
            .bind(scores.motivation_score)
            .bind(scores.location_score)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            "Saved match: {} <-> {} ({})",
            user1_id,
            user2_id,
            scores.compatibility_score
        );

        row_to_record(&row)
    }

    /// Get a match by id
    pub async fn fetch_match(&self, match_id: uuid::Uuid) -> Result<MatchRecord, PostgresError> {
        let query = format!("SELECT {} FROM matches WHERE id = $1", RETURNING_COLUMNS);

        let row = sqlx::query(&query)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("match {}", match_id)))?;

        row_to_record(&row)
    }

    /// Get all matches a user takes part in, best score first
    pub async fn fetch_user_matches(&self, user_id: &str) -> Result<Vec<MatchRecord>, PostgresError> {
        let query = format!(
            r#"
            SELECT {}
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY compatibility_score DESC, created_at ASC
            "#,
            RETURNING_COLUMNS
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        let matches: Result<Vec<MatchRecord>, _> = rows.iter().map(row_to_record).collect();
        let matches = matches?;

        tracing::debug!("User {} has {} matches", user_id, matches.len());

        Ok(matches)
    }

    /// Set the workflow status of a match
    pub async fn set_status(
        &self,
        match_id: uuid::Uuid,
        status: MatchStatus,
    ) -> Result<MatchRecord, PostgresError> {
        let query = format!(
            r#"
            UPDATE matches
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RETURNING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(match_id)
            .bind(StatusColumn::from(status))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("match {}", match_id)))?;

        tracing::info!("Match {} is now {}", match_id, status.as_str());

        row_to_record(&row)
    }

    /// Health check for the database connection
    pub async fn ping(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn row_to_record(row: &PgRow) -> Result<MatchRecord, PostgresError> {
    let status: StatusColumn = row.try_get("status")?;

    Ok(MatchRecord {
        id: row.try_get("id")?,
        user1_id: row.try_get("user1_id")?,
        user2_id: row.try_get("user2_id")?,
        scores: MatchResult {
            compatibility_score: row.try_get("compatibility_score")?,
            interest_score: row.try_get("interest_score")?,
            personality_score: row.try_get("personality_score")?,
            motivation_score: row.try_get("motivation_score")?,
            location_score: row.try_get("location_score")?,
        },
        status: status.into(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl MatchRepository for PostgresClient {
    async fn upsert_match(
        &self,
        user1_id: &str,
        user2_id: &str,
        scores: &MatchResult,
    ) -> Result<MatchRecord, StoreError> {
        Ok(self.save_match(user1_id, user2_id, scores).await?)
    }

    async fn get_match(&self, match_id: uuid::Uuid) -> Result<MatchRecord, StoreError> {
        Ok(self.fetch_match(match_id).await?)
    }

    async fn list_user_matches(&self, user_id: &str) -> Result<Vec<MatchRecord>, StoreError> {
        Ok(self.fetch_user_matches(user_id).await?)
    }

    async fn update_status(
        &self,
        match_id: uuid::Uuid,
        status: MatchStatus,
    ) -> Result<MatchRecord, StoreError> {
        Ok(self.set_status(match_id, status).await?)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(self.ping().await?)
    }
}
