// Service exports
pub mod appwrite;
pub mod cache;
pub mod memory;
pub mod postgres;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use memory::{InMemoryMatchRepository, InMemoryProfileStore};
pub use postgres::{PostgresClient, PostgresError};

use crate::models::{MatchRecord, MatchResult, MatchStatus, ProfileDocument, ProfileUpdate};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the profile store and match repository
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<AppwriteError> for StoreError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::NotFound(what) => StoreError::NotFound(what),
            AppwriteError::InvalidResponse(msg) => StoreError::InvalidRecord(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::NotFound(what) => StoreError::NotFound(what),
            PostgresError::InvalidInput(msg) => StoreError::InvalidRecord(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Source of user profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile by user id
    async fn get_profile(&self, user_id: &str) -> Result<ProfileDocument, StoreError>;

    /// Fetch every stored profile
    async fn list_profiles(&self) -> Result<Vec<ProfileDocument>, StoreError>;

    /// Apply a partial update and return the stored result
    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<ProfileDocument, StoreError>;
}

/// Persistence for scored matches, keyed by the unordered user pair
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Insert a pending match, or refresh the scores of an existing one for
    /// the same pair while keeping its status
    async fn upsert_match(
        &self,
        user1_id: &str,
        user2_id: &str,
        scores: &MatchResult,
    ) -> Result<MatchRecord, StoreError>;

    async fn get_match(&self, match_id: uuid::Uuid) -> Result<MatchRecord, StoreError>;

    /// Matches on either side of the pair, best score first
    async fn list_user_matches(&self, user_id: &str) -> Result<Vec<MatchRecord>, StoreError>;

    async fn update_status(
        &self,
        match_id: uuid::Uuid,
        status: MatchStatus,
    ) -> Result<MatchRecord, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
