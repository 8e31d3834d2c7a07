use crate::models::{MatchRecord, MatchResult, MatchStatus, ProfileDocument, ProfileUpdate};
use crate::services::{MatchRepository, ProfileStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Process-local profile store
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, ProfileDocument>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = ProfileDocument>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    /// Build a store from a JSON array of profile documents
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let profiles: Vec<ProfileDocument> = serde_json::from_str(json)
            .map_err(|e| StoreError::InvalidRecord(format!("profile seed: {}", e)))?;
        Ok(Self::with_profiles(profiles))
    }

    /// Load a JSON seed file, see `from_json`
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("reading {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }

    /// Insert or replace a profile
    pub async fn insert(&self, profile: ProfileDocument) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<ProfileDocument, StoreError> {
        self.profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", user_id)))
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileDocument>, StoreError> {
        let mut profiles: Vec<ProfileDocument> = self.profiles.read().await.values().cloned().collect();
        // HashMap order is arbitrary; keep listings reproducible
        profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<ProfileDocument, StoreError> {
        let mut profiles = self.profiles.write().await;
        let doc = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", user_id)))?;

        update.apply_to(doc);
        Ok(doc.clone())
    }
}

/// Process-local match repository
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<Vec<MatchRecord>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn upsert_match(
        &self,
        user1_id: &str,
        user2_id: &str,
        scores: &MatchResult,
    ) -> Result<MatchRecord, StoreError> {
        if user1_id == user2_id {
            return Err(StoreError::InvalidRecord(format!(
                "cannot match user {} with itself",
                user1_id
            )));
        }

        let mut matches = self.matches.write().await;

        if let Some(existing) = matches.iter_mut().find(|m| m.is_pair(user1_id, user2_id)) {
            existing.scores = *scores;
            existing.updated_at = chrono::Utc::now();
            return Ok(existing.clone());
        }

        let record = MatchRecord::pending(user1_id, user2_id, *scores);
        matches.push(record.clone());
        Ok(record)
    }

    async fn get_match(&self, match_id: uuid::Uuid) -> Result<MatchRecord, StoreError> {
        self.matches
            .read()
            .await
            .iter()
            .find(|m| m.id == match_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("match {}", match_id)))
    }

    async fn list_user_matches(&self, user_id: &str) -> Result<Vec<MatchRecord>, StoreError> {
        let mut matches: Vec<MatchRecord> = self
            .matches
            .read()
            .await
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.scores
                .compatibility_score
                .partial_cmp(&a.scores.compatibility_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(matches)
    }

    async fn update_status(
        &self,
        match_id: uuid::Uuid,
        status: MatchStatus,
    ) -> Result<MatchRecord, StoreError> {
        let mut matches = self.matches.write().await;
        let record = matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::NotFound(format!("match {}", match_id)))?;

        record.status = status;
        record.updated_at = chrono::Utc::now();
        Ok(record.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
