use crate::models::{ProfileDocument, ProfileUpdate};
use crate::services::{ProfileStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Documents requested per page when listing a collection
const PAGE_SIZE: usize = 100;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client
///
/// Backs the profile store with an Appwrite document collection:
/// - Fetching a single profile
/// - Listing the whole profile collection page by page
/// - Applying partial profile updates
///
/// The document id of each profile is the user id.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub user_profiles: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.user_profiles
        )
    }

    fn document_url(&self, user_id: &str) -> String {
        format!("{}/{}", self.documents_url(), urlencoding::encode(user_id))
    }

    fn check_status(status: StatusCode, what: &str) -> Result<(), AppwriteError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(AppwriteError::NotFound(what.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppwriteError::Unauthorized),
            s => Err(AppwriteError::ApiError(format!("{} failed: {}", what, s))),
        }
    }

    /// Get a single profile by user ID
    pub async fn fetch_profile(&self, user_id: &str) -> Result<ProfileDocument, AppwriteError> {
        let url = self.document_url(user_id);

        tracing::debug!("Fetching profile for user: {}", user_id);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        Self::check_status(response.status(), &format!("profile {}", user_id))?;

        let json: Value = response.json().await?;
        parse_document(&json)
    }

    /// Fetch one page of the profile collection
    ///
    /// Returns the parsed profiles, the number of raw documents on the page
    /// and the collection total reported by Appwrite.
    async fn fetch_page(&self, offset: usize) -> Result<(Vec<ProfileDocument>, usize, u64), AppwriteError> {
        let queries = vec![format!("limit({})", PAGE_SIZE), format!("offset({})", offset)];
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        let full_url = format!("{}?queries={}", self.documents_url(), urlencoding::encode(&queries_json));

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        Self::check_status(response.status(), "list profiles")?;

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let profiles = documents
            .iter()
            .filter_map(|doc| match parse_document(doc) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping malformed profile document: {}", e);
                    None
                }
            })
            .collect();

        Ok((profiles, documents.len(), total))
    }

    /// List every profile in the collection
    pub async fn fetch_all_profiles(&self) -> Result<Vec<ProfileDocument>, AppwriteError> {
        let mut profiles = Vec::new();
        let mut offset = 0;

        loop {
            let (page, raw_len, total) = self.fetch_page(offset).await?;
            profiles.extend(page);
            offset += raw_len;

            if raw_len < PAGE_SIZE || offset as u64 >= total {
                break;
            }
        }

        tracing::debug!("Listed {} profiles", profiles.len());

        Ok(profiles)
    }

    /// Apply a partial update to a profile document
    pub async fn patch_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<ProfileDocument, AppwriteError> {
        let mut data = serde_json::to_value(update)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        if let Some(obj) = data.as_object_mut() {
            obj.insert("updatedAt".to_string(), json!(chrono::Utc::now()));
        }

        let response = self
            .client
            .patch(self.document_url(user_id))
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&json!({ "data": data }))
            .send()
            .await?;

        Self::check_status(response.status(), &format!("profile {}", user_id))?;

        tracing::debug!("Updated profile for user: {}", user_id);

        let json: Value = response.json().await?;
        parse_document(&json)
    }
}

/// Extract a profile from an Appwrite document
///
/// Attributes may be nested under `data`; a missing `userId` falls back to
/// the document's `$id`.
fn parse_document(doc: &Value) -> Result<ProfileDocument, AppwriteError> {
    let data = doc.get("data").unwrap_or(doc);
    let mut data = data.clone();

    if let Some(obj) = data.as_object_mut() {
        if !obj.contains_key("userId") && !obj.contains_key("uid") {
            if let Some(id) = doc.get("$id").cloned() {
                obj.insert("userId".to_string(), id);
            }
        }
    }

    serde_json::from_value(data)
        .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse profile: {}", e)))
}

#[async_trait]
impl ProfileStore for AppwriteClient {
    async fn get_profile(&self, user_id: &str) -> Result<ProfileDocument, StoreError> {
        Ok(self.fetch_profile(user_id).await?)
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileDocument>, StoreError> {
        Ok(self.fetch_all_profiles().await?)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<ProfileDocument, StoreError> {
        Ok(self.patch_profile(user_id, update).await?)
    }
}
