// Route exports
pub mod matches;
pub mod users;

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::Ranker;
use crate::models::{ErrorResponse, ProfileDocument};
use crate::services::{CacheKey, CacheManager, MatchRepository, ProfileStore, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub matches: Arc<dyn MatchRepository>,
    pub cache: Arc<CacheManager>,
    pub ranker: Ranker,
    pub matching: MatchingSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(users::configure),
    );
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Map a store failure onto an HTTP error
pub(crate) fn store_error_response(err: &StoreError, error: &str) -> HttpResponse {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::InvalidRecord(_) | StoreError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error, err.to_string())
}

/// Fetch a profile, serving from cache when possible
pub(crate) async fn load_profile(state: &AppState, user_id: &str) -> Result<ProfileDocument, StoreError> {
    let key = CacheKey::profile(user_id);

    if let Ok(profile) = state.cache.get::<ProfileDocument>(&key).await {
        return Ok(profile);
    }

    let profile = state.profiles.get_profile(user_id).await?;

    if let Err(e) = state.cache.set(&key, &profile).await {
        tracing::warn!("Failed to cache profile {}: {}", user_id, e);
    }

    Ok(profile)
}

/// Drop cached entries, logging rather than failing
pub(crate) async fn invalidate(state: &AppState, keys: &[String]) {
    for key in keys {
        if let Err(e) = state.cache.delete(key).await {
            tracing::warn!("Failed to invalidate cache key {}: {}", key, e);
        }
    }
}
