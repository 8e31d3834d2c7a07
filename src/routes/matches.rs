use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use super::{error_response, invalidate, load_profile, store_error_response, AppState};
use crate::core::MatchBreakdown;
use crate::models::{
    GenerateMatchesRequest, GenerateMatchesResponse, GeneratedMatch, HealthResponse,
    ListMatchesQuery, ListMatchesResponse, MatchRecord, MatchStatus, Profile, ScorePairRequest,
    ScorePairResponse, UpdateMatchStatusRequest,
};
use crate::services::CacheKey;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches", web::get().to(list_matches))
        .route("/matches/generate", web::post().to(generate_matches))
        .route("/matches/score", web::post().to(score_pair))
        .route("/matches/{id}", web::get().to(get_match))
        .route("/matches/{id}/status", web::patch().to(update_match_status));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let repo_healthy = state.matches.health_check().await.unwrap_or(false);

    let status = if repo_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate matches endpoint
///
/// POST /api/v1/matches/generate
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "threshold": 5.0,
///   "limit": 10,
///   "excludeUserIds": ["string"]
/// }
/// ```
///
/// Every qualifying pair is persisted as a pending match (existing pairs keep
/// their status); the best `limit` are returned. Stored matches of the user
/// that no longer qualify get their scores refreshed.
async fn generate_matches(
    state: web::Data<AppState>,
    req: web::Json<GenerateMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for generate_matches request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let user_id = &req.user_id;
    let threshold = req.threshold.unwrap_or(state.matching.threshold);
    let limit = req
        .limit
        .map(usize::from)
        .unwrap_or(state.matching.top_n)
        .min(state.matching.max_top_n);

    tracing::info!("Generating matches for user: {}, threshold: {}, limit: {}", user_id, threshold, limit);

    let subject_doc = match load_profile(&state, user_id).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return store_error_response(&e, "Failed to fetch user profile");
        }
    };

    let subject = match Profile::try_from(subject_doc) {
        Ok(profile) => profile,
        Err(e) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Incomplete profile", e.to_string());
        }
    };

    let documents = match state.profiles.list_profiles().await {
        Ok(docs) => docs,
        Err(e) => {
            tracing::error!("Failed to list candidate profiles: {}", e);
            return store_error_response(&e, "Failed to list profiles");
        }
    };

    let candidates: Vec<Profile> = documents
        .into_iter()
        .filter_map(|doc| match Profile::try_from(doc) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("Skipping candidate: {}", e);
                None
            }
        })
        .collect();

    tracing::debug!("Scoring {} candidates for {}", candidates.len(), user_id);

    let ranked = state
        .ranker
        .qualifying(&subject, &candidates, threshold, &req.exclude_user_ids);

    let mut generated = Vec::with_capacity(ranked.len());
    let mut stale_keys = vec![CacheKey::matches(user_id)];

    let to_save = ranked.len();

    for ranked_match in ranked {
        let record = match state
            .matches
            .upsert_match(user_id, &ranked_match.user_id, &ranked_match.result)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    "Failed to save match {} -> {} after saving {} of {} matches: {}",
                    user_id,
                    ranked_match.user_id,
                    generated.len(),
                    to_save,
                    e
                );
                invalidate(&state, &stale_keys).await;
                return store_error_response(&e, "Failed to save match");
            }
        };

        stale_keys.push(CacheKey::matches(&ranked_match.user_id));
        generated.push(GeneratedMatch {
            match_id: record.id,
            status: record.status,
            ranked: ranked_match,
        });
    }

    let refreshed = refresh_stale_matches(&state, &subject, &candidates, &generated).await;
    stale_keys.extend(refreshed.iter().map(|id| CacheKey::matches(id)));

    invalidate(&state, &stale_keys).await;

    let match_count = generated.len();
    generated.truncate(limit);

    tracing::info!(
        "Returning {} of {} matches for user {} (from {} candidates)",
        generated.len(),
        match_count,
        user_id,
        candidates.len()
    );

    HttpResponse::Ok().json(GenerateMatchesResponse {
        success: true,
        match_count,
        total_candidates: candidates.len(),
        matches: generated,
    })
}

/// Rescore stored matches of the subject that were not regenerated this run
///
/// Counterparts that are no longer usable profiles are left untouched.
/// Failures are logged and do not fail the request. Returns the ids of the
/// refreshed counterparts.
async fn refresh_stale_matches(
    state: &AppState,
    subject: &Profile,
    candidates: &[Profile],
    generated: &[GeneratedMatch],
) -> Vec<String> {
    let existing = match state.matches.list_user_matches(&subject.user_id).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Could not load stored matches of {}: {}", subject.user_id, e);
            return Vec::new();
        }
    };

    let mut refreshed = Vec::new();

    for record in existing {
        if generated.iter().any(|g| g.match_id == record.id) {
            continue;
        }

        let counterpart_id = record.counterpart(&subject.user_id);
        let Some(counterpart) = candidates.iter().find(|c| c.user_id == counterpart_id) else {
            continue;
        };

        let result = state.ranker.scorer().score(subject, counterpart);
        if result == record.scores {
            continue;
        }

        match state
            .matches
            .upsert_match(&subject.user_id, &counterpart.user_id, &result)
            .await
        {
            Ok(_) => refreshed.push(counterpart.user_id.clone()),
            Err(e) => tracing::warn!(
                "Failed to refresh match {} <-> {}: {}",
                subject.user_id,
                counterpart.user_id,
                e
            ),
        }
    }

    if !refreshed.is_empty() {
        tracing::info!("Refreshed {} stale matches for {}", refreshed.len(), subject.user_id);
    }

    refreshed
}

/// Score preview endpoint
///
/// POST /api/v1/matches/score
///
/// Scores one pair and explains it without persisting anything.
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScorePairRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    if req.user_id == req.target_user_id {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid pair",
            "userId and targetUserId must differ",
        );
    }

    let mut profiles = Vec::with_capacity(2);
    for id in [&req.user_id, &req.target_user_id] {
        let doc = match load_profile(&state, id).await {
            Ok(doc) => doc,
            Err(e) => return store_error_response(&e, "Failed to fetch user profile"),
        };
        match Profile::try_from(doc) {
            Ok(profile) => profiles.push(profile),
            Err(e) => {
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Incomplete profile", e.to_string());
            }
        }
    }

    let (subject, target) = (&profiles[0], &profiles[1]);
    let result = state.ranker.scorer().score(subject, target);

    tracing::debug!(
        "Scored {} -> {}: {}",
        subject.user_id,
        target.user_id,
        result.compatibility_score
    );

    HttpResponse::Ok().json(ScorePairResponse {
        user_id: subject.user_id.clone(),
        target_user_id: target.user_id.clone(),
        result,
        breakdown: MatchBreakdown::explain(subject, target),
    })
}

/// List a user's persisted matches
///
/// GET /api/v1/matches?userId={userId}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ListMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let user_id = &query.user_id;
    let key = CacheKey::matches(user_id);

    if let Ok(matches) = state.cache.get::<Vec<MatchRecord>>(&key).await {
        return HttpResponse::Ok().json(ListMatchesResponse { success: true, matches });
    }

    match state.matches.list_user_matches(user_id).await {
        Ok(matches) => {
            if let Err(e) = state.cache.set(&key, &matches).await {
                tracing::warn!("Failed to cache matches for {}: {}", user_id, e);
            }
            HttpResponse::Ok().json(ListMatchesResponse { success: true, matches })
        }
        Err(e) => {
            tracing::error!("Failed to fetch matches for {}: {}", user_id, e);
            store_error_response(&e, "Failed to fetch matches")
        }
    }
}

/// GET /api/v1/matches/{id}
async fn get_match(state: web::Data<AppState>, path: web::Path<uuid::Uuid>) -> impl Responder {
    let match_id = path.into_inner();

    match state.matches.get_match(match_id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => {
            tracing::info!("Failed to get match {}: {}", match_id, e);
            store_error_response(&e, "Failed to get match")
        }
    }
}

/// Update match status endpoint
///
/// PATCH /api/v1/matches/{id}/status
///
/// Request body:
/// ```json
/// { "status": "pending|accepted|rejected" }
/// ```
async fn update_match_status(
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<UpdateMatchStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let status: MatchStatus = match req.status.parse() {
        Ok(status) => status,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid status",
                "Status must be one of: pending, accepted, rejected",
            );
        }
    };

    let match_id = path.into_inner();

    match state.matches.update_status(match_id, status).await {
        Ok(record) => {
            invalidate(
                &state,
                &[CacheKey::matches(&record.user1_id), CacheKey::matches(&record.user2_id)],
            )
            .await;

            tracing::info!("Match {} set to {}", match_id, status.as_str());
            HttpResponse::Ok().json(record)
        }
        Err(e) => {
            tracing::error!("Failed to update match {}: {}", match_id, e);
            store_error_response(&e, "Failed to update match")
        }
    }
}
