use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use super::{error_response, invalidate, load_profile, store_error_response, AppState};
use crate::models::{ProfileUpdate, UpdateProfileRequest};
use crate::services::CacheKey;

/// Configure profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}", web::patch().to(update_user));
}

/// GET /api/v1/users/{id}
async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();

    match load_profile(&state, &user_id).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user,
        })),
        Err(e) => {
            tracing::info!("Failed to get user {}: {}", user_id, e);
            store_error_response(&e, "Failed to get user")
        }
    }
}

/// PATCH /api/v1/users/{id}
///
/// Partial update; `userId` and `createdAt` cannot be changed.
async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let user_id = path.into_inner();
    let update = ProfileUpdate::from(req.into_inner());

    if update.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Empty update", "No updatable fields supplied");
    }

    match state.profiles.update_profile(&user_id, &update).await {
        Ok(user) => {
            invalidate(&state, &[CacheKey::profile(&user_id)]).await;
            tracing::info!("Updated profile for user {}", user_id);

            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "user": user,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to update user {}: {}", user_id, e);
            store_error_response(&e, "Failed to update user")
        }
    }
}
