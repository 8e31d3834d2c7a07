// Integration tests for Mentor Match

use actix_web::{http::StatusCode, test, web, App};
use mentor_match::config::MatchingSettings;
use mentor_match::core::{Ranker, DEFAULT_THRESHOLD};
use mentor_match::models::{MatchRecord, MatchResult, MatchStatus, Personality, Profile, ProfileDocument, Role};
use mentor_match::routes::{self, AppState};
use mentor_match::services::{
    CacheManager, InMemoryMatchRepository, InMemoryProfileStore, MatchRepository, StoreError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn create_document(id: &str, role: Option<Role>, interests: &[&str], location: Option<&str>) -> ProfileDocument {
    let mut doc = ProfileDocument::new(id, role);
    doc.name = format!("User {}", id);
    doc.interests = interests.iter().map(|s| s.to_string()).collect();
    doc.location = location.map(str::to_string);
    doc
}

fn seed_documents() -> Vec<ProfileDocument> {
    vec![
        create_document("m1", Some(Role::Mentor), &["cooking", "reading"], Some("Berkeley, CA")),
        create_document("m2", Some(Role::Mentor), &["golf"], Some("Austin, TX")),
        create_document("s1", Some(Role::Seeker), &["cooking", "reading"], Some("Berkeley, CA")),
        create_document("s2", Some(Role::Seeker), &["golf"], Some("Austin, TX")),
        create_document("norole", None, &[], None),
    ]
}

fn create_state() -> AppState {
    AppState {
        profiles: Arc::new(InMemoryProfileStore::with_profiles(seed_documents())),
        matches: Arc::new(InMemoryMatchRepository::new()),
        cache: Arc::new(CacheManager::l1_only(100, 60)),
        ranker: Ranker::default(),
        matching: MatchingSettings::default(),
    }
}

/// Match repository whose writes start failing after a fixed number of upserts
struct FlakyMatchRepository {
    inner: InMemoryMatchRepository,
    remaining: AtomicUsize,
}

#[async_trait::async_trait]
impl MatchRepository for FlakyMatchRepository {
    async fn upsert_match(
        &self,
        user1_id: &str,
        user2_id: &str,
        scores: &MatchResult,
    ) -> Result<MatchRecord, StoreError> {
        if self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
        {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.upsert_match(user1_id, user2_id, scores).await
    }

    async fn get_match(&self, match_id: uuid::Uuid) -> Result<MatchRecord, StoreError> {
        self.inner.get_match(match_id).await
    }

    async fn list_user_matches(&self, user_id: &str) -> Result<Vec<MatchRecord>, StoreError> {
        self.inner.list_user_matches(user_id).await
    }

    async fn update_status(
        &self,
        match_id: uuid::Uuid,
        status: MatchStatus,
    ) -> Result<MatchRecord, StoreError> {
        self.inner.update_status(match_id, status).await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[core::prelude::v1::test]
fn test_integration_rank_fifteen_candidates() {
    let ranker = Ranker::default();
    let subject = Profile::new("subject", Role::Mentor)
        .with_interests(["cooking", "reading", "travel"])
        .with_personality(Personality::new(7.0, 8.0, 6.0, 9.0))
        .with_location("Berkeley, CA");

    let interest_pool = ["cooking", "reading", "travel", "chess", "golf", "music"];
    let candidates: Vec<Profile> = (0..15)
        .map(|i| {
            let role = if i % 3 == 0 { Role::Mentor } else { Role::Seeker };
            let interests: Vec<&str> = interest_pool.iter().skip(i % 4).take(1 + i % 3).copied().collect();
            let trait_value = (i % 11) as f64;
            let location = if i % 2 == 0 { "Berkeley, CA" } else { "Oakland, CA" };

            Profile::new(format!("c{}", i), role)
                .with_interests(interests)
                .with_personality(Personality::new(trait_value, 10.0 - trait_value, 5.0, trait_value))
                .with_location(location)
        })
        .collect();

    let result = ranker.rank(&subject, &candidates, DEFAULT_THRESHOLD, 10);

    assert!(result.matches.len() <= 10);
    assert_eq!(result.total_candidates, 15);
    for m in &result.matches {
        assert!(m.result.compatibility_score >= 5.0);
    }
    for pair in result.matches.windows(2) {
        assert!(
            pair[0].result.compatibility_score >= pair[1].result.compatibility_score,
            "Matches not sorted by score"
        );
    }
}

#[actix_web::test]
async fn test_generate_matches_persists_and_ranks() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // s1: perfect overlap; s2: 0*0.4 + 10*0.3 + 10*0.2 + 5*0.1 = 5.5; m2 scores 4.5
    assert_eq!(body["success"], true);
    assert_eq!(body["matchCount"], 2);
    assert_eq!(body["totalCandidates"], 4);
    assert_eq!(body["matches"][0]["userId"], "s1");
    assert_eq!(body["matches"][0]["compatibilityScore"], 10.0);
    assert_eq!(body["matches"][0]["status"], "pending");
    assert_eq!(
        body["matches"][0]["breakdown"]["motivationAlignment"],
        "Perfect mentor-mentee match"
    );
    assert_eq!(body["matches"][1]["userId"], "s2");
    assert_eq!(body["matches"][1]["compatibilityScore"], 5.5);
}

#[actix_web::test]
async fn test_generate_respects_limit_and_threshold() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1", "limit": 1, "threshold": 0.0 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["matchCount"], 3);
    assert_eq!(body["matches"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_generate_rejects_profile_without_role() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "norole" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_generate_unknown_user_is_not_found() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_generate_validates_request() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1", "threshold": 11.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_status_workflow_survives_regeneration() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = body["matches"][0]["matchId"].as_str().unwrap().to_string();

    // Warm the match list cache for the counterpart
    let req = test::TestRequest::get().uri("/api/v1/matches?userId=s1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["status"], "pending");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/status", match_id))
        .set_json(json!({ "status": "accepted" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "accepted");

    let req = test::TestRequest::get().uri("/api/v1/matches?userId=s1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["status"], "accepted");

    // Scoring from the other side updates the same pair and keeps its status
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "s1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["matchId"], match_id.as_str());
    assert_eq!(body["matches"][0]["status"], "accepted");
}

#[actix_web::test]
async fn test_invalid_status_rejected() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/status", uuid::Uuid::new_v4()))
        .set_json(json!({ "status": "maybe" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/status", uuid::Uuid::new_v4()))
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_score_preview() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({ "userId": "s1", "targetUserId": "m1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["compatibilityScore"], 10.0);
    assert_eq!(body["breakdown"]["commonInterests"], json!(["cooking", "reading"]));
    assert_eq!(body["breakdown"]["motivationAlignment"], "Great learning opportunity");

    // Nothing was persisted
    let req = test::TestRequest::get().uri("/api/v1/matches?userId=s1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"], json!([]));
}

#[actix_web::test]
async fn test_profile_update_enables_matching() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/users/norole").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["role"], Value::Null);

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/norole")
        .set_json(json!({ "role": "seeker", "userId": "hijack" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["role"], "seeker");
    assert_eq!(body["user"]["userId"], "norole");

    // Cached profile was invalidated by the update
    let req = test::TestRequest::get().uri("/api/v1/users/norole").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["role"], "seeker");

    // No interests, no location: 5*0.4 + 10*0.3 + 10*0.2 + 5*0.1 = 7.5
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({ "userId": "m1", "targetUserId": "norole" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["compatibilityScore"], 7.5);
}

#[actix_web::test]
async fn test_profile_update_validation() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/m1")
        .set_json(json!({ "personality": { "extrovert": 11 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/m1")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health_check() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_seeded_memory_backend_serves_matches() {
    let profiles = InMemoryProfileStore::from_seed_file("config/seed.json").unwrap();
    let state = AppState {
        profiles: Arc::new(profiles),
        ..create_state()
    };
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/users/mentor-ruth").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["name"], "Ruth");

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "mentor-ruth" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalCandidates"], 4);
    assert_eq!(body["matches"][0]["userId"], "seeker-maya");
}

#[actix_web::test]
async fn test_get_match_by_id() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = body["matches"][0]["matchId"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/matches/{}", match_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], match_id.as_str());
    assert_eq!(body["user1Id"], "m1");
    assert_eq!(body["user2Id"], "s1");
    assert_eq!(body["compatibilityScore"], 10.0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/matches/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_limit_above_default_cap_is_clamped() {
    let mut state = create_state();
    state.matching.max_top_n = 200;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1", "limit": 150, "threshold": 0.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["matches"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1", "limit": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_regeneration_refreshes_matches_below_threshold() {
    let state = create_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][1]["userId"], "s2");
    assert_eq!(body["matches"][1]["compatibilityScore"], 5.5);

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/s2")
        .set_json(json!({ "personality": { "extrovert": 0, "patient": 0, "humorous": 0, "empathetic": 0 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Warm the counterpart's list so the refresh has to invalidate it
    let req = test::TestRequest::get().uri("/api/v1/matches?userId=s2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["compatibilityScore"], 5.5);

    // s2 now: 0*0.4 + 5*0.3 + 10*0.2 + 5*0.1 = 4.0
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matchCount"], 1);

    let req = test::TestRequest::get().uri("/api/v1/matches?userId=m1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["compatibilityScore"], 10.0);
    assert_eq!(body["matches"][1]["user2Id"], "s2");
    assert_eq!(body["matches"][1]["compatibilityScore"], 4.0);

    let req = test::TestRequest::get().uri("/api/v1/matches?userId=s2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["compatibilityScore"], 4.0);
}

#[actix_web::test]
async fn test_partial_save_failure_keeps_earlier_matches() {
    let repo = Arc::new(FlakyMatchRepository {
        inner: InMemoryMatchRepository::new(),
        remaining: AtomicUsize::new(1),
    });
    let state = AppState {
        matches: repo.clone(),
        ..create_state()
    };
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "m1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(repo.inner.len().await, 1);

    let req = test::TestRequest::get().uri("/api/v1/matches?userId=m1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"][0]["user2Id"], "s1");
}
