use serde::{Deserialize, Serialize};
use crate::core::{MatchBreakdown, RankedMatch};
use crate::models::domain::{MatchRecord, MatchResult};

/// A freshly generated match as returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMatch {
    #[serde(rename = "matchId")]
    pub match_id: uuid::Uuid,
    pub status: crate::models::domain::MatchStatus,
    #[serde(flatten)]
    pub ranked: RankedMatch,
}

/// Response for the generate matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateMatchesResponse {
    pub success: bool,
    #[serde(rename = "matchCount")]
    pub match_count: usize,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub matches: Vec<GeneratedMatch>,
}

/// Response for the score preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "targetUserId")]
    pub target_user_id: String,
    #[serde(flatten)]
    pub result: MatchResult,
    pub breakdown: MatchBreakdown,
}

/// Response for listing a user's persisted matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMatchesResponse {
    pub success: bool,
    pub matches: Vec<MatchRecord>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
