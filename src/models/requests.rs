use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Personality, ProfileUpdate, Role};

/// Request to generate matches for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Clamped to `matching.max_top_n`
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    #[serde(alias = "exclude_user_ids", rename = "excludeUserIds")]
    pub exclude_user_ids: Vec<String>,
}

/// Request to score one pair without persisting anything
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScorePairRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
}

/// Request to move a match through its workflow
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMatchStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(range(min = 13, max = 120))]
    pub age: Option<u8>,
    pub role: Option<Role>,
    #[validate(length(max = 50))]
    pub interests: Option<Vec<String>>,
    #[validate(nested)]
    pub personality: Option<Personality>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            bio: req.bio,
            age: req.age,
            role: req.role,
            interests: req.interests,
            personality: req.personality,
            location: req.location,
        }
    }
}

/// Query for listing persisted matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListMatchesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
