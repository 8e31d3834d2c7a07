use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Neutral midpoint used for any personality trait a profile leaves unset
pub const NEUTRAL_TRAIT: f64 = 5.0;

/// Errors raised when a stored record cannot be used for scoring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Profile {0} has no role")]
    MissingRole(String),

    #[error("Profile has an empty user id")]
    MissingUserId,
}

/// Which side of a mentorship a profile is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Seeker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mentor => "mentor",
            Role::Seeker => "seeker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four personality traits on a nominal 0-10 scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Personality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub extrovert: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub patient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub humorous: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub empathetic: Option<f64>,
}

impl Personality {
    /// Fully specified personality, mostly useful for fixtures
    pub fn new(extrovert: f64, patient: f64, humorous: f64, empathetic: f64) -> Self {
        Self {
            extrovert: Some(extrovert),
            patient: Some(patient),
            humorous: Some(humorous),
            empathetic: Some(empathetic),
        }
    }

    /// Trait values in a fixed order, with unset traits at the neutral midpoint.
    /// Only an absent value is neutral; an explicit 0 stays 0.
    pub fn traits_or_neutral(&self) -> [f64; 4] {
        [
            self.extrovert.unwrap_or(NEUTRAL_TRAIT),
            self.patient.unwrap_or(NEUTRAL_TRAIT),
            self.humorous.unwrap_or(NEUTRAL_TRAIT),
            self.empathetic.unwrap_or(NEUTRAL_TRAIT),
        ]
    }
}

/// Profile record as held by the profile store
///
/// Everything except the id is optional here; `Profile::try_from` decides
/// whether the record is usable for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(rename = "userId", alias = "uid")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ProfileDocument {
    pub fn new(user_id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            bio: None,
            age: None,
            role,
            interests: Vec::new(),
            personality: Personality::default(),
            location: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Partial update to a stored profile. Identity and creation time are not
/// part of it and therefore can never change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Personality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }

    /// Apply the set fields onto a stored document
    pub fn apply_to(&self, doc: &mut ProfileDocument) {
        if let Some(name) = &self.name {
            doc.name = name.clone();
        }
        if let Some(bio) = &self.bio {
            doc.bio = Some(bio.clone());
        }
        if let Some(age) = self.age {
            doc.age = Some(age);
        }
        if let Some(role) = self.role {
            doc.role = Some(role);
        }
        if let Some(interests) = &self.interests {
            doc.interests = interests.clone();
        }
        if let Some(personality) = self.personality {
            doc.personality = personality;
        }
        if let Some(location) = &self.location {
            doc.location = Some(location.clone());
        }
        doc.updated_at = Some(chrono::Utc::now());
    }
}

/// Validated, read-only input to the compatibility scorer
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub interests: BTreeSet<String>,
    pub personality: Personality,
    pub location: Option<String>,
}

impl Profile {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            role,
            interests: BTreeSet::new(),
            personality: Personality::default(),
            location: None,
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = normalize_location(Some(location.into()));
        self
    }
}

fn normalize_location(location: Option<String>) -> Option<String> {
    location.filter(|l| !l.is_empty())
}

impl TryFrom<ProfileDocument> for Profile {
    type Error = ProfileError;

    fn try_from(doc: ProfileDocument) -> Result<Self, Self::Error> {
        if doc.user_id.is_empty() {
            return Err(ProfileError::MissingUserId);
        }
        let role = doc.role.ok_or_else(|| ProfileError::MissingRole(doc.user_id.clone()))?;

        Ok(Self {
            user_id: doc.user_id,
            name: doc.name,
            role,
            interests: doc.interests.into_iter().collect(),
            personality: doc.personality,
            location: normalize_location(doc.location),
        })
    }
}

/// Compatibility score and its four components, all on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    #[serde(rename = "interestScore")]
    pub interest_score: f64,
    #[serde(rename = "personalityScore")]
    pub personality_score: f64,
    #[serde(rename = "motivationScore")]
    pub motivation_score: f64,
    #[serde(rename = "locationScore")]
    pub location_score: f64,
}

/// Workflow status of a persisted match. Assigned by callers, never by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MatchStatus::Pending),
            "accepted" => Ok(MatchStatus::Accepted),
            "rejected" => Ok(MatchStatus::Rejected),
            other => Err(format!("unknown match status: {}", other)),
        }
    }
}

/// Persisted match between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: uuid::Uuid,
    #[serde(rename = "user1Id")]
    pub user1_id: String,
    #[serde(rename = "user2Id")]
    pub user2_id: String,
    #[serde(flatten)]
    pub scores: MatchResult,
    pub status: MatchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MatchRecord {
    /// Fresh pending record for a newly scored pair
    pub fn pending(user1_id: &str, user2_id: &str, scores: MatchResult) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            user1_id: user1_id.to_string(),
            user2_id: user2_id.to_string(),
            scores,
            status: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this record covers the given pair, in either order
    pub fn is_pair(&self, a: &str, b: &str) -> bool {
        (self.user1_id == a && self.user2_id == b) || (self.user1_id == b && self.user2_id == a)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The participant that is not `user_id`
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.user1_id == user_id {
            &self.user2_id
        } else {
            &self.user1_id
        }
    }
}

/// Invalid scoring weight configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("Weight {0} is negative")]
    Negative(&'static str),

    #[error("Weights must sum to 1.0, got {0}")]
    BadSum(f64),
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub interest: f64,
    pub personality: f64,
    pub motivation: f64,
    pub location: f64,
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, value) in [
            ("interest", self.interest),
            ("personality", self.personality),
            ("motivation", self.motivation),
            ("location", self.location),
        ] {
            if value < 0.0 {
                return Err(WeightsError::Negative(name));
            }
        }

        let sum = self.interest + self.personality + self.motivation + self.location;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(WeightsError::BadSum(sum));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            interest: 0.4,
            personality: 0.3,
            motivation: 0.2,
            location: 0.1,
        }
    }
}
