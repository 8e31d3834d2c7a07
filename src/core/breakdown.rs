use crate::models::{Profile, Role};
use serde::{Deserialize, Serialize};

/// Human-readable explanation of a match, relative to the profile asking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    #[serde(rename = "commonInterests")]
    pub common_interests: Vec<String>,
    #[serde(rename = "motivationAlignment")]
    pub motivation_alignment: String,
}

impl MatchBreakdown {
    pub fn explain(subject: &Profile, other: &Profile) -> Self {
        Self {
            common_interests: common_interests(subject, other),
            motivation_alignment: motivation_alignment(subject.role, other.role).to_string(),
        }
    }
}

/// Shared interests in sorted order
pub fn common_interests(subject: &Profile, other: &Profile) -> Vec<String> {
    subject
        .interests
        .intersection(&other.interests)
        .cloned()
        .collect()
}

pub fn motivation_alignment(subject: Role, other: Role) -> &'static str {
    match (subject, other) {
        (Role::Mentor, Role::Seeker) => "Perfect mentor-mentee match",
        (Role::Seeker, Role::Mentor) => "Great learning opportunity",
        _ => "Peer connection",
    }
}
