//! Mentor Match - compatibility scoring and match service
//!
//! This library pairs mentors (older adults sharing experience) with seekers
//! (students looking for mentorship or companionship). The core is a pure,
//! symmetric compatibility scorer and a ranker built on it; the surrounding
//! services persist profiles and matches behind injectable traits.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_compatibility, CompatibilityScorer, MatchBreakdown, RankedMatch, RankedMatches, Ranker};
pub use models::{MatchRecord, MatchResult, MatchStatus, Personality, Profile, ProfileDocument, Role, ScoringWeights};
