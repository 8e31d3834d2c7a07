// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    MatchRecord, MatchResult, MatchStatus, Personality, Profile, ProfileDocument, ProfileError,
    ProfileUpdate, Role, ScoringWeights, WeightsError,
};
pub use requests::{
    GenerateMatchesRequest, ListMatchesQuery, ScorePairRequest, UpdateMatchStatusRequest,
    UpdateProfileRequest,
};
pub use responses::{
    ErrorResponse, GenerateMatchesResponse, GeneratedMatch, HealthResponse, ListMatchesResponse,
    ScorePairResponse,
};
