// Core algorithm exports
pub mod breakdown;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use breakdown::MatchBreakdown;
pub use filters::{is_eligible_candidate, meets_threshold};
pub use ranker::{RankedMatch, RankedMatches, Ranker, DEFAULT_THRESHOLD, DEFAULT_TOP_N};
pub use scoring::{calculate_compatibility, round_to_tenth, CompatibilityScorer};
