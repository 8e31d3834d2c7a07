use crate::models::{MatchResult, Profile, Role, ScoringWeights};

/// Score given when one side has no stated interests or the pairing is unremarkable
pub const NEUTRAL_SCORE: f64 = 5.0;
/// Upper bound of every score
pub const MAX_SCORE: f64 = 10.0;

/// Round to one decimal place, half away from zero
#[inline]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Calculate the compatibility (0-10) of two profiles
///
/// Scoring formula:
/// score = (
///     interest_score * 0.4 +       # Jaccard overlap of interests
///     personality_score * 0.3 +    # Closer trait values = higher
///     motivation_score * 0.2 +     # Mentor paired with seeker
///     location_score * 0.1         # Same location string
/// )
///
/// The total is built from the already-rounded sub-scores. Every rule is
/// symmetric, so swapping `a` and `b` gives the same result.
pub fn calculate_compatibility(a: &Profile, b: &Profile, weights: &ScoringWeights) -> MatchResult {
    let interest = interest_score(a, b);
    let personality = personality_score(a, b);
    let motivation = motivation_score(a, b);
    let location = location_score(a, b);

    let total = interest * weights.interest
        + personality * weights.personality
        + motivation * weights.motivation
        + location * weights.location;

    MatchResult {
        compatibility_score: round_to_tenth(total.clamp(0.0, MAX_SCORE)),
        interest_score: interest,
        personality_score: personality,
        motivation_score: motivation,
        location_score: location,
    }
}

/// Interest score (0-10): Jaccard similarity stretched over the scale.
/// Neutral when either side has no interests at all.
#[inline]
pub fn interest_score(a: &Profile, b: &Profile) -> f64 {
    if a.interests.is_empty() || b.interests.is_empty() {
        return NEUTRAL_SCORE;
    }

    let shared = a.interests.intersection(&b.interests).count();
    let union = a.interests.union(&b.interests).count();

    round_to_tenth(shared as f64 / union as f64 * MAX_SCORE)
}

/// Personality score (0-10): ten minus the mean absolute trait difference
#[inline]
pub fn personality_score(a: &Profile, b: &Profile) -> f64 {
    let traits_a = a.personality.traits_or_neutral();
    let traits_b = b.personality.traits_or_neutral();

    let total_diff: f64 = traits_a
        .iter()
        .zip(traits_b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum();
    let avg_diff = total_diff / traits_a.len() as f64;

    round_to_tenth((MAX_SCORE - avg_diff).max(0.0))
}

/// Motivation score: full marks when the roles differ and one of them mentors
#[inline]
pub fn motivation_score(a: &Profile, b: &Profile) -> f64 {
    if a.role != b.role && (a.role == Role::Mentor || b.role == Role::Mentor) {
        MAX_SCORE
    } else {
        NEUTRAL_SCORE
    }
}

/// Location score: full marks only for two present, byte-equal locations
#[inline]
pub fn location_score(a: &Profile, b: &Profile) -> f64 {
    match (a.location.as_deref(), b.location.as_deref()) {
        (Some(la), Some(lb)) if !la.is_empty() && la == lb => MAX_SCORE,
        _ => NEUTRAL_SCORE,
    }
}

/// Pure compatibility scorer bound to a set of weights
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityScorer {
    weights: ScoringWeights,
}

impl CompatibilityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, a: &Profile, b: &Profile) -> MatchResult {
        calculate_compatibility(a, b, &self.weights)
    }
}
