use crate::core::{
    breakdown::MatchBreakdown,
    filters::{is_eligible_candidate, meets_threshold},
    scoring::CompatibilityScorer,
};
use crate::models::{MatchResult, Profile, ScoringWeights};
use serde::{Deserialize, Serialize};

/// Minimum compatibility score for a pair to count as a match
pub const DEFAULT_THRESHOLD: f64 = 5.0;
/// Number of matches returned by default
pub const DEFAULT_TOP_N: usize = 10;

/// A scored candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub result: MatchResult,
    pub breakdown: MatchBreakdown,
}

/// Result of a ranking pass
#[derive(Debug, Clone)]
pub struct RankedMatches {
    pub matches: Vec<RankedMatch>,
    pub total_candidates: usize,
    pub qualifying: usize,
}

/// Ranks a candidate pool against one subject profile
///
/// # Pipeline Stages
/// 1. Eligibility (drop the subject itself and excluded ids)
/// 2. Pairwise compatibility scoring
/// 3. Threshold filter
/// 4. Stable sort, highest score first
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    scorer: CompatibilityScorer,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            scorer: CompatibilityScorer::new(weights),
        }
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    /// Every candidate scoring at least `threshold`, best first
    ///
    /// Ties keep the order of `candidates`.
    pub fn qualifying(
        &self,
        subject: &Profile,
        candidates: &[Profile],
        threshold: f64,
        exclude_ids: &[String],
    ) -> Vec<RankedMatch> {
        let mut matches: Vec<RankedMatch> = candidates
            .iter()
            .filter(|candidate| is_eligible_candidate(subject, candidate, exclude_ids))
            .filter_map(|candidate| {
                let result = self.scorer.score(subject, candidate);

                if meets_threshold(&result, threshold) {
                    Some(RankedMatch {
                        user_id: candidate.user_id.clone(),
                        result,
                        breakdown: MatchBreakdown::explain(subject, candidate),
                    })
                } else {
                    None
                }
            })
            .collect();

        // sort_by is stable
        matches.sort_by(|a, b| {
            b.result
                .compatibility_score
                .partial_cmp(&a.result.compatibility_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        matches
    }

    /// Top `top_n` matches for the subject
    pub fn rank(
        &self,
        subject: &Profile,
        candidates: &[Profile],
        threshold: f64,
        top_n: usize,
    ) -> RankedMatches {
        let mut matches = self.qualifying(subject, candidates, threshold, &[]);
        let qualifying = matches.len();
        matches.truncate(top_n);

        RankedMatches {
            matches,
            total_candidates: candidates.len(),
            qualifying,
        }
    }

    /// `rank` with the default threshold and result count
    pub fn rank_default(&self, subject: &Profile, candidates: &[Profile]) -> RankedMatches {
        self.rank(subject, candidates, DEFAULT_THRESHOLD, DEFAULT_TOP_N)
    }
}
