use crate::models::{MatchResult, Profile};

/// Check whether a candidate may be scored against the subject
///
/// The subject itself and any explicitly excluded ids are skipped.
#[inline]
pub fn is_eligible_candidate(subject: &Profile, candidate: &Profile, exclude_ids: &[String]) -> bool {
    if candidate.user_id == subject.user_id {
        return false;
    }

    !exclude_ids.contains(&candidate.user_id)
}

/// Check if a scored pair clears the match threshold
#[inline]
pub fn meets_threshold(result: &MatchResult, threshold: f64) -> bool {
    result.compatibility_score >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_subject_is_never_a_candidate() {
        let subject = Profile::new("me", Role::Mentor);
        let twin = Profile::new("me", Role::Seeker);
        let other = Profile::new("you", Role::Seeker);

        assert!(!is_eligible_candidate(&subject, &twin, &[]));
        assert!(is_eligible_candidate(&subject, &other, &[]));
        assert!(!is_eligible_candidate(&subject, &other, &["you".to_string()]));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let result = MatchResult {
            compatibility_score: 5.0,
            interest_score: 5.0,
            personality_score: 5.0,
            motivation_score: 5.0,
            location_score: 5.0,
        };

        assert!(meets_threshold(&result, 5.0));
        assert!(!meets_threshold(&result, 5.1));
    }
}
