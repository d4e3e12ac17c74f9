//! Adaptive difficulty policy
//!
//! Difficulty climbs on sustained correct streaks and only drops back once
//! the streak breaks or reverses.

use crate::{
    constants::difficulty::{HARD_SCORE, MODERATE_SCORE},
    question::Tier,
};

/// Maps the current streak and tier to the tier of the next question
///
/// 1. a score of at least 4, or any positive score while already at
///    [`Tier::Hard`], selects [`Tier::Hard`]
/// 2. a score of at least 2, or any positive score while already at
///    [`Tier::Moderate`], selects [`Tier::Moderate`]
/// 3. anything else falls back to [`Tier::Easy`]
///
/// A hard round therefore stays hard for as long as the streak is positive,
/// even when a broken streak is rebuilt to 2 or 3.
pub fn next(score: i32, current: Tier) -> Tier {
    if score >= HARD_SCORE || (current == Tier::Hard && score > 0) {
        Tier::Hard
    } else if score >= MODERATE_SCORE || (current == Tier::Moderate && score > 0) {
        Tier::Moderate
    } else {
        Tier::Easy
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_escalates_to_hard_from_any_tier() {
        for tier in Tier::ALL {
            assert_eq!(next(4, tier), Tier::Hard);
            assert_eq!(next(7, tier), Tier::Hard);
        }
    }

    #[test]
    fn test_score_two_or_three_selects_moderate_below_hard() {
        for tier in [Tier::Easy, Tier::Moderate] {
            assert_eq!(next(2, tier), Tier::Moderate);
            assert_eq!(next(3, tier), Tier::Moderate);
        }
    }

    #[test]
    fn test_single_correct_at_easy_stays_easy() {
        assert_eq!(next(1, Tier::Easy), Tier::Easy);
    }

    #[test]
    fn test_hard_is_sticky_on_score_one() {
        assert_eq!(next(1, Tier::Hard), Tier::Hard);
    }

    #[test]
    fn test_moderate_is_sticky_on_score_one() {
        assert_eq!(next(1, Tier::Moderate), Tier::Moderate);
    }

    #[test]
    fn test_hard_stays_hard_while_streak_rebuilds() {
        assert_eq!(next(2, Tier::Hard), Tier::Hard);
        assert_eq!(next(3, Tier::Hard), Tier::Hard);
    }

    #[test]
    fn test_zero_or_negative_score_falls_to_easy() {
        for tier in Tier::ALL {
            assert_eq!(next(0, tier), Tier::Easy);
            assert_eq!(next(-1, tier), Tier::Easy);
            assert_eq!(next(-2, tier), Tier::Easy);
        }
    }

    #[test]
    fn test_next_is_deterministic() {
        for score in -4..=6 {
            for tier in Tier::ALL {
                assert_eq!(next(score, tier), next(score, tier));
            }
        }
    }
}
