//! Streak scoring for a single round
//!
//! The score is signed: a positive value is the length of the current run of
//! correct answers, a negative value the length of the current run of wrong
//! ones. Switching direction restarts the run at one.

use serde::{Deserialize, Serialize};

use crate::constants::score::{MAX_SCORE_LOSE, MAX_SCORE_WIN};

/// Result of applying one answer to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    /// Signed streak after the answer
    pub score: i32,
    /// Streak length that ends the round in the current direction
    pub max: i32,
}

/// What the score means for the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Keep asking questions
    Continue,
    /// The winning streak reached its threshold
    Win,
    /// The losing streak reached its threshold
    Lose,
}

/// Running score and answer counts of a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: i32,
    correct_count: u32,
    incorrect_count: u32,
}

impl ScoreTracker {
    /// Clears the score and both counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records one answer and returns the new streak
    ///
    /// # Arguments
    ///
    /// * `is_correct` - Whether the submitted answer was the correct one
    ///
    /// # Returns
    ///
    /// The updated score together with the threshold for its direction
    pub fn apply_answer(&mut self, is_correct: bool) -> ScoreUpdate {
        if is_correct {
            self.correct_count += 1;
            self.score = if self.score >= 0 { self.score + 1 } else { 1 };
        } else {
            self.incorrect_count += 1;
            self.score = if self.score <= 0 { self.score - 1 } else { -1 };
        }

        ScoreUpdate {
            score: self.score,
            max: Self::max_for(self.score),
        }
    }

    /// Threshold that applies to `score`: the win mark when it is not negative
    pub fn max_for(score: i32) -> i32 {
        if score >= 0 {
            MAX_SCORE_WIN
        } else {
            MAX_SCORE_LOSE
        }
    }

    /// Decides whether `score` ends the round
    pub fn verdict(score: i32) -> Verdict {
        if score >= MAX_SCORE_WIN {
            Verdict::Win
        } else if score <= -MAX_SCORE_LOSE {
            Verdict::Lose
        } else {
            Verdict::Continue
        }
    }

    /// Current signed streak
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Number of correct answers this round
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    /// Number of incorrect answers this round
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_correct_answers_extend_winning_streak() {
        let mut tracker = ScoreTracker::default();
        for expected in 1..=4 {
            let update = tracker.apply_answer(true);
            assert_eq!(update.score, expected);
            assert_eq!(update.max, MAX_SCORE_WIN);
        }
        assert_eq!(tracker.correct_count(), 4);
        assert_eq!(tracker.incorrect_count(), 0);
    }

    #[test]
    fn test_incorrect_answers_extend_losing_streak() {
        let mut tracker = ScoreTracker::default();
        assert_eq!(tracker.apply_answer(false), ScoreUpdate { score: -1, max: 3 });
        assert_eq!(tracker.apply_answer(false), ScoreUpdate { score: -2, max: 3 });
        assert_eq!(tracker.incorrect_count(), 2);
    }

    #[test]
    fn test_direction_change_resets_magnitude() {
        let mut tracker = ScoreTracker::default();
        tracker.apply_answer(true);
        tracker.apply_answer(true);
        tracker.apply_answer(true);
        assert_eq!(tracker.apply_answer(false).score, -1);
        tracker.apply_answer(false);
        assert_eq!(tracker.apply_answer(true).score, 1);
        assert_eq!(tracker.correct_count(), 4);
        assert_eq!(tracker.incorrect_count(), 2);
    }

    #[test]
    fn test_score_tracks_signed_streak_for_any_sequence() {
        let mut rng = fastrand::Rng::with_seed(99);
        let mut tracker = ScoreTracker::default();
        let mut streak = 0i32;
        for _ in 0..500 {
            let correct = rng.bool();
            let before = tracker.score();
            streak = match (correct, streak.signum()) {
                (true, 1) => streak + 1,
                (true, _) => 1,
                (false, -1) => streak - 1,
                (false, _) => -1,
            };
            let update = tracker.apply_answer(correct);
            assert_eq!(update.score, streak);
            if before.signum() == update.score.signum() {
                assert_eq!((update.score - before).abs(), 1);
            } else {
                assert_eq!(update.score.abs(), 1);
            }
        }
    }

    #[test]
    fn test_verdict_thresholds_are_asymmetric() {
        assert_eq!(ScoreTracker::verdict(5), Verdict::Win);
        assert_eq!(ScoreTracker::verdict(6), Verdict::Win);
        assert_eq!(ScoreTracker::verdict(4), Verdict::Continue);
        assert_eq!(ScoreTracker::verdict(0), Verdict::Continue);
        assert_eq!(ScoreTracker::verdict(-2), Verdict::Continue);
        assert_eq!(ScoreTracker::verdict(-3), Verdict::Lose);
        assert_eq!(ScoreTracker::verdict(-4), Verdict::Lose);
    }

    #[test]
    fn test_max_for() {
        assert_eq!(ScoreTracker::max_for(0), MAX_SCORE_WIN);
        assert_eq!(ScoreTracker::max_for(3), MAX_SCORE_WIN);
        assert_eq!(ScoreTracker::max_for(-1), MAX_SCORE_LOSE);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ScoreTracker::default();
        tracker.apply_answer(true);
        tracker.apply_answer(false);
        tracker.reset();
        assert_eq!(tracker, ScoreTracker::default());
    }
}
