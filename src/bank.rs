//! Question storage with per-tier draw-without-replacement
//!
//! The bank keeps the full fetched catalog as an immutable master set and one
//! working set per [`Tier`]. Draws deplete the working set of a single tier;
//! an exhausted working set is restored by copying the master set again.

use enum_map::EnumMap;
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::question::{Question, Tier};

/// Errors that can occur when drawing from the bank
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankError {
    /// The working set has no presentable question left; refill and retry
    #[error("no {0} question left in the working set")]
    Empty(Tier),
    /// Even a freshly refilled working set has nothing to present
    #[error("the catalog has no presentable {0} question")]
    Exhausted(Tier),
}

/// Holds every fetched question, partitioned by difficulty tier
#[derive(Debug, Clone)]
pub struct QuestionBank {
    /// All questions in fetch order, the source for refills
    master: Vec<Question>,
    /// Currently drawable questions per tier
    working: EnumMap<Tier, Vec<Question>>,
    rng: fastrand::Rng,
}

impl QuestionBank {
    /// Creates a bank and seeds every working set from `questions`
    pub fn new(questions: Vec<Question>) -> Self {
        Self::with_rng(questions, fastrand::Rng::new())
    }

    /// Creates a bank drawing with the supplied random source
    pub fn with_rng(questions: Vec<Question>, rng: fastrand::Rng) -> Self {
        let mut bank = Self {
            master: questions,
            working: EnumMap::default(),
            rng,
        };
        bank.populate_from_master();
        bank
    }

    /// Seeds all three working sets from the master set at once
    pub fn populate_from_master(&mut self) {
        for tier in Tier::ALL {
            self.refill(tier);
        }
    }

    /// Replaces the working set of `tier` with every master question of that tier
    ///
    /// Whatever was left in the working set is discarded. Other tiers are not
    /// touched.
    pub fn refill(&mut self, tier: Tier) {
        self.working[tier] = self
            .master
            .iter()
            .filter(|question| question.tier() == tier)
            .cloned()
            .collect_vec();
        debug!(%tier, size = self.working[tier].len(), "refilled working set");
    }

    /// Draws a random question of `tier` without replacement
    ///
    /// Starting at a uniformly random index, the working set is scanned
    /// forward circularly for the first presentable question, which is
    /// removed and returned. Malformed entries are skipped and stay put.
    ///
    /// # Errors
    ///
    /// [`BankError::Empty`] when the working set holds nothing presentable.
    pub fn draw(&mut self, tier: Tier) -> Result<Question, BankError> {
        let set = &mut self.working[tier];
        if set.is_empty() {
            return Err(BankError::Empty(tier));
        }

        let start = self.rng.usize(..set.len());
        let index = (0..set.len())
            .map(|offset| (start + offset) % set.len())
            .find(|&i| set[i].is_presentable())
            .ok_or(BankError::Empty(tier))?;

        Ok(set.remove(index))
    }

    /// Draws from `tier`, refilling its working set once if it is empty
    ///
    /// # Errors
    ///
    /// [`BankError::Exhausted`] when the master set has no presentable
    /// question of `tier`.
    pub fn draw_or_refill(&mut self, tier: Tier) -> Result<Question, BankError> {
        match self.draw(tier) {
            Err(BankError::Empty(_)) => {
                self.refill(tier);
                self.draw(tier).map_err(|_| BankError::Exhausted(tier))
            }
            result => result,
        }
    }

    /// Number of questions currently drawable (or skipped as malformed) in `tier`
    pub fn remaining(&self, tier: Tier) -> usize {
        self.working[tier].len()
    }

    /// Whether any tier has a presentable master question
    pub fn is_playable(&self) -> bool {
        self.master.iter().any(Question::is_presentable)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn question(prompt: &str, tier: Tier) -> Question {
        Question::new(
            prompt,
            "right",
            ["wrong one".to_string(), "wrong two".to_string()],
            tier,
        )
    }

    fn sample_bank() -> QuestionBank {
        QuestionBank::with_rng(
            vec![
                question("e1", Tier::Easy),
                question("m1", Tier::Moderate),
                question("e2", Tier::Easy),
                question("h1", Tier::Hard),
                question("e3", Tier::Easy),
                question("m2", Tier::Moderate),
            ],
            fastrand::Rng::with_seed(3),
        )
    }

    #[test]
    fn test_new_partitions_by_tier() {
        let bank = sample_bank();
        assert_eq!(bank.remaining(Tier::Easy), 3);
        assert_eq!(bank.remaining(Tier::Moderate), 2);
        assert_eq!(bank.remaining(Tier::Hard), 1);
    }

    #[test]
    fn test_draw_returns_requested_tier() {
        let mut bank = sample_bank();
        for tier in Tier::ALL {
            assert_eq!(bank.draw(tier).unwrap().tier(), tier);
        }
    }

    #[test]
    fn test_draw_never_repeats_without_refill() {
        let mut bank = sample_bank();
        let mut seen = HashSet::new();
        while let Ok(question) = bank.draw(Tier::Easy) {
            assert!(seen.insert(question.prompt().to_owned()));
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(bank.draw(Tier::Easy), Err(BankError::Empty(Tier::Easy)));
    }

    #[test]
    fn test_draw_does_not_touch_other_tiers() {
        let mut bank = sample_bank();
        bank.draw(Tier::Easy).unwrap();
        bank.draw(Tier::Easy).unwrap();
        assert_eq!(bank.remaining(Tier::Moderate), 2);
        assert_eq!(bank.remaining(Tier::Hard), 1);
    }

    #[test]
    fn test_refill_restores_whole_tier() {
        let mut bank = sample_bank();
        bank.draw(Tier::Easy).unwrap();
        bank.refill(Tier::Easy);
        assert_eq!(bank.remaining(Tier::Easy), 3);

        bank.draw(Tier::Moderate).unwrap();
        bank.refill(Tier::Easy);
        assert_eq!(bank.remaining(Tier::Moderate), 1);
    }

    #[test]
    fn test_draw_or_refill_refills_exhausted_tier() {
        let mut bank = sample_bank();
        assert_eq!(bank.draw_or_refill(Tier::Hard).unwrap().prompt(), "h1");
        assert_eq!(bank.remaining(Tier::Hard), 0);
        assert_eq!(bank.draw_or_refill(Tier::Hard).unwrap().prompt(), "h1");
        assert_eq!(bank.remaining(Tier::Hard), 0);
    }

    #[test]
    fn test_draw_or_refill_cycles_through_whole_tier() {
        let mut bank = sample_bank();
        let first: HashSet<_> = (0..3)
            .map(|_| bank.draw_or_refill(Tier::Easy).unwrap().prompt().to_owned())
            .collect();
        let second: HashSet<_> = (0..3)
            .map(|_| bank.draw_or_refill(Tier::Easy).unwrap().prompt().to_owned())
            .collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_draw_skips_malformed_questions() {
        let mut bank = QuestionBank::with_rng(
            vec![
                question("", Tier::Easy),
                question("valid", Tier::Easy),
                question("", Tier::Easy),
            ],
            fastrand::Rng::with_seed(11),
        );
        assert_eq!(bank.draw(Tier::Easy).unwrap().prompt(), "valid");
        assert_eq!(bank.remaining(Tier::Easy), 2);
        assert_eq!(bank.draw(Tier::Easy), Err(BankError::Empty(Tier::Easy)));
    }

    #[test]
    fn test_draw_or_refill_reports_exhausted_tier() {
        let mut bank = QuestionBank::new(vec![question("e", Tier::Easy), question("", Tier::Hard)]);
        assert_eq!(
            bank.draw_or_refill(Tier::Moderate),
            Err(BankError::Exhausted(Tier::Moderate))
        );
        assert_eq!(
            bank.draw_or_refill(Tier::Hard),
            Err(BankError::Exhausted(Tier::Hard))
        );
        assert_eq!(bank.draw_or_refill(Tier::Easy).unwrap().prompt(), "e");
    }

    #[test]
    fn test_is_playable() {
        assert!(sample_bank().is_playable());
        assert!(!QuestionBank::new(vec![question("", Tier::Easy)]).is_playable());
        assert!(!QuestionBank::new(Vec::new()).is_playable());
    }
}
