//! Trivia questions and difficulty tiers
//!
//! A [`Question`] is immutable once it has been fetched from the catalog.
//! Every question belongs to exactly one [`Tier`], and tiers are totally
//! ordered from easiest to hardest.

use enum_map::Enum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::question::ANSWER_COUNT;

/// Difficulty level of a question
///
/// Tiers are ordered `Easy < Moderate < Hard`. Their textual labels are the
/// upper case names used by the catalog and the settings store.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Enum,
    derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Entry level questions, also the fallback for unknown labels
    #[default]
    #[display("EASY")]
    Easy,
    /// Intermediate questions
    #[display("MODERATE")]
    Moderate,
    /// Hardest questions
    #[display("HARD")]
    Hard,
}

impl Tier {
    /// All tiers in ascending order of difficulty
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Moderate, Tier::Hard];

    /// Parses a tier label
    ///
    /// Labels are case-sensitive. Anything other than `EASY`, `MODERATE` or
    /// `HARD` (including the empty string) maps to [`Tier::Easy`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "MODERATE" => Self::Moderate,
            "HARD" => Self::Hard,
            _ => Self::Easy,
        }
    }

    /// Returns every tier ordered by distance from `self`
    ///
    /// `self` comes first; ties between two equally distant tiers are broken
    /// towards the easier one.
    pub fn by_distance(self) -> impl Iterator<Item = Tier> {
        let origin = self.into_usize();
        Self::ALL
            .into_iter()
            .sorted_by_key(move |tier| (tier.into_usize().abs_diff(origin), *tier))
    }
}

/// A single trivia question with one correct and two incorrect answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The text shown to the player
    prompt: String,
    /// The only answer that scores
    correct_answer: String,
    /// The two distractors
    incorrect_answers: [String; 2],
    /// Difficulty tier the question belongs to
    tier: Tier,
}

impl Question {
    /// Creates a new question
    pub fn new(
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: [String; 2],
        tier: Tier,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
            tier,
        }
    }

    /// The question text
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The correct answer
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// The two incorrect answers
    pub fn incorrect_answers(&self) -> &[String; 2] {
        &self.incorrect_answers
    }

    /// The difficulty tier
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Whether the question can be shown to a player
    ///
    /// Entries with an empty prompt are malformed and are skipped when drawing.
    pub fn is_presentable(&self) -> bool {
        !self.prompt.is_empty()
    }

    /// Checks a submitted answer against the correct one
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    /// Lays the answers out for presentation
    ///
    /// The correct answer lands in a uniformly random slot; the incorrect
    /// answers fill the remaining slots in their original order.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random source used to pick the slot of the correct answer
    pub fn shuffled_answers(&self, rng: &mut fastrand::Rng) -> [String; ANSWER_COUNT] {
        let slot = rng.usize(..ANSWER_COUNT);
        let mut incorrect = self.incorrect_answers.iter();
        std::array::from_fn(|i| {
            if i == slot {
                self.correct_answer.clone()
            } else {
                incorrect.next().cloned().unwrap_or_default()
            }
        })
    }
}
