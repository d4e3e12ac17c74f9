//! Configuration constants for the trivia round engine
//!
//! This module contains the scoring thresholds that decide a round, the
//! streak marks that drive difficulty changes, and the bounds used to
//! validate user supplied configuration.

/// Score thresholds that end a round
pub mod score {
    /// A winning streak of this length wins the round
    pub const MAX_SCORE_WIN: i32 = 5;
    /// A losing streak of this length loses the round
    pub const MAX_SCORE_LOSE: i32 = 3;
}

/// Streak marks used by the difficulty policy
pub mod difficulty {
    /// Score at which the round escalates straight to hard questions
    pub const HARD_SCORE: i32 = 4;
    /// Score at which the round escalates to moderate questions
    pub const MODERATE_SCORE: i32 = 2;
}

/// Round timing configuration constants
pub mod timing {
    /// Default time in milliseconds a player has to answer one question
    pub const DEFAULT_TIME_PER_QUESTION: u64 = 5_000;
    /// Minimum time in seconds a player can be given per question
    pub const MIN_TIME_PER_QUESTION: u64 = 1;
    /// Maximum time in seconds a player can be given per question
    pub const MAX_TIME_PER_QUESTION: u64 = 120;
    /// Default time in milliseconds the outcome panel stays before results
    pub const DEFAULT_OUTCOME_HOLD: u64 = 3_000;
    /// Minimum time in seconds the outcome panel stays before results
    pub const MIN_OUTCOME_HOLD: u64 = 0;
    /// Maximum time in seconds the outcome panel stays before results
    pub const MAX_OUTCOME_HOLD: u64 = 30;
    /// Minimum pause in seconds between a resolved answer and the next question
    pub const MIN_RESOLVE_PAUSE: u64 = 0;
    /// Maximum pause in seconds between a resolved answer and the next question
    pub const MAX_RESOLVE_PAUSE: u64 = 10;
}

/// Catalog retry configuration constants
pub mod retry {
    /// Default number of login and fetch attempts before giving up
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Minimum number of attempts
    pub const MIN_ATTEMPTS: u32 = 1;
    /// Maximum number of attempts
    pub const MAX_ATTEMPTS: u32 = 10;
    /// Default backoff in milliseconds, multiplied by the attempt number
    pub const DEFAULT_BACKOFF: u64 = 500;
    /// Minimum backoff in seconds
    pub const MIN_BACKOFF: u64 = 0;
    /// Maximum backoff in seconds
    pub const MAX_BACKOFF: u64 = 30;
}

/// Question presentation constants
pub mod question {
    /// Number of answers shown for every question
    pub const ANSWER_COUNT: usize = 3;
}

/// Settings store keys
pub mod settings {
    /// Key under which the last difficulty is persisted
    pub const LAST_DIFFICULTY_KEY: &str = "LastDifficulty";
}
