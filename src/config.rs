//! Round configuration
//!
//! Timing and retry settings for a round. Values come from built-in
//! defaults, optionally overridden by a TOML file and then by `TRIVIA_`
//! environment variables, and are validated against the bounds in
//! [`crate::constants`].

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{retry, timing};

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "TRIVIA_";

type ValidationResult = garde::Result;

/// Validates that a duration falls within `[MIN_SECONDS, MAX_SECONDS]`
fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    val: &Duration,
    _ctx: &(),
) -> ValidationResult {
    if (Duration::from_secs(MIN_SECONDS)..=Duration::from_secs(MAX_SECONDS)).contains(val) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or had the wrong shape
    #[error("cannot load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    /// The merged configuration is out of bounds
    #[error("invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}

/// How often and how patiently the catalog is retried during init
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of login and fetch attempts
    #[garde(range(min = retry::MIN_ATTEMPTS, max = retry::MAX_ATTEMPTS))]
    pub max_attempts: u32,
    /// Wait before the second attempt; later attempts wait proportionally longer
    #[garde(custom(validate_duration::<{ retry::MIN_BACKOFF }, { retry::MAX_BACKOFF }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(retry::DEFAULT_BACKOFF),
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying after `attempt` failed attempts
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Timing and retry configuration for a round
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QuizConfig {
    /// Time the player has to answer each question
    #[garde(custom(validate_duration::<{ timing::MIN_TIME_PER_QUESTION }, { timing::MAX_TIME_PER_QUESTION }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub time_per_question: Duration,
    /// Time the outcome panel stays up before the results are revealed
    #[garde(custom(validate_duration::<{ timing::MIN_OUTCOME_HOLD }, { timing::MAX_OUTCOME_HOLD }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub outcome_hold: Duration,
    /// Pause between a resolved answer and the next question
    #[garde(custom(validate_duration::<{ timing::MIN_RESOLVE_PAUSE }, { timing::MAX_RESOLVE_PAUSE }>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub resolve_pause: Duration,
    /// Catalog retry policy used during init
    #[garde(dive)]
    pub retry: RetryPolicy,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            time_per_question: Duration::from_millis(timing::DEFAULT_TIME_PER_QUESTION),
            outcome_hold: Duration::from_millis(timing::DEFAULT_OUTCOME_HOLD),
            resolve_pause: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }
}

impl QuizConfig {
    /// Loads the configuration from defaults, `path` and the environment
    ///
    /// Priority (highest to lowest):
    /// 1. `TRIVIA_` environment variables, nested keys split on `__`
    ///    (`TRIVIA_RETRY__MAX_ATTEMPTS=5`)
    /// 2. The TOML file at `path`, if given
    /// 3. Built-in defaults
    ///
    /// Durations are given in milliseconds.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Load`] if a source cannot be read or parsed, and
    /// [`ConfigError::Invalid`] if the merged values are out of bounds.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = QuizConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.time_per_question, Duration::from_secs(5));
        assert_eq!(config.outcome_hold, Duration::from_secs(3));
        assert_eq!(config.resolve_pause, Duration::ZERO);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_time_per_question_bounds() {
        let mut config = QuizConfig {
            time_per_question: Duration::from_millis(500),
            ..QuizConfig::default()
        };
        assert!(config.validate().is_err());

        config.time_per_question = Duration::from_secs(121);
        assert!(config.validate().is_err());

        config.time_per_question = Duration::from_secs(120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duration_bounds_are_exact() {
        let mut config = QuizConfig {
            time_per_question: Duration::from_millis(120_999),
            ..QuizConfig::default()
        };
        assert!(config.validate().is_err());

        config.time_per_question = Duration::from_millis(120_001);
        assert!(config.validate().is_err());

        config.time_per_question = Duration::from_millis(999);
        assert!(config.validate().is_err());

        config.time_per_question = Duration::from_millis(1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_outcome_hold_too_long() {
        let config = QuizConfig {
            outcome_hold: Duration::from_secs(31),
            ..QuizConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_attempts_bounds() {
        let mut config = QuizConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
        config.retry.max_attempts = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_delay_grows_linearly() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(200));
        assert_eq!(policy.delay_after(2), Duration::from_millis(400));
    }

    #[test]
    fn test_load_without_sources_gives_defaults() {
        Jail::expect_with(|_jail| {
            assert_eq!(QuizConfig::load(None).unwrap(), QuizConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_merges_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "trivia.toml",
                r"
                time_per_question = 8000

                [retry]
                max_attempts = 5
                ",
            )?;
            jail.set_env("TRIVIA_OUTCOME_HOLD", "1000");
            jail.set_env("TRIVIA_RETRY__BACKOFF", "50");

            let config = QuizConfig::load(Some(Path::new("trivia.toml"))).unwrap();
            assert_eq!(config.time_per_question, Duration::from_secs(8));
            assert_eq!(config.outcome_hold, Duration::from_secs(1));
            assert_eq!(config.retry.max_attempts, 5);
            assert_eq!(config.retry.backoff, Duration::from_millis(50));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_out_of_bounds_values() {
        Jail::expect_with(|jail| {
            jail.set_env("TRIVIA_TIME_PER_QUESTION", "999999");
            assert!(matches!(
                QuizConfig::load(None),
                Err(ConfigError::Invalid(_))
            ));
            Ok(())
        });
    }
}
