//! # Trivia Round Library
//!
//! Core logic for a single-player trivia round: questions are fetched from a
//! remote catalog, drawn at an adaptive difficulty, answered against a
//! countdown, and scored as a signed streak that ends the round on a win, a
//! loss or a timeout. The last difficulty is remembered between rounds.
//!
//! The [`round::RoundController`] is the entry point. It is driven by the
//! host through [`round::RoundController::tick`] and
//! [`round::RoundController::submit_answer`], and reports everything the
//! player should see through a [`display::Display`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;

pub mod bank;
pub mod catalog;
pub mod config;
pub mod difficulty;
pub mod display;
pub mod error;
pub mod question;
pub mod round;
pub mod score;
pub mod settings;

pub use catalog::{AuthError, FetchError, Identity, RemoteCatalog, StaticCatalog};
pub use config::{ConfigError, QuizConfig, RetryPolicy};
pub use display::{ChannelDisplay, Display, UpdateMessage};
pub use error::RoundError;
pub use question::{Question, Tier};
pub use round::{Outcome, Phase, RoundController, RoundState};
pub use settings::{FileSettings, MemorySettings, SettingsError, SettingsStore};
