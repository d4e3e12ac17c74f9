//! Round progression state machine
//!
//! A [`RoundController`] runs one quiz round at a time: it signs in and
//! fetches the catalog, draws questions at the current difficulty, runs the
//! countdown, scores answers, adapts difficulty, and ends the round on a
//! win, a loss or a timeout.
//!
//! The controller never waits on its own. The host calls
//! [`RoundController::tick`] once per scheduling interval with the elapsed
//! time, and [`RoundController::submit_answer`] when the player picks an
//! answer. Once the phase leaves [`Phase::AwaitingAnswer`], late ticks and
//! late answers are ignored, which is what keeps a timeout and an answer
//! from both being applied to the same question.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    bank::QuestionBank,
    catalog::{FetchError, Identity, RemoteCatalog},
    config::QuizConfig,
    constants::score::MAX_SCORE_WIN,
    difficulty,
    display::{Display, UpdateMessage},
    error::RoundError,
    question::{Question, Tier},
    score::{ScoreTracker, Verdict},
    settings::SettingsStore,
};

/// How a round ended
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    /// The winning streak reached its threshold
    #[display("WIN")]
    Win,
    /// The losing streak reached its threshold
    #[display("LOSE")]
    Lose,
    /// The countdown ran out before an answer arrived
    #[display("TIMEOUT")]
    Timeout,
}

/// Where the round currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the catalog; also where a failed init leaves the round
    AwaitingData,
    /// A question is up and the countdown is running
    AwaitingAnswer,
    /// An answer was scored and the next question is pending
    Resolved,
    /// The round is over
    Ended(Outcome),
}

/// Observable state of the current round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    current_question: Option<Question>,
    /// Answers of the current question in presentation order
    answers: Vec<String>,
    difficulty: Tier,
    tracker: ScoreTracker,
    time_remaining: Duration,
    phase: Phase,
}

impl RoundState {
    fn new(difficulty: Tier) -> Self {
        Self {
            current_question: None,
            answers: Vec::new(),
            difficulty,
            tracker: ScoreTracker::default(),
            time_remaining: Duration::ZERO,
            phase: Phase::AwaitingData,
        }
    }

    /// The question being asked, if any
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Answers of the current question in the order they were presented
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Tier used for the next draw
    pub fn difficulty(&self) -> Tier {
        self.difficulty
    }

    /// Signed streak
    pub fn score(&self) -> i32 {
        self.tracker.score()
    }

    /// Correct answers this round
    pub fn correct_count(&self) -> u32 {
        self.tracker.correct_count()
    }

    /// Incorrect answers this round
    pub fn incorrect_count(&self) -> u32 {
        self.tracker.incorrect_count()
    }

    /// Time left to answer the current question
    pub fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Drives a quiz round from catalog fetch to outcome
pub struct RoundController<D: Display> {
    config: QuizConfig,
    catalog: Arc<dyn RemoteCatalog>,
    settings: Box<dyn SettingsStore>,
    display: D,
    bank: Option<QuestionBank>,
    identity: Option<Identity>,
    state: RoundState,
    /// Countdown for the resolve pause or the outcome hold
    hold_remaining: Duration,
    /// Whether the results still have to be revealed after the outcome hold
    results_pending: bool,
    rng: fastrand::Rng,
}

impl<D: Display> std::fmt::Debug for RoundController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundController")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<D: Display> RoundController<D> {
    /// Creates a controller in [`Phase::AwaitingData`]
    ///
    /// # Arguments
    ///
    /// * `config` - Timing and retry configuration
    /// * `catalog` - Source of the player identity and the questions
    /// * `settings` - Store remembering the last difficulty between rounds
    /// * `display` - Sink for everything the player should see
    pub fn new(
        config: QuizConfig,
        catalog: Arc<dyn RemoteCatalog>,
        settings: Box<dyn SettingsStore>,
        display: D,
    ) -> Self {
        Self {
            config,
            catalog,
            settings,
            display,
            bank: None,
            identity: None,
            state: RoundState::new(Tier::default()),
            hold_remaining: Duration::ZERO,
            results_pending: false,
            rng: fastrand::Rng::new(),
        }
    }

    /// Replaces the random source used for drawing and shuffling
    #[must_use]
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Current round state
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The display notifications are sent to
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The settings store
    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    /// The identity from the last successful login
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The configuration the controller runs with
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    fn send(&self, message: UpdateMessage) {
        self.display.send_message(&message);
    }

    /// Starts a new round
    ///
    /// Signs in, then fetches the catalog, retrying the pair according to the
    /// configured [`crate::config::RetryPolicy`]. On success the question
    /// bank is seeded, the starting tier is read from the settings store, the
    /// score is reset and the first question is shown.
    ///
    /// # Errors
    ///
    /// Returns the last catalog error once every attempt failed, or at once
    /// for an error that retrying cannot fix (see [`RoundError::is_retryable`]). The display then receives
    /// [`UpdateMessage::Unavailable`] and the round stays in
    /// [`Phase::AwaitingData`]; calling `init` again starts over.
    pub async fn init(&mut self) -> Result<(), RoundError> {
        self.state = RoundState::new(self.state.difficulty);
        self.results_pending = false;
        self.send(UpdateMessage::InputEnabled(false));

        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt = 1;
        let (identity, bank) = loop {
            match self.connect().await {
                Ok(connected) => break connected,
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.retry.delay_after(attempt);
                    warn!(attempt, ?delay, "catalog unavailable, retrying: {err}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(attempt, "round cannot start: {err}");
                    self.send(UpdateMessage::Unavailable(err.to_string()));
                    return Err(err);
                }
            }
        };

        self.identity = Some(identity);
        self.bank = Some(bank);
        self.start();
        Ok(())
    }

    /// Logs in and fetches the questions, strictly in that order
    async fn connect(&mut self) -> Result<(Identity, QuestionBank), RoundError> {
        let catalog = Arc::clone(&self.catalog);

        let identity = catalog.login().await?;
        debug!(player_id = %identity.player_id, "logged in");

        let questions = catalog.fetch_questions(&identity).await?;
        info!(count = questions.len(), "fetched questions");

        let bank = QuestionBank::with_rng(questions, self.rng.fork());
        if !bank.is_playable() {
            return Err(FetchError::NoQuestions.into());
        }
        Ok((identity, bank))
    }

    /// Resets the score, restores the last difficulty and asks the first question
    fn start(&mut self) {
        let difficulty = self.settings.last_difficulty().unwrap_or_default();
        self.state.difficulty = difficulty;
        self.state.tracker.reset();
        info!(%difficulty, "round started");

        self.send(UpdateMessage::Scoreboard {
            tier: difficulty,
            score: 0,
            max: MAX_SCORE_WIN,
        });
        self.select_next();
    }

    /// Draws at the current difficulty, falling back to the nearest tier that has questions
    fn draw(&mut self) -> Option<Question> {
        let bank = self.bank.as_mut()?;
        let wanted = self.state.difficulty;

        wanted.by_distance().find_map(|tier| match bank.draw_or_refill(tier) {
            Ok(question) => {
                if tier != wanted {
                    warn!(%wanted, %tier, "no {wanted} questions, drawing {tier} instead");
                }
                Some(question)
            }
            Err(err) => {
                debug!("{err}");
                None
            }
        })
    }

    /// Shows the next question and restarts the countdown
    fn select_next(&mut self) {
        let Some(question) = self.draw() else {
            error!("question bank has nothing to present");
            return;
        };

        let answers = question.shuffled_answers(&mut self.rng).to_vec();
        debug!(tier = %question.tier(), prompt = question.prompt(), "next question");

        self.send(UpdateMessage::Question {
            prompt: question.prompt().to_owned(),
            answers: answers.clone(),
            tier: question.tier(),
        });

        self.state.current_question = Some(question);
        self.state.answers = answers;
        self.state.time_remaining = self.config.time_per_question;
        self.state.phase = Phase::AwaitingAnswer;

        self.send(UpdateMessage::Timer(1.0));
        self.send(UpdateMessage::InputEnabled(true));
    }

    /// Share of the answer time still left, from 1 down to 0
    pub fn timer_fraction(&self) -> f32 {
        let total = self.config.time_per_question.as_secs_f32();
        if total <= 0.0 {
            return 0.0;
        }
        (self.state.time_remaining.as_secs_f32() / total).clamp(0.0, 1.0)
    }

    /// Advances the round clock by `elapsed`
    ///
    /// While a question is up this runs the countdown and ends the round
    /// with [`Outcome::Timeout`] when it reaches zero; a timeout leaves the
    /// score and the answer counts untouched. While resolved it runs the
    /// pause before the next question, and once ended it runs the outcome
    /// hold before the results are revealed.
    pub fn tick(&mut self, elapsed: Duration) {
        match self.state.phase {
            Phase::AwaitingData => {}
            Phase::AwaitingAnswer => {
                self.state.time_remaining = self.state.time_remaining.saturating_sub(elapsed);
                self.send(UpdateMessage::Timer(self.timer_fraction()));

                if self.state.time_remaining.is_zero() {
                    self.enter_ended(Outcome::Timeout);
                }
            }
            Phase::Resolved => {
                self.hold_remaining = self.hold_remaining.saturating_sub(elapsed);
                if self.hold_remaining.is_zero() {
                    self.select_next();
                }
            }
            Phase::Ended(_) => {
                if self.results_pending {
                    self.hold_remaining = self.hold_remaining.saturating_sub(elapsed);
                    if self.hold_remaining.is_zero() {
                        self.reveal_results();
                    }
                }
            }
        }
    }

    /// Scores the player's answer
    ///
    /// Input is disabled before anything else so that a second click cannot
    /// be scored twice. The answer updates the streak, then the difficulty,
    /// then the verdict decides between the next question and the end of the
    /// round.
    ///
    /// # Returns
    ///
    /// The verdict, or `None` if no question was awaiting an answer
    pub fn submit_answer(&mut self, answer: &str) -> Option<Verdict> {
        if self.state.phase != Phase::AwaitingAnswer {
            debug!(phase = ?self.state.phase, "ignoring answer");
            return None;
        }
        let is_correct = self.state.current_question.as_ref()?.is_correct(answer);

        self.send(UpdateMessage::InputEnabled(false));

        let update = self.state.tracker.apply_answer(is_correct);
        self.state.difficulty = difficulty::next(update.score, self.state.difficulty);
        debug!(
            is_correct,
            score = update.score,
            difficulty = %self.state.difficulty,
            "answer scored"
        );

        self.send(UpdateMessage::Scoreboard {
            tier: self.state.difficulty,
            score: update.score,
            max: update.max,
        });

        let verdict = ScoreTracker::verdict(update.score);
        match verdict {
            Verdict::Continue => {
                self.state.phase = Phase::Resolved;
                self.hold_remaining = self.config.resolve_pause;
                if self.hold_remaining.is_zero() {
                    self.select_next();
                }
            }
            Verdict::Win => self.enter_ended(Outcome::Win),
            Verdict::Lose => self.enter_ended(Outcome::Lose),
        }

        Some(verdict)
    }

    /// Scores the answer shown in slot `index`
    ///
    /// An index outside the presented answers is ignored.
    pub fn submit_choice(&mut self, index: usize) -> Option<Verdict> {
        let answer = self.state.answers.get(index)?.clone();
        self.submit_answer(&answer)
    }

    /// Ends the round, persists the difficulty and shows the outcome panel
    fn enter_ended(&mut self, outcome: Outcome) {
        self.state.phase = Phase::Ended(outcome);
        self.send(UpdateMessage::InputEnabled(false));

        if let Err(err) = self.settings.set_last_difficulty(self.state.difficulty) {
            warn!("cannot persist last difficulty: {err}");
        }

        info!(
            %outcome,
            difficulty = %self.state.difficulty,
            correct = self.state.correct_count(),
            incorrect = self.state.incorrect_count(),
            "round ended"
        );
        self.send(UpdateMessage::Outcome(outcome));

        self.results_pending = true;
        self.hold_remaining = self.config.outcome_hold;
        if self.hold_remaining.is_zero() {
            self.reveal_results();
        }
    }

    fn reveal_results(&mut self) {
        self.results_pending = false;
        self.send(UpdateMessage::Results {
            correct: self.state.correct_count(),
            incorrect: self.state.incorrect_count(),
        });
    }
}
