//! Outbound notifications for the presentation layer
//!
//! The round controller never renders anything itself. Every change the
//! player should see is turned into an [`UpdateMessage`] and handed to a
//! [`Display`] implementation, which might draw a UI, print to a terminal,
//! or forward the message over a channel.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{question::Tier, round::Outcome};

/// Messages sent to the presentation layer as the round progresses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UpdateMessage {
    /// A new question is up
    Question {
        /// The question text
        prompt: String,
        /// All answers in presentation order
        answers: Vec<String>,
        /// Difficulty of the question
        tier: Tier,
    },
    /// Remaining share of the answer time, from 1 down to 0
    Timer(f32),
    /// Scoreboard after the tier or score changed
    Scoreboard {
        /// Tier of the next question
        tier: Tier,
        /// Signed streak
        score: i32,
        /// Streak length that ends the round in the current direction
        max: i32,
    },
    /// Whether answer input is accepted
    InputEnabled(bool),
    /// The round ended with this outcome
    Outcome(Outcome),
    /// Final answer counts, revealed after the outcome panel
    Results {
        /// Correct answers this round
        correct: u32,
        /// Incorrect answers this round
        incorrect: u32,
    },
    /// The catalog could not be reached and the round cannot start
    Unavailable(String),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Sink for round notifications
///
/// Implementations should return quickly; the controller calls them inline
/// while it holds the round state.
pub trait Display {
    /// Delivers one notification
    fn send_message(&self, message: &UpdateMessage);
}

/// [`Display`] that forwards every message into an unbounded channel
///
/// Messages sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelDisplay {
    sender: mpsc::UnboundedSender<UpdateMessage>,
}

impl ChannelDisplay {
    /// Creates the display together with the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UpdateMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Display for ChannelDisplay {
    fn send_message(&self, message: &UpdateMessage) {
        if self.sender.send(message.clone()).is_err() {
            debug!("display channel closed, dropping {message:?}");
        }
    }
}
