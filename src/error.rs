//! Round-level error type

use thiserror::Error;

use crate::catalog::{AuthError, FetchError};

/// Errors that stop a round from starting
///
/// Everything else that can go wrong during a round (an exhausted tier, a
/// malformed question, a failed settings write) is absorbed by the
/// controller and only logged.
#[derive(Error, Debug)]
pub enum RoundError {
    /// The player could not be signed in
    #[error("login failed: {0}")]
    Auth(#[from] AuthError),
    /// The question catalog could not be fetched or has nothing to show
    #[error("fetching questions failed: {0}")]
    Fetch(#[from] FetchError),
}

impl RoundError {
    /// Whether trying again might succeed
    ///
    /// Only transport failures are transient. Rejected credentials, unknown
    /// players and malformed or empty catalogs come back the same on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RoundError::Auth(AuthError::Transport(_)) | RoundError::Fetch(FetchError::Transport(_))
        )
    }
}
