//! Error types for the collaborators around the simulation
//!
//! The simulation itself never fails: physics invariants are debug assertions.

use thiserror::Error;

/// Level layout could not be produced by a provider
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The provider reported a failure (service down, bad status, ...)
    #[error("layout provider failed: {0}")]
    Provider(String),

    /// The provider answered with something that is not a 2D integer array
    #[error("malformed layout: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The layout parsed but places no bricks
    #[error("layout contains no bricks")]
    Empty,

    /// The provider did not answer in time
    #[error("layout request timed out after {0} ms")]
    Timeout(u64),

    #[error("layout I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local leaderboard persistence failed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("leaderboard I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("leaderboard encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Initials rejected by validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Please enter your initials.")]
    Empty,

    #[error("Initials can be at most {max} characters.")]
    TooLong { max: usize },

    #[error("Please enter at least {min} initials.")]
    TooShort { min: usize },

    #[error("'{0}' is not allowed in initials.")]
    InvalidChar(char),
}

/// Score submission failed
///
/// Every variant renders as a message that can be shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wrong network: expected chain {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Insufficient funds for the submission fee")]
    InsufficientFunds,

    /// Any other refusal reported by the remote side
    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Submission timed out after {0} ms")]
    Timeout(u64),

    #[error("A submission is already in progress")]
    InFlight,

    #[error("Scores can only be submitted after a game ends")]
    NotGameOver,

    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("Could not save score: {0}")]
    Store(String),
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        SubmitError::Store(err.to_string())
    }
}
