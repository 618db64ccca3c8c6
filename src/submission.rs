//! Score submission: player names, the remote submitter seam, and the
//! single-flight guard that keeps late results from landing on the wrong screen.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NameError, SubmitError};

/// Longest accepted initials
pub const NAME_MAX_LEN: usize = 8;
/// Shortest initials accepted for remote submission
pub const REMOTE_NAME_MIN_LEN: usize = 3;

/// Validated, upper-cased player initials
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    /// Trim, upper-case and check initials. `min_len` is at least 1.
    pub fn parse(raw: &str, min_len: usize) -> Result<Self, NameError> {
        let name = raw.trim().to_uppercase();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(NameError::InvalidChar(c));
        }
        let len = name.chars().count();
        if len > NAME_MAX_LEN {
            return Err(NameError::TooLong { max: NAME_MAX_LEN });
        }
        if len < min_len.max(1) {
            return Err(NameError::TooShort { min: min_len });
        }
        Ok(Self(name))
    }

    /// Rules for local-only saves
    pub fn local(raw: &str) -> Result<Self, NameError> {
        Self::parse(raw, 1)
    }

    /// Rules for remote submission
    pub fn remote(raw: &str) -> Result<Self, NameError> {
        Self::parse(raw, REMOTE_NAME_MIN_LEN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof that a remote submission went through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// Remote score recorder (e.g. an on-chain leaderboard behind a wallet)
#[allow(async_fn_in_trait)]
pub trait ScoreSubmitter {
    async fn submit(&self, name: &PlayerName, score: u64) -> Result<TxReceipt, SubmitError>;
}

/// Submitter for builds without a wallet: every attempt is refused
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSubmitter;

impl ScoreSubmitter for OfflineSubmitter {
    async fn submit(&self, _name: &PlayerName, _score: u64) -> Result<TxReceipt, SubmitError> {
        Err(SubmitError::WalletNotConnected)
    }
}

/// Run a remote submission, giving up after `timeout_ms`
pub async fn submit_with_timeout<R: ScoreSubmitter>(
    submitter: &R,
    name: &PlayerName,
    score: u64,
    timeout_ms: u64,
) -> Result<TxReceipt, SubmitError> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), submitter.submit(name, score)).await {
        Ok(result) => result,
        Err(_) => Err(SubmitError::Timeout(timeout_ms)),
    }
}

/// Identifies one submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Allows one submission at a time and recognizes stale completions
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    generation: u64,
    in_flight: Option<u64>,
}

impl SubmissionGuard {
    pub fn begin(&mut self) -> Result<Ticket, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::InFlight);
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Ok(Ticket(self.generation))
    }

    /// Close the attempt. False means the ticket is stale and its result
    /// must be dropped.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Abandon whatever is in flight (player left the screen)
    pub fn cancel(&mut self) {
        if self.in_flight.take().is_some() {
            log::debug!("Submission abandoned");
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}
