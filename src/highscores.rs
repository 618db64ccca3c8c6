//! High score leaderboard system
//!
//! Keeps the top 10 scores, sorted descending. Ties keep arrival order.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGH_SCORES;
use crate::error::StoreError;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player initials, upper-cased
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Transaction hash when the score was also recorded remotely
    #[serde(default, rename = "txHash", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl LeaderboardEntry {
    pub fn new(name: &str, score: u64) -> Self {
        Self {
            name: name.to_uppercase(),
            score,
            timestamp: None,
            tx_hash: None,
        }
    }

    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<LeaderboardEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from arbitrary entries, sorting and trimming them
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut scores = Self::new();
        for entry in entries {
            scores.add(entry);
        }
        scores
    }

    /// Check if a score would make it onto the table
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry. Returns the rank achieved (1-indexed) or None if it
    /// did not make the table.
    pub fn add(&mut self, mut entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        entry.name = entry.name.to_uppercase();

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Local leaderboard persistence
pub trait ScoreStore {
    /// Record an entry. Returns its rank, or None when it did not make the table.
    fn save(&mut self, entry: LeaderboardEntry) -> Result<Option<usize>, StoreError>;

    fn top_scores(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;

    /// Would this score make the table right now
    fn is_high_score(&self, score: u64) -> Result<bool, StoreError> {
        let top = self.top_scores(MAX_HIGH_SCORES)?;
        Ok(top.len() < MAX_HIGH_SCORES || top.last().is_some_and(|e| score > e.score))
    }
}

/// Leaderboard held in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub scores: HighScores,
}

impl ScoreStore for MemoryStore {
    fn save(&mut self, entry: LeaderboardEntry) -> Result<Option<usize>, StoreError> {
        Ok(self.scores.add(entry))
    }

    fn top_scores(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self.scores.top(n).to_vec())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.scores = HighScores::new();
        Ok(())
    }
}

/// Leaderboard persisted as a JSON array of entries
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    pub path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the table; a missing or unreadable file is an empty table
    pub fn load(&self) -> Result<HighScores, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                return Ok(HighScores::new());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Vec<LeaderboardEntry>>(&json) {
            Ok(entries) => {
                log::info!("Loaded {} high scores", entries.len());
                Ok(HighScores::from_entries(entries))
            }
            Err(e) => {
                log::warn!("Discarding corrupt leaderboard {}: {}", self.path.display(), e);
                Ok(HighScores::new())
            }
        }
    }

    fn write(&self, scores: &HighScores) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(scores)?;
        std::fs::write(&self.path, json)?;
        log::info!("High scores saved ({} entries)", scores.entries.len());
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn save(&mut self, entry: LeaderboardEntry) -> Result<Option<usize>, StoreError> {
        let mut scores = self.load()?;
        let rank = scores.add(entry);
        self.write(&scores)?;
        Ok(rank)
    }

    fn top_scores(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self.load()?.top(n).to_vec())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
