//! Record book for the game-over screen
//!
//! Kept in memory, top 10 runs sorted by score. Hosts that want persistence
//! round-trip it through JSON.

use serde::{Deserialize, Serialize};

/// Maximum number of records to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level index reached
    pub level: usize,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Whether a run with `score` would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        self.entries.len() < MAX_HIGH_SCORES
            || self.entries.last().is_none_or(|lowest| score > lowest.score)
    }

    /// 1-based rank `score` would take, if it qualifies
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.qualifies(score).then(|| self.insertion_index(score) + 1)
    }

    /// Record a run; returns the rank it took (1-based)
    pub fn add_score(&mut self, score: u64, level: usize, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|entry| entry.score)
    }

    /// Equal scores keep their earlier placement
    fn insertion_index(&self, score: u64) -> usize {
        self.entries
            .iter()
            .position(|entry| score > entry.score)
            .unwrap_or(self.entries.len())
    }
}
