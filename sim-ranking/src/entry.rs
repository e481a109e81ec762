//! `RankEntry`: one player's position within a [`crate::Ranking`].

use std::collections::VecDeque;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::time_score::TimeScore;

/// Bounded history of a player's previous scores, oldest evicted first.
const HISTORY_CAP: usize = 100;

/// A single ranked player's entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankEntry {
    /// The ranked player's id.
    pub player_id: String,
    /// Current real-valued score.
    pub score: f64,
    /// Composite sort key; always consistent with `score` and the owning
    /// ranking's current `sortType`.
    pub time_score: TimeScore,
    /// 1-based rank, set only when returned from a query — `0` otherwise.
    pub rank: u32,
    /// Previous scores, oldest evicted once more than [`HISTORY_CAP`] accrue.
    pub history: VecDeque<f64>,
    /// Best (numerically lowest) rank this entry has ever held.
    pub best_rank: Option<u32>,
    /// Worst (numerically highest) rank this entry has ever held.
    pub worst_rank: Option<u32>,
    /// Total number of `UpdateScore` calls that touched this entry.
    pub total_updates: u64,
    /// Unix-seconds of the last update.
    pub last_update_time: i64,
    /// Caller-supplied metadata, opaque to the ranking engine.
    pub metadata: HashMap<String, String>,
}

impl RankEntry {
    /// Creates a brand-new entry for a player's first update.
    #[must_use]
    pub fn new(player_id: impl Into<String>, score: f64, time_score: TimeScore, now: i64, metadata: HashMap<String, String>) -> Self {
        Self {
            player_id: player_id.into(),
            score,
            time_score,
            rank: 0,
            history: VecDeque::new(),
            best_rank: None,
            worst_rank: None,
            total_updates: 1,
            last_update_time: now,
            metadata,
        }
    }

    /// Applies a new score, pushing the previous one into `history`.
    pub fn apply_update(&mut self, new_score: f64, new_time_score: TimeScore, now: i64, metadata: HashMap<String, String>) {
        self.push_history(self.score);
        self.score = new_score;
        self.time_score = new_time_score;
        self.total_updates += 1;
        self.last_update_time = now;
        if !metadata.is_empty() {
            self.metadata = metadata;
        }
    }

    fn push_history(&mut self, previous_score: f64) {
        if self.history.len() >= HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(previous_score);
    }

    /// Records `rank` as this entry's current rank, updating best/worst.
    pub fn record_rank(&mut self, rank: u32) {
        self.rank = rank;
        self.best_rank = Some(self.best_rank.map_or(rank, |b| b.min(rank)));
        self.worst_rank = Some(self.worst_rank.map_or(rank, |w| w.max(rank)));
    }
}

#[cfg(test)]
mod tests {
    use super::{HISTORY_CAP, RankEntry};
    use crate::time_score::TimeScore;
    use std::collections::HashMap;

    #[test]
    fn history_evicts_oldest_past_cap() {
        let mut entry = RankEntry::new("p1", 0.0, TimeScore(0), 0, HashMap::new());
        for i in 0..(HISTORY_CAP + 10) {
            entry.apply_update(i as f64, TimeScore(i as i128), 0, HashMap::new());
        }
        assert_eq!(entry.history.len(), HISTORY_CAP);
        assert_eq!(*entry.history.front().unwrap(), 9.0);
    }

    #[test]
    fn record_rank_tracks_best_and_worst() {
        let mut entry = RankEntry::new("p1", 0.0, TimeScore(0), 0, HashMap::new());
        entry.record_rank(5);
        entry.record_rank(2);
        entry.record_rank(8);
        assert_eq!(entry.best_rank, Some(2));
        assert_eq!(entry.worst_rank, Some(8));
    }
}
