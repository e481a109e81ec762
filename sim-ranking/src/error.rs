//! Ranking error taxonomy.

use sim_utils::error::{Classify, Severity};
use thiserror::Error;

/// Errors raised by [`crate::Ranking`] operations.
#[derive(Debug, Error)]
pub enum RankingError {
    /// `GetRanking`'s `[start, end]` was malformed or exceeded the 1000-entry
    /// hard limit.
    #[error("invalid range [{start}, {end}]")]
    InvalidRange {
        /// Requested start index.
        start: i64,
        /// Requested end index.
        end: i64,
    },
    /// `UpdateScore` was called with a non-finite score.
    #[error("invalid score: {0}")]
    InvalidScore(f64),
    /// A ranking operation referenced a sort type this ranking wasn't
    /// configured for.
    #[error("unknown sort type")]
    UnknownSortType,
    /// The ranking is not `Active` (e.g. under maintenance).
    #[error("ranking is not active")]
    RankingInactive,
    /// `now` fell outside the ranking's `[startTime, endTime]` window.
    #[error("ranking time window expired")]
    RankingTimeExpired,
    /// The player is blacklisted and cannot be updated or queried.
    #[error("player is blacklisted")]
    PlayerBlacklisted,
    /// `GetPlayerRank` found no entry for the player.
    #[error("player not in ranking")]
    PlayerNotInRanking,
    /// The backing repository failed; retryable per the `system` policy.
    #[error("ranking repository error: {0}")]
    Repository(String),
}

impl Classify for RankingError {
    fn severity(&self) -> Severity {
        match self {
            Self::InvalidRange { .. } | Self::InvalidScore(_) | Self::UnknownSortType => {
                Severity::Validation
            }
            Self::RankingInactive | Self::RankingTimeExpired | Self::PlayerBlacklisted => {
                Severity::State
            }
            Self::PlayerNotInRanking => Severity::NotFound,
            Self::Repository(_) => Severity::System,
        }
    }
}
