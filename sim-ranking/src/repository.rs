//! Persistence ports for the ranking aggregate family.
//!
//! These are external collaborators: `sim-ranking` never implements one
//! itself (a concrete store is deliberately out of the core's scope), only
//! consumes it through the registry in [`crate::registry`].

use async_trait::async_trait;

use crate::blacklist::BlacklistEntry;
use crate::entry::RankEntry;

/// Failure surfaced by any repository method.
#[derive(Debug, thiserror::Error)]
#[error("repository error: {message} (retryable={retryable})")]
pub struct RepositoryError {
    /// Human-readable detail, safe to log.
    pub message: String,
    /// Whether the caller's recovery strategy should retry this operation.
    pub retryable: bool,
}

/// Persistence for whole `Ranking` aggregates.
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Persists the full state of one ranking.
    async fn save(&self, rank_id: &str, entries: &[RankEntry]) -> Result<(), RepositoryError>;

    /// Loads a ranking's entries, if it has ever been saved.
    async fn find_by_id(&self, rank_id: &str) -> Result<Option<Vec<RankEntry>>, RepositoryError>;

    /// Deletes a ranking's persisted state entirely.
    async fn delete(&self, rank_id: &str) -> Result<(), RepositoryError>;

    /// Whether a ranking has any persisted state.
    async fn exists(&self, rank_id: &str) -> Result<bool, RepositoryError>;
}

/// Persistence for individual [`BlacklistEntry`] rows, narrower than the
/// whole-ranking repository so archival/export jobs don't need to round-trip
/// the entire entry list.
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// Persists one blacklist entry.
    async fn save(&self, rank_id: &str, entry: &BlacklistEntry) -> Result<(), RepositoryError>;

    /// Finds every blacklist entry for a ranking whose `expires_at` has
    /// already passed `now` — used to seed [`crate::Ranking::maybe_cleanup_blacklist`]
    /// after a restart.
    async fn find_expired(&self, rank_id: &str, now: i64) -> Result<Vec<BlacklistEntry>, RepositoryError>;

    /// Removes a blacklist entry.
    async fn delete(&self, rank_id: &str, player_id: &str) -> Result<(), RepositoryError>;
}
