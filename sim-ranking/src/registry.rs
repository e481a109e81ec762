//! In-memory registry mapping `rankId -> Ranking`, loading from the
//! repository at most once per id and caching the result.

use std::sync::Arc;

use sim_utils::locks::{SyncMutex, SyncRwLock};
use tracing::warn;

use crate::error::RankingError;
use crate::ranking::Ranking;
use crate::repository::RankingRepository;
use crate::time_score::{SortType, TimeWindow};

/// One ranking guarded by its own reader/writer lock: every write takes the
/// write lock, reads only need the read lock.
pub type SharedRanking = Arc<SyncRwLock<Ranking>>;

/// Owns every loaded [`Ranking`] and lazily hydrates from the repository.
pub struct RankingRegistry {
    repository: Arc<dyn RankingRepository>,
    rankings: SyncMutex<rustc_hash::FxHashMap<String, SharedRanking>>,
}

impl RankingRegistry {
    /// Creates a registry backed by `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn RankingRepository>) -> Self {
        Self {
            repository,
            rankings: SyncMutex::new(rustc_hash::FxHashMap::default()),
        }
    }

    /// Returns the ranking for `rank_id`, loading it from the repository the
    /// first time it's requested and caching the result thereafter.
    ///
    /// If no persisted state exists, creates a fresh descending, unbounded
    /// ranking — callers that need different defaults should configure it
    /// immediately after the first `get_or_load`.
    pub async fn get_or_load(&self, rank_id: &str) -> Result<SharedRanking, RankingError> {
        if let Some(existing) = self.rankings.lock().get(rank_id).cloned() {
            return Ok(existing);
        }

        let loaded = self
            .repository
            .find_by_id(rank_id)
            .await
            .map_err(|err| RankingError::Repository(err.message))?;

        let mut ranking = Ranking::new(rank_id, SortType::Descending, TimeWindow { start_time: 0, end_time: 0 });
        if let Some(entries) = loaded {
            for entry in entries {
                // Replays persisted entries without re-running validation;
                // they already passed it once when originally written.
                ranking.restore_entry(entry);
            }
        } else {
            warn!(rank_id, "no persisted ranking found, starting fresh");
        }

        let shared = Arc::new(SyncRwLock::new(ranking));
        self.rankings.lock().insert(rank_id.to_owned(), shared.clone());
        Ok(shared)
    }

    /// Drops a ranking from the in-memory cache without touching its
    /// persisted state, forcing the next `get_or_load` to re-hydrate it.
    pub fn evict(&self, rank_id: &str) {
        self.rankings.lock().remove(rank_id);
    }
}
