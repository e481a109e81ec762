//! In-memory reference implementations of the repository ports.
//!
//! These exist for local running and integration tests; a production
//! embedder supplies its own durable implementation against the same
//! traits.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use sim_core::interfaces::{RepositoryError as SceneRepositoryError, SceneRepository};
use sim_core::scene::Scene;
use sim_ranking::repository::{BlacklistRepository, RankingRepository, RepositoryError as RankingRepositoryError};
use sim_ranking::{BlacklistEntry, RankEntry};
use sim_utils::{SceneId, SyncMutex};

/// Keeps scenes nowhere but in this process's memory.
///
/// `save` is a no-op: [`Scene`] already lives behind the in-process
/// [`sim_core::scene::SceneService`] map; this repository only exists so
/// the service layer has something to call during shutdown/reload drills.
#[derive(Default)]
pub struct InMemorySceneRepository {
    active_ids: SyncMutex<Vec<SceneId>>,
}

#[async_trait]
impl SceneRepository for InMemorySceneRepository {
    async fn save(&self, scene: &Scene) -> Result<(), SceneRepositoryError> {
        let mut ids = self.active_ids.lock();
        if !ids.contains(&scene.id) {
            ids.push(scene.id.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, _id: &SceneId) -> Result<Option<Scene>, SceneRepositoryError> {
        // Scenes are not actually serialized in this reference
        // implementation; a real store would deserialize here.
        Ok(None)
    }

    async fn delete(&self, id: &SceneId) -> Result<(), SceneRepositoryError> {
        self.active_ids.lock().retain(|existing| existing != id);
        Ok(())
    }

    async fn exists(&self, id: &SceneId) -> Result<bool, SceneRepositoryError> {
        Ok(self.active_ids.lock().contains(id))
    }

    async fn find_active_scenes(&self) -> Result<Vec<SceneId>, SceneRepositoryError> {
        Ok(self.active_ids.lock().clone())
    }
}

/// Keeps whole rankings nowhere but in this process's memory.
#[derive(Default)]
pub struct InMemoryRankingRepository {
    rankings: SyncMutex<FxHashMap<String, Vec<RankEntry>>>,
}

#[async_trait]
impl RankingRepository for InMemoryRankingRepository {
    async fn save(&self, rank_id: &str, entries: &[RankEntry]) -> Result<(), RankingRepositoryError> {
        self.rankings.lock().insert(rank_id.to_owned(), entries.to_vec());
        Ok(())
    }

    async fn find_by_id(&self, rank_id: &str) -> Result<Option<Vec<RankEntry>>, RankingRepositoryError> {
        Ok(self.rankings.lock().get(rank_id).cloned())
    }

    async fn delete(&self, rank_id: &str) -> Result<(), RankingRepositoryError> {
        self.rankings.lock().remove(rank_id);
        Ok(())
    }

    async fn exists(&self, rank_id: &str) -> Result<bool, RankingRepositoryError> {
        Ok(self.rankings.lock().contains_key(rank_id))
    }
}

/// Keeps blacklist entries nowhere but in this process's memory, keyed by
/// `(rank_id, player_id)`.
#[derive(Default)]
pub struct InMemoryBlacklistRepository {
    entries: SyncMutex<FxHashMap<(String, String), BlacklistEntry>>,
}

#[async_trait]
impl BlacklistRepository for InMemoryBlacklistRepository {
    async fn save(&self, rank_id: &str, entry: &BlacklistEntry) -> Result<(), RankingRepositoryError> {
        self.entries
            .lock()
            .insert((rank_id.to_owned(), entry.player_id.clone()), entry.clone());
        Ok(())
    }

    async fn find_expired(&self, rank_id: &str, now: i64) -> Result<Vec<BlacklistEntry>, RankingRepositoryError> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|((rid, _), entry)| rid == rank_id && entry.is_expired(now))
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn delete(&self, rank_id: &str, player_id: &str) -> Result<(), RankingRepositoryError> {
        self.entries.lock().remove(&(rank_id.to_owned(), player_id.to_owned()));
        Ok(())
    }
}

/// Builds an [`Arc`] of each in-memory repository, convenience for
/// [`crate::app::SimApp::bootstrap`].
#[must_use]
pub fn in_memory_scene_repository() -> Arc<InMemorySceneRepository> {
    Arc::new(InMemorySceneRepository::default())
}

/// See [`in_memory_scene_repository`].
#[must_use]
pub fn in_memory_ranking_repository() -> Arc<InMemoryRankingRepository> {
    Arc::new(InMemoryRankingRepository::default())
}

/// See [`in_memory_scene_repository`].
#[must_use]
pub fn in_memory_blacklist_repository() -> Arc<InMemoryBlacklistRepository> {
    Arc::new(InMemoryBlacklistRepository::default())
}
