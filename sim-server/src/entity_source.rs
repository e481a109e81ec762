//! The entity source: the one command surface external callers use to
//! reach both the scene and ranking aggregates.
//!
//! `sim-core` cannot depend on `sim-ranking` (scenes know nothing about
//! leaderboards), so this composite lives here instead of inside either
//! core crate — it is purely a façade over [`SceneService`] and
//! [`RankingRegistry`], adding no state of its own.

use std::collections::HashMap;
use std::sync::Arc;

use sim_core::entity::{Entity, Player};
use sim_core::scene::SceneError;
use sim_core::SceneService;
use sim_ranking::{BlacklistEntry, RankEntry, RankingError, RankingFilter, RankingRegistry};
use sim_utils::error::{Classify, Severity};
use sim_utils::{EntityId, SceneId, Vector3};
use thiserror::Error;

/// Errors surfaced by the entity source, merging the scene and ranking
/// error taxonomies under one type so callers handle one error path.
#[derive(Debug, Error)]
pub enum EntitySourceError {
    /// A scene-side operation failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// A ranking-side operation failed.
    #[error(transparent)]
    Ranking(#[from] RankingError),
    /// `EnterScene`/`Move` named a scene id that isn't currently loaded.
    #[error("scene {0} is not loaded")]
    SceneNotLoaded(String),
}

impl Classify for EntitySourceError {
    fn severity(&self) -> Severity {
        match self {
            Self::Scene(err) => err.severity(),
            Self::Ranking(err) => err.severity(),
            Self::SceneNotLoaded(_) => Severity::NotFound,
        }
    }
}

/// The command surface external callers use: `EnterScene`, `LeaveScene`,
/// `Move`, `UpdateScore`, `AddToBlacklist`, `ResetRanking`, `GetRanking`,
/// `GetPlayerRank`, `GetNearbyEntities`.
pub struct EntitySource {
    scenes: Arc<SceneService>,
    rankings: Arc<RankingRegistry>,
}

impl EntitySource {
    /// Builds a command surface over already-wired services.
    #[must_use]
    pub const fn new(scenes: Arc<SceneService>, rankings: Arc<RankingRegistry>) -> Self {
        Self { scenes, rankings }
    }

    fn scene_handle(&self, scene_id: &SceneId) -> Result<Arc<sim_utils::SyncMutex<sim_core::scene::Scene>>, EntitySourceError> {
        self.scenes.get(scene_id).ok_or_else(|| EntitySourceError::SceneNotLoaded(scene_id.0.clone()))
    }

    /// `EnterScene(playerId, sceneId, pos)`.
    pub fn enter_scene(
        &self,
        player_id: EntityId,
        scene_id: &SceneId,
        position: Vector3,
        now: i64,
    ) -> Result<(), EntitySourceError> {
        let scene = self.scene_handle(scene_id)?;
        let player = Entity::Player(Player::new(player_id.clone(), position, 100, 100, 1));
        scene.lock().add_player(player_id, player, now)?;
        Ok(())
    }

    /// `LeaveScene(playerId, sceneId)`.
    pub fn leave_scene(&self, player_id: &EntityId, scene_id: &SceneId, now: i64) -> Result<(), EntitySourceError> {
        let scene = self.scene_handle(scene_id)?;
        scene.lock().remove_player(player_id, now)?;
        Ok(())
    }

    /// `Move(entityId, sceneId, pos)`.
    pub fn move_entity(
        &self,
        entity_id: &EntityId,
        scene_id: &SceneId,
        new_position: Vector3,
        now: i64,
    ) -> Result<(), EntitySourceError> {
        let scene = self.scene_handle(scene_id)?;
        scene.lock().move_entity(entity_id, new_position, now)?;
        Ok(())
    }

    /// `GetNearbyEntities(entityId, sceneId, radius)`.
    pub fn get_nearby_entities(&self, entity_id: &EntityId, scene_id: &SceneId, radius: f64) -> Result<Vec<EntityId>, EntitySourceError> {
        let scene = self.scene_handle(scene_id)?;
        Ok(scene.lock().get_nearby_entities(entity_id, radius))
    }

    /// `UpdateScore(rankId, playerId, realScore, metadata)`.
    pub async fn update_score(
        &self,
        rank_id: &str,
        player_id: &str,
        real_score: f64,
        metadata: HashMap<String, String>,
        now: i64,
    ) -> Result<(), EntitySourceError> {
        let ranking = self.rankings.get_or_load(rank_id).await?;
        ranking.write().update_score(player_id, real_score, metadata, now)?;
        Ok(())
    }

    /// `AddToBlacklist(rankId, playerId, reason)`, permanent unless
    /// `duration_secs` is given.
    pub async fn add_to_blacklist(
        &self,
        rank_id: &str,
        player_id: &str,
        reason: &str,
        now: i64,
        duration_secs: Option<i64>,
    ) -> Result<(), EntitySourceError> {
        let ranking = self.rankings.get_or_load(rank_id).await?;
        let entry = duration_secs.map_or_else(
            || BlacklistEntry::permanent(player_id, reason, now),
            |secs| BlacklistEntry::temporary(player_id, reason, now, secs),
        );
        ranking.write().add_to_blacklist(entry, now);
        Ok(())
    }

    /// `ResetRanking(rankId)`.
    pub async fn reset_ranking(&self, rank_id: &str, now: i64) -> Result<(), EntitySourceError> {
        let ranking = self.rankings.get_or_load(rank_id).await?;
        ranking.write().reset(now);
        Ok(())
    }

    /// `GetRanking(rankId, start, end)`.
    pub async fn get_ranking(&self, rank_id: &str, start: i64, end: i64) -> Result<Vec<RankEntry>, EntitySourceError> {
        let ranking = self.rankings.get_or_load(rank_id).await?;
        let entries = ranking.read().get_ranking(start, end, RankingFilter::default())?;
        Ok(entries)
    }

    /// `GetPlayerRank(rankId, playerId)`.
    pub async fn get_player_rank(&self, rank_id: &str, player_id: &str) -> Result<RankEntry, EntitySourceError> {
        let ranking = self.rankings.get_or_load(rank_id).await?;
        let entry = ranking.read().get_player_rank(player_id)?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::EntitySource;
    use sim_core::interfaces::{Broadcaster, EntityFactory};
    use sim_core::scene::{Scene, SceneType};
    use sim_core::{SceneService, TickDriver};
    use sim_ranking::RankingRegistry;
    use sim_utils::{EntityId, SceneId, Vector3};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    struct NoopBroadcaster;
    impl Broadcaster for NoopBroadcaster {
        fn broadcast(&self, _recipients: &[EntityId], _topic: &str, _payload: &[u8]) {}
    }

    struct NoopFactory;
    impl EntityFactory for NoopFactory {
        fn create(&self, _kind: sim_core::entity::SpawnKind, _template_id: &str, id: EntityId, position: Vector3) -> sim_core::entity::Entity {
            sim_core::entity::Entity::Npc(sim_core::entity::Npc::new(id, position, "placeholder"))
        }
    }

    fn entity_source() -> EntitySource {
        let driver = Arc::new(TickDriver::new(Duration::from_millis(50)));
        let scenes = Arc::new(SceneService::new(
            driver,
            Arc::new(crate::publisher::BusEventPublisher::new(Arc::new(sim_eventbus::EventBus::new()))),
            Arc::new(NoopBroadcaster),
            Arc::new(NoopFactory),
        ));
        let rankings = Arc::new(RankingRegistry::new(crate::repository::in_memory_ranking_repository()));
        EntitySource::new(scenes, rankings)
    }

    #[tokio::test]
    async fn enter_move_leave_round_trip() {
        let source = entity_source();
        let scene_id = SceneId::from("s1");
        source.scenes.load(Scene::new(scene_id.clone(), "Test", SceneType::City, 1000.0, 1000.0, 10));

        let player_id = EntityId::from("p1");
        source.enter_scene(player_id.clone(), &scene_id, Vector3::new(10.0, 10.0, 0.0), 0).unwrap();
        source.move_entity(&player_id, &scene_id, Vector3::new(20.0, 20.0, 0.0), 1).unwrap();
        source.leave_scene(&player_id, &scene_id, 2).unwrap();
    }

    #[tokio::test]
    async fn ranking_round_trip() {
        let source = entity_source();
        source.update_score("r1", "p1", 10.0, HashMap::new(), 0).await.unwrap();
        source.update_score("r1", "p2", 20.0, HashMap::new(), 0).await.unwrap();

        let rank = source.get_player_rank("r1", "p2").await.unwrap();
        assert_eq!(rank.rank, 1);

        source.add_to_blacklist("r1", "p2", "cheat", 1, None).await.unwrap();
        let err = source.get_player_rank("r1", "p2").await.unwrap_err();
        assert!(matches!(err, super::EntitySourceError::Ranking(sim_ranking::RankingError::PlayerBlacklisted)));

        source.reset_ranking("r1", 2).await.unwrap();
        let ranking = source.get_ranking("r1", 0, 10).await.unwrap();
        assert!(ranking.is_empty());
    }
}
