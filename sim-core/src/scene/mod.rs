//! The scene aggregate: the single source of truth for one world
//! area. Every mutation to its entities passes through a method here.

/// [`SceneError`] and its `Classify` impl.
pub mod error;
/// [`SceneService`], the thin orchestrator registering scenes with the tick
/// driver and draining their events onto the bus.
pub mod service;

pub use error::SceneError;

use rustc_hash::FxHashMap;
use sim_eventbus::{DomainEvent, EventMeta, topics};
use sim_utils::{EntityId, SceneId, Vector3};

use crate::aoi::{AoiIndex, DEFAULT_CELL_SIZE};
use crate::entity::{Entity, EntityBehavior, SpawnPoint};
use crate::interfaces::{Broadcaster, EntityFactory};

/// Coarse category a scene falls into, affecting no behavior in this core
/// beyond being carried on the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    /// A safe hub area.
    City,
    /// An instanced combat area.
    Dungeon,
    /// An open PvP zone.
    Battlefield,
    /// An open-world area with roaming monsters.
    Wilderness,
    /// A single-party instanced copy.
    Instance,
    /// A guild-owned area.
    Guild,
    /// Free-for-all PvP.
    PvP,
    /// A high-difficulty instanced raid.
    Raid,
}

/// Scene lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    /// Accepting player admission and ticking normally.
    Active,
    /// Ticking, but closed to new player admission.
    Maintenance,
    /// Terminal: the scene is torn down.
    Closed,
    /// At `maxPlayers`; reverts to `Active` once a slot frees up.
    Full,
}

/// One world area: entities, spawn points, AOI index, pending event queue.
///
/// Every public method other than the getters takes `&mut self` — callers
/// are expected to hold this behind their own lock: one lock per aggregate,
/// never a lock per field.
pub struct Scene {
    /// Stable scene id.
    pub id: SceneId,
    /// Display name.
    pub name: String,
    /// Coarse category.
    pub scene_type: SceneType,
    status: SceneStatus,
    /// World width in world-units.
    pub width: f64,
    /// World height in world-units.
    pub height: f64,
    /// Maximum concurrent players.
    pub max_players: u32,
    entities: FxHashMap<EntityId, Entity>,
    player_ids: std::collections::HashSet<EntityId>,
    spawn_points: FxHashMap<String, SpawnPoint>,
    aoi: AoiIndex,
    pending_events: Vec<DomainEvent>,
    version: u64,
    broadcaster: Option<std::sync::Arc<dyn Broadcaster>>,
    entity_factory: Option<std::sync::Arc<dyn EntityFactory>>,
}

impl Scene {
    /// Creates an empty, `Active` scene with the default AOI cell size.
    #[must_use]
    pub fn new(id: SceneId, name: impl Into<String>, scene_type: SceneType, width: f64, height: f64, max_players: u32) -> Self {
        Self {
            id,
            name: name.into(),
            scene_type,
            status: SceneStatus::Active,
            width,
            height,
            max_players,
            entities: FxHashMap::default(),
            player_ids: std::collections::HashSet::default(),
            spawn_points: FxHashMap::default(),
            aoi: AoiIndex::new(DEFAULT_CELL_SIZE),
            pending_events: Vec::new(),
            version: 0,
            broadcaster: None,
            entity_factory: None,
        }
    }

    /// Injects the broadcaster used by `broadcast_to`/`broadcast_in_range`.
    pub fn set_broadcaster(&mut self, broadcaster: std::sync::Arc<dyn Broadcaster>) {
        self.broadcaster = Some(broadcaster);
    }

    /// Injects the entity factory used by the spawn policy.
    pub fn set_entity_factory(&mut self, factory: std::sync::Arc<dyn EntityFactory>) {
        self.entity_factory = Some(factory);
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SceneStatus {
        self.status
    }

    /// Explicit lifecycle transition. `Closed` is terminal: once set, no
    /// further transition is possible from here.
    pub fn set_status(&mut self, status: SceneStatus) {
        self.status = status;
    }

    /// Number of players currently in the scene.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_ids.len()
    }

    fn within_bounds(&self, position: Vector3) -> bool {
        position.within_bounds(self.width, self.height)
    }

    fn emit(&mut self, build: impl FnOnce(EventMeta) -> DomainEvent, topic: &'static str, now: i64) {
        self.version += 1;
        let meta = EventMeta::new(self.id.as_str(), topic, now, self.version);
        self.pending_events.push(build(meta));
    }

    /// Admits a player entity into the scene.
    pub fn add_player(&mut self, id: EntityId, entity: Entity, now: i64) -> Result<(), SceneError> {
        if matches!(self.status, SceneStatus::Maintenance | SceneStatus::Closed) {
            return Err(SceneError::SceneNotActive);
        }
        if self.player_ids.len() as u32 >= self.max_players {
            return Err(SceneError::SceneFull);
        }
        if self.entities.contains_key(&id) {
            return Err(SceneError::PlayerAlreadyInScene(id.0));
        }

        let position = entity.position();
        self.entities.insert(id.clone(), entity);
        self.player_ids.insert(id.clone());
        self.aoi.add(id.clone(), position);

        self.emit(
            |meta| DomainEvent::PlayerEntered {
                meta,
                scene_id: self.id.0.clone(),
                player_id: id.0.clone(),
                position: [position.x, position.y, position.z],
            },
            topics::PLAYER_ENTERED,
            now,
        );

        if self.player_ids.len() as u32 >= self.max_players {
            self.status = SceneStatus::Full;
        }
        Ok(())
    }

    /// Removes a player entity from the scene.
    pub fn remove_player(&mut self, id: &EntityId, now: i64) -> Result<(), SceneError> {
        if !self.player_ids.remove(id) {
            return Err(SceneError::PlayerNotInScene(id.0.clone()));
        }
        self.entities.remove(id);
        self.aoi.remove(id);

        self.emit(
            |meta| DomainEvent::PlayerLeft {
                meta,
                scene_id: self.id.0.clone(),
                player_id: id.0.clone(),
            },
            topics::PLAYER_LEFT,
            now,
        );

        if self.status == SceneStatus::Full && (self.player_ids.len() as u32) < self.max_players {
            self.status = SceneStatus::Active;
        }
        Ok(())
    }

    /// Moves an existing entity.
    pub fn move_entity(&mut self, id: &EntityId, new_position: Vector3, now: i64) -> Result<(), SceneError> {
        if !self.within_bounds(new_position) {
            return Err(SceneError::InvalidPosition);
        }
        let entity = self.entities.get_mut(id).ok_or_else(|| SceneError::EntityNotFound(id.0.clone()))?;
        let old_position = entity.position();
        entity.set_position(new_position);
        self.aoi.update(id, new_position);

        self.emit(
            |meta| DomainEvent::EntityMoved {
                meta,
                scene_id: self.id.0.clone(),
                entity_id: id.0.clone(),
                old_position: [old_position.x, old_position.y, old_position.z],
                new_position: [new_position.x, new_position.y, new_position.z],
            },
            topics::ENTITY_MOVED,
            now,
        );
        Ok(())
    }

    /// Adds a monster entity already constructed by the caller and
    /// increments its owning spawn point's `currentCount`. The spawn policy
    /// calls this internally; it is also exposed for direct use (manual GM
    /// spawns, tests).
    pub fn spawn_monster(&mut self, id: EntityId, entity: Entity, spawn_point_id: &str, now: i64) -> Result<(), SceneError> {
        if self.entities.contains_key(&id) {
            return Err(SceneError::MonsterAlreadyExists(id.0));
        }
        let position = entity.position();
        self.entities.insert(id.clone(), entity);
        self.aoi.add(id.clone(), position);

        if let Some(sp) = self.spawn_points.get_mut(spawn_point_id) {
            sp.record_spawn(now);
        }

        self.emit(
            |meta| DomainEvent::MonsterSpawned {
                meta,
                scene_id: self.id.0.clone(),
                entity_id: id.0.clone(),
                spawn_point_id: spawn_point_id.to_owned(),
            },
            topics::MONSTER_SPAWNED,
            now,
        );
        Ok(())
    }

    /// Drops an item entity into the scene.
    pub fn drop_item(&mut self, id: EntityId, entity: Entity, now: i64) -> Result<(), SceneError> {
        if self.entities.contains_key(&id) {
            return Err(SceneError::ItemAlreadyExists(id.0));
        }
        let position = entity.position();
        self.entities.insert(id.clone(), entity);
        self.aoi.add(id.clone(), position);

        self.emit(
            |meta| DomainEvent::ItemDropped {
                meta,
                scene_id: self.id.0.clone(),
                entity_id: id.0.clone(),
                position: [position.x, position.y, position.z],
            },
            topics::ITEM_DROPPED,
            now,
        );
        Ok(())
    }

    /// Registers a spawn point that the per-tick spawn policy will
    /// drive. Does not itself spawn anything.
    pub fn add_spawn_point(&mut self, spawn_point: SpawnPoint) {
        self.spawn_points.insert(spawn_point.id.clone(), spawn_point);
    }

    /// Entities within `radius` of `entity_id`'s current position, excluding
    /// the entity itself.
    #[must_use]
    pub fn get_nearby_entities(&self, entity_id: &EntityId, radius: f64) -> Vec<EntityId> {
        let Some(entity) = self.entities.get(entity_id) else {
            return Vec::new();
        };
        self.aoi
            .query(entity.position(), radius)
            .into_iter()
            .map(|e| e.id)
            .filter(|id| id != entity_id)
            .collect()
    }

    /// Sends `payload` to exactly `recipients`.
    pub fn broadcast_to(&self, recipients: &[EntityId], topic: &str, payload: &[u8]) {
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.broadcast(recipients, topic, payload);
        }
    }

    /// Sends `payload` to the AOI snapshot around `center`.
    pub fn broadcast_in_range(&self, center: Vector3, radius: f64, topic: &str, payload: &[u8]) {
        let recipients: Vec<EntityId> = self.aoi.query(center, radius).into_iter().map(|e| e.id).collect();
        self.broadcast_to(&recipients, topic, payload);
    }

    /// Advances every active entity by `dt`, runs the spawn policy, and
    /// appends any emitted events.
    pub fn update(&mut self, dt: f64, now: i64) {
        let dead_monsters = self.tick_entities(dt);
        for (entity_id, spawn_point_id) in dead_monsters {
            self.entities.remove(&entity_id);
            self.aoi.remove(&entity_id);
            if let Some(sp_id) = spawn_point_id
                && let Some(sp) = self.spawn_points.get_mut(&sp_id)
            {
                sp.record_death();
            }
        }
        self.run_spawn_policy(now);
    }

    fn tick_entities(&mut self, dt: f64) -> Vec<(EntityId, Option<String>)> {
        let mut dead = Vec::new();
        for (id, entity) in &mut self.entities {
            if !entity.is_active() {
                continue;
            }
            entity.tick(dt);
            if let Entity::Monster(monster) = entity
                && monster.is_dead()
            {
                dead.push((id.clone(), monster.spawn_point_id.clone()));
            }
        }
        dead
    }

    fn run_spawn_policy(&mut self, now: i64) {
        let Some(factory) = self.entity_factory.clone() else {
            return;
        };
        let due: Vec<String> = self
            .spawn_points
            .values()
            .filter(|sp| sp.should_spawn(now))
            .map(|sp| sp.id.clone())
            .collect();

        for sp_id in due {
            let Some((spawn_kind, template_id, position)) = self
                .spawn_points
                .get(&sp_id)
                .map(|sp| (sp.spawn_kind, sp.template_id.clone(), sp.position))
            else {
                continue;
            };
            let entity_id = EntityId::from(format!("{sp_id}-{template_id}-{now}"));
            let entity = factory.create(spawn_kind, &template_id, entity_id.clone(), position);
            if let Err(err) = self.spawn_monster(entity_id, entity, &sp_id, now) {
                tracing::warn!(spawn_point = %sp_id, error = %err, "spawn policy could not place monster");
            }
        }
    }

    /// Every event appended since the last `clear_events`.
    #[must_use]
    pub fn events(&self) -> &[DomainEvent] {
        &self.pending_events
    }

    /// Clears the pending event queue.
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Scene, SceneStatus, SceneType};
    use crate::entity::{Entity, Player};
    use sim_utils::{EntityId, Vector3};

    fn player(id: &str, position: Vector3) -> Entity {
        Entity::Player(Player::new(EntityId::from(id), position, 100, 50, 1))
    }

    #[test]
    fn full_scene_rejects_third_player() {
        let mut scene = Scene::new(sim_utils::SceneId::from("s1"), "Test", SceneType::City, 1000.0, 1000.0, 2);

        scene.add_player(EntityId::from("p1"), player("p1", Vector3::new(100.0, 100.0, 0.0)), 0).unwrap();
        scene.add_player(EntityId::from("p2"), player("p2", Vector3::new(200.0, 200.0, 0.0)), 0).unwrap();

        let err = scene.add_player(EntityId::from("p3"), player("p3", Vector3::new(300.0, 300.0, 0.0)), 0);
        assert!(matches!(err, Err(super::SceneError::SceneFull)));
        assert_eq!(scene.status(), SceneStatus::Full);

        let events = scene.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], sim_eventbus::DomainEvent::PlayerEntered { ref player_id, .. } if player_id == "p1"));
        assert!(matches!(events[1], sim_eventbus::DomainEvent::PlayerEntered { ref player_id, .. } if player_id == "p2"));
    }

    #[test]
    fn move_entity_rejects_out_of_bounds() {
        let mut scene = Scene::new(sim_utils::SceneId::from("s1"), "Test", SceneType::City, 1000.0, 1000.0, 10);
        scene.add_player(EntityId::from("p1"), player("p1", Vector3::new(100.0, 100.0, 0.0)), 0).unwrap();

        let err = scene.move_entity(&EntityId::from("p1"), Vector3::new(-1.0, 0.0, 0.0), 1);
        assert!(matches!(err, Err(super::SceneError::InvalidPosition)));
    }

    #[test]
    fn full_scene_reverts_to_active_after_removal() {
        let mut scene = Scene::new(sim_utils::SceneId::from("s1"), "Test", SceneType::City, 1000.0, 1000.0, 1);
        scene.add_player(EntityId::from("p1"), player("p1", Vector3::ZERO), 0).unwrap();
        assert_eq!(scene.status(), SceneStatus::Full);

        scene.remove_player(&EntityId::from("p1"), 1).unwrap();
        assert_eq!(scene.status(), SceneStatus::Active);
    }
}
