//! The scene's `Monster` entity.

use sim_utils::{EntityId, Vector3};

use super::EntityBehavior;

/// Coarse AI behavior a monster follows. The concrete decision logic is a
/// gameplay vertical out of this core's scope; this block only records
/// which mode a monster is in so the scene's tick loop has somewhere to
/// dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiBehavior {
    /// Stands still until provoked.
    Idle,
    /// Attacks the nearest valid target on sight.
    Aggressive,
    /// Walks a patrol route when no target is in range.
    Patrol,
}

/// A hostile or neutral AI-driven entity, optionally tied to the spawn point
/// that created it.
pub struct Monster {
    id: EntityId,
    position: Vector3,
    active: bool,
    /// Monster level, used by combat (out of this core's scope) for damage
    /// scaling.
    pub level: u32,
    /// Current AI mode.
    pub behavior: AiBehavior,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Non-owning reference to the spawn point that created this monster,
    /// if any — used only to find the spawn point to decrement on death
    ///, never to mutate it directly from here.
    pub spawn_point_id: Option<String>,
}

impl Monster {
    /// Creates a monster at full health.
    #[must_use]
    pub fn new(id: EntityId, position: Vector3, level: u32, max_hp: i32, spawn_point_id: Option<String>) -> Self {
        Self {
            id,
            position,
            active: true,
            level,
            behavior: AiBehavior::Idle,
            hp: max_hp,
            max_hp,
            spawn_point_id,
        }
    }

    /// True once `hp` reaches zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Applies damage, clamping to zero.
    pub fn apply_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Removes this monster from AOI/tick participation, used while it is
    /// respawning.
    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl EntityBehavior for Monster {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn position(&self) -> Vector3 {
        self.position
    }

    fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    fn is_active(&self) -> bool {
        self.active && !self.is_dead()
    }

    fn tick(&mut self, _dt: f64) {
        // AI decision-making is an external gameplay vertical; this core
        // only carries the `behavior` tag for it to act on.
    }
}
