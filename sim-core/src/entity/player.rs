//! The scene's `Player` entity.
//!
//! This is strictly a scene-local entity (position, combat attributes,
//! status); cross-aggregate correlation with a player-domain identity
//! elsewhere in the system is left to the service layer, never modeled
//! here.

use sim_utils::{EntityId, Vector3};

use super::EntityBehavior;

/// What a player is currently doing, gating which systems may act on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Free to move, interact, and be targeted.
    Normal,
    /// Engaged in combat.
    Combat,
    /// Dead; excluded from combat targeting, but AOI keeps tracking position
    /// until the scene removes the corpse.
    Dead,
    /// Away from keyboard.
    Afk,
    /// Mid-trade with another player.
    Trading,
    /// Channeling a skill.
    Casting,
}

/// A connected player as tracked by a scene.
pub struct Player {
    id: EntityId,
    position: Vector3,
    active: bool,
    /// Current hit points; invariant `0 <= hp <= max_hp`.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current mana points; invariant `0 <= mp <= max_mp`.
    pub mp: i32,
    /// Maximum mana points.
    pub max_mp: i32,
    /// Character level.
    pub level: u32,
    /// What the player is currently doing.
    pub status: PlayerStatus,
    /// Unix-seconds of the last player-initiated action.
    pub last_action_at: i64,
}

impl Player {
    /// Creates a player at full health/mana, `Normal` status.
    #[must_use]
    pub fn new(id: EntityId, position: Vector3, max_hp: i32, max_mp: i32, level: u32) -> Self {
        Self {
            id,
            position,
            active: true,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            level,
            status: PlayerStatus::Normal,
            last_action_at: 0,
        }
    }

    /// Applies damage, clamping to `0`, and transitions to `Dead` on
    /// lethal damage.
    pub fn apply_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.status = PlayerStatus::Dead;
        }
    }

    /// Heals, clamping to `max_hp`.
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Whether this player may currently be targeted in combat. Distinct
    /// from [`EntityBehavior::is_active`]: a dead player stays AOI-tracked
    /// (`is_active() == true`) until the scene removes the corpse, but is
    /// never combat-targetable.
    #[must_use]
    pub const fn is_combat_targetable(&self) -> bool {
        !matches!(self.status, PlayerStatus::Dead)
    }

    /// Marks the entity inactive, excluding it from tick processing and AOI
    /// queries. Scenes call this only right before removing the entity
    /// entirely.
    pub const fn deactivate(&mut self) {
        self.active = false;
    }
}

impl EntityBehavior for Player {
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
        self.active
    }

    fn tick(&mut self, _dt: f64) {
        // Regen, status decay, and similar per-tick bookkeeping belong to
        // the gameplay verticals this core excludes; the scene only
        // needs the capability hook to exist.
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, PlayerStatus};
    use crate::entity::EntityBehavior;
    use sim_utils::{EntityId, Vector3};

    #[test]
    fn lethal_damage_transitions_to_dead_but_stays_active() {
        let mut player = Player::new(EntityId::from("p1"), Vector3::ZERO, 100, 50, 1);
        player.apply_damage(100);

        assert_eq!(player.status, PlayerStatus::Dead);
        assert_eq!(player.hp, 0);
        assert!(player.is_active());
        assert!(!player.is_combat_targetable());
    }

    #[test]
    fn heal_clamps_to_max_hp() {
        let mut player = Player::new(EntityId::from("p1"), Vector3::ZERO, 100, 50, 1);
        player.apply_damage(90);
        player.heal(50);
        assert_eq!(player.hp, 100);
    }
}
