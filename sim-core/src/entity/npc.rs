//! The scene's `Npc` entity.
//!
//! An NPC is a static, always-active fixture: no AI, no respawn, no
//! expiration. It participates in AOI like any other entity so players see
//! quest-givers and vendors.

use sim_utils::{EntityId, Vector3};

use super::EntityBehavior;

/// A static non-player character (quest giver, vendor, trainer).
pub struct Npc {
    id: EntityId,
    position: Vector3,
    /// Template/dialogue id, opaque to this core.
    pub template_id: String,
}

impl Npc {
    /// Creates an NPC at a fixed position.
    #[must_use]
    pub fn new(id: EntityId, position: Vector3, template_id: impl Into<String>) -> Self {
        Self {
            id,
            position,
            template_id: template_id.into(),
        }
    }
}

impl EntityBehavior for Npc {
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
        true
    }

    fn tick(&mut self, _dt: f64) {}
}
