//! The scene's `Portal` entity.
//!
//! A portal behaves like an item with no expiration: static, always active,
//! participates in AOI. It carries the destination a move onto its position
//! should trigger; the entity source's `EnterScene` handler owns acting on
//! that, not this type.
use sim_utils::{EntityId, Vector3};

use super::EntityBehavior;

/// A static link to another scene.
pub struct Portal {
    id: EntityId,
    position: Vector3,
    /// Scene a player entering this portal is transported to.
    pub destination_scene_id: String,
    /// Position the player arrives at in the destination scene.
    pub destination_position: Vector3,
}

impl Portal {
    /// Creates a portal linking to `destination_scene_id` at
    /// `destination_position`.
    #[must_use]
    pub fn new(
        id: EntityId,
        position: Vector3,
        destination_scene_id: impl Into<String>,
        destination_position: Vector3,
    ) -> Self {
        Self {
            id,
            position,
            destination_scene_id: destination_scene_id.into(),
            destination_position,
        }
    }
}

impl EntityBehavior for Portal {
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
