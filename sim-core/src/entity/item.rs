//! The scene's dropped `Item` entity.

use sim_utils::{EntityId, Vector3};

use super::EntityBehavior;

/// An item lying on the ground, awaiting pickup or expiry.
pub struct DroppedItem {
    id: EntityId,
    position: Vector3,
    /// Template id identifying what this item is, opaque to this core.
    pub template_id: String,
    /// Unix-seconds this item despawns at, if it expires.
    pub expires_at: Option<i64>,
    /// If set, only this player may pick the item up.
    pub owner_restriction: Option<String>,
}

impl DroppedItem {
    /// Creates a dropped item with no expiration and no owner restriction.
    #[must_use]
    pub fn new(id: EntityId, position: Vector3, template_id: impl Into<String>) -> Self {
        Self {
            id,
            position,
            template_id: template_id.into(),
            expires_at: None,
            owner_restriction: None,
        }
    }

    /// Sets an expiration instant.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Restricts pickup to a single player.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_restriction = Some(owner.into());
        self
    }

    /// True once `now` has passed `expires_at`, if any.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }

    /// Whether `player_id` is allowed to pick this item up.
    #[must_use]
    pub fn can_be_picked_up_by(&self, player_id: &str) -> bool {
        self.owner_restriction.as_deref().is_none_or(|owner| owner == player_id)
    }
}

impl EntityBehavior for DroppedItem {
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

#[cfg(test)]
mod tests {
    use super::DroppedItem;
    use sim_utils::{EntityId, Vector3};

    #[test]
    fn owner_restriction_blocks_other_players() {
        let item = DroppedItem::new(EntityId::from("i1"), Vector3::ZERO, "sword").with_owner("p1");
        assert!(item.can_be_picked_up_by("p1"));
        assert!(!item.can_be_picked_up_by("p2"));
    }

    #[test]
    fn expiry_check() {
        let item = DroppedItem::new(EntityId::from("i1"), Vector3::ZERO, "sword").with_expiry(100);
        assert!(!item.is_expired(99));
        assert!(item.is_expired(100));
    }
}
