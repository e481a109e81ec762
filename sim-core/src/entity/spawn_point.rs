//! `SpawnPoint`: a scene-local source that periodically creates monsters up
//! to a count cap.

use sim_utils::Vector3;

/// What kind of entity a spawn point creates. Only `Monster` is driven by
/// the tick loop's spawn policy; the others are reserved for future
/// spawn-driven content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    /// Instantiates a monster from `template_id`.
    Monster,
}

/// A periodic monster source within a scene.
pub struct SpawnPoint {
    /// Stable id, unique within the owning scene.
    pub id: String,
    /// World position new entities are created at.
    pub position: Vector3,
    /// What kind of entity this spawn point creates.
    pub spawn_kind: SpawnKind,
    /// Template id passed to the entity factory.
    pub template_id: String,
    /// Minimum seconds between spawns.
    pub interval: i64,
    /// Maximum simultaneously-alive entities this spawn point owns.
    pub max_count: u32,
    /// Currently-alive entities owned by this spawn point; invariant
    /// `0 <= current_count <= max_count`.
    pub current_count: u32,
    /// Unix-seconds of the last spawn, `i64::MIN` if it has never fired.
    pub last_spawn: i64,
}

impl SpawnPoint {
    /// Creates a spawn point with `current_count = 0`, eligible to spawn
    /// immediately.
    #[must_use]
    pub fn new(id: impl Into<String>, position: Vector3, spawn_kind: SpawnKind, template_id: impl Into<String>, interval: i64, max_count: u32) -> Self {
        Self {
            id: id.into(),
            position,
            spawn_kind,
            template_id: template_id.into(),
            interval,
            max_count,
            current_count: 0,
            last_spawn: i64::MIN,
        }
    }

    /// True if this spawn point should fire at `now`.
    #[must_use]
    pub const fn should_spawn(&self, now: i64) -> bool {
        self.current_count < self.max_count && now.saturating_sub(self.last_spawn) >= self.interval
    }

    /// Records that a spawn just happened.
    pub const fn record_spawn(&mut self, now: i64) {
        self.last_spawn = now;
        self.current_count += 1;
    }

    /// Decrements `current_count` on the death of one owned entity.
    /// Invariant: called exactly once per death.
    pub const fn record_death(&mut self) {
        self.current_count = self.current_count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{SpawnKind, SpawnPoint};
    use sim_utils::Vector3;

    #[test]
    fn respects_interval_and_cap() {
        let mut sp = SpawnPoint::new("sp1", Vector3::ZERO, SpawnKind::Monster, "goblin", 10, 2);
        assert!(sp.should_spawn(0));
        sp.record_spawn(0);
        assert!(!sp.should_spawn(5));
        assert!(sp.should_spawn(10));
        sp.record_spawn(10);
        assert_eq!(sp.current_count, 2);
        assert!(!sp.should_spawn(20));

        sp.record_death();
        assert!(sp.should_spawn(20));
    }
}
