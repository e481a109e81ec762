//! Entities: the tagged variant plus a shared capability set, in place of a
//! polymorphic base struct with downcasting.
//!
//! Rather than a polymorphic base struct with downcasting, [`Entity`] is a
//! closed enum over the five concrete kinds and [`EntityBehavior`] is
//! dispatched on the tag via `enum_dispatch`.

/// Dropped items.
pub mod item;
/// Monsters and their spawn-point back-reference.
pub mod monster;
/// Static non-player characters.
pub mod npc;
/// Players.
pub mod player;
/// Scene portals.
pub mod portal;
/// Spawn points that periodically instantiate monsters.
pub mod spawn_point;

use enum_dispatch::enum_dispatch;
use sim_utils::{EntityId, Vector3};

pub use item::DroppedItem;
pub use monster::{AiBehavior, Monster};
pub use npc::Npc;
pub use player::{Player, PlayerStatus};
pub use portal::Portal;
pub use spawn_point::{SpawnKind, SpawnPoint};

/// The capability set every entity kind offers, regardless of variant.
#[enum_dispatch]
pub trait EntityBehavior {
    /// Stable id, unique within the owning scene.
    fn id(&self) -> &EntityId;

    /// Current world position.
    fn position(&self) -> Vector3;

    /// Overwrites the current position. Callers are responsible for AOI
    /// bookkeeping — this only updates the entity's own state.
    fn set_position(&mut self, position: Vector3);

    /// Whether this entity currently participates in tick processing and
    /// AOI queries. `false` excludes it from both.
    fn is_active(&self) -> bool;

    /// Advances this entity's own internal state by `dt` seconds.
    fn tick(&mut self, dt: f64);
}

/// A polymorphic entity living inside exactly one scene at a time.
#[enum_dispatch(EntityBehavior)]
pub enum Entity {
    /// A connected player.
    Player(Player),
    /// A hostile or neutral AI-driven monster.
    Monster(Monster),
    /// A static non-player character.
    Npc(Npc),
    /// A dropped item awaiting pickup or expiry.
    Item(DroppedItem),
    /// A portal linking to another scene.
    Portal(Portal),
}
