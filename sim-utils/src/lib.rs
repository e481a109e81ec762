//! Shared primitives used across the simulation workspace.
//!
//! Nothing in this crate owns any simulation state; it exists so that
//! `sim-core`, `sim-ranking`, and `sim-eventbus` agree on the same vector
//! math, lock aliases, id types, and error classification without depending
//! on one another.

/// Error severity/retryability classification.
pub mod error;
/// Stable entity/scene/player id newtypes.
pub mod ids;
/// Lock type aliases used by every aggregate in the workspace.
pub mod locks;
/// 3D vector math shared by entities, AOI, and movement.
pub mod math;
/// Wall-clock helpers that route through a single `now()` so tests can
/// control time.
pub mod time;

pub use error::{Classify, Severity};
pub use ids::{EntityId, PlayerId, RankId, SceneId};
pub use locks::{SyncMutex, SyncRwLock};
pub use math::Vector3;
