//! The realtime simulation core: entities, the scene aggregate, the AOI
//! grid index, the tick driver, the async task pool, and the external
//! collaborator traits that wire them into an embedding binary.

/// The grid-bucket Area-of-Interest index.
pub mod aoi;
/// Entity variants and the shared [`entity::EntityBehavior`] capability set.
pub mod entity;
/// External collaborator traits: repository, broadcaster, publisher, entity factory.
pub mod interfaces;
/// The scene aggregate and scene service.
pub mod scene;
/// The async task pool / `SpawnManager`.
pub mod task_pool;
/// The clock / tick driver.
pub mod tick;

pub use aoi::AoiIndex;
pub use entity::{Entity, EntityBehavior};
pub use scene::{Scene, SceneError, SceneStatus, SceneType};
pub use scene::service::SceneService;
pub use task_pool::TaskPool;
pub use tick::{TickDriver, Updatable};
