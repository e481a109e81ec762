//! External collaborators the scene layer consumes but never implements
//!. Everything here is injected by the embedding binary; `sim-core`
//! only depends on the trait.

use async_trait::async_trait;
use sim_utils::{EntityId, SceneId, Vector3};
use thiserror::Error;

use crate::entity::{Entity, SpawnKind};
use crate::scene::Scene;

/// Builds a concrete [`Entity`] from a spawn point's template id.
///
/// Spec's own source leaves this as a TODO; this spec
/// specifies the spawn *policy* but leaves entity construction to
/// whatever content system owns templates.
pub trait EntityFactory: Send + Sync {
    /// Instantiates an entity of `kind` from `template_id` at `position`,
    /// assigning it `id`.
    fn create(&self, kind: SpawnKind, template_id: &str, id: EntityId, position: Vector3) -> Entity;
}

/// Delivers a batch of updates to a fixed recipient list.
///
/// Required non-blocking: the scene calls this from inside a mutation
/// under its own lock, so a slow broadcaster stalls every other caller of
/// that scene.
pub trait Broadcaster: Send + Sync {
    /// Sends `payload` under `topic` to exactly `recipients`.
    fn broadcast(&self, recipients: &[EntityId], topic: &str, payload: &[u8]);
}

/// Failure surfaced by a repository round-trip: always `System`,
/// always retryable per the static table.
#[derive(Debug, Error)]
#[error("repository operation failed: {0}")]
pub struct RepositoryError(pub String);

impl sim_utils::Classify for RepositoryError {
    fn severity(&self) -> sim_utils::Severity {
        sim_utils::Severity::System
    }
}

/// Persistence for [`Scene`] aggregates. `sim-server` ships an in-memory
/// reference implementation; a production embedder supplies a real one.
#[async_trait]
pub trait SceneRepository: Send + Sync {
    /// Persists the current state of `scene`.
    async fn save(&self, scene: &Scene) -> Result<(), RepositoryError>;

    /// Loads a scene by id, if it exists.
    async fn find_by_id(&self, id: &SceneId) -> Result<Option<Scene>, RepositoryError>;

    /// Deletes a scene by id. Idempotent.
    async fn delete(&self, id: &SceneId) -> Result<(), RepositoryError>;

    /// True if a scene with this id is persisted.
    async fn exists(&self, id: &SceneId) -> Result<bool, RepositoryError>;

    /// All scenes whose persisted status is `Active`.
    async fn find_active_scenes(&self) -> Result<Vec<SceneId>, RepositoryError>;
}

/// Publishes domain events past the local bus. Failures are logged-only by
/// the caller — never escalated here.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event. Errors never unwind into the scene mutation
    /// that produced the event.
    async fn publish(&self, event: &sim_eventbus::DomainEvent) -> Result<(), sim_eventbus::PublishError>;
}
