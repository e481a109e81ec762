//! Errors surfaced by [`super::Scene`]'s methods.

use sim_utils::error::{Classify, Severity};
use thiserror::Error;

/// Failure modes of scene mutation methods.
#[derive(Debug, Error)]
pub enum SceneError {
    /// `AddPlayer` when `playerCount == maxPlayers`.
    #[error("scene is full")]
    SceneFull,
    /// A mutating method was called while `status != Active`.
    #[error("scene is not active")]
    SceneNotActive,
    /// `AddPlayer` with an id already present.
    #[error("player {0} is already in this scene")]
    PlayerAlreadyInScene(String),
    /// `RemovePlayer` with an id not present.
    #[error("player {0} is not in this scene")]
    PlayerNotInScene(String),
    /// `MoveEntity`/damage methods referencing an unknown entity id.
    #[error("entity {0} not found")]
    EntityNotFound(String),
    /// `MoveEntity` to a position outside `[0,width] x [0,height]`.
    #[error("position out of bounds")]
    InvalidPosition,
    /// `SpawnMonster` with an id already present.
    #[error("monster {0} already exists")]
    MonsterAlreadyExists(String),
    /// `DropItem` with an id already present.
    #[error("item {0} already exists")]
    ItemAlreadyExists(String),
}

impl Classify for SceneError {
    fn severity(&self) -> Severity {
        match self {
            Self::InvalidPosition => Severity::Validation,
            Self::SceneFull | Self::SceneNotActive => Severity::State,
            Self::PlayerAlreadyInScene(_) | Self::MonsterAlreadyExists(_) | Self::ItemAlreadyExists(_) => Severity::State,
            Self::PlayerNotInScene(_) | Self::EntityNotFound(_) => Severity::NotFound,
        }
    }
}
