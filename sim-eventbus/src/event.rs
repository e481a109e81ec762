//! The domain event envelope.
//!
//! Every aggregate in the workspace (scene, ranking) emits variants of
//! [`DomainEvent`] rather than reaching into the bus's internals. Each
//! variant carries [`EventMeta`] (event id, aggregate id, topic, occurred-at,
//! per-aggregate version) plus its own payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields common to every domain event, regardless of variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMeta {
    /// Unique id of this event occurrence.
    pub event_id: Uuid,
    /// Id of the aggregate (scene id or rank id) that emitted this event.
    pub aggregate_id: String,
    /// Stable topic string, used as the remote bridge's routing key.
    pub topic: &'static str,
    /// Unix-seconds timestamp of when the mutation committed.
    pub occurred_at: i64,
    /// Monotonically increasing version for this aggregate id.
    pub version: u64,
}

impl EventMeta {
    /// Builds a fresh [`EventMeta`] with a random event id.
    #[must_use]
    pub fn new(aggregate_id: impl Into<String>, topic: &'static str, occurred_at: i64, version: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.into(),
            topic,
            occurred_at,
            version,
        }
    }
}

/// Reason a `RankEntry` left the sorted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeftRankingReason {
    /// Dropped because the ranking exceeded `maxSize` after this update.
    Overflow,
    /// Removed because the player was added to the blacklist.
    Blacklisted,
}

/// The closed set of domain events this core emits.
///
/// New variants are additive only — existing topics are part of the
/// remote-bridge wire contract and must not be renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A player was admitted into a scene.
    PlayerEntered {
        /// Common event fields.
        meta: EventMeta,
        /// Scene the player entered.
        scene_id: String,
        /// Player that entered.
        player_id: String,
        /// Spawn position.
        position: [f64; 3],
    },
    /// A player left a scene (voluntary or forced).
    PlayerLeft {
        /// Common event fields.
        meta: EventMeta,
        /// Scene the player left.
        scene_id: String,
        /// Player that left.
        player_id: String,
    },
    /// Any entity's position changed.
    EntityMoved {
        /// Common event fields.
        meta: EventMeta,
        /// Scene the entity belongs to.
        scene_id: String,
        /// Entity that moved.
        entity_id: String,
        /// Position before the move.
        old_position: [f64; 3],
        /// Position after the move.
        new_position: [f64; 3],
    },
    /// A spawn point instantiated a new monster.
    MonsterSpawned {
        /// Common event fields.
        meta: EventMeta,
        /// Scene the monster was spawned into.
        scene_id: String,
        /// Id of the new monster entity.
        entity_id: String,
        /// Id of the spawn point responsible.
        spawn_point_id: String,
    },
    /// An item was dropped into a scene.
    ItemDropped {
        /// Common event fields.
        meta: EventMeta,
        /// Scene the item was dropped into.
        scene_id: String,
        /// Id of the new item entity.
        entity_id: String,
        /// Drop position.
        position: [f64; 3],
    },
    /// An existing ranked player's score changed.
    PlayerScoreUpdated {
        /// Common event fields.
        meta: EventMeta,
        /// Ranking the player belongs to.
        rank_id: String,
        /// Player whose score changed.
        player_id: String,
        /// Real score before the update.
        old_score: f64,
        /// Real score after the update.
        new_score: f64,
    },
    /// A player appeared in a ranking for the first time.
    PlayerJoinedRanking {
        /// Common event fields.
        meta: EventMeta,
        /// Ranking the player joined.
        rank_id: String,
        /// Player that joined.
        player_id: String,
    },
    /// A player's `RankEntry` was removed from the sorted list.
    PlayerLeftRanking {
        /// Common event fields.
        meta: EventMeta,
        /// Ranking the player left.
        rank_id: String,
        /// Player that left.
        player_id: String,
        /// Why the entry was removed.
        reason: LeftRankingReason,
    },
    /// A player was added to a ranking's blacklist.
    PlayerBlacklisted {
        /// Common event fields.
        meta: EventMeta,
        /// Ranking the blacklist belongs to.
        rank_id: String,
        /// Player that was blacklisted.
        player_id: String,
        /// Operator-supplied reason string.
        reason: String,
    },
    /// A temporary blacklist entry's `expiresAt` passed and cleanup removed it.
    BlacklistExpired {
        /// Common event fields.
        meta: EventMeta,
        /// Ranking the blacklist belongs to.
        rank_id: String,
        /// Player whose blacklist entry expired.
        player_id: String,
    },
    /// A ranking's entry list was cleared via `Reset`.
    RankingReset {
        /// Common event fields.
        meta: EventMeta,
        /// Ranking that was reset.
        rank_id: String,
        /// Number of entries the list held immediately before the reset.
        previous_player_count: usize,
    },
}

impl DomainEvent {
    /// Borrows this event's common metadata, regardless of variant.
    #[must_use]
    pub fn meta(&self) -> &EventMeta {
        match self {
            Self::PlayerEntered { meta, .. }
            | Self::PlayerLeft { meta, .. }
            | Self::EntityMoved { meta, .. }
            | Self::MonsterSpawned { meta, .. }
            | Self::ItemDropped { meta, .. }
            | Self::PlayerScoreUpdated { meta, .. }
            | Self::PlayerJoinedRanking { meta, .. }
            | Self::PlayerLeftRanking { meta, .. }
            | Self::PlayerBlacklisted { meta, .. }
            | Self::BlacklistExpired { meta, .. }
            | Self::RankingReset { meta, .. } => meta,
        }
    }

    /// The topic this event publishes under, used both for local
    /// subscription matching and as the remote bridge's routing key.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        self.meta().topic
    }
}

/// Topic string constants, named `<aggregate>.<event>` by convention.
pub mod topics {
    /// `scene.player_entered`
    pub const PLAYER_ENTERED: &str = "scene.player_entered";
    /// `scene.player_left`
    pub const PLAYER_LEFT: &str = "scene.player_left";
    /// `scene.entity_moved`
    pub const ENTITY_MOVED: &str = "scene.entity_moved";
    /// `scene.monster_spawned`
    pub const MONSTER_SPAWNED: &str = "scene.monster_spawned";
    /// `scene.item_dropped`
    pub const ITEM_DROPPED: &str = "scene.item_dropped";
    /// `ranking.player_score_updated`
    pub const PLAYER_SCORE_UPDATED: &str = "ranking.player_score_updated";
    /// `ranking.player_joined`
    pub const PLAYER_JOINED_RANKING: &str = "ranking.player_joined";
    /// `ranking.player_left`
    pub const PLAYER_LEFT_RANKING: &str = "ranking.player_left";
    /// `ranking.player_blacklisted`
    pub const PLAYER_BLACKLISTED: &str = "ranking.player_blacklisted";
    /// `ranking.blacklist_expired`
    pub const BLACKLIST_EXPIRED: &str = "ranking.blacklist_expired";
    /// `ranking.reset`
    pub const RANKING_RESET: &str = "ranking.reset";
}
