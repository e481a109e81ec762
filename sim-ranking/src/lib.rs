//! The ranking engine: a time-weighted, bounded, sortable leaderboard
//! store with blacklisting, reset, and trend statistics.
//!
//! This crate owns the `Ranking` aggregate end to end. It depends on
//! `sim-eventbus` only for the [`sim_eventbus::DomainEvent`] envelope — it
//! has no notion of scenes, AOI, or the tick loop.

/// Blacklist entries and the per-ranking blacklist set.
pub mod blacklist;
/// `RankEntry`, its bounded history, and rank bookkeeping.
pub mod entry;
/// Ranking error taxonomy.
pub mod error;
/// The `Ranking` aggregate root.
pub mod ranking;
/// In-memory `rankId -> Ranking` registry with lazy repository hydration.
pub mod registry;
/// Persistence ports for rankings and blacklist entries.
pub mod repository;
/// Cached/on-demand statistics and the trend predictor.
pub mod stats;
/// The time-factored composite score.
pub mod time_score;

pub use blacklist::{Blacklist, BlacklistEntry};
pub use entry::RankEntry;
pub use error::RankingError;
pub use ranking::{Ranking, RankingFilter, RankingStatus};
pub use registry::{RankingRegistry, SharedRanking};
pub use repository::{BlacklistRepository, RankingRepository, RepositoryError};
pub use stats::{OnDemandStatistics, StatisticsCache, TrendPrediction, TrendSample, TrendTracker};
pub use time_score::{SortType, TimeScore, TimeScoreCodec, TimeWindow};
