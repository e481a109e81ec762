//! The `Ranking` aggregate root.

use std::collections::HashMap;

use sim_eventbus::{DomainEvent, EventMeta, LeftRankingReason, topics};
use tracing::debug;

use crate::blacklist::{Blacklist, BlacklistEntry};
use crate::entry::RankEntry;
use crate::error::RankingError;
use crate::stats::StatisticsCache;
use crate::time_score::{SortType, TimeScoreCodec, TimeWindow};

/// Lifecycle status of a ranking aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingStatus {
    /// Accepts `UpdateScore` calls.
    Active,
    /// Queries still work; writes are rejected.
    Maintenance,
    /// Terminal: no further mutation is accepted.
    Closed,
}

/// Default `maxSize`: the ranking list is truncated past this many entries.
pub const DEFAULT_MAX_SIZE: usize = 5000;
/// Default cleanup cadence for expired temporary blacklist entries.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: i64 = 3600;
/// Hard limit on a single `GetRanking` page (`end - start + 1`).
pub const MAX_QUERY_PAGE: i64 = 1000;

/// Optional filter applied to `GetRanking` reads.
#[derive(Debug, Clone, Copy)]
pub struct RankingFilter {
    /// Covers replay scenarios where a stale snapshot might still contain a
    /// since-blacklisted player; the live list should never contain one.
    pub exclude_blacklisted: bool,
}

impl Default for RankingFilter {
    fn default() -> Self {
        Self { exclude_blacklisted: true }
    }
}

/// A time-weighted, bounded, sortable leaderboard.
pub struct Ranking {
    /// This ranking's id.
    pub rank_id: String,
    sort_type: SortType,
    codec: TimeScoreCodec,
    max_size: usize,
    entries: Vec<RankEntry>,
    blacklist: Blacklist,
    window: TimeWindow,
    status: RankingStatus,
    stats: StatisticsCache,
    total_players: u64,
    pending_events: Vec<DomainEvent>,
    version: u64,
    last_cleanup: i64,
    cleanup_interval: i64,
}

impl Ranking {
    /// Creates a new, empty ranking.
    #[must_use]
    pub fn new(rank_id: impl Into<String>, sort_type: SortType, window: TimeWindow) -> Self {
        Self {
            rank_id: rank_id.into(),
            sort_type,
            codec: TimeScoreCodec::default(),
            max_size: DEFAULT_MAX_SIZE,
            entries: Vec::new(),
            blacklist: Blacklist::new(),
            window,
            status: RankingStatus::Active,
            stats: StatisticsCache::default(),
            total_players: 0,
            pending_events: Vec::new(),
            version: 0,
            last_cleanup: 0,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }

    /// Overrides `timeBitLen`/`timeUnit`. Must be called before any
    /// `UpdateScore` to avoid mixing encodings within one sorted list.
    pub fn configure_codec(&mut self, time_bit_len: u32, time_unit: i64) {
        self.codec = TimeScoreCodec { time_bit_len, time_unit };
    }

    /// Overrides `maxSize`.
    pub const fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    fn comparator(&self) -> impl Fn(&RankEntry, &RankEntry) -> std::cmp::Ordering + '_ {
        move |a, b| match self.sort_type {
            SortType::Descending => b.time_score.cmp(&a.time_score),
            SortType::Ascending => a.time_score.cmp(&b.time_score),
        }
    }

    /// Re-sorts `entries` and assigns 1-based ranks. Insertion-position
    /// would be cheaper, but a full sort is acceptable since `maxSize` is
    /// bounded well under 10,000.
    fn resort_and_rank(&mut self) {
        let cmp = self.comparator();
        self.entries.sort_by(|a, b| cmp(a, b));
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            entry.record_rank((idx + 1) as u32);
        }
    }

    /// Applies a new score for `player_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn update_score(
        &mut self,
        player_id: &str,
        real_score: f64,
        metadata: HashMap<String, String>,
        now: i64,
    ) -> Result<(), RankingError> {
        if !real_score.is_finite() {
            return Err(RankingError::InvalidScore(real_score));
        }
        if self.status != RankingStatus::Active {
            return Err(RankingError::RankingInactive);
        }
        if self.blacklist.contains(player_id) {
            return Err(RankingError::PlayerBlacklisted);
        }
        if !self.window.contains(now) {
            return Err(RankingError::RankingTimeExpired);
        }

        let time_score = self.codec.encode(real_score, now, self.sort_type, self.window);

        if let Some(existing) = self.entries.iter_mut().find(|e| e.player_id == player_id) {
            let old_score = existing.score;
            existing.apply_update(real_score, time_score, now, metadata);
            let version = self.next_version();
            self.pending_events.push(DomainEvent::PlayerScoreUpdated {
                meta: EventMeta::new(self.rank_id.clone(), topics::PLAYER_SCORE_UPDATED, now, version),
                rank_id: self.rank_id.clone(),
                player_id: player_id.to_owned(),
                old_score,
                new_score: real_score,
            });
        } else {
            self.entries.push(RankEntry::new(player_id, real_score, time_score, now, metadata));
            self.total_players += 1;
            let version = self.next_version();
            self.pending_events.push(DomainEvent::PlayerJoinedRanking {
                meta: EventMeta::new(self.rank_id.clone(), topics::PLAYER_JOINED_RANKING, now, version),
                rank_id: self.rank_id.clone(),
                player_id: player_id.to_owned(),
            });
        }

        self.resort_and_rank();

        while self.entries.len() > self.max_size {
            let dropped = self.entries.pop().expect("len > max_size implies non-empty");
            let version = self.next_version();
            self.pending_events.push(DomainEvent::PlayerLeftRanking {
                meta: EventMeta::new(self.rank_id.clone(), topics::PLAYER_LEFT_RANKING, now, version),
                rank_id: self.rank_id.clone(),
                player_id: dropped.player_id,
                reason: LeftRankingReason::Overflow,
            });
        }

        self.stats.recompute_from_entries(&self.entries);
        self.stats.total_players = self.total_players;
        self.stats.blacklist_count = self.blacklist.len() as u64;

        Ok(())
    }

    /// Re-inserts a previously persisted entry without emitting events or
    /// re-validating it, used by [`crate::registry::RankingRegistry`] to
    /// hydrate from the repository. Callers must call this for every entry
    /// before the ranking is otherwise used, then it self-sorts once.
    pub fn restore_entry(&mut self, entry: RankEntry) {
        self.total_players += 1;
        self.entries.push(entry);
        self.resort_and_rank();
        self.stats.recompute_from_entries(&self.entries);
        self.stats.total_players = self.total_players;
    }

    /// `GetRanking`: 1-based, inclusive `[start,
    /// end]`.
    pub fn get_ranking(&self, start: i64, end: i64, _filter: RankingFilter) -> Result<Vec<RankEntry>, RankingError> {
        if start < 0 || end < 0 || end < start {
            return Err(RankingError::InvalidRange { start, end });
        }
        if end - start + 1 > MAX_QUERY_PAGE {
            return Err(RankingError::InvalidRange { start, end });
        }

        let start_idx = start as usize;
        if start_idx >= self.entries.len() {
            return Ok(Vec::new());
        }
        let end_idx = (end as usize).min(self.entries.len().saturating_sub(1));
        Ok(self.entries[start_idx..=end_idx].to_vec())
    }

    /// `GetPlayerRank`.
    pub fn get_player_rank(&self, player_id: &str) -> Result<RankEntry, RankingError> {
        if self.blacklist.contains(player_id) {
            return Err(RankingError::PlayerBlacklisted);
        }
        self.entries
            .iter()
            .find(|e| e.player_id == player_id)
            .cloned()
            .ok_or(RankingError::PlayerNotInRanking)
    }

    /// Adds `player_id` to the blacklist, removing any existing entry from
    /// the sorted list.
    pub fn add_to_blacklist(&mut self, entry: BlacklistEntry, now: i64) {
        let player_id = entry.player_id.clone();
        self.blacklist.insert(entry.clone());

        if let Some(idx) = self.entries.iter().position(|e| e.player_id == player_id) {
            self.entries.remove(idx);
            self.total_players = self.total_players.saturating_sub(1);
            self.resort_and_rank();
        }

        let version = self.next_version();
        self.pending_events.push(DomainEvent::PlayerBlacklisted {
            meta: EventMeta::new(self.rank_id.clone(), topics::PLAYER_BLACKLISTED, now, version),
            rank_id: self.rank_id.clone(),
            player_id,
            reason: entry.reason,
        });

        self.stats.blacklist_count = self.blacklist.len() as u64;
    }

    /// Runs the periodic blacklist cleanup if `cleanup_interval` has elapsed
    /// since the last run, emitting `BlacklistExpired` for each removed
    /// entry.
    pub fn maybe_cleanup_blacklist(&mut self, now: i64) {
        if now - self.last_cleanup < self.cleanup_interval {
            return;
        }
        self.last_cleanup = now;

        for player_id in self.blacklist.remove_expired(now) {
            let version = self.next_version();
            self.pending_events.push(DomainEvent::BlacklistExpired {
                meta: EventMeta::new(self.rank_id.clone(), topics::BLACKLIST_EXPIRED, now, version),
                rank_id: self.rank_id.clone(),
                player_id,
            });
        }
        self.stats.blacklist_count = self.blacklist.len() as u64;
    }

    /// Clears the entry list and zeroes counters, preserving the time
    /// window.
    pub fn reset(&mut self, now: i64) {
        let previous_player_count = self.entries.len();
        self.entries.clear();
        self.total_players = 0;
        self.stats = StatisticsCache::default();
        self.stats.blacklist_count = self.blacklist.len() as u64;

        let version = self.next_version();
        self.pending_events.push(DomainEvent::RankingReset {
            meta: EventMeta::new(self.rank_id.clone(), topics::RANKING_RESET, now, version),
            rank_id: self.rank_id.clone(),
            previous_player_count,
        });
        debug!(rank_id = %self.rank_id, previous_player_count, "ranking reset");
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> RankingStatus {
        self.status
    }

    /// Transitions this ranking's status.
    pub const fn set_status(&mut self, status: RankingStatus) {
        self.status = status;
    }

    /// Current cached statistics.
    #[must_use]
    pub const fn statistics(&self) -> StatisticsCache {
        self.stats
    }

    /// Live entry slice, for on-demand statistics (`median`/`std_dev`/`min`)
    /// or trend sampling.
    #[must_use]
    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    /// Drains and returns all pending domain events.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Current monotone version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::{Ranking, RankingFilter};
    use crate::blacklist::BlacklistEntry;
    use crate::time_score::{SortType, TimeWindow};
    use std::collections::HashMap;

    fn window() -> TimeWindow {
        TimeWindow { start_time: 0, end_time: 0 }
    }

    #[test]
    fn update_score_sorts_descending_by_default() {
        let mut ranking = Ranking::new("r1", SortType::Descending, window());
        ranking.set_max_size(3);

        ranking.update_score("p1", 100.0, HashMap::new(), 0).unwrap();
        ranking.update_score("p2", 300.0, HashMap::new(), 1).unwrap();
        ranking.update_score("p3", 200.0, HashMap::new(), 2).unwrap();
        ranking.update_score("p4", 50.0, HashMap::new(), 3).unwrap();

        let top = ranking.get_ranking(0, 2, RankingFilter::default()).unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].player_id, "p2");
        assert_eq!(top[1].player_id, "p3");
        assert_eq!(top[2].player_id, "p1");
        assert!(ranking.entries().iter().all(|e| e.player_id != "p4"));
    }

    #[test]
    fn blacklisting_a_player_removes_them_from_the_ranking() {
        let mut ranking = Ranking::new("r1", SortType::Descending, window());
        ranking.set_max_size(3);
        for (player, score, t) in [("p1", 100.0, 0), ("p2", 300.0, 1), ("p3", 200.0, 2), ("p4", 50.0, 3)] {
            ranking.update_score(player, score, HashMap::new(), t).unwrap();
        }

        ranking.add_to_blacklist(BlacklistEntry::permanent("p2", "cheat", 10), 10);

        let page = ranking.get_ranking(0, 1, RankingFilter::default()).unwrap();
        assert_eq!(page[0].player_id, "p3");
        assert_eq!(page[1].player_id, "p1");

        let err = ranking.get_player_rank("p2").unwrap_err();
        assert!(matches!(err, crate::error::RankingError::PlayerBlacklisted));
    }

    #[test]
    fn temporary_blacklist_expiry_emits_event() {
        let mut ranking = Ranking::new("r1", SortType::Descending, window());
        ranking.add_to_blacklist(BlacklistEntry::temporary("p5", "cool-down", 0, 1), 0);

        ranking.maybe_cleanup_blacklist(0);
        assert!(ranking.blacklist.contains("p5"));

        // Force an immediate cleanup despite the 1-hour default interval by
        // constructing a ranking whose `last_cleanup` already elapsed.
        ranking.last_cleanup = -super::DEFAULT_CLEANUP_INTERVAL_SECS;
        ranking.maybe_cleanup_blacklist(2);

        let events = ranking.take_events();
        assert!(events.iter().any(|e| matches!(e, sim_eventbus::DomainEvent::BlacklistExpired { player_id, .. } if player_id == "p5")));
    }

    #[test]
    fn query_range_validation() {
        let ranking = Ranking::new("r1", SortType::Descending, window());
        assert!(matches!(
            ranking.get_ranking(-1, 0, RankingFilter::default()),
            Err(crate::error::RankingError::InvalidRange { .. })
        ));
        assert!(matches!(
            ranking.get_ranking(5, 2, RankingFilter::default()),
            Err(crate::error::RankingError::InvalidRange { .. })
        ));
        assert!(matches!(
            ranking.get_ranking(0, 1000, RankingFilter::default()),
            Err(crate::error::RankingError::InvalidRange { .. })
        ));
    }
}
