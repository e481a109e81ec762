//! Ranking blacklist.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One blacklisted player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// The blacklisted player's id.
    pub player_id: String,
    /// Operator-supplied reason.
    pub reason: String,
    /// Unix-seconds the entry was added.
    pub added_at: i64,
    /// Unix-seconds this entry stops applying, if temporary.
    pub expires_at: Option<i64>,
    /// True if this entry never expires.
    pub is_permanent: bool,
}

impl BlacklistEntry {
    /// A permanent blacklist entry.
    #[must_use]
    pub fn permanent(player_id: impl Into<String>, reason: impl Into<String>, now: i64) -> Self {
        Self {
            player_id: player_id.into(),
            reason: reason.into(),
            added_at: now,
            expires_at: None,
            is_permanent: true,
        }
    }

    /// A temporary blacklist entry expiring `duration_secs` after `now`.
    #[must_use]
    pub fn temporary(player_id: impl Into<String>, reason: impl Into<String>, now: i64, duration_secs: i64) -> Self {
        Self {
            player_id: player_id.into(),
            reason: reason.into(),
            added_at: now,
            expires_at: Some(now + duration_secs),
            is_permanent: false,
        }
    }

    /// True once `now` has passed `expires_at` for a temporary entry.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        !self.is_permanent && self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// The set of blacklisted players for one ranking.
#[derive(Debug, Default)]
pub struct Blacklist {
    entries: FxHashMap<String, BlacklistEntry>,
}

impl Blacklist {
    /// Creates an empty blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a blacklist entry.
    pub fn insert(&mut self, entry: BlacklistEntry) {
        self.entries.insert(entry.player_id.clone(), entry);
    }

    /// True if `player_id` is currently blacklisted.
    #[must_use]
    pub fn contains(&self, player_id: &str) -> bool {
        self.entries.contains_key(player_id)
    }

    /// Number of blacklisted players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no players are blacklisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry whose `expires_at` has passed, returning the
    /// removed player ids so the caller can emit `BlacklistExpired` events.
    pub fn remove_expired(&mut self, now: i64) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.player_id.clone())
            .collect();
        for id in &expired {
            self.entries.remove(id);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::{Blacklist, BlacklistEntry};

    #[test]
    fn temporary_entry_expires_after_duration() {
        let mut bl = Blacklist::new();
        bl.insert(BlacklistEntry::temporary("p5", "afk farming", 0, 1));

        assert!(bl.contains("p5"));
        let expired = bl.remove_expired(0);
        assert!(expired.is_empty());

        let expired = bl.remove_expired(2);
        assert_eq!(expired, vec!["p5".to_string()]);
        assert!(!bl.contains("p5"));
    }

    #[test]
    fn permanent_entry_never_expires() {
        let mut bl = Blacklist::new();
        bl.insert(BlacklistEntry::permanent("p2", "cheat", 0));
        assert!(bl.remove_expired(i64::MAX).is_empty());
    }
}
