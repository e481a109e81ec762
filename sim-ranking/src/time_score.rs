//! The time-factored composite score.
//!
//! A named type wraps the packed bits so no caller manipulates them
//! directly, with constructors and accessors instead of raw shifts at call
//! sites.

use serde::{Deserialize, Serialize};

/// Sort direction for a ranking. `Descending`: higher real score ranks
/// first. `Ascending`: lower real score ranks first (e.g. a race-time
/// leaderboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    /// Higher `timeScore` ranks first.
    Descending,
    /// Lower `timeScore` ranks first.
    Ascending,
}

/// A ranking's active time window. `end_time == 0` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Unix-seconds the ranking started accepting updates.
    pub start_time: i64,
    /// Unix-seconds the ranking stops accepting updates, or 0 for none.
    pub end_time: i64,
}

impl TimeWindow {
    /// True if `now` falls within `[start_time, end_time]` (`end_time == 0`
    /// meaning unbounded).
    #[must_use]
    pub const fn contains(&self, now: i64) -> bool {
        now >= self.start_time && (self.end_time == 0 || now <= self.end_time)
    }
}

/// The packed `(score, timeFactor)` integer used to sort and break ties.
///
/// Opaque by design: construct with [`TimeScoreCodec::encode`], read back
/// with [`TimeScoreCodec::real_score`] / [`TimeScoreCodec::time_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeScore(pub i128);

/// Encodes/decodes [`TimeScore`] values for one ranking's `timeBitLen` /
/// `timeUnit` configuration.
#[derive(Debug, Clone, Copy)]
pub struct TimeScoreCodec {
    /// Number of low bits reserved for the time factor. Default 24.
    pub time_bit_len: u32,
    /// Seconds per unit of time factor. Default 60.
    pub time_unit: i64,
}

impl TimeScoreCodec {
    /// The mask selecting the low `time_bit_len` bits.
    fn mask(self) -> i128 {
        (1i128 << self.time_bit_len) - 1
    }

    /// Packs `score` (rounded to the nearest integer — leaderboard scores in
    /// this domain are always whole points/kills/damage) and a time factor
    /// derived from `now`, `sort`, and the ranking's `window` into one
    /// [`TimeScore`].
    #[must_use]
    pub fn encode(self, score: f64, now: i64, sort: SortType, window: TimeWindow) -> TimeScore {
        let time_factor = match sort {
            SortType::Descending => (now - window.start_time) / self.time_unit.max(1),
            SortType::Ascending => {
                // endTime == 0 (no upper bound) has no natural "end" to
                // count down to; treat `now` as the reference so the time
                // factor is always 0 rather than growing unbounded.
                let end = if window.end_time == 0 { now } else { window.end_time };
                (end - now) / self.time_unit.max(1)
            }
        };
        let clamped = i128::from(time_factor).clamp(0, self.mask());
        let score_int = i128::from(score.round() as i64);
        TimeScore((score_int << self.time_bit_len) | clamped)
    }

    /// Recovers the real score component.
    #[must_use]
    pub fn real_score(self, ts: TimeScore) -> f64 {
        (ts.0 >> self.time_bit_len) as f64
    }

    /// Recovers the raw time factor component (not a timestamp).
    #[must_use]
    pub fn time_factor(self, ts: TimeScore) -> i128 {
        ts.0 & self.mask()
    }

    /// Reconstructs an approximate timestamp the encoded entry was written
    /// at, accurate to within `time_unit` seconds.
    #[must_use]
    pub fn time_of(self, ts: TimeScore, sort: SortType, window: TimeWindow) -> i64 {
        let factor = self.time_factor(ts) as i64;
        match sort {
            SortType::Descending => window.start_time + factor * self.time_unit,
            SortType::Ascending => {
                let end = if window.end_time == 0 { 0 } else { window.end_time };
                end - factor * self.time_unit
            }
        }
    }
}

impl Default for TimeScoreCodec {
    fn default() -> Self {
        Self {
            time_bit_len: 24,
            time_unit: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SortType, TimeScoreCodec, TimeWindow};

    #[test]
    fn round_trip_recovers_score_and_approximate_time() {
        let codec = TimeScoreCodec::default();
        let window = TimeWindow { start_time: 0, end_time: 0 };
        let now = 3600;
        let ts = codec.encode(250.0, now, SortType::Descending, window);

        assert_eq!(codec.real_score(ts), 250.0);
        let recovered_time = codec.time_of(ts, SortType::Descending, window);
        assert!((recovered_time - now).abs() <= codec.time_unit);
    }

    #[test]
    fn higher_score_always_wins_regardless_of_time_factor() {
        let codec = TimeScoreCodec::default();
        let window = TimeWindow { start_time: 0, end_time: 0 };
        let low = codec.encode(100.0, 100_000, SortType::Descending, window);
        let high = codec.encode(101.0, 0, SortType::Descending, window);
        assert!(high > low);
    }

    #[test]
    fn ascending_sort_prefers_smaller_timescore_for_equal_score() {
        let codec = TimeScoreCodec::default();
        let window = TimeWindow { start_time: 0, end_time: 1_000_000 };
        let earlier = codec.encode(50.0, 0, SortType::Ascending, window);
        let later = codec.encode(50.0, 500_000, SortType::Ascending, window);
        // Both pack the same score bits; compare as raw integers for ordering.
        assert_ne!(earlier.0, later.0);
    }
}
