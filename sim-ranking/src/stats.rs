//! Cached aggregate statistics and the trend module.

use std::collections::VecDeque;

use crate::entry::RankEntry;

/// Aggregates maintained incrementally on every `UpdateScore`/`Reset`, cheap
/// to read without walking the whole entry list.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsCache {
    /// Total distinct players ever admitted (including ones later dropped by
    /// overflow, but not ones removed by blacklisting).
    pub total_players: u64,
    /// Entries currently present in the sorted list.
    pub active_entries: u64,
    /// Mean real score over the current list.
    pub average_score: f64,
    /// Real score of the head entry (best rank).
    pub top_score: f64,
    /// Number of players currently blacklisted.
    pub blacklist_count: u64,
}

impl StatisticsCache {
    /// Recomputes `active_entries`, `average_score`, and `top_score` from
    /// the current entry list. `total_players` and `blacklist_count` are
    /// maintained by the caller incrementally since they track history, not
    /// just current membership.
    pub fn recompute_from_entries(&mut self, entries: &[RankEntry]) {
        self.active_entries = entries.len() as u64;
        self.top_score = entries.first().map_or(0.0, |e| e.score);
        self.average_score = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64
        };
    }
}

/// Statistics computed on demand rather than cached, since they require a
/// full pass (or sort) over the current entries.
#[derive(Debug, Clone, Copy)]
pub struct OnDemandStatistics {
    /// Median real score.
    pub median: f64,
    /// Population standard deviation of real scores.
    pub std_dev: f64,
    /// Minimum real score.
    pub min: f64,
}

/// Computes median/std-dev/min over the current entries. `O(n log n)` from
/// the sort needed for the median; callers on a hot path should prefer the
/// cached [`StatisticsCache`] instead.
#[must_use]
pub fn compute_on_demand(entries: &[RankEntry]) -> OnDemandStatistics {
    if entries.is_empty() {
        return OnDemandStatistics { median: 0.0, std_dev: 0.0, min: 0.0 };
    }

    let mut scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
    scores.sort_by(|a, b| a.partial_cmp(b).expect("scores are always finite"));

    let mid = scores.len() / 2;
    let median = if scores.len() % 2 == 0 {
        (scores[mid - 1] + scores[mid]) / 2.0
    } else {
        scores[mid]
    };

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;

    OnDemandStatistics {
        median,
        std_dev: variance.sqrt(),
        min: scores[0],
    }
}

/// One periodic snapshot fed into [`TrendTracker`].
#[derive(Debug, Clone, Copy)]
pub struct TrendSample {
    /// Unix-seconds this sample was taken.
    pub at: i64,
    /// `average_score` at the time of the snapshot.
    pub average_score: f64,
}

/// Output of [`TrendTracker::predict`]: growth rate, volatility, and a
/// short-horizon prediction with a fixed confidence.
#[derive(Debug, Clone, Copy)]
pub struct TrendPrediction {
    /// Average-score change per second, from a linear fit over the window.
    pub growth_rate: f64,
    /// Standard deviation of `average_score` over the window.
    pub volatility: f64,
    /// Linear extrapolation of `average_score` at `horizon_secs` past the
    /// last sample.
    pub predicted_average_score: f64,
    /// Fixed confidence assigned to short-horizon linear predictions.
    pub confidence: f64,
}

const PREDICTION_CONFIDENCE: f64 = 0.7;

/// Bounded history of periodic [`TrendSample`]s, fed from the async task
/// pool — has no realtime responsibilities and may be invoked off the tick
/// loop.
#[derive(Debug)]
pub struct TrendTracker {
    samples: VecDeque<TrendSample>,
    capacity: usize,
}

impl TrendTracker {
    /// Creates a tracker retaining up to `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest once over capacity.
    pub fn record(&mut self, sample: TrendSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Linear growth rate, volatility, and a `horizon_secs`-ahead prediction
    /// from the retained samples. `None` if fewer than two samples exist.
    #[must_use]
    pub fn predict(&self, horizon_secs: i64) -> Option<TrendPrediction> {
        if self.samples.len() < 2 {
            return None;
        }

        let n = self.samples.len() as f64;
        let t0 = self.samples.front().unwrap().at;
        let xs: Vec<f64> = self.samples.iter().map(|s| (s.at - t0) as f64).collect();
        let ys: Vec<f64> = self.samples.iter().map(|s| s.average_score).collect();

        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            cov += (x - mean_x) * (y - mean_y);
            var_x += (x - mean_x).powi(2);
        }
        let growth_rate = if var_x == 0.0 { 0.0 } else { cov / var_x };
        let intercept = mean_y - growth_rate * mean_x;

        let variance_y = ys.iter().map(|y| (y - mean_y).powi(2)).sum::<f64>() / n;
        let volatility = variance_y.sqrt();

        let last = self.samples.back().unwrap();
        let horizon_x = (last.at - t0 + horizon_secs) as f64;
        let predicted_average_score = intercept + growth_rate * horizon_x;

        Some(TrendPrediction {
            growth_rate,
            volatility,
            predicted_average_score,
            confidence: PREDICTION_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{TrendSample, TrendTracker, compute_on_demand};
    use crate::entry::RankEntry;
    use crate::time_score::TimeScore;
    use std::collections::HashMap;

    fn entry(score: f64) -> RankEntry {
        RankEntry::new("p", score, TimeScore(0), 0, HashMap::new())
    }

    #[test]
    fn median_and_min_on_odd_count() {
        let entries = vec![entry(10.0), entry(30.0), entry(20.0)];
        let stats = compute_on_demand(&entries);
        assert_eq!(stats.median, 20.0);
        assert_eq!(stats.min, 10.0);
    }

    #[test]
    fn trend_needs_at_least_two_samples() {
        let mut tracker = TrendTracker::new(10);
        assert!(tracker.predict(60).is_none());
        tracker.record(TrendSample { at: 0, average_score: 10.0 });
        assert!(tracker.predict(60).is_none());
    }

    #[test]
    fn trend_detects_linear_growth() {
        let mut tracker = TrendTracker::new(10);
        for i in 0..5 {
            tracker.record(TrendSample { at: i * 60, average_score: (i * 10) as f64 });
        }
        let prediction = tracker.predict(60).unwrap();
        assert!((prediction.growth_rate - (10.0 / 60.0)).abs() < 1e-6);
        assert!((prediction.confidence - 0.7).abs() < 1e-9);
    }
}
