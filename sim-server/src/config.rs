//! Process configuration, loaded once at startup.
//!
//! A single process-wide default reachable without threading a config value
//! through every call site, for embedders that don't build their own
//! [`SimConfig`].

use std::sync::LazyLock;
use std::time::Duration;

use serde::Deserialize;

/// Tick driver, task pool, AOI, and ranking defaults for one process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Async task pool worker count.
    pub task_pool_workers: usize,
    /// Async task pool bounded queue capacity.
    pub task_pool_queue_capacity: usize,
    /// Default AOI cell size in world-units.
    pub aoi_cell_size: f64,
    /// Default ranking `maxSize`.
    pub ranking_max_size: usize,
    /// Default ranking blacklist cleanup cadence, seconds.
    pub ranking_cleanup_interval_secs: i64,
    /// Reconnect interval for the optional remote bridge, seconds.
    pub bridge_reconnect_interval_secs: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            task_pool_workers: sim_core::task_pool::DEFAULT_WORKER_COUNT,
            task_pool_queue_capacity: sim_core::task_pool::DEFAULT_QUEUE_CAPACITY,
            aoi_cell_size: sim_core::aoi::DEFAULT_CELL_SIZE,
            ranking_max_size: sim_ranking::ranking::DEFAULT_MAX_SIZE,
            ranking_cleanup_interval_secs: sim_ranking::ranking::DEFAULT_CLEANUP_INTERVAL_SECS,
            bridge_reconnect_interval_secs: 2,
        }
    }
}

impl SimConfig {
    /// Parses a JSON5 document into a config, falling back to defaults for
    /// any field the document omits.
    pub fn from_json5(source: &str) -> Result<Self, serde_json5::Error> {
        serde_json5::from_str(source)
    }

    /// This config's tick interval as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Process-wide default, used by embedders that never call
/// [`SimConfig::from_json5`] themselves.
pub static SIM_CONFIG: LazyLock<SimConfig> = LazyLock::new(SimConfig::default);

#[cfg(test)]
mod tests {
    use super::SimConfig;

    #[test]
    fn partial_json5_fills_remaining_fields_from_default() {
        let config = SimConfig::from_json5("{ tick_interval_ms: 100 }").unwrap();
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.task_pool_workers, sim_core::task_pool::DEFAULT_WORKER_COUNT);
    }
}
