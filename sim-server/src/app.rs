//! Bootstraps the tick driver, task pool, event bus, scene service, and
//! ranking registry into one process.

use std::sync::Arc;

use sim_core::{SceneService, TaskPool, TickDriver};
use sim_eventbus::EventBus;
use sim_ranking::RankingRegistry;

use crate::broadcaster::LoggingBroadcaster;
use crate::config::SimConfig;
use crate::entity_factory::TemplateEntityFactory;
use crate::entity_source::EntitySource;
use crate::publisher::BusEventPublisher;
use crate::repository::{in_memory_ranking_repository, in_memory_scene_repository};

/// Everything an embedding binary needs to run the simulation core.
pub struct SimApp {
    /// Fixed-rate tick scheduler driving every loaded scene.
    pub tick_driver: Arc<TickDriver>,
    /// Bounded worker pool for deferred, non-realtime jobs.
    pub task_pool: Arc<TaskPool>,
    /// Process-local event fan-out (no remote bridge wired by default).
    pub event_bus: Arc<EventBus>,
    /// Orchestrator holding every loaded scene.
    pub scene_service: Arc<SceneService>,
    /// `rankId -> Ranking` registry, lazily hydrated.
    pub ranking_registry: Arc<RankingRegistry>,
    /// The single external command surface over scenes and rankings.
    pub entity_source: Arc<EntitySource>,
}

impl SimApp {
    /// Wires every component using in-memory reference repositories, a
    /// logging broadcaster, and a trivial entity factory — suitable for
    /// local running, demos, and integration tests. A production embedder
    /// swaps the repository/broadcaster/factory arguments for real ones.
    #[must_use]
    pub fn bootstrap(config: &SimConfig) -> Self {
        let tick_driver = Arc::new(TickDriver::new(config.tick_interval()));
        let task_pool = TaskPool::start(config.task_pool_workers, config.task_pool_queue_capacity);
        let event_bus = Arc::new(EventBus::new());

        let scene_service = Arc::new(SceneService::new(
            Arc::clone(&tick_driver),
            Arc::new(BusEventPublisher::new(Arc::clone(&event_bus))),
            Arc::new(LoggingBroadcaster),
            Arc::new(TemplateEntityFactory),
        ));

        let ranking_registry = Arc::new(RankingRegistry::new(in_memory_ranking_repository()));

        // The scene repository isn't consulted by this reference bootstrap
        // (scenes are created in-process, not rehydrated), but is built so
        // a future `SceneService::restore` has something to call.
        let _scene_repository = in_memory_scene_repository();

        let entity_source = Arc::new(EntitySource::new(Arc::clone(&scene_service), Arc::clone(&ranking_registry)));

        Self {
            tick_driver,
            task_pool,
            event_bus,
            scene_service,
            ranking_registry,
            entity_source,
        }
    }

    /// Starts the tick driver. The task pool and event bus need no explicit
    /// start: they are ready the moment they're constructed.
    pub fn start(&self) {
        self.tick_driver.start();
    }

    /// Stops the tick driver, drains the task pool, and disconnects the
    /// event bus's remote bridge if one is configured.
    pub async fn shutdown(&self) {
        self.tick_driver.stop().await;
        self.task_pool.stop().await;
        self.event_bus.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::SimApp;
    use crate::config::SimConfig;
    use sim_core::scene::{Scene, SceneType};
    use sim_utils::SceneId;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn bootstrap_loads_and_ticks_a_scene() {
        let app = SimApp::bootstrap(&SimConfig { tick_interval_ms: 10, ..SimConfig::default() });
        let scene = Scene::new(SceneId::from("s1"), "Test", SceneType::City, 1000.0, 1000.0, 10);
        app.scene_service.load(scene);

        app.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        app.shutdown().await;

        assert_eq!(app.scene_service.list(), vec![SceneId::from("s1")]);
    }
}
