//! The scene service: thin orchestrator holding the loaded scenes,
//! registering each with the tick driver, and draining its events onto the
//! event bus after every mutation.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use sim_utils::{SceneId, SyncMutex, SyncRwLock};
use tracing::warn;

use crate::interfaces::{Broadcaster, EntityFactory, EventPublisher};
use crate::scene::Scene;
use crate::tick::{TickDriver, Updatable};

/// Registration id a scene is given when it registers with the tick driver.
fn tick_id(scene_id: &SceneId) -> String {
    format!("scene:{}", scene_id.0)
}

/// Adapts a shared, lockable [`Scene`] to the tick driver's [`Updatable`]
/// contract, then drains and publishes its events once `update` returns.
struct ScenePulse {
    scene: Arc<SyncMutex<Scene>>,
    publisher: Arc<dyn EventPublisher>,
}

impl Updatable for ScenePulse {
    fn update(&self, dt: f64, now: i64) {
        let events = {
            let mut scene = self.scene.lock();
            scene.update(dt, now);
            let events = scene.events().to_vec();
            scene.clear_events();
            events
        };

        for event in events {
            let publisher = Arc::clone(&self.publisher);
            tokio::spawn(async move {
                if let Err(err) = publisher.publish(&event).await {
                    warn!(error = %err, "scene event publish failed; logged only");
                }
            });
        }
    }
}

/// Holds every loaded scene, registering/unregistering it with the tick
/// driver as scenes are created and closed.
pub struct SceneService {
    tick_driver: Arc<TickDriver>,
    publisher: Arc<dyn EventPublisher>,
    broadcaster: Arc<dyn Broadcaster>,
    entity_factory: Arc<dyn EntityFactory>,
    scenes: SyncRwLock<FxHashMap<SceneId, Arc<SyncMutex<Scene>>>>,
}

impl SceneService {
    /// Creates a service bound to the given tick driver and external
    /// collaborators, injected into every scene it loads.
    #[must_use]
    pub fn new(
        tick_driver: Arc<TickDriver>,
        publisher: Arc<dyn EventPublisher>,
        broadcaster: Arc<dyn Broadcaster>,
        entity_factory: Arc<dyn EntityFactory>,
    ) -> Self {
        Self {
            tick_driver,
            publisher,
            broadcaster,
            entity_factory,
            scenes: SyncRwLock::new(FxHashMap::default()),
        }
    }

    /// Loads `scene` into the service, injects the broadcaster/entity
    /// factory, and registers it with the tick driver.
    pub fn load(&self, mut scene: Scene) -> Arc<SyncMutex<Scene>> {
        scene.set_broadcaster(Arc::clone(&self.broadcaster));
        scene.set_entity_factory(Arc::clone(&self.entity_factory));
        let id = scene.id.clone();
        let handle = Arc::new(SyncMutex::new(scene));

        self.tick_driver.register(
            tick_id(&id),
            Arc::new(ScenePulse {
                scene: Arc::clone(&handle),
                publisher: Arc::clone(&self.publisher),
            }),
        );
        self.scenes.write().insert(id, Arc::clone(&handle));
        handle
    }

    /// Unregisters a scene from the tick driver and drops it from the
    /// service's map.
    pub fn unload(&self, id: &SceneId) {
        self.tick_driver.unregister(&tick_id(id));
        self.scenes.write().remove(id);
    }

    /// Looks up a loaded scene's shared handle.
    #[must_use]
    pub fn get(&self, id: &SceneId) -> Option<Arc<SyncMutex<Scene>>> {
        self.scenes.read().get(id).cloned()
    }

    /// Every currently loaded scene id.
    #[must_use]
    pub fn list(&self) -> Vec<SceneId> {
        self.scenes.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::SceneService;
    use crate::entity::{Entity, SpawnKind};
    use crate::interfaces::{Broadcaster, EntityFactory};
    use crate::scene::{Scene, SceneType};
    use crate::tick::TickDriver;
    use async_trait::async_trait;
    use sim_eventbus::{DomainEvent, PublishError};
    use sim_utils::{EntityId, SceneId, Vector3};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoopBroadcaster;
    impl Broadcaster for NoopBroadcaster {
        fn broadcast(&self, _recipients: &[EntityId], _topic: &str, _payload: &[u8]) {}
    }

    struct NoopFactory;
    impl EntityFactory for NoopFactory {
        fn create(&self, _kind: SpawnKind, _template_id: &str, id: EntityId, position: Vector3) -> Entity {
            Entity::Npc(crate::entity::Npc::new(id, position, "placeholder"))
        }
    }

    struct CountingPublisher(Arc<AtomicUsize>);
    #[async_trait]
    impl crate::interfaces::EventPublisher for CountingPublisher {
        async fn publish(&self, _event: &DomainEvent) -> Result<(), PublishError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn loaded_scene_ticks_and_publishes_events() {
        let driver = Arc::new(TickDriver::new(Duration::from_millis(10)));
        let published = Arc::new(AtomicUsize::new(0));
        let service = SceneService::new(
            Arc::clone(&driver),
            Arc::new(CountingPublisher(published.clone())),
            Arc::new(NoopBroadcaster),
            Arc::new(NoopFactory),
        );

        let scene = Scene::new(SceneId::from("s1"), "Test", SceneType::City, 1000.0, 1000.0, 10);
        let handle = service.load(scene);
        handle
            .lock()
            .add_player(
                EntityId::from("p1"),
                Entity::Npc(crate::entity::Npc::new(EntityId::from("p1"), Vector3::ZERO, "x")),
                0,
            )
            .unwrap();

        driver.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        driver.stop().await;

        assert!(published.load(Ordering::SeqCst) >= 1);
        assert_eq!(service.list(), vec![SceneId::from("s1")]);
    }
}
