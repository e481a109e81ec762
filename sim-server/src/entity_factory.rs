//! A trivial reference [`EntityFactory`] for demos and tests.
//!
//! The spawn-point template-to-entity mapping is an external collaborator;
//! this implementation always builds a level-1 monster at full health,
//! ignoring `template_id` beyond carrying it onto the entity's label.

use sim_core::entity::{AiBehavior, Entity, Monster, SpawnKind};
use sim_core::interfaces::EntityFactory;
use sim_utils::{EntityId, Vector3};

/// Builds every spawned entity as a basic level-1 monster.
#[derive(Default)]
pub struct TemplateEntityFactory;

impl EntityFactory for TemplateEntityFactory {
    fn create(&self, kind: SpawnKind, _template_id: &str, id: EntityId, position: Vector3) -> Entity {
        match kind {
            SpawnKind::Monster => {
                let mut monster = Monster::new(id, position, 1, 100, None);
                monster.behavior = AiBehavior::Idle;
                Entity::Monster(monster)
            }
        }
    }
}
