//! The Area-of-Interest grid index.
//!
//! A uniform grid keyed by `(gx, gy)`. Queries answer "which observers must
//! see this event?" in `O(k)` where `k` is the number of entities in the
//! scanned bucket square, not the total entity count.

use rustc_hash::FxHashMap;
use sim_utils::{EntityId, SyncRwLock, Vector3};

/// Default cell size, in world units.
pub const DEFAULT_CELL_SIZE: f64 = 100.0;

/// A cell coordinate, `floor(pos / cellSize)`.
pub type CellCoord = (i64, i64);

/// One entity tracked by the AOI index: its id, current position, and the
/// cell it currently belongs to.
#[derive(Debug, Clone)]
pub struct AoiEntity {
    /// The entity's id.
    pub id: EntityId,
    /// The entity's current position.
    pub position: Vector3,
    /// The cell this entity's `position` currently maps to. Invariant:
    /// always equal to `floor(position / cell_size)`.
    pub cell: CellCoord,
}

struct AoiState {
    cell_size: f64,
    buckets: FxHashMap<CellCoord, FxHashMap<EntityId, AoiEntity>>,
    entity_cells: FxHashMap<EntityId, CellCoord>,
}

impl AoiState {
    fn cell_of(&self, position: Vector3) -> CellCoord {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.y / self.cell_size).floor() as i64,
        )
    }
}

/// Grid-bucket Area-of-Interest index for one scene.
///
/// A single reader/writer lock guards the whole index:
/// the only writer is the owning scene's tick step and command handlers,
/// already serialized by the scene's own lock, so the read lock here exists
/// only to let broadcast fan-out read concurrently with itself.
pub struct AoiIndex {
    state: SyncRwLock<AoiState>,
}

impl AoiIndex {
    /// Creates an empty index with the given cell size.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        Self {
            state: SyncRwLock::new(AoiState {
                cell_size,
                buckets: FxHashMap::default(),
                entity_cells: FxHashMap::default(),
            }),
        }
    }

    /// Inserts an entity at `position`, computing its cell.
    pub fn add(&self, id: EntityId, position: Vector3) {
        let mut state = self.state.write();
        let cell = state.cell_of(position);
        state.buckets.entry(cell).or_default().insert(
            id.clone(),
            AoiEntity { id: id.clone(), position, cell },
        );
        state.entity_cells.insert(id, cell);
    }

    /// Removes an entity entirely, dropping its bucket if it was the last
    /// occupant.
    pub fn remove(&self, id: &EntityId) {
        let mut state = self.state.write();
        let Some(cell) = state.entity_cells.remove(id) else {
            return;
        };
        if let Some(bucket) = state.buckets.get_mut(&cell) {
            bucket.remove(id);
            if bucket.is_empty() {
                state.buckets.remove(&cell);
            }
        }
    }

    /// Moves an entity to `new_position`. Fast path: if the new cell equals
    /// the old one, only the stored position is mutated in place — no
    /// bucket membership changes.
    pub fn update(&self, id: &EntityId, new_position: Vector3) {
        let mut state = self.state.write();
        let Some(&old_cell) = state.entity_cells.get(id) else {
            return;
        };
        let new_cell = state.cell_of(new_position);

        if new_cell == old_cell {
            if let Some(bucket) = state.buckets.get_mut(&old_cell)
                && let Some(entity) = bucket.get_mut(id)
            {
                entity.position = new_position;
            }
            return;
        }

        if let Some(bucket) = state.buckets.get_mut(&old_cell) {
            bucket.remove(id);
            if bucket.is_empty() {
                state.buckets.remove(&old_cell);
            }
        }
        state.buckets.entry(new_cell).or_default().insert(
            id.clone(),
            AoiEntity { id: id.clone(), position: new_position, cell: new_cell },
        );
        state.entity_cells.insert(id.clone(), new_cell);
    }

    /// Returns every tracked entity within `radius` of `center`, exact
    /// Euclidean distance applied after a bucket-square over-scan.
    #[must_use]
    pub fn query(&self, center: Vector3, radius: f64) -> Vec<AoiEntity> {
        let state = self.state.read();
        let cell_radius = (radius / state.cell_size).ceil() as i64;
        let center_cell = state.cell_of(center);

        let mut result = Vec::new();
        for dx in -cell_radius..=cell_radius {
            for dy in -cell_radius..=cell_radius {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                let Some(bucket) = state.buckets.get(&cell) else {
                    continue;
                };
                for entity in bucket.values() {
                    if entity.position.distance(center) <= radius {
                        result.push(entity.clone());
                    }
                }
            }
        }
        result
    }

    /// Number of entities currently tracked, for diagnostics/tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entity_cells.len()
    }

    /// True if no entities are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{AoiIndex, DEFAULT_CELL_SIZE};
    use sim_utils::{EntityId, Vector3};

    #[test]
    fn query_returns_entities_within_radius_only() {
        let index = AoiIndex::new(DEFAULT_CELL_SIZE);
        index.add(EntityId::from("e1"), Vector3::new(50.0, 50.0, 0.0));
        index.add(EntityId::from("e2"), Vector3::new(150.0, 150.0, 0.0));
        index.add(EntityId::from("e3"), Vector3::new(900.0, 900.0, 0.0));

        let nearby = index.query(Vector3::new(100.0, 100.0, 0.0), 150.0);
        let ids: Vec<String> = nearby.iter().map(|e| e.id.0.clone()).collect();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"e1".to_string()));
        assert!(ids.contains(&"e2".to_string()));
        assert!(!ids.contains(&"e3".to_string()));
    }

    #[test]
    fn fast_path_does_not_move_bucket() {
        let index = AoiIndex::new(DEFAULT_CELL_SIZE);
        let id = EntityId::from("e1");
        index.add(id.clone(), Vector3::new(10.0, 10.0, 0.0));

        index.update(&id, Vector3::new(20.0, 20.0, 0.0));

        let state = index.state.read();
        assert_eq!(state.buckets.len(), 1);
        assert_eq!(state.entity_cells[&id], (0, 0));
    }

    #[test]
    fn update_across_cell_boundary_moves_buckets() {
        let index = AoiIndex::new(DEFAULT_CELL_SIZE);
        let id = EntityId::from("e1");
        index.add(id.clone(), Vector3::new(10.0, 10.0, 0.0));

        index.update(&id, Vector3::new(150.0, 10.0, 0.0));

        let state = index.state.read();
        assert_eq!(state.buckets.len(), 1);
        assert_eq!(state.entity_cells[&id], (1, 0));
    }

    #[test]
    fn remove_drops_empty_bucket() {
        let index = AoiIndex::new(DEFAULT_CELL_SIZE);
        let id = EntityId::from("e1");
        index.add(id.clone(), Vector3::new(10.0, 10.0, 0.0));
        index.remove(&id);

        assert!(index.is_empty());
        assert!(index.state.read().buckets.is_empty());
    }
}
