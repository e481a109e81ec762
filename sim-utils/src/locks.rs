//! Lock type aliases.
//!
//! Every aggregate in this workspace (scene, ranking, AOI index) is guarded
//! by exactly one of these. Named aliases beat scattering
//! `parking_lot::RwLock` throughout call sites.

/// A reader/writer lock. Used where reads (AOI queries, ranking reads)
/// vastly outnumber writes.
pub type SyncRwLock<T> = parking_lot::RwLock<T>;

/// A plain mutual-exclusion lock. Used where there is no meaningful
/// read/write split (the scene's event queue, the tick driver's
/// registration table).
pub type SyncMutex<T> = parking_lot::Mutex<T>;
