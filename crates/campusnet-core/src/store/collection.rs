// ── Generic entity collection ──
//
// Concurrent storage with O(1) lookups by record id, an optional unique
// secondary key, and a cached snapshot rebuilt on every mutation.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

use crate::model::EntityId;

/// A concurrent collection for a single record type.
///
/// Uses `DashMap` for per-shard locking and a `watch` channel to hold the
/// full snapshot, so readers get a cheap `Arc` clone instead of iterating
/// the map. Every mutation bumps a version counter.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: record id -> entity.
    by_id: DashMap<EntityId, Arc<T>>,

    /// Unique secondary index (e.g. a device's `deviceId`) -> record id.
    key_to_id: DashMap<String, EntityId>,

    /// Reverse of `key_to_id` for efficient removal.
    id_to_key: DashMap<EntityId, String>,

    version: watch::Sender<u64>,

    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            key_to_id: DashMap::new(),
            id_to_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert a new entity. When `key` is given it must not already be
    /// claimed by another record; on conflict the id holding the key is
    /// returned and nothing is stored.
    pub(crate) fn insert(&self, id: EntityId, key: Option<String>, entity: T) -> Result<(), EntityId> {
        if let Some(key) = key {
            match self.key_to_id.entry(key.clone()) {
                Entry::Occupied(existing) if *existing.get() != id => return Err(*existing.get()),
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.id_to_key.insert(id, key);
        }

        self.by_id.insert(id, Arc::new(entity));
        self.rebuild_snapshot();
        self.bump_version();
        Ok(())
    }

    /// Apply `mutate` to a copy of the stored entity and swap it in.
    /// Returns the updated entity, or `None` if the id is unknown.
    pub(crate) fn update(&self, id: &EntityId, mutate: impl FnOnce(&mut T)) -> Option<Arc<T>> {
        let updated = {
            let mut slot = self.by_id.get_mut(id)?;
            let mut entity = (**slot).clone();
            mutate(&mut entity);
            let entity = Arc::new(entity);
            *slot = Arc::clone(&entity);
            entity
        };
        self.rebuild_snapshot();
        self.bump_version();
        Some(updated)
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            if let Some((_, key)) = self.id_to_key.remove(id) {
                self.key_to_id.remove(&key);
            }
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Resolve a secondary key to its record id.
    pub(crate) fn id_for_key(&self, key: &str) -> Option<EntityId> {
        self.key_to_id.get(key).map(|r| *r.value())
    }

    /// Get the current snapshot (cheap `Arc` clone). Order is unspecified.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Number of mutations applied since creation.
    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let col: EntityCollection<String> = EntityCollection::new();
        let id = EntityId::new();
        col.insert(id, None, "hello".into()).unwrap();
        assert_eq!(*col.get(&id).unwrap(), "hello");
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let col: EntityCollection<String> = EntityCollection::new();
        let first = EntityId::new();
        col.insert(first, Some("AP-1".into()), "a".into()).unwrap();

        let err = col.insert(EntityId::new(), Some("AP-1".into()), "b".into());
        assert_eq!(err, Err(first));
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn remove_frees_secondary_key() {
        let col: EntityCollection<String> = EntityCollection::new();
        let id = EntityId::new();
        col.insert(id, Some("AP-1".into()), "a".into()).unwrap();

        assert_eq!(*col.remove(&id).unwrap(), "a");
        assert!(col.id_for_key("AP-1").is_none());
        assert!(col.get(&id).is_none());
        assert!(col.insert(EntityId::new(), Some("AP-1".into()), "b".into()).is_ok());
    }

    #[test]
    fn update_replaces_entity_and_snapshot() {
        let col: EntityCollection<u32> = EntityCollection::new();
        let id = EntityId::new();
        col.insert(id, None, 1).unwrap();

        let updated = col.update(&id, |v| *v += 41).unwrap();
        assert_eq!(*updated, 42);
        assert_eq!(*col.snapshot()[0], 42);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let col: EntityCollection<u32> = EntityCollection::new();
        assert!(col.update(&EntityId::new(), |v| *v += 1).is_none());
    }

    #[test]
    fn every_mutation_bumps_version() {
        let col: EntityCollection<u32> = EntityCollection::new();
        let id = EntityId::new();
        col.insert(id, None, 1).unwrap();
        col.update(&id, |v| *v = 2);
        col.remove(&id);
        assert_eq!(col.version(), 3);
    }
}
