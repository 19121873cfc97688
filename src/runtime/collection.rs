//! Concurrency-safe keyed registry of runtime entities.
//!
//! # Responsibilities
//! - Map ids to shared (`Arc`) runtime entities
//! - Create entities on first sight and hand them to a setup callback
//! - Produce point-in-time snapshots for iteration
//!
//! # Design Decisions
//! - Backed by `DashMap`; setup callbacks run after the shard guard is
//!   released, so a callback may touch other collections freely
//! - Snapshots are copies sorted by id (ordinal), so iteration order is stable
//! - Removal only makes an entity unreachable by id; readers holding the `Arc`
//!   keep observing its last config

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

/// An id-keyed runtime entity that can be created empty.
pub trait ManagedEntity: Send + Sync + 'static {
    /// Create a fresh entity with an empty config slot.
    fn create(id: &str) -> Self;

    fn id(&self) -> &str;
}

/// Keyed registry of runtime entities.
pub struct ManagedCollection<T> {
    items: DashMap<String, Arc<T>>,
}

impl<T: ManagedEntity> ManagedCollection<T> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Return the entity for `id`, creating it if absent, after running `setup` on it.
    pub fn get_or_create<F>(&self, id: &str, setup: F) -> Arc<T>
    where
        F: FnOnce(&T),
    {
        let existing = self.items.get(id).map(|entry| Arc::clone(entry.value()));
        let item = match existing {
            Some(item) => item,
            None => Arc::clone(
                self.items
                    .entry(id.to_string())
                    .or_insert_with(|| Arc::new(T::create(id)))
                    .value(),
            ),
        };

        setup(&item);
        item
    }

    pub fn try_get(&self, id: &str) -> Option<Arc<T>> {
        self.items.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove `id`. Returns false if it was not registered.
    pub fn try_remove(&self, id: &str) -> bool {
        self.remove(id).is_some()
    }

    /// Remove `id`, returning the entity that was registered.
    pub fn remove(&self, id: &str) -> Option<Arc<T>> {
        self.items.remove(id).map(|(_, item)| item)
    }

    /// Snapshot of all registered entities, ordered by id.
    pub fn items(&self) -> Vec<Arc<T>> {
        let mut items: Vec<Arc<T>> = self
            .items
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: ManagedEntity> Default for ManagedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ManagedEntity> fmt::Debug for ManagedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items();
        f.debug_set().entries(items.iter().map(|item| item.id())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::slot::ConfigSlot;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Item {
        id: String,
        config: ConfigSlot<String>,
    }

    impl ManagedEntity for Item {
        fn create(id: &str) -> Self {
            Self {
                id: id.to_string(),
                config: ConfigSlot::empty(),
            }
        }

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn test_get_or_create_runs_setup_every_time() {
        let collection: ManagedCollection<Item> = ManagedCollection::new();
        let calls = AtomicUsize::new(0);

        let first = collection.get_or_create("a", |item| {
            assert!(item.config.is_empty());
            item.config.store(Arc::new("v1".into()));
            calls.fetch_add(1, Ordering::Relaxed);
        });
        let second = collection.get_or_create("a", |item| {
            assert_eq!(item.config.load().unwrap().as_str(), "v1");
            calls.fetch_add(1, Ordering::Relaxed);
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_try_get_and_remove() {
        let collection: ManagedCollection<Item> = ManagedCollection::new();
        assert!(collection.try_get("missing").is_none());
        assert!(!collection.try_remove("missing"));

        collection.get_or_create("a", |_| {});
        assert!(collection.try_get("a").is_some());
        assert!(collection.try_remove("a"));
        assert!(collection.try_get("a").is_none());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        let collection: ManagedCollection<Item> = ManagedCollection::new();
        collection.get_or_create("Api", |_| {});
        assert!(collection.try_get("api").is_none());
        assert!(collection.contains("Api"));
    }

    #[test]
    fn test_snapshot_is_stable() {
        let collection: ManagedCollection<Item> = ManagedCollection::new();
        collection.get_or_create("b", |_| {});
        collection.get_or_create("a", |_| {});

        let snapshot = collection.items();
        collection.try_remove("a");
        collection.get_or_create("c", |_| {});

        let ids: Vec<_> = snapshot.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let ids: Vec<_> = collection.items().iter().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_removed_entity_stays_readable() {
        let collection: ManagedCollection<Item> = ManagedCollection::new();
        let held = collection.get_or_create("a", |item| item.config.store(Arc::new("last".into())));

        let removed = collection.remove("a").unwrap();
        assert!(Arc::ptr_eq(&held, &removed));
        assert_eq!(held.config.load().unwrap().as_str(), "last");

        // A recreated id is a fresh entity with an empty config.
        let fresh = collection.get_or_create("a", |_| {});
        assert!(!Arc::ptr_eq(&held, &fresh));
        assert!(fresh.config.is_empty());
    }
}
