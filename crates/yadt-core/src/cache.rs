use std::collections::HashMap;

use crate::model::{ResourceIdentity, Snapshot};

/// Last observed snapshot per resource identity
///
/// Plain `HashMap` storage with no locking: the diff engine owns the cache
/// and is its only reader and writer. Entries are replaced wholesale and
/// are never evicted except through [`SnapshotCache::remove`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    entries: HashMap<ResourceIdentity, Snapshot>,
}

impl SnapshotCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Last snapshot seen for an identity
    pub fn get(&self, identity: &ResourceIdentity) -> Option<&Snapshot> {
        self.entries.get(identity)
    }

    /// Store a snapshot under its own identity, replacing any previous
    /// entry, and return the replaced one.
    pub fn put(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        self.entries.insert(snapshot.identity().clone(), snapshot)
    }

    /// Evict an identity
    pub fn remove(&mut self, identity: &ResourceIdentity) -> Option<Snapshot> {
        self.entries.remove(identity)
    }

    pub fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(name: &str, image: &str) -> Snapshot {
        Snapshot::from_json(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": name, "namespace": "default"},
            "spec": {"containers": [{"image": image}]}
        }))
        .unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let mut cache = SnapshotCache::new();
        let snap = pod("a", "nginx:1");
        let id = snap.identity().clone();

        assert!(cache.put(snap.clone()).is_none());
        assert_eq!(cache.get(&id), Some(&snap));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_whole_entry() {
        let mut cache = SnapshotCache::new();
        let first = pod("a", "nginx:1");
        let second = pod("a", "nginx:2");
        let id = first.identity().clone();

        cache.put(first.clone());
        let replaced = cache.put(second.clone());

        assert_eq!(replaced, Some(first));
        assert_eq!(cache.get(&id), Some(&second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_identities_are_independent() {
        let mut cache = SnapshotCache::new();
        cache.put(pod("a", "nginx:1"));
        cache.put(pod("b", "nginx:1"));

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_remove_evicts() {
        let mut cache = SnapshotCache::new();
        let snap = pod("a", "nginx:1");
        let id = snap.identity().clone();
        cache.put(snap);

        assert!(cache.remove(&id).is_some());
        assert!(!cache.contains(&id));
        assert!(cache.is_empty());
    }
}
