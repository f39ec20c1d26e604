// ── Generic keyed collection ──
//
// Concurrent set-by-identity storage with O(1) lookups and a snapshot
// rebuilt once per merge.

use std::hash::Hash;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

/// Set semantics over `T`, keyed by `K`. Inserting an existing key
/// replaces the previous value.
pub(crate) struct KeyedCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    by_key: DashMap<K, Arc<T>>,

    /// Full snapshot, rebuilt on merge.
    snapshot: ArcSwap<Vec<Arc<T>>>,
}

impl<K, T> KeyedCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            by_key: DashMap::new(),
            snapshot: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Merge a batch by identity (last write wins). Returns how many keys
    /// were new.
    pub(crate) fn upsert_many(&self, items: impl IntoIterator<Item = (K, T)>) -> usize {
        let mut added = 0;
        let mut touched = false;
        for (key, item) in items {
            if self.by_key.insert(key, Arc::new(item)).is_none() {
                added += 1;
            }
            touched = true;
        }

        if touched {
            self.rebuild_snapshot();
        }
        added
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.load_full()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
        self.snapshot.store(Arc::new(values));
    }
}
