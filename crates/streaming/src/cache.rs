use std::collections::{HashMap, VecDeque};

use formats::MapDocument;

/// Bounded in-memory document cache with strict FIFO eviction.
///
/// Eviction is by insertion order, never by recency of access: re-fetch
/// cost is low and workloads are small, so the simplicity is deliberate.
/// `get` does not reorder anything. Replacing an existing key keeps its
/// original insertion position and never evicts.
#[derive(Debug)]
pub struct DocumentCache {
    capacity: usize,
    entries: HashMap<String, MapDocument>,
    order: VecDeque<String>,
}

impl DocumentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&MapDocument> {
        self.entries.get(key)
    }

    /// Inserts a validated document, evicting the oldest-inserted entry
    /// first when at capacity. Returns the evicted key, if any.
    pub fn put(&mut self, key: String, document: MapDocument) -> Option<String> {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = document;
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, document);
        evicted
    }

    /// Empties the cache. Used on explicit "refresh available maps" actions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
