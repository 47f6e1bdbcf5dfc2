//! Cache Store Module
//!
//! Generic cache engine combining a key index with the arena-backed recency
//! list and lazy idle-TTL expiration. The store itself is single-threaded;
//! concurrent callers go through `SharedCache`.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::entry::CacheEntry;
use crate::cache::lru::{NodeId, RecencyList};

#[derive(Debug)]
struct IndexedEntry<V> {
    node: NodeId,
    entry: CacheEntry<V>,
}

// == LRU-TTL Cache ==
/// Bounded map with recency-based eviction and optional idle TTL.
///
/// Every key in the index has exactly one node in the recency list and vice
/// versa, so the list length always equals the index size and never exceeds
/// the configured capacity.
#[derive(Debug)]
pub struct LruTtlCache<K, V> {
    /// Key -> recency node + entry
    index: HashMap<K, IndexedEntry<V>>,
    /// Recency ordering, most recently used at the head
    order: RecencyList<K>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Idle TTL, None = entries never expire
    ttl: Option<Duration>,
}

impl<K, V> LruTtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new cache with the given capacity and optional idle TTL.
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: HashMap::with_capacity(capacity),
            order: RecencyList::with_capacity(capacity),
            capacity,
            ttl,
        }
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// A hit promotes the entry to most-recently-used and refreshes its
    /// access timestamp. An entry past its idle TTL is removed here and
    /// reported absent; expiry is only ever checked lazily at access time.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.index.get(key) {
            Some(indexed) => indexed.entry.is_expired(self.ttl),
            None => return None,
        };
        if expired {
            self.remove(key);
            return None;
        }

        let indexed = self
            .index
            .get_mut(key)
            .expect("entry vanished between probe and touch");
        indexed.entry.touch();
        let node = indexed.node;
        let value = indexed.entry.value.clone();
        self.order.touch(node);
        Some(value)
    }

    // == Set ==
    /// Inserts or overwrites a value, returning the evicted key if any.
    ///
    /// An overwrite is a logical remove + insert: the old position is
    /// dropped and the key re-enters at the head with a fresh timestamp.
    /// When a new key would exceed capacity, the least-recently-used entry
    /// is evicted before insertion, so capacity is never exceeded even
    /// transiently.
    pub fn set(&mut self, key: K, value: V) -> Option<K> {
        let mut evicted = None;

        if let Some(old) = self.index.remove(&key) {
            self.order.remove(old.node);
        } else if self.index.len() >= self.capacity {
            if let Some(lru_key) = self.order.pop_back() {
                self.index.remove(&lru_key);
                evicted = Some(lru_key);
            }
        }

        let node = self.order.push_front(key.clone());
        self.index.insert(
            key,
            IndexedEntry {
                node,
                entry: CacheEntry::new(value),
            },
        );

        evicted
    }

    // == Remove ==
    /// Removes an entry if present; returns whether anything was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(indexed) => {
                self.order.remove(indexed.node);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Empties the index and the recency list together.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Length ==
    /// Returns the current table size.
    ///
    /// The count can include entries past their idle TTL that no access has
    /// collected yet; run `cleanup_expired` first for a live count.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Cleanup Expired ==
    /// Eagerly removes all entries past the idle TTL.
    ///
    /// Returns the number of entries removed. This is the only operation
    /// that scans; everything else is O(1) amortized.
    pub fn cleanup_expired(&mut self) -> usize {
        let ttl = match self.ttl {
            Some(ttl) => ttl,
            None => return 0,
        };

        let expired_keys: Vec<K> = self
            .index
            .iter()
            .filter(|(_, indexed)| indexed.entry.is_expired(Some(ttl)))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove(&key);
        }
        count
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
