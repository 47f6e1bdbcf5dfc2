//! Shared Cache Module
//!
//! Thread-safe handle over the cache store. All structural mutations,
//! including the promotion a `get` performs, are serialized through the
//! write half of a single `RwLock` scoped to the cache instance; the read
//! half only serves size queries. Clones share the same underlying cache.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::store::LruTtlCache;

// == Shared Cache ==
/// Cloneable, thread-safe handle to an `LruTtlCache`.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    inner: Arc<RwLock<LruTtlCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new shared cache with the given capacity and idle TTL.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LruTtlCache::new(capacity, ttl))),
        }
    }

    // == Get ==
    /// Returns the value for the key, promoting it to most-recently-used.
    pub async fn get(&self, key: &K) -> Option<V> {
        // Write lock: a hit mutates the recency order
        let mut cache = self.inner.write().await;
        cache.get(key)
    }

    // == Set ==
    /// Inserts or overwrites a value, returning the evicted key if any.
    pub async fn set(&self, key: K, value: V) -> Option<K> {
        let mut cache = self.inner.write().await;
        cache.set(key, value)
    }

    // == Remove ==
    /// Removes an entry if present; returns whether anything was removed.
    pub async fn remove(&self, key: &K) -> bool {
        let mut cache = self.inner.write().await;
        cache.remove(key)
    }

    // == Clear ==
    /// Empties the cache.
    pub async fn clear(&self) {
        let mut cache = self.inner.write().await;
        cache.clear();
    }

    // == Length ==
    /// Returns the current table size (see `LruTtlCache::len`).
    pub async fn len(&self) -> usize {
        let cache = self.inner.read().await;
        cache.len()
    }

    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        let cache = self.inner.read().await;
        cache.is_empty()
    }

    // == Cleanup Expired ==
    /// Eagerly removes entries past the idle TTL; returns how many.
    pub async fn cleanup_expired(&self) -> usize {
        let mut cache = self.inner.write().await;
        cache.cleanup_expired()
    }

    /// Returns the configured capacity.
    pub async fn capacity(&self) -> usize {
        let cache = self.inner.read().await;
        cache.capacity()
    }
}
