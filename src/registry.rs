//! Cache Registry Module
//!
//! Named registration of caches for an external memory-pressure controller.
//! The registry only exposes enumeration plus `cleanup_expired` and `clear`
//! per cache or across every registered cache; deciding when to invoke them
//! stays with the embedder.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::SharedCache;

// == Managed Cache ==
/// The operations a registered cache exposes to pressure controllers.
#[async_trait]
pub trait ManagedCache: Send + Sync {
    /// Eagerly removes expired entries; returns how many were removed.
    async fn cleanup_expired(&self) -> usize;

    /// Drops every entry.
    async fn clear(&self);

    /// Current table size.
    async fn len(&self) -> usize;
}

#[async_trait]
impl<K, V> ManagedCache for SharedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn cleanup_expired(&self) -> usize {
        SharedCache::cleanup_expired(self).await
    }

    async fn clear(&self) {
        SharedCache::clear(self).await;
    }

    async fn len(&self) -> usize {
        SharedCache::len(self).await
    }
}

// == Cache Registry ==
/// Registry of named caches.
#[derive(Default)]
pub struct CacheRegistry {
    caches: RwLock<HashMap<String, Arc<dyn ManagedCache>>>,
}

impl CacheRegistry {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Registers a cache under a name, replacing any previous registration.
    pub async fn register(&self, name: impl Into<String>, cache: Arc<dyn ManagedCache>) {
        let name = name.into();
        let mut caches = self.caches.write().await;
        if caches.insert(name.clone(), cache).is_some() {
            warn!(name = %name, "replaced an existing cache registration");
        } else {
            debug!(name = %name, "registered cache");
        }
    }

    // == Unregister ==
    /// Removes a registration; returns whether one existed.
    pub async fn unregister(&self, name: &str) -> bool {
        let mut caches = self.caches.write().await;
        caches.remove(name).is_some()
    }

    // == Names ==
    /// Names of all registered caches, sorted.
    pub async fn names(&self) -> Vec<String> {
        let caches = self.caches.read().await;
        let mut names: Vec<String> = caches.keys().cloned().collect();
        names.sort();
        names
    }

    // == Cleanup One ==
    /// Runs `cleanup_expired` on one cache; `None` for unknown names.
    pub async fn cleanup_expired(&self, name: &str) -> Option<usize> {
        let cache = {
            let caches = self.caches.read().await;
            caches.get(name).cloned()
        }?;
        Some(cache.cleanup_expired().await)
    }

    // == Clear One ==
    /// Clears one cache; returns whether the name was known.
    pub async fn clear(&self, name: &str) -> bool {
        let cache = {
            let caches = self.caches.read().await;
            caches.get(name).cloned()
        };
        match cache {
            Some(cache) => {
                cache.clear().await;
                true
            }
            None => false,
        }
    }

    // == Cleanup All ==
    /// Runs `cleanup_expired` on every registered cache.
    ///
    /// Returns the total number of entries removed. The registry lock is
    /// not held while the caches do their work.
    pub async fn cleanup_all(&self) -> usize {
        let caches = self.handles().await;
        let mut removed = 0;
        for cache in caches {
            removed += cache.cleanup_expired().await;
        }
        removed
    }

    // == Clear All ==
    /// Clears every registered cache.
    pub async fn clear_all(&self) {
        for cache in self.handles().await {
            cache.clear().await;
        }
    }

    // == Total Entries ==
    /// Sum of the table sizes of every registered cache.
    pub async fn total_entries(&self) -> usize {
        let mut total = 0;
        for cache in self.handles().await {
            total += cache.len().await;
        }
        total
    }

    async fn handles(&self) -> Vec<Arc<dyn ManagedCache>> {
        let caches = self.caches.read().await;
        caches.values().cloned().collect()
    }
}
