//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with idle-TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry holding an opaque value and its access metadata.
///
/// The TTL is an idle timeout: the clock restarts on every access, so an
/// entry only expires after going unread for the full TTL duration.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value, opaque to the cache
    pub value: V,
    /// Last time this entry was inserted or read
    last_access: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with a fresh access timestamp.
    pub fn new(value: V) -> Self {
        Self {
            value,
            last_access: Instant::now(),
        }
    }

    // == Touch ==
    /// Refreshes the access timestamp.
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived the given idle TTL.
    ///
    /// Boundary condition: an entry is expired only when its idle time is
    /// strictly greater than the TTL, so an entry read exactly at the TTL
    /// mark is still served. `None` means entries never expire.
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.last_access.elapsed() > ttl,
            None => false,
        }
    }

    // == Idle Time ==
    /// Returns how long ago this entry was last accessed.
    pub fn idle_time(&self) -> Duration {
        self.last_access.elapsed()
    }
}
