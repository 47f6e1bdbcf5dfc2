//! Cache Metrics Module
//!
//! Tracks cache effectiveness: global hit/miss/eviction counters plus a
//! per-key breakdown. Counters are atomics and the per-key table is a
//! concurrent map, so every operation is safe from any thread without
//! external locking and concurrent increments for the same key never lose
//! an update.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

// == Per-Key Stats ==
/// Hit/miss record for a single key.
#[derive(Debug, Clone, Serialize)]
pub struct KeyStats {
    /// Number of hits recorded for this key
    pub hits: u64,
    /// Number of misses recorded for this key
    pub misses: u64,
    /// Wall-clock time of the most recent hit or miss
    pub last_access: DateTime<Utc>,
}

// == Metrics Snapshot ==
/// Point-in-time copy of all counters, for reporting sinks to poll.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Global hit count
    pub hits: u64,
    /// Global miss count
    pub misses: u64,
    /// Entries evicted by the LRU policy
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 with no observations
    pub hit_rate: f64,
    /// Per-key records, ordered by key
    pub keys: BTreeMap<String, KeyStats>,
}

impl MetricsSnapshot {
    /// Renders the snapshot as a JSON value for structured log sinks.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("metrics snapshot serializes")
    }
}

// == Cache Metrics ==
/// Accumulates cache effectiveness counters.
///
/// Purely additive; counters only go back to zero through `reset`.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    per_key: DashMap<String, KeyStats>,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new metrics collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Records a hit for the given key.
    pub fn record_hit(&self, key: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.per_key
            .entry(key.to_string())
            .and_modify(|stats| {
                stats.hits += 1;
                stats.last_access = Utc::now();
            })
            .or_insert_with(|| KeyStats {
                hits: 1,
                misses: 0,
                last_access: Utc::now(),
            });
    }

    // == Record Miss ==
    /// Records a miss for the given key.
    pub fn record_miss(&self, key: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.per_key
            .entry(key.to_string())
            .and_modify(|stats| {
                stats.misses += 1;
                stats.last_access = Utc::now();
            })
            .or_insert_with(|| KeyStats {
                hits: 0,
                misses: 1,
                last_access: Utc::now(),
            });
    }

    // == Record Eviction ==
    /// Records an LRU eviction.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Global hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Global miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Global eviction count.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if nothing was recorded yet.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Hit/miss record for one key, if any was recorded.
    pub fn key_stats(&self, key: &str) -> Option<KeyStats> {
        self.per_key.get(key).map(|stats| stats.clone())
    }

    // == Snapshot ==
    /// Copies all counters into a serializable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let keys: BTreeMap<String, KeyStats> = self
            .per_key
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        MetricsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
            hit_rate: self.hit_rate(),
            keys,
        }
    }

    // == Summary ==
    /// Renders a human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            "cache metrics: {} hits, {} misses, {} evictions, hit rate {:.1}%",
            snapshot.hits,
            snapshot.misses,
            snapshot.evictions,
            snapshot.hit_rate * 100.0
        );
        for (key, stats) in &snapshot.keys {
            out.push_str(&format!(
                "\n  {}: {} hits, {} misses, last access {}",
                key,
                stats.hits,
                stats.misses,
                stats.last_access.to_rfc3339()
            ));
        }
        out
    }

    // == Reset ==
    /// Zeroes every counter and drops the per-key table.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.per_key.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_metrics_new() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.hits(), 0);
        assert_eq!(metrics.misses(), 0);
        assert_eq!(metrics.evictions(), 0);
    }

    #[test]
    fn test_hit_rate_no_observations() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let metrics = CacheMetrics::new();
        metrics.record_hit("a");
        metrics.record_hit("a");
        metrics.record_hit("b");
        assert_eq!(metrics.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let metrics = CacheMetrics::new();
        metrics.record_hit("a");
        metrics.record_miss("a");
        assert_eq!(metrics.hit_rate(), 0.5);
    }

    #[test]
    fn test_per_key_breakdown() {
        let metrics = CacheMetrics::new();
        metrics.record_miss("a");
        metrics.record_hit("a");
        metrics.record_hit("a");
        metrics.record_miss("b");

        let a = metrics.key_stats("a").expect("key a recorded");
        assert_eq!(a.hits, 2);
        assert_eq!(a.misses, 1);

        let b = metrics.key_stats("b").expect("key b recorded");
        assert_eq!(b.hits, 0);
        assert_eq!(b.misses, 1);

        assert!(metrics.key_stats("c").is_none());
    }

    #[test]
    fn test_record_eviction() {
        let metrics = CacheMetrics::new();
        metrics.record_eviction();
        metrics.record_eviction();
        assert_eq!(metrics.evictions(), 2);
    }

    #[test]
    fn test_reset() {
        let metrics = CacheMetrics::new();
        metrics.record_hit("a");
        metrics.record_miss("b");
        metrics.record_eviction();

        metrics.reset();

        assert_eq!(metrics.hits(), 0);
        assert_eq!(metrics.misses(), 0);
        assert_eq!(metrics.evictions(), 0);
        assert_eq!(metrics.hit_rate(), 0.0);
        assert!(metrics.key_stats("a").is_none());
    }

    #[test]
    fn test_concurrent_increments_lose_nothing() {
        let metrics = Arc::new(CacheMetrics::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let metrics = Arc::clone(&metrics);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    metrics.record_hit("shared");
                }
            }));
        }
        for handle in handles {
            handle.join().expect("metrics thread panicked");
        }

        assert_eq!(metrics.hits(), 8000);
        let stats = metrics.key_stats("shared").expect("key recorded");
        assert_eq!(stats.hits, 8000);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = CacheMetrics::new();
        metrics.record_hit("/proj/app");
        metrics.record_miss("/proj/lib");

        let json = metrics.snapshot().to_json();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 1);
        assert!(json["keys"]["/proj/app"]["hits"].is_u64());
    }

    #[test]
    fn test_summary_mentions_keys() {
        let metrics = CacheMetrics::new();
        metrics.record_hit("/proj/app");
        metrics.record_miss("/proj/app");

        let summary = metrics.summary();
        assert!(summary.contains("1 hits"));
        assert!(summary.contains("1 misses"));
        assert!(summary.contains("hit rate 50.0%"));
        assert!(summary.contains("/proj/app"));
    }
}
