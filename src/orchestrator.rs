//! Load Orchestrator Module
//!
//! The surface callers actually use: `get_or_load` combines the shared
//! cache, the modification tracker, the metrics collector, and a bounded
//! admission gate around the external loader.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::cache::{CacheMetrics, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::loader::{FsSourceStat, SourceStat, UnitLoader};
use crate::tracker::ModificationTracker;

// == Compilation Cache ==
/// Modification-aware, admission-controlled cache of compilation units.
///
/// Values are handed out as `Arc<L::Unit>`, so callers share one unit
/// rather than cloning it. The admission gate bounds how many loads run at
/// once in total; it is not a per-key single-flight lock, so two callers
/// that both miss can still build the same key twice, with the later insert
/// winning.
pub struct CompilationCache<L: UnitLoader> {
    /// Cached units keyed by project path
    units: SharedCache<PathBuf, Arc<L::Unit>>,
    /// Last-observed source modification time per key
    tracker: ModificationTracker,
    /// Hit/miss/eviction accounting
    metrics: Arc<CacheMetrics>,
    /// Bounds the number of concurrently running loads
    gate: Semaphore,
    /// Source modification-time provider
    stat: Box<dyn SourceStat>,
    /// The external engine that builds units
    loader: L,
}

impl<L: UnitLoader> CompilationCache<L> {
    // == Constructor ==
    /// Creates a cache around the given loader, statting sources on the
    /// real filesystem.
    pub fn new(loader: L, config: &Config) -> Self {
        Self::with_source_stat(loader, config, Box::new(FsSourceStat))
    }

    /// Creates a cache with a custom modification-time provider.
    pub fn with_source_stat(loader: L, config: &Config, stat: Box<dyn SourceStat>) -> Self {
        Self {
            units: SharedCache::new(config.max_units, config.ttl()),
            tracker: ModificationTracker::new(),
            metrics: Arc::new(CacheMetrics::new()),
            gate: Semaphore::new(config.max_concurrent_loads.max(1)),
            stat,
            loader,
        }
    }

    // == Get Or Load ==
    /// Returns the current unit for the project at `path`, loading it if it
    /// is absent or its source changed on disk.
    ///
    /// The cache probe and the staleness check run without any admission
    /// slot held; the loader runs outside the cache lock, so a slow load
    /// never blocks unrelated cache reads. After waiting for an admission
    /// slot the probe is repeated once, because another caller may have
    /// completed the same load in the meantime.
    pub async fn get_or_load(&self, path: &Path) -> Result<Arc<L::Unit>> {
        validate_project_key(path)?;
        let metrics_key = path.display().to_string();

        // One stat per call; the observation drives both staleness checks
        // and, on success, the recorded modification time.
        let observed = self.stat.modified(path);

        // Fast path
        if let Some(unit) = self.probe(path, &observed).await {
            self.metrics.record_hit(&metrics_key);
            return Ok(unit);
        }
        self.metrics.record_miss(&metrics_key);

        // Admission gate; the permit is released on drop, success or not
        let _permit = self
            .gate
            .acquire()
            .await
            .expect("admission gate semaphore closed");

        // Re-check under the gate: another caller may have finished this
        // load while we waited for a slot.
        if let Some(unit) = self.probe(path, &observed).await {
            return Ok(unit);
        }

        debug!(path = %path.display(), "loading compilation unit");
        match self.loader.load(path).await {
            Ok(unit) => {
                let unit = Arc::new(unit);
                match &observed {
                    Ok(mtime) => {
                        self.tracker.record(path, *mtime);
                        if let Some(evicted) = self
                            .units
                            .set(path.to_path_buf(), Arc::clone(&unit))
                            .await
                        {
                            self.metrics.record_eviction();
                            debug!(evicted = %evicted.display(), "evicted least recently used unit");
                        }
                    }
                    // Without a stat the unit can never be proven fresh, so
                    // caching it would only create an entry with no
                    // modification record that the next probe throws away.
                    Err(_) => {
                        self.tracker.forget(path);
                    }
                }
                Ok(unit)
            }
            // Loader failures are never cached and never touch the tracker
            Err(source) => match observed {
                Err(io_err) => Err(CacheError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source: io_err,
                }),
                Ok(_) => Err(CacheError::LoadFailed {
                    path: path.to_path_buf(),
                    source,
                }),
            },
        }
    }

    /// Cache probe with staleness check; removes stale entries.
    async fn probe(
        &self,
        path: &Path,
        observed: &io::Result<SystemTime>,
    ) -> Option<Arc<L::Unit>> {
        let key = path.to_path_buf();
        let unit = self.units.get(&key).await?;
        let fresh = match observed {
            Ok(current) => !self.tracker.is_stale(path, *current),
            // An unstat'able source always counts as modified
            Err(_) => false,
        };
        if fresh {
            return Some(unit);
        }
        // Drop the stale unit before anyone can be served from it
        self.units.remove(&key).await;
        info!(path = %path.display(), "source changed, invalidating cached unit");
        None
    }

    // == Invalidate ==
    /// Drops one key's cached unit and modification record.
    ///
    /// Returns whether a cached unit was removed.
    pub async fn invalidate(&self, path: &Path) -> bool {
        let removed = self.units.remove(&path.to_path_buf()).await;
        self.tracker.forget(path);
        removed
    }

    // == Clear ==
    /// Drops every cached unit, modification record, and metric.
    pub async fn clear(&self) {
        self.units.clear().await;
        self.tracker.clear();
        self.metrics.reset();
    }

    /// Metrics handle for reporting components to poll.
    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Shared handle to the underlying unit cache, e.g. for registering it
    /// with a `CacheRegistry` or a background cleanup task.
    pub fn units(&self) -> SharedCache<PathBuf, Arc<L::Unit>> {
        self.units.clone()
    }
}

// == Key Validation ==
/// Rejects malformed or unsafe project keys before any cache interaction.
fn validate_project_key(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CacheError::InvalidKey("empty path".to_string()));
    }
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(CacheError::InvalidKey(format!(
            "path escapes its root: {}",
            path.display()
        )));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    /// Loader that counts invocations and returns a generation-stamped unit.
    struct CountingLoader {
        loads: AtomicUsize,
        fail: bool,
    }

    impl CountingLoader {
        fn new() -> Self {
            Self {
                loads: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                loads: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UnitLoader for CountingLoader {
        type Unit = String;

        async fn load(&self, path: &Path) -> anyhow::Result<String> {
            let generation = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                anyhow::bail!("semantic analysis failed");
            }
            Ok(format!("{}#{}", path.display(), generation))
        }
    }

    /// Stat provider with a controllable clock per path.
    struct FixedStat {
        mtime: std::sync::Mutex<SystemTime>,
    }

    impl FixedStat {
        fn new() -> Self {
            Self {
                mtime: std::sync::Mutex::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1000)),
            }
        }

        fn advance(&self, secs: u64) {
            let mut mtime = self.mtime.lock().expect("stat clock poisoned");
            *mtime += Duration::from_secs(secs);
        }
    }

    struct FixedStatHandle(Arc<FixedStat>);

    impl SourceStat for FixedStatHandle {
        fn modified(&self, _path: &Path) -> io::Result<SystemTime> {
            Ok(*self.0.mtime.lock().expect("stat clock poisoned"))
        }
    }

    struct FailingStat;

    impl SourceStat for FailingStat {
        fn modified(&self, _path: &Path) -> io::Result<SystemTime> {
            Err(io::Error::new(io::ErrorKind::NotFound, "source deleted"))
        }
    }

    fn test_cache(
        loader: CountingLoader,
        stat: Box<dyn SourceStat>,
    ) -> CompilationCache<CountingLoader> {
        CompilationCache::with_source_stat(loader, &Config::default(), stat)
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let stat = Arc::new(FixedStat::new());
        let cache = test_cache(
            CountingLoader::new(),
            Box::new(FixedStatHandle(Arc::clone(&stat))),
        );
        let path = Path::new("/proj/app");

        let first = cache.get_or_load(path).await.expect("first load");
        let second = cache.get_or_load(path).await.expect("cached read");

        assert_eq!(*first, *second);
        assert_eq!(cache.loader.count(), 1);
        assert_eq!(cache.metrics().hits(), 1);
        assert_eq!(cache.metrics().misses(), 1);
    }

    #[tokio::test]
    async fn test_modified_source_triggers_reload() {
        let stat = Arc::new(FixedStat::new());
        let cache = test_cache(
            CountingLoader::new(),
            Box::new(FixedStatHandle(Arc::clone(&stat))),
        );
        let path = Path::new("/proj/app");

        let first = cache.get_or_load(path).await.expect("first load");
        stat.advance(30);
        let second = cache.get_or_load(path).await.expect("reload");

        assert_ne!(*first, *second);
        assert_eq!(cache.loader.count(), 2);
    }

    #[tokio::test]
    async fn test_unstatable_source_always_reloads() {
        let cache = test_cache(CountingLoader::new(), Box::new(FailingStat));
        let path = Path::new("/proj/app");

        cache.get_or_load(path).await.expect("first load");
        cache.get_or_load(path).await.expect("second load");

        // Never served from cache while the source cannot be stat'ed
        assert_eq!(cache.loader.count(), 2);
    }

    #[tokio::test]
    async fn test_loader_failure_propagates_and_is_not_cached() {
        let stat = Arc::new(FixedStat::new());
        let cache = test_cache(
            CountingLoader::failing(),
            Box::new(FixedStatHandle(Arc::clone(&stat))),
        );
        let path = Path::new("/proj/app");

        let err = cache.get_or_load(path).await.expect_err("load should fail");
        assert!(matches!(err, CacheError::LoadFailed { .. }));

        // No poison entry, no modification record
        assert_eq!(cache.units().len().await, 0);
        assert!(cache.tracker.is_empty());

        // The next call retries from scratch
        let err = cache.get_or_load(path).await.expect_err("still failing");
        assert!(matches!(err, CacheError::LoadFailed { .. }));
        assert_eq!(cache.loader.count(), 2);
    }

    #[tokio::test]
    async fn test_stat_and_load_both_failing_is_source_unavailable() {
        let cache = test_cache(CountingLoader::failing(), Box::new(FailingStat));

        let err = cache
            .get_or_load(Path::new("/proj/app"))
            .await
            .expect_err("load should fail");
        assert!(matches!(err, CacheError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_invalid_keys_never_reach_the_loader() {
        let stat = Arc::new(FixedStat::new());
        let cache = test_cache(
            CountingLoader::new(),
            Box::new(FixedStatHandle(Arc::clone(&stat))),
        );

        let err = cache.get_or_load(Path::new("")).await.expect_err("empty key");
        assert!(matches!(err, CacheError::InvalidKey(_)));

        let err = cache
            .get_or_load(Path::new("/proj/../etc/passwd"))
            .await
            .expect_err("traversal key");
        assert!(matches!(err, CacheError::InvalidKey(_)));

        assert_eq!(cache.loader.count(), 0);
        assert_eq!(cache.metrics().misses(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let stat = Arc::new(FixedStat::new());
        let cache = test_cache(
            CountingLoader::new(),
            Box::new(FixedStatHandle(Arc::clone(&stat))),
        );
        let path = Path::new("/proj/app");

        cache.get_or_load(path).await.expect("first load");
        assert!(cache.invalidate(path).await);
        assert!(!cache.invalidate(path).await);

        cache.get_or_load(path).await.expect("reload");
        assert_eq!(cache.loader.count(), 2);
    }

    #[tokio::test]
    async fn test_clear_resets_units_tracker_and_metrics() {
        let stat = Arc::new(FixedStat::new());
        let cache = test_cache(
            CountingLoader::new(),
            Box::new(FixedStatHandle(Arc::clone(&stat))),
        );
        let path = Path::new("/proj/app");

        cache.get_or_load(path).await.expect("first load");
        cache.get_or_load(path).await.expect("cached read");

        cache.clear().await;

        assert_eq!(cache.units().len().await, 0);
        assert!(cache.tracker.is_empty());
        assert_eq!(cache.metrics().hits(), 0);
        assert_eq!(cache.metrics().misses(), 0);
    }

    #[test]
    fn test_validate_project_key_accepts_normal_paths() {
        assert!(validate_project_key(Path::new("/proj/app")).is_ok());
        assert!(validate_project_key(Path::new("relative/project")).is_ok());
    }
}
