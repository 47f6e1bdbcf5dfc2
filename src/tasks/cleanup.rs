//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so that
//! idle entries free their memory without waiting for the next access.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically cleans up expired entries.
///
/// The task loops forever, sleeping for the given interval between runs.
/// Abort the returned handle during shutdown.
///
/// # Example
/// ```ignore
/// let cache: SharedCache<PathBuf, Arc<Unit>> = SharedCache::new(64, ttl);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<K, V>(
    cache: SharedCache<K, V>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            interval_secs = cleanup_interval_secs,
            "starting TTL cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;

            if removed > 0 {
                info!(removed, "TTL cleanup removed expired units");
            } else {
                debug!("TTL cleanup found no expired units");
            }
        }
    })
}
