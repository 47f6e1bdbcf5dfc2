//! unitcache - concurrent caching of expensive compilation units
//!
//! Serves parsed and semantically-analyzed project representations from a
//! bounded in-memory cache, invalidating them when their sources change on
//! disk and bounding how many expensive loads run at once.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod registry;
pub mod tasks;
pub mod tracker;

pub use cache::{CacheMetrics, LruTtlCache, MetricsSnapshot, SharedCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use loader::{FsSourceStat, SourceStat, UnitLoader};
pub use orchestrator::CompilationCache;
pub use registry::{CacheRegistry, ManagedCache};
pub use tasks::spawn_cleanup_task;
pub use tracker::ModificationTracker;
