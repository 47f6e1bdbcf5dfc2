//! Loader Collaborators Module
//!
//! Traits for the two external collaborators the orchestrator consumes: the
//! engine that constructs a compilation unit from a project path, and the
//! provider of source modification times. Both are behind traits so tests
//! and embedders can substitute their own.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;

// == Unit Loader ==
/// Constructs a compilation unit from a project path.
///
/// Loading is expensive (seconds); the orchestrator caches results and
/// bounds how many loads run at once. Implementations must tolerate
/// concurrent calls for distinct paths up to that bound. Errors are opaque
/// to the cache and are propagated to the caller unchanged.
#[async_trait]
pub trait UnitLoader: Send + Sync {
    /// The parsed and semantically-analyzed representation of a project.
    type Unit: Send + Sync + 'static;

    /// Builds the unit for the given project path.
    async fn load(&self, path: &Path) -> anyhow::Result<Self::Unit>;
}

#[async_trait]
impl<T> UnitLoader for std::sync::Arc<T>
where
    T: UnitLoader + ?Sized,
{
    type Unit = T::Unit;

    async fn load(&self, path: &Path) -> anyhow::Result<Self::Unit> {
        (**self).load(path).await
    }
}

// == Source Stat ==
/// Provides the current modification time of a project's source.
///
/// Used for staleness checks only; whole-file timestamps, no content
/// hashing. A stat failure (source deleted, permissions) makes the
/// orchestrator treat the key as modified.
pub trait SourceStat: Send + Sync {
    /// Returns the source's current modification time.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

// == Filesystem Stat ==
/// `SourceStat` backed by `std::fs::metadata`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceStat;

impl SourceStat for FsSourceStat {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }
}
