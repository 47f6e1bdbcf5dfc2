//! Error types for the unit cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache and load-orchestration operations.
///
/// Cache-internal operations (`get`, `set`, `remove`, `clear`,
/// `cleanup_expired`) never fail; errors only arise from key validation or
/// from the external loader/stat collaborators.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The project key is malformed or unsafe
    #[error("Invalid project key: {0}")]
    InvalidKey(String),

    /// The external loader failed for this key
    #[error("Failed to load compilation unit for {path}")]
    LoadFailed {
        /// The key whose load failed
        path: PathBuf,
        /// The loader's original error
        #[source]
        source: anyhow::Error,
    },

    /// The source could not be stat'ed and the subsequent load also failed
    #[error("Source unavailable: {path}")]
    SourceUnavailable {
        /// The key whose source is unavailable
        path: PathBuf,
        /// The stat error
        #[source]
        source: std::io::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the unit cache.
pub type Result<T> = std::result::Result<T, CacheError>;
