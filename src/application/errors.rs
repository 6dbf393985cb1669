//! Application-level error types

use thiserror::Error;

use crate::config::ValidationError;
use crate::infrastructure::remote::RemoteError;

/// Errors from the persisted scan cache.
///
/// These surface only from explicit `write()` calls; corrupt or
/// version-mismatched cache files are recovered inside `read()` and never
/// propagate.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level error for scan operations.
///
/// Per-item failures (one artifact failing to download or parse) are logged
/// and skipped inside the pipeline loop; only configuration-level failures
/// abort a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("remote service error: {0}")]
    Remote(#[from] RemoteError),

    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error("pipeline channel error: {0}")]
    Channel(String),

    #[error("worker task failed: {0}")]
    Join(String),
}
