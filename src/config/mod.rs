//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infrastructure::cache::{EvictionPolicy, cache_file_name};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub pipeline: PipelineConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cache.validate()?;
        self.pipeline.validate()?;
        self.remote.validate()?;
        Ok(())
    }
}

/// Scan cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the per-project/per-build cache files
    pub dir: PathBuf,
    /// Capacity bound for local project caches (LRU)
    pub max_entries: usize,
    /// Age bound for CI build caches, in hours (TTL)
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("depscan-cache"),
            max_entries: 100,
            ttl_hours: 7 * 24,
        }
    }
}

impl CacheConfig {
    /// Policy for local project caches.
    pub fn project_policy(&self) -> EvictionPolicy {
        EvictionPolicy::Capacity {
            max_entries: self.max_entries,
        }
    }

    /// Policy for CI build caches.
    pub fn build_policy(&self) -> EvictionPolicy {
        EvictionPolicy::MaxAge {
            max_age: Duration::from_secs(self.ttl_hours * 3600),
        }
    }

    /// Backing file for one build's cache under the configured directory.
    ///
    /// The file name is the reversible hex encoding of `"{name}_{number}"`,
    /// so repeated runs of the same build address the same file. Callers own
    /// cache lifetimes; they open a [`EvictionPolicy::MaxAge`] cache at this
    /// path and hand it to the scan entry point.
    pub fn build_cache_path(&self, build_name: &str, build_number: &str) -> PathBuf {
        self.dir.join(cache_file_name(build_name, build_number))
    }
}

/// Producer/consumer pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bounded queue capacity; `send`/`recv` suspend when full/empty
    pub queue_capacity: usize,
    /// Number of producer workers
    pub producers: usize,
    /// Number of consumer workers
    pub consumers: usize,
    /// Components per remote summary request
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            producers: 1,
            consumers: 3,
            batch_size: 100,
        }
    }
}

/// Remote scan service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the vulnerability scan service
    pub base_url: String,
    /// Timeout for individual requests (in seconds)
    pub timeout_seconds: u64,
    /// Cap on the number of builds returned by an artifact search
    pub max_results: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scan.example.com".to_string(),
            timeout_seconds: 30,
            max_results: 20,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
