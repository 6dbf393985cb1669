//! Versioned, persisted scan-result cache
//!
//! One JSON document per cache instance:
//! `{"version": <int>, "artifactsMap": {<componentId>: {"artifact": {...},
//! "lastUpdated": <epoch-ms>}}}`. On load, a version mismatch or a corrupt
//! file discards the whole map and starts empty; partial data is never
//! trusted and cache problems are never fatal.
//!
//! Two eviction policies, chosen per instance:
//! - [`EvictionPolicy::Capacity`] — access-ordered LRU bound, used for local
//!   short-lived project scans.
//! - [`EvictionPolicy::MaxAge`] — entries older than a threshold are treated
//!   as absent and dropped on the next `put`, used for cross-session/CI
//!   caches where staleness matters more than memory.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::errors::CacheError;
use crate::domain::ScannedArtifact;

/// Format version of the on-disk envelope. Any stored document with a
/// different version is discarded wholesale on load.
pub const CACHE_VERSION: u32 = 1;

/// Default age threshold for [`EvictionPolicy::MaxAge`] caches.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Eviction policy for one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep at most `max_entries`; after every `put` the single oldest entry
    /// (by access order) is evicted while over capacity.
    Capacity { max_entries: usize },
    /// Entries older than `max_age` are reported absent even while still
    /// physically stored, and are dropped on the next `put`.
    MaxAge { max_age: Duration },
}

/// One cached component result with its refresh timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub artifact: ScannedArtifact,
    /// Milliseconds since the Unix epoch.
    pub last_updated: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    version: u32,
    artifacts_map: HashMap<String, CacheEntry>,
}

/// Current time in milliseconds since the Unix epoch.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Persisted `componentId -> scan artifact` map with per-instance eviction.
pub struct ScanCache {
    path: PathBuf,
    policy: EvictionPolicy,
    entries: HashMap<String, CacheEntry>,
    /// Access/insertion order, oldest first. Maintained for `Capacity` only.
    order: VecDeque<String>,
}

impl ScanCache {
    /// Open a cache backed by `path`, loading any previously persisted map.
    ///
    /// A missing, corrupt, or version-mismatched file yields an empty cache;
    /// it is never an error.
    pub fn open(path: impl Into<PathBuf>, policy: EvictionPolicy) -> Self {
        let mut cache = Self {
            path: path.into(),
            policy,
            entries: HashMap::new(),
            order: VecDeque::new(),
        };
        cache.read();
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reload the map from the backing file, replacing in-memory state.
    pub fn read(&mut self) {
        self.entries.clear();
        self.order.clear();

        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no readable cache file, starting empty");
                return;
            }
        };

        let file: CacheFile = match serde_json::from_slice(&raw) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cache file, discarding");
                return;
            }
        };

        if file.version != CACHE_VERSION {
            warn!(
                path = %self.path.display(),
                stored = file.version,
                expected = CACHE_VERSION,
                "cache version mismatch, discarding"
            );
            return;
        }

        self.entries = file.artifacts_map;

        // Rebuild access order oldest-first from the stored timestamps.
        let mut keys: Vec<(&String, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.last_updated))
            .collect();
        keys.sort_by_key(|&(_, last_updated)| last_updated);
        self.order = keys.into_iter().map(|(key, _)| key.clone()).collect();
    }

    /// Persist the map to the backing file.
    ///
    /// Called only at well-defined completion points, never mid-pipeline.
    pub fn write(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let file = CacheFile {
            version: CACHE_VERSION,
            artifacts_map: self.entries.clone(),
        };
        let raw = serde_json::to_vec(&file)?;
        std::fs::write(&self.path, raw).map_err(|source| CacheError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "cache written");
        Ok(())
    }

    /// Whether a fresh entry for `id` exists. Under `MaxAge`, an expired
    /// entry is reported absent even though it is still physically stored
    /// until the next `put`.
    pub fn contains(&self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(entry) => !self.is_expired(entry),
            None => false,
        }
    }

    /// Fetch a fresh entry, refreshing its recency under `Capacity`.
    pub fn get(&mut self, id: &str) -> Option<&ScannedArtifact> {
        if !self.contains(id) {
            return None;
        }
        if matches!(self.policy, EvictionPolicy::Capacity { .. }) {
            self.touch(id);
        }
        self.entries.get(id).map(|entry| &entry.artifact)
    }

    /// Insert or refresh an entry, then apply the eviction policy.
    pub fn put(&mut self, artifact: ScannedArtifact) {
        let id = artifact.component_id().to_string();
        let entry = CacheEntry {
            artifact,
            last_updated: current_time_millis(),
        };

        let replaced = self.entries.insert(id.clone(), entry).is_some();

        match self.policy {
            EvictionPolicy::Capacity { max_entries } => {
                if replaced {
                    self.order.retain(|key| key != &id);
                }
                self.order.push_back(id);
                while self.entries.len() > max_entries {
                    if let Some(oldest) = self.order.pop_front() {
                        self.entries.remove(&oldest);
                        debug!(component = %oldest, "evicted over-capacity cache entry");
                    } else {
                        break;
                    }
                }
            }
            EvictionPolicy::MaxAge { max_age } => {
                let now = current_time_millis();
                let threshold = max_age.as_millis() as u64;
                self.entries
                    .retain(|_, entry| now.saturating_sub(entry.last_updated) <= threshold);
            }
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        match self.policy {
            EvictionPolicy::Capacity { .. } => false,
            EvictionPolicy::MaxAge { max_age } => {
                let age = current_time_millis().saturating_sub(entry.last_updated);
                age > max_age.as_millis() as u64
            }
        }
    }

    fn touch(&mut self, id: &str) {
        self.order.retain(|key| key != id);
        self.order.push_back(id.to_string());
    }

    #[cfg(test)]
    pub(crate) fn force_entry_age(&mut self, id: &str, last_updated: u64) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.last_updated = last_updated;
        }
    }
}

/// Cache file name for one build: a reversible hex encoding of
/// `"{name}_{number}"`, so repeated runs address the same file without a
/// separate index.
pub fn cache_file_name(build_name: &str, build_number: &str) -> String {
    format!("{}.json", hex::encode(format!("{build_name}_{build_number}")))
}

/// Recover the `"{name}_{number}"` key from a cache file name produced by
/// [`cache_file_name`].
pub fn decode_cache_file_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".json")?;
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}
