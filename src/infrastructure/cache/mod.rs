//! Persisted scan-result cache

pub mod file_cache;

pub use file_cache::{
    CACHE_VERSION, CacheEntry, DEFAULT_MAX_AGE, EvictionPolicy, ScanCache, cache_file_name,
    current_time_millis, decode_cache_file_name,
};
