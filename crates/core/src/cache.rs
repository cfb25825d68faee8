use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::storage::backend::StorageBackend;

/// Default time-to-live for cached API payloads: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Namespace prefix for cache entries in the storage backend, so cached
/// payloads never collide with the persisted ledger/favorites collections.
const CACHE_PREFIX: &str = "apiCache:";

/// A cached payload with its expiry instant. Owned exclusively by the cache
/// and never handed out to callers.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// Key/value cache with per-entry expiry, persisted synchronously to the
/// storage backend.
///
/// Eviction is lazy: an expired entry is deleted by the read that discovers
/// it; there is no background sweep. There is also no size bound — entry
/// count is bounded by distinct query shapes, not by data volume.
pub struct TtlCache {
    store: Arc<dyn StorageBackend>,
    default_ttl: Duration,
}

impl TtlCache {
    pub fn new(store: Arc<dyn StorageBackend>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Look up a cached value. Reports a miss for an absent key, an expired
    /// entry (which is deleted), or an entry that can no longer be parsed.
    pub fn get(&self, key: &str) -> Option<Value> {
        let storage_key = self.storage_key(key);
        let raw = self.store.read(&storage_key).ok().flatten()?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                let _ = self.store.remove(&storage_key);
                return None;
            }
        };

        if Utc::now() > entry.expires_at {
            tracing::debug!(key, "cache entry expired");
            let _ = self.store.remove(&storage_key);
            return None;
        }

        Some(entry.value)
    }

    /// Store a value under `key` with the default TTL. Always overwrites.
    pub fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Store a value with an explicit TTL.
    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CoreError::Serialization(format!("TTL out of range: {e}")))?;
        let entry = CacheEntry {
            value,
            expires_at: Utc::now() + ttl,
        };
        let raw =
            serde_json::to_string(&entry).map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.store.write(&self.storage_key(key), &raw)
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{CACHE_PREFIX}{key}")
    }
}
