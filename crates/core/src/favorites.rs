use std::sync::Arc;

use crate::errors::CoreError;
use crate::storage::backend::StorageBackend;

/// Storage key for the serialized favorites list.
pub const FAVORITES_KEY: &str = "cryptoFavorites";

/// User-curated set of asset ids, unique by construction and persisted the
/// same way the ledger is: in-memory list as source of truth, whole
/// collection rewritten on every mutation. Insertion order is preserved.
pub struct FavoriteSet {
    store: Arc<dyn StorageBackend>,
    ids: Vec<String>,
}

impl FavoriteSet {
    /// Load the persisted list. Unreadable stored JSON is logged and treated
    /// as an empty set.
    pub fn load(store: Arc<dyn StorageBackend>) -> Result<Self, CoreError> {
        let ids = match store.read(FAVORITES_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "stored favorites are unreadable — starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { store, ids })
    }

    /// Add the id if absent, remove it if present. Returns `true` when the
    /// id is a favorite after the call.
    pub fn toggle(&mut self, crypto_id: &str) -> Result<bool, CoreError> {
        let now_favorite = if let Some(idx) = self.ids.iter().position(|id| id == crypto_id) {
            self.ids.remove(idx);
            false
        } else {
            self.ids.push(crypto_id.to_string());
            true
        };
        self.persist()?;
        tracing::info!(crypto_id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    pub fn contains(&self, crypto_id: &str) -> bool {
        self.ids.iter().any(|id| id == crypto_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn persist(&self) -> Result<(), CoreError> {
        let raw =
            serde_json::to_string(&self.ids).map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.store.write(FAVORITES_KEY, &raw)
    }
}
