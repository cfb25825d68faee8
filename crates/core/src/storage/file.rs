use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::backend::StorageBackend;
use crate::errors::CoreError;

/// File-backed storage: one JSON document holding every key.
///
/// The document is read once when the store is opened and rewritten wholesale
/// on every mutation — there is no incremental diff and no locking, which is
/// acceptable because mutations are not interleaved mid-write.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the backing document. An unreadable document falls
    /// back to an empty profile rather than refusing to open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "stored data is unreadable — starting from an empty profile"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CoreError::PersistenceRead(e.to_string())),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), CoreError> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::PersistenceWrite(e.to_string()))?;
            }
        }
        std::fs::write(&self.path, raw).map_err(|e| CoreError::PersistenceWrite(e.to_string()))
    }
}

impl StorageBackend for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        self.flush(&entries)
    }
}
