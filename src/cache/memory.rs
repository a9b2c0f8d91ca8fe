//! In-memory discovery cache.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{CacheError, CachePath, CacheResult, CacheStats, MetadataStore};

/// Process-local cache, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryMetadataCache {
    entries: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MemoryMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, BTreeMap<String, serde_json::Value>>> {
        self.entries.lock().map_err(|_| CacheError::Poisoned)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

impl MetadataStore for MemoryMetadataCache {
    fn get(&self, path: &CachePath) -> CacheResult<Option<serde_json::Value>> {
        Ok(self.lock()?.get(&path.key()).cloned())
    }

    fn put(&self, path: &CachePath, value: serde_json::Value) -> CacheResult<()> {
        self.lock()?.insert(path.key(), value);
        Ok(())
    }

    fn remove(&self, path: &CachePath) -> CacheResult<bool> {
        Ok(self.lock()?.remove(&path.key()).is_some())
    }

    fn clear_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }

    fn stats(&self) -> CacheResult<CacheStats> {
        let entries = self.lock()?;
        let total_size_bytes = entries.values().map(|v| v.to_string().len()).sum();
        Ok(CacheStats {
            entry_count: entries.len(),
            total_size_bytes,
        })
    }
}
