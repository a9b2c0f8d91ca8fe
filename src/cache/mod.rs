//! Discovery cache.
//!
//! Every discovery call (catalog list, schema list, table list, column list)
//! and every join detection result is stored under a path built from the
//! sanitized names leading to it. Sanitized segments never contain `/`, so
//! the rendered key is unambiguous.
//!
//! # Design
//!
//! - Key-value store with JSON values
//! - No TTL - entries persist until cleared
//! - Failed lookups are stored as empty lists so they are not retried
//!
//! # Key Format
//!
//! ```text
//! catalogs                          -> ["hive", "postgres", ...]
//! {catalog}/schemas                 -> ["sales", ...]
//! {catalog}/{schema}/tables         -> ["orders", ...]
//! {catalog}/{schema}/{table}/columns-> [ColumnMetadata, ...]
//! {catalog}/joins                   -> [JoinCandidate, ...]
//! ```

mod hash;
mod memory;
mod sqlite;

pub use hash::{compute_hash, connection_namespace};
pub use memory::MemoryMetadataCache;
pub use sqlite::SqliteMetadataCache;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::ident::sanitize;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache lock poisoned")]
    Poisoned,
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size_bytes: usize,
}

/// What a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLeaf {
    Catalogs,
    Schemas,
    Tables,
    Columns,
    Joins,
}

impl CacheLeaf {
    fn as_str(self) -> &'static str {
        match self {
            CacheLeaf::Catalogs => "catalogs",
            CacheLeaf::Schemas => "schemas",
            CacheLeaf::Tables => "tables",
            CacheLeaf::Columns => "columns",
            CacheLeaf::Joins => "joins",
        }
    }
}

/// Location of a cache entry.
///
/// Segments are sanitized on construction, so callers may pass either raw or
/// already-sanitized names; sanitizing is idempotent on valid names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePath {
    segments: Vec<String>,
    leaf: CacheLeaf,
}

impl CachePath {
    pub fn catalogs() -> Self {
        Self::new(&[], CacheLeaf::Catalogs)
    }

    pub fn schemas(catalog: &str) -> Self {
        Self::new(&[catalog], CacheLeaf::Schemas)
    }

    pub fn tables(catalog: &str, schema: &str) -> Self {
        Self::new(&[catalog, schema], CacheLeaf::Tables)
    }

    pub fn columns(catalog: &str, schema: &str, table: &str) -> Self {
        Self::new(&[catalog, schema, table], CacheLeaf::Columns)
    }

    pub fn joins(catalog: &str) -> Self {
        Self::new(&[catalog], CacheLeaf::Joins)
    }

    fn new(segments: &[&str], leaf: CacheLeaf) -> Self {
        Self {
            segments: segments.iter().map(|s| sanitize(s)).collect(),
            leaf,
        }
    }

    pub fn leaf(&self) -> CacheLeaf {
        self.leaf
    }

    /// Rendered key, e.g. `hive/sales/tables`.
    pub fn key(&self) -> String {
        let mut key = String::new();
        for segment in &self.segments {
            key.push_str(segment);
            key.push('/');
        }
        key.push_str(self.leaf.as_str());
        key
    }

    /// Key prefix shared by every entry below `catalog`.
    pub fn catalog_prefix(catalog: &str) -> String {
        format!("{}/", sanitize(catalog))
    }
}

impl fmt::Display for CachePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Backing store for discovery results.
///
/// Implementations must tolerate concurrent calls; the walker may fan out
/// column lookups for the tables of a schema.
pub trait MetadataStore: Send + Sync {
    /// Read an entry.
    fn get(&self, path: &CachePath) -> CacheResult<Option<serde_json::Value>>;

    /// Write an entry, replacing any previous value.
    fn put(&self, path: &CachePath, value: serde_json::Value) -> CacheResult<()>;

    /// Remove one entry. Returns whether it existed.
    fn remove(&self, path: &CachePath) -> CacheResult<bool>;

    /// Remove every entry whose key starts with `prefix`. An empty prefix
    /// clears the whole store.
    fn clear_prefix(&self, prefix: &str) -> CacheResult<usize>;

    /// Entry count and payload size.
    fn stats(&self) -> CacheResult<CacheStats>;
}

/// Read and deserialize an entry.
pub fn load<T: DeserializeOwned>(
    store: &dyn MetadataStore,
    path: &CachePath,
) -> CacheResult<Option<T>> {
    match store.get(path)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and write an entry.
pub fn save<T: Serialize>(store: &dyn MetadataStore, path: &CachePath, value: &T) -> CacheResult<()> {
    store.put(path, serde_json::to_value(value)?)
}

/// Forget everything cached below `catalog`, or the whole store.
///
/// Clearing one catalog also drops the catalog list, which sits above every
/// catalog prefix.
pub fn invalidate(store: &dyn MetadataStore, catalog: Option<&str>) -> CacheResult<usize> {
    match catalog {
        Some(catalog) => {
            let removed = store.clear_prefix(&CachePath::catalog_prefix(catalog))?;
            let list = usize::from(store.remove(&CachePath::catalogs())?);
            Ok(removed + list)
        }
        None => store.clear_prefix(""),
    }
}
