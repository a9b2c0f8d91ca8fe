//! SQLite-backed discovery cache.
//!
//! Stored at `~/.cache/catalogql/cache.db` unless configured otherwise.
//! Entries are namespaced by connection so one file can serve several
//! engines.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheError, CachePath, CacheResult, CacheStats, MetadataStore};

/// Current cache schema version. Bump this when the cache format changes.
const CACHE_VERSION: i32 = 1;

/// SQLite-based discovery cache.
pub struct SqliteMetadataCache {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteMetadataCache {
    /// Open or create the cache database at the default location.
    ///
    /// If the cache version doesn't match, it's automatically cleared.
    pub fn open(namespace: impl Into<String>) -> CacheResult<Self> {
        Self::open_at(Self::default_path()?, namespace)
    }

    /// Open or create the cache database at `path`.
    pub fn open_at(path: impl AsRef<Path>, namespace: impl Into<String>) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let cache = Self {
            conn: Mutex::new(Connection::open(path)?),
            namespace: namespace.into(),
        };
        cache.init()?;

        tracing::debug!(path = %path.display(), "opened metadata cache");
        Ok(cache)
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        let cache = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            namespace: String::new(),
        };
        cache.init()?;
        Ok(cache)
    }

    /// Default cache database location.
    pub fn default_path() -> CacheResult<PathBuf> {
        let base = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join("catalogql").join("cache.db"))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    fn full_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.namespace, key)
        }
    }

    /// Initialize the cache schema and check version.
    fn init(&self) -> CacheResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == CACHE_VERSION => {}
            Some(v) => {
                tracing::info!(from = v, to = CACHE_VERSION, "cache version changed, clearing");
                conn.execute("DELETE FROM cache", [])?;
                set_version(&conn)?;
            }
            None => set_version(&conn)?,
        }

        Ok(())
    }

    /// List keys (without namespace) starting with `prefix`.
    pub fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let full = self.full_key(prefix);
        let strip = self.full_key("").len();

        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT key FROM cache WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map(params![full], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys.into_iter().map(|k| k[strip..].to_string()).collect())
    }
}

fn set_version(conn: &Connection) -> CacheResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
        params![CACHE_VERSION.to_string()],
    )?;
    Ok(())
}

impl MetadataStore for SqliteMetadataCache {
    fn get(&self, path: &CachePath) -> CacheResult<Option<serde_json::Value>> {
        let key = self.full_key(&path.key());
        let json: Option<String> = self
            .lock()?
            .query_row("SELECT value FROM cache WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn put(&self, path: &CachePath, value: serde_json::Value) -> CacheResult<()> {
        let key = self.full_key(&path.key());
        let json = serde_json::to_string(&value)?;
        self.lock()?.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    fn remove(&self, path: &CachePath) -> CacheResult<bool> {
        let key = self.full_key(&path.key());
        let rows = self.lock()?.execute("DELETE FROM cache WHERE key = ?", params![key])?;
        Ok(rows > 0)
    }

    // LIKE would treat `_` in sanitized names as a wildcard.
    fn clear_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let full = self.full_key(prefix);
        let rows = self.lock()?.execute(
            "DELETE FROM cache WHERE substr(key, 1, length(?1)) = ?1",
            params![full],
        )?;
        Ok(rows)
    }

    fn stats(&self) -> CacheResult<CacheStats> {
        let full = self.full_key("");
        let conn = self.lock()?;
        let (entry_count, total_size): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(value)), 0) FROM cache
             WHERE substr(key, 1, length(?1)) = ?1",
            params![full],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(CacheStats {
            entry_count: entry_count as usize,
            total_size_bytes: total_size as usize,
        })
    }
}
