//! Catalog → schema → table → column discovery.
//!
//! Names handed out by the walker are sanitized when
//! `replace_invalid_characters` is on, raw otherwise. Names handed in are
//! restored before they reach the source. Every call consults the cache
//! first and writes back what it fetched; a failed fetch is logged and
//! stored as an empty list.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};

use super::source::{MetadataSource, SourceResult};
use super::types::ColumnMetadata;
use crate::cache::{self, CachePath, MetadataStore};
use crate::ident::{restore, sanitize};

/// Walker behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerOptions {
    /// Sanitize discovered names.
    pub replace_invalid_characters: bool,
    /// Read from the cache. Results are written back either way.
    pub use_cache: bool,
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self {
            replace_invalid_characters: false,
            use_cache: true,
        }
    }
}

/// Cache-first metadata discovery over a [`MetadataSource`].
pub struct MetadataWalker {
    source: Arc<dyn MetadataSource>,
    cache: Arc<dyn MetadataStore>,
    options: WalkerOptions,
}

impl MetadataWalker {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        cache: Arc<dyn MetadataStore>,
        options: WalkerOptions,
    ) -> Self {
        Self {
            source,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &Arc<dyn MetadataStore> {
        &self.cache
    }

    pub async fn list_catalogs(&self) -> Vec<String> {
        self.cached_or_fetch(CachePath::catalogs(), "SHOW CATALOGS".to_string(), async {
            let names = self.source.list_catalogs().await;
            names.map(|n| self.encode_names(n))
        })
        .await
    }

    pub async fn list_schemas(&self, catalog: &str) -> Vec<String> {
        let raw_catalog = restore(catalog);
        let statement = format!("SHOW SCHEMAS FROM {}", raw_catalog);

        self.cached_or_fetch(CachePath::schemas(catalog), statement, async {
            let names = self.source.list_schemas(&raw_catalog).await;
            names.map(|n| self.encode_names(n))
        })
        .await
    }

    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Vec<String> {
        let raw_catalog = restore(catalog);
        let raw_schema = restore(schema);
        let statement = format!("SHOW TABLES FROM {}.{}", raw_catalog, raw_schema);

        self.cached_or_fetch(CachePath::tables(catalog, schema), statement, async {
            let names = self.source.list_tables(&raw_catalog, &raw_schema).await;
            names.map(|n| self.encode_names(n))
        })
        .await
    }

    pub async fn list_columns(&self, catalog: &str, schema: &str, table: &str) -> Vec<ColumnMetadata> {
        let raw_catalog = restore(catalog);
        let raw_schema = restore(schema);
        let raw_table = restore(table);
        let statement = format!("DESCRIBE {}.{}.{}", raw_catalog, raw_schema, raw_table);

        self.cached_or_fetch(
            CachePath::columns(catalog, schema, table),
            statement,
            async {
                let described = self
                    .source
                    .describe_columns(&raw_catalog, &raw_schema, &raw_table)
                    .await;

                described.map(|columns| {
                    columns
                        .into_iter()
                        .map(|c| {
                            ColumnMetadata::new(
                                catalog,
                                schema,
                                table,
                                self.encode_name(c.name),
                                c.native_type,
                            )
                        })
                        .collect::<Vec<_>>()
                })
            },
        )
        .await
    }

    /// Every column of every table in `catalog`.
    ///
    /// Column lookups within a schema run concurrently; the result keeps
    /// schema and table listing order.
    pub async fn catalog_columns(&self, catalog: &str) -> Vec<ColumnMetadata> {
        let mut columns = Vec::new();

        for schema in self.list_schemas(catalog).await {
            let tables = self.list_tables(catalog, &schema).await;
            let described = join_all(
                tables
                    .iter()
                    .map(|table| self.list_columns(catalog, &schema, table)),
            )
            .await;
            columns.extend(described.into_iter().flatten());
        }

        columns
    }

    /// Forget everything cached below `catalog`, or the whole cache.
    pub fn invalidate(&self, catalog: Option<&str>) -> usize {
        cache::invalidate(self.cache.as_ref(), catalog).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to clear cache");
            0
        })
    }

    /// Store an arbitrary result next to the discovery entries.
    pub fn remember<T: Serialize>(&self, path: &CachePath, value: &T) {
        if let Err(e) = cache::save(self.cache.as_ref(), path, value) {
            tracing::warn!(path = %path, error = %e, "failed to write cache entry");
        }
    }

    /// `fetch` is only polled on a cache miss.
    async fn cached_or_fetch<T, Fut>(&self, path: CachePath, statement: String, fetch: Fut) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = SourceResult<Vec<T>>>,
    {
        if self.options.use_cache {
            match cache::load::<Vec<T>>(self.cache.as_ref(), &path) {
                Ok(Some(hit)) => {
                    tracing::debug!(path = %path, "cache hit");
                    return hit;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(path = %path, error = %e, "unreadable cache entry"),
            }
        }

        tracing::info!("{}", statement);
        let fetched = match fetch.await {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(error = %e, "{} failed", statement);
                Vec::new()
            }
        };

        self.remember(&path, &fetched);
        fetched
    }

    fn encode_names(&self, names: Vec<String>) -> Vec<String> {
        names.into_iter().map(|n| self.encode_name(n)).collect()
    }

    fn encode_name(&self, name: String) -> String {
        if self.options.replace_invalid_characters {
            sanitize(&name)
        } else {
            name
        }
    }
}
