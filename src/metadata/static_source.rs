//! In-process metadata source backed by a fixed catalog tree.
//!
//! Used for offline schema generation (`--fixture`) and throughout the test
//! suite. The tree is loaded from JSON shaped as
//! `{ catalog: { schema: { table: [ { "name": .., "type": .. } ] } } }`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::source::{MetadataSource, SourceError, SourceResult};
use super::types::{ColumnDescription, Row};
use crate::query::BoundQuery;

type TableTree = BTreeMap<String, Vec<ColumnDescription>>;
type SchemaTree = BTreeMap<String, TableTree>;
type CatalogTree = BTreeMap<String, SchemaTree>;

/// A metadata source that answers from memory.
#[derive(Debug, Default)]
pub struct StaticMetadataSource {
    catalogs: CatalogTree,
    failing: BTreeSet<String>,
    rows: Vec<Row>,
    executed: Mutex<Vec<BoundQuery>>,
    calls: AtomicUsize,
}

impl StaticMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture from a JSON string.
    pub fn from_json(json: &str) -> SourceResult<Self> {
        let catalogs: CatalogTree = serde_json::from_str(json)
            .map_err(|e| SourceError::Unavailable(format!("invalid fixture: {}", e)))?;
        Ok(Self {
            catalogs,
            ..Self::default()
        })
    }

    /// Load a fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SourceError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Add a table, creating its catalog and schema as needed.
    pub fn with_table(
        mut self,
        catalog: &str,
        schema: &str,
        table: &str,
        columns: &[(&str, &str)],
    ) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| ColumnDescription::new(*name, *ty))
            .collect();
        self.catalogs
            .entry(catalog.to_string())
            .or_default()
            .entry(schema.to_string())
            .or_default()
            .insert(table.to_string(), columns);
        self
    }

    /// Add an empty schema.
    pub fn with_schema(mut self, catalog: &str, schema: &str) -> Self {
        self.catalogs
            .entry(catalog.to_string())
            .or_default()
            .entry(schema.to_string())
            .or_default();
        self
    }

    /// Make every request that touches `catalog` fail.
    pub fn with_failing_catalog(mut self, catalog: &str) -> Self {
        self.catalogs.entry(catalog.to_string()).or_default();
        self.failing.insert(catalog.to_string());
        self
    }

    /// Rows returned by every `execute_query` call.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Number of requests answered so far, failures included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received by `execute_query`, in order.
    pub fn executed_queries(&self) -> Vec<BoundQuery> {
        match self.executed.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn catalog(&self, catalog: &str) -> SourceResult<&SchemaTree> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(catalog) {
            return Err(SourceError::Unavailable(format!(
                "catalog '{}' is unavailable",
                catalog
            )));
        }
        self.catalogs
            .get(catalog)
            .ok_or_else(|| SourceError::NotFound(catalog.to_string()))
    }

    fn schema(&self, catalog: &str, schema: &str) -> SourceResult<&TableTree> {
        self.catalog(catalog)?
            .get(schema)
            .ok_or_else(|| SourceError::NotFound(format!("{}.{}", catalog, schema)))
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn list_catalogs(&self) -> SourceResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalogs.keys().cloned().collect())
    }

    async fn list_schemas(&self, catalog: &str) -> SourceResult<Vec<String>> {
        Ok(self.catalog(catalog)?.keys().cloned().collect())
    }

    async fn list_tables(&self, catalog: &str, schema: &str) -> SourceResult<Vec<String>> {
        Ok(self.schema(catalog, schema)?.keys().cloned().collect())
    }

    async fn describe_columns(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> SourceResult<Vec<ColumnDescription>> {
        self.schema(catalog, schema)?
            .get(table)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("{}.{}.{}", catalog, schema, table)))
    }

    async fn execute_query(&self, query: &BoundQuery) -> SourceResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.executed.lock() {
            Ok(mut guard) => guard.push(query.clone()),
            Err(poisoned) => poisoned.into_inner().push(query.clone()),
        }
        Ok(self.rows.clone())
    }
}
