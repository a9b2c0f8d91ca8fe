//! Table query execution.

use std::sync::Arc;

use super::error::QueryResult;
use super::filter::FilterInput;
use super::translate::{translate, BoundQuery};
use crate::ident::sanitize;
use crate::metadata::{MetadataSource, Row};

/// Row cap applied when a request does not carry a limit.
pub const DEFAULT_LIMIT: i64 = 1000;

/// Runs table queries for root field resolvers.
///
/// Stateless per request; one service is shared by all concurrent requests.
pub struct TableQueryService {
    source: Arc<dyn MetadataSource>,
    default_limit: i64,
}

impl TableQueryService {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// Build the bound query without running it.
    pub fn prepare(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        limit: Option<i64>,
        filters: &[FilterInput],
    ) -> QueryResult<BoundQuery> {
        translate(
            catalog,
            schema,
            table,
            limit.unwrap_or(self.default_limit),
            filters,
        )
    }

    /// Query one table. Result column names are sanitized so they line up
    /// with the generated field names.
    pub async fn query_table(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        limit: Option<i64>,
        filters: &[FilterInput],
    ) -> QueryResult<Vec<Row>> {
        let query = self.prepare(catalog, schema, table, limit, filters)?;
        tracing::info!(sql = %query.sql, params = query.params.len(), "executing table query");

        let rows = self.source.execute_query(&query).await?;
        tracing::debug!(rows = rows.len(), "table query finished");

        Ok(rows.into_iter().map(sanitize_row).collect())
    }
}

fn sanitize_row(row: Row) -> Row {
    row.into_iter().map(|(k, v)| (sanitize(&k), v)).collect()
}
