//! MetadataSource trait definition.
//!
//! The metadata source is the engine-facing side of discovery and query
//! execution. Every name passed in or returned is a raw engine name; the
//! identifier codec is applied by the callers, never by the source.

use async_trait::async_trait;

use super::types::{ColumnDescription, Row};
use crate::query::BoundQuery;
use crate::worker::WorkerError;

/// Errors returned by a metadata source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The worker transport failed or the engine rejected the request.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// The requested catalog, schema or table does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The engine could not run the request.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Result type for metadata source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Engine-side discovery and query execution.
///
/// # Example
///
/// ```ignore
/// use catalogql::metadata::MetadataSource;
///
/// async fn example(source: &dyn MetadataSource) -> SourceResult<()> {
///     for catalog in source.list_catalogs().await? {
///         let schemas = source.list_schemas(&catalog).await?;
///         println!("{catalog}: {schemas:?}");
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// `SHOW CATALOGS`
    async fn list_catalogs(&self) -> SourceResult<Vec<String>>;

    /// `SHOW SCHEMAS FROM <catalog>`
    async fn list_schemas(&self, catalog: &str) -> SourceResult<Vec<String>>;

    /// `SHOW TABLES FROM <catalog>.<schema>`
    async fn list_tables(&self, catalog: &str, schema: &str) -> SourceResult<Vec<String>>;

    /// `DESCRIBE <catalog>.<schema>.<table>`
    async fn describe_columns(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> SourceResult<Vec<ColumnDescription>>;

    /// Execute a parameter-bound query and return its rows.
    async fn execute_query(&self, query: &BoundQuery) -> SourceResult<Vec<Row>>;
}
