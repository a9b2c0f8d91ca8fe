//! MetadataSource backed by the worker process.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::source::{MetadataSource, SourceResult};
use super::types::{ColumnDescription, Row};
use crate::query::BoundQuery;
use crate::worker::protocol::{ConnectionParams, ExecuteQueryResponse};
use crate::worker::{WorkerClient, WorkerResult};

/// MetadataSource that forwards every call to the worker.
///
/// Discovery calls are retried once on a timeout or a dropped engine
/// connection. Queries are sent once.
///
/// # Example
///
/// ```ignore
/// use catalogql::worker::WorkerClient;
/// use catalogql::metadata::WorkerMetadataSource;
///
/// let client = WorkerClient::spawn_with_settings(&settings.worker).await?;
/// let source = WorkerMetadataSource::new(Arc::new(client), "trino", "http://localhost:8080");
///
/// let catalogs = source.list_catalogs().await?;
/// ```
pub struct WorkerMetadataSource {
    client: Arc<WorkerClient>,
    connection: ConnectionParams,
}

impl WorkerMetadataSource {
    pub fn new(
        client: Arc<WorkerClient>,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            client,
            connection: ConnectionParams {
                driver: driver.into(),
                connection_string: connection_string.into(),
            },
        }
    }
}

#[async_trait]
impl MetadataSource for WorkerMetadataSource {
    async fn list_catalogs(&self) -> SourceResult<Vec<String>> {
        Ok(retry_once("list_catalogs", || self.client.list_catalogs(&self.connection)).await?)
    }

    async fn list_schemas(&self, catalog: &str) -> SourceResult<Vec<String>> {
        Ok(retry_once("list_schemas", || {
            self.client.list_schemas(&self.connection, catalog)
        })
        .await?)
    }

    async fn list_tables(&self, catalog: &str, schema: &str) -> SourceResult<Vec<String>> {
        Ok(retry_once("list_tables", || {
            self.client.list_tables(&self.connection, catalog, schema)
        })
        .await?)
    }

    async fn describe_columns(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> SourceResult<Vec<ColumnDescription>> {
        let columns = retry_once("describe_columns", || {
            self.client
                .describe_columns(&self.connection, catalog, schema, table)
        })
        .await?;

        Ok(columns
            .into_iter()
            .map(|c| ColumnDescription::new(c.name, c.data_type))
            .collect())
    }

    async fn execute_query(&self, query: &BoundQuery) -> SourceResult<Vec<Row>> {
        let response = self
            .client
            .execute_query(&self.connection, &query.sql, query.args())
            .await?;

        Ok(rows_to_maps(response))
    }
}

/// Run a worker call, sending it a second time if the first failure is transient.
async fn retry_once<T, F, Fut>(op: &str, mut call: F) -> WorkerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WorkerResult<T>>,
{
    match call().await {
        Err(e) if e.is_retriable() => {
            tracing::warn!(op, error = %e, "retrying worker request");
            call().await
        }
        Err(e) => {
            if e.is_worker_exited() {
                tracing::error!(op, "worker is no longer running");
            }
            Err(e)
        }
        ok => ok,
    }
}

/// Zip positional rows with their column names.
fn rows_to_maps(response: ExecuteQueryResponse) -> Vec<Row> {
    let names: Vec<String> = response.columns.into_iter().map(|c| c.name).collect();

    response
        .rows
        .into_iter()
        .map(|values| names.iter().cloned().zip(values).collect())
        .collect()
}
