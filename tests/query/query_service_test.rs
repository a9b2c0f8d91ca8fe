use std::sync::Arc;

use async_trait::async_trait;
use catalogql::metadata::{ColumnDescription, MetadataSource, Row, SourceError, SourceResult, StaticMetadataSource};
use catalogql::query::{BoundQuery, FilterInput, ParamValue, QueryError, TableQueryService, DEFAULT_LIMIT};
use serde_json::json;

/// Engine that refuses every request.
struct DownSource;

#[async_trait]
impl MetadataSource for DownSource {
    async fn list_catalogs(&self) -> SourceResult<Vec<String>> {
        Err(SourceError::Unavailable("engine down".into()))
    }

    async fn list_schemas(&self, _catalog: &str) -> SourceResult<Vec<String>> {
        Err(SourceError::Unavailable("engine down".into()))
    }

    async fn list_tables(&self, _catalog: &str, _schema: &str) -> SourceResult<Vec<String>> {
        Err(SourceError::Unavailable("engine down".into()))
    }

    async fn describe_columns(
        &self,
        _catalog: &str,
        _schema: &str,
        _table: &str,
    ) -> SourceResult<Vec<ColumnDescription>> {
        Err(SourceError::Unavailable("engine down".into()))
    }

    async fn execute_query(&self, _query: &BoundQuery) -> SourceResult<Vec<Row>> {
        Err(SourceError::Unavailable("engine down".into()))
    }
}

fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[tokio::test]
async fn test_query_sends_bound_statement() {
    let source = Arc::new(StaticMetadataSource::new().with_rows(vec![row(&[("id", json!(1))])]));
    let service = TableQueryService::new(source.clone());

    let filters = [FilterInput::new("name", "like").string("ali")];
    let rows = service
        .query_table("hive", "crm", "people", Some(20), &filters)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let executed = source.executed_queries();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].sql,
        r#"SELECT t1.* FROM "hive"."crm"."people" t1 WHERE "name" LIKE ? LIMIT 20"#
    );
    assert_eq!(executed[0].params, vec![ParamValue::String("%ali%".into())]);
}

#[tokio::test]
async fn test_default_limit() {
    let source = Arc::new(StaticMetadataSource::new());
    let service = TableQueryService::new(source.clone());

    assert_eq!(service.default_limit(), DEFAULT_LIMIT);
    service.query_table("hive", "crm", "people", None, &[]).await.unwrap();

    assert!(source.executed_queries()[0].sql.ends_with("LIMIT 1000"));
}

#[tokio::test]
async fn test_result_keys_are_sanitized() {
    let source = Arc::new(StaticMetadataSource::new().with_rows(vec![row(&[
        ("user id", json!("u1")),
        ("2024 total", json!(42)),
        ("plain", json!(null)),
    ])]));
    let service = TableQueryService::new(source);

    let rows = service.query_table("hive", "crm", "people", None, &[]).await.unwrap();

    let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert!(keys.contains(&"user_U0020_id"));
    assert!(keys.contains(&"_U0032_024_U0020_total"));
    assert!(keys.contains(&"plain"));
    assert_eq!(rows[0]["user_U0020_id"], json!("u1"));
}

#[tokio::test]
async fn test_invalid_filter_never_reaches_engine() {
    let source = Arc::new(StaticMetadataSource::new());
    let service = TableQueryService::new(source.clone());

    let filters = [FilterInput::new("age", "gt")];
    let result = service.query_table("hive", "crm", "people", None, &filters).await;

    assert!(matches!(result, Err(QueryError::InvalidFilter { .. })));
    assert!(source.executed_queries().is_empty());
}

#[tokio::test]
async fn test_engine_failure_is_reported() {
    let service = TableQueryService::new(Arc::new(DownSource));

    let err = service
        .query_table("hive", "crm", "people", None, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Source(SourceError::Unavailable(_))));
}

#[test]
fn test_prepare_negative_limit() {
    let service = TableQueryService::new(Arc::new(StaticMetadataSource::new()));

    assert!(matches!(
        service.prepare("hive", "crm", "people", Some(-10), &[]),
        Err(QueryError::InvalidLimit(-10))
    ));
}
