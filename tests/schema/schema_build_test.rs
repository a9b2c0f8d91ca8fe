use std::sync::Arc;

use catalogql::cache::MemoryMetadataCache;
use catalogql::config::DiscoverySettings;
use catalogql::metadata::{MetadataWalker, StaticMetadataSource, WalkerOptions};
use catalogql::schema::{sdl, GeneratedSchema, SchemaBuilder, SchemaError};

fn walker(source: StaticMetadataSource, sanitize: bool) -> MetadataWalker {
    MetadataWalker::new(
        Arc::new(source),
        Arc::new(MemoryMetadataCache::new()),
        WalkerOptions {
            replace_invalid_characters: sanitize,
            use_cache: true,
        },
    )
}

async fn build(
    source: StaticMetadataSource,
    sanitize: bool,
    discovery: &DiscoverySettings,
) -> Result<GeneratedSchema, SchemaError> {
    let walker = walker(source, sanitize);
    SchemaBuilder::new(&walker, discovery).build().await
}

fn sales() -> StaticMetadataSource {
    StaticMetadataSource::new()
        .with_table(
            "hive",
            "sales",
            "orders",
            &[
                ("id", "bigint"),
                ("amount", "double"),
                ("tags", "array(varchar)"),
                ("attrs", "map(varchar, varchar)"),
            ],
        )
        .with_table(
            "hive",
            "sales",
            "customers",
            &[("id", "integer"), ("name", "varchar")],
        )
}

#[tokio::test]
async fn test_sdl_output() {
    let schema = build(sales(), false, &DiscoverySettings::default()).await.unwrap();
    let text = sdl::render(&schema);

    assert!(text.starts_with("schema {\n  query: Query\n  subscription: Subscription\n}\n"));
    assert!(text.contains("enum FilterOperator {\n"));
    assert!(text.contains("input FilterInput {\n"));

    let start = text.find("type KeyValue").unwrap();
    insta::assert_snapshot!(text[start..].trim_end(), @r#"
type KeyValue {
  key: String
  value: String
}

type hive_sales_customers {
  "Native type: integer"
  id: Int
  "Native type: varchar"
  name: String
}

type hive_sales_orders {
  "Native type: bigint"
  id: String
  "Native type: double"
  amount: Float
  "Native type: array(varchar)"
  tags: [String]
  "Native type: map(varchar, varchar)"
  attrs: [KeyValue]
}

type Query {
  "Catalogs available for querying"
  catalogs: [String]
  "Catalog: hive, Schema: sales, Table: customers"
  hive_sales_customers(limit: Int, filters: [FilterInput]): [hive_sales_customers]
  "Catalog: hive, Schema: sales, Table: orders"
  hive_sales_orders(limit: Int, filters: [FilterInput]): [hive_sales_orders]
}

type Subscription {
  "Catalog: hive, Schema: sales, Table: customers"
  hive_sales_customers(limit: Int, filters: [FilterInput]): [hive_sales_customers]
  "Catalog: hive, Schema: sales, Table: orders"
  hive_sales_orders(limit: Int, filters: [FilterInput]): [hive_sales_orders]
}
"#);
}

#[tokio::test]
async fn test_one_root_field_per_table() {
    let schema = build(sales(), false, &DiscoverySettings::default()).await.unwrap();

    assert_eq!(schema.catalogs, vec!["hive"]);
    assert_eq!(schema.table_count(), 2);
    assert_eq!(schema.query_fields, schema.subscription_fields);

    let orders = schema.root_field("hive_sales_orders").unwrap();
    assert_eq!(orders.ty.to_string(), "[hive_sales_orders]");
    assert_eq!(orders.table.qualified(), "hive.sales.orders");
    assert_eq!(
        orders.args.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        vec!["limit", "filters"]
    );
}

#[tokio::test]
async fn test_key_value_only_when_needed() {
    let source = StaticMetadataSource::new().with_table("pg", "public", "users", &[("id", "integer")]);
    let schema = build(source, false, &DiscoverySettings::default()).await.unwrap();

    assert!(schema.object_type("KeyValue").is_none());
    assert!(!sdl::render(&schema).contains("type KeyValue"));
}

#[tokio::test]
async fn test_sanitized_names() {
    let source = StaticMetadataSource::new().with_table(
        "hive",
        "web-logs",
        "2024",
        &[("user id", "varchar"), ("hits", "integer")],
    );
    let schema = build(source, true, &DiscoverySettings::default()).await.unwrap();

    let field = schema.root_field("hive_web_U002D_logs__U0032_024").unwrap();
    assert_eq!(
        field.description,
        "Catalog: hive, Schema: web_U002D_logs, Table: _U0032_024"
    );

    let object = schema.object_type("hive_web_U002D_logs__U0032_024").unwrap();
    let names: Vec<_> = object.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["user_U0020_id", "hits"]);
}

#[tokio::test]
async fn test_rebuild_is_stable() {
    let metadata = || {
        sales()
            .with_table(
                "pg",
                "web-logs",
                "2024",
                &[("user id", "varchar"), ("hits", "integer")],
            )
            .with_table("pg", "public", "users", &[("id", "integer"), ("email", "varchar")])
    };
    let discovery = DiscoverySettings::default();

    let first = build(metadata(), true, &discovery).await.unwrap();
    let second = build(metadata(), true, &discovery).await.unwrap();

    assert_eq!(first.table_count(), 4);
    assert_eq!(first, second);
    assert_eq!(sdl::render(&first), sdl::render(&second));
}

#[tokio::test]
async fn test_invalid_names_skipped_without_sanitizing() {
    let source = StaticMetadataSource::new()
        .with_table("hive", "web-logs", "hits", &[("id", "integer")])
        .with_table("hive", "sales", "orders", &[("id", "integer"), ("order date", "date")]);
    let schema = build(source, false, &DiscoverySettings::default()).await.unwrap();

    assert_eq!(schema.table_count(), 1);
    let orders = schema.object_type("hive_sales_orders").unwrap();
    assert_eq!(orders.fields.len(), 1);
    assert_eq!(orders.fields[0].name, "id");
}

#[tokio::test]
async fn test_table_without_columns_skipped() {
    let source = StaticMetadataSource::new()
        .with_table("hive", "sales", "empty", &[])
        .with_table("hive", "sales", "orders", &[("id", "integer")]);
    let schema = build(source, false, &DiscoverySettings::default()).await.unwrap();

    assert!(schema.root_field("hive_sales_empty").is_none());
    assert!(schema.root_field("hive_sales_orders").is_some());
}

#[tokio::test]
async fn test_failing_catalog_is_hidden() {
    let source = StaticMetadataSource::new()
        .with_failing_catalog("broken")
        .with_table("hive", "sales", "orders", &[("id", "integer")]);
    let schema = build(source, false, &DiscoverySettings::default()).await.unwrap();

    assert_eq!(schema.table_count(), 1);
    assert!(schema.root_field("hive_sales_orders").is_some());
}

#[tokio::test]
async fn test_discovery_filters() {
    let source = sales()
        .with_table("system", "runtime", "nodes", &[("node_id", "varchar")])
        .with_table("hive", "information_schema", "tables", &[("table_name", "varchar")]);
    let discovery = DiscoverySettings {
        exclude_catalogs: vec!["system".to_string()],
        exclude_schemas: vec!["information_schema".to_string()],
        ..DiscoverySettings::default()
    };
    let schema = build(source, false, &discovery).await.unwrap();

    assert_eq!(schema.catalogs, vec!["hive"]);
    assert_eq!(schema.table_count(), 2);
}

#[tokio::test]
async fn test_type_name_collision() {
    let source = StaticMetadataSource::new()
        .with_table("a_b", "c", "d", &[("id", "integer")])
        .with_table("a", "b_c", "d", &[("id", "integer")]);

    let err = build(source, false, &DiscoverySettings::default()).await.unwrap_err();
    match err {
        SchemaError::TypeNameCollision { name, first, second } => {
            assert_eq!(name, "a_b_c_d");
            assert_eq!(first, "a.b_c.d");
            assert_eq!(second, "a_b.c.d");
        }
    }
}

