use std::sync::Arc;

use catalogql::cache::{self, CachePath, MemoryMetadataCache, MetadataStore};
use catalogql::metadata::{ColumnMetadata, MetadataWalker, StaticMetadataSource, WalkerOptions};

struct Harness {
    walker: MetadataWalker,
    source: Arc<StaticMetadataSource>,
    cache: Arc<MemoryMetadataCache>,
}

fn harness(source: StaticMetadataSource, options: WalkerOptions) -> Harness {
    let source = Arc::new(source);
    let cache = Arc::new(MemoryMetadataCache::new());
    let walker = MetadataWalker::new(source.clone(), cache.clone(), options);
    Harness {
        walker,
        source,
        cache,
    }
}

fn tree() -> StaticMetadataSource {
    StaticMetadataSource::new()
        .with_table("hive", "sales", "orders", &[("id", "bigint"), ("customer_id", "bigint")])
        .with_table("hive", "sales", "customers", &[("id", "bigint")])
        .with_table("hive", "web", "events", &[("ts", "timestamp")])
}

#[tokio::test]
async fn test_second_call_served_from_cache() {
    let h = harness(tree(), WalkerOptions::default());

    let first = h.walker.list_tables("hive", "sales").await;
    let calls = h.source.call_count();
    let second = h.walker.list_tables("hive", "sales").await;

    assert_eq!(first, vec!["customers", "orders"]);
    assert_eq!(first, second);
    assert_eq!(h.source.call_count(), calls);
}

#[tokio::test]
async fn test_failure_is_cached_as_empty() {
    let source = tree().with_failing_catalog("broken");
    let h = harness(source, WalkerOptions::default());

    assert!(h.walker.list_schemas("broken").await.is_empty());
    let calls = h.source.call_count();
    assert!(h.walker.list_schemas("broken").await.is_empty());

    assert_eq!(h.source.call_count(), calls);
    let cached: Option<Vec<String>> = cache::load(h.cache.as_ref(), &CachePath::schemas("broken")).unwrap();
    assert_eq!(cached, Some(Vec::new()));
}

#[tokio::test]
async fn test_cache_bypass_still_writes() {
    let options = WalkerOptions {
        use_cache: false,
        ..WalkerOptions::default()
    };
    let h = harness(tree(), options);

    h.walker.list_schemas("hive").await;
    h.walker.list_schemas("hive").await;

    assert_eq!(h.source.call_count(), 2);
    assert!(h.cache.get(&CachePath::schemas("hive")).unwrap().is_some());
}

#[tokio::test]
async fn test_stale_cache_wins_over_source() {
    let h = harness(tree(), WalkerOptions::default());
    cache::save(h.cache.as_ref(), &CachePath::schemas("hive"), &vec!["archived"]).unwrap();

    assert_eq!(h.walker.list_schemas("hive").await, vec!["archived"]);
    assert_eq!(h.source.call_count(), 0);
}

#[tokio::test]
async fn test_catalog_columns_in_listing_order() {
    let h = harness(tree(), WalkerOptions::default());

    let columns = h.walker.catalog_columns("hive").await;
    let names: Vec<String> = columns.iter().map(ColumnMetadata::qualified_name).collect();

    assert_eq!(
        names,
        vec![
            "hive.sales.customers.id",
            "hive.sales.orders.id",
            "hive.sales.orders.customer_id",
            "hive.web.events.ts",
        ]
    );
}

#[tokio::test]
async fn test_raw_names_sent_to_source() {
    let source = StaticMetadataSource::new().with_table("hive", "web-logs", "2024", &[("user id", "varchar")]);
    let options = WalkerOptions {
        replace_invalid_characters: true,
        ..WalkerOptions::default()
    };
    let h = harness(source, options);

    // The source only knows the raw names; sanitized arguments are restored first.
    let columns = h.walker.list_columns("hive", "web_U002D_logs", "_U0032_024").await;

    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column, "user_U0020_id");
    assert_eq!(columns[0].native_type, "varchar");
}

#[tokio::test]
async fn test_invalidate_whole_cache() {
    let h = harness(tree(), WalkerOptions::default());
    h.walker.catalog_columns("hive").await;
    let populated = h.cache.stats().unwrap().entry_count;

    assert_eq!(h.walker.invalidate(None), populated);
    assert_eq!(h.cache.stats().unwrap().entry_count, 0);
}
