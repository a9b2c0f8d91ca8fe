use std::sync::Arc;

use catalogql::cache::{self, CachePath, MemoryMetadataCache};
use catalogql::joins::{JoinBasis, JoinCandidate, JoinDetector, JoinStrategy};
use catalogql::metadata::{ColumnMetadata, MetadataWalker, StaticMetadataSource, WalkerOptions};

fn col(schema: &str, table: &str, column: &str, ty: &str) -> ColumnMetadata {
    ColumnMetadata::new("hive", schema, table, column, ty)
}

fn same_schema() -> JoinDetector {
    JoinDetector::new(JoinStrategy::SameSchema)
}

fn pairs(candidates: &[JoinCandidate]) -> Vec<(String, String, JoinBasis)> {
    candidates
        .iter()
        .map(|c| (c.left.qualified_name(), c.right.qualified_name(), c.basis))
        .collect()
}

#[test]
fn test_foreign_key_suffix() {
    let columns = [
        col("shop", "orders", "user_id", "integer"),
        col("shop", "users", "id", "integer"),
    ];

    let candidates = same_schema().detect(&columns);

    assert_eq!(
        pairs(&candidates),
        vec![(
            "hive.shop.orders.user_id".to_string(),
            "hive.shop.users.id".to_string(),
            JoinBasis::ForeignKeySuffix
        )]
    );
}

#[test]
fn test_shared_column_name() {
    let columns = [
        col("hr", "employees", "dept_id", "integer"),
        col("hr", "departments", "dept_id", "integer"),
    ];

    let candidates = same_schema().detect(&columns);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].basis, JoinBasis::ExactName);
    assert_eq!(candidates[0].left.table, "departments");
    assert_eq!(candidates[0].right.table, "employees");
}

#[test]
fn test_unrelated_text_columns() {
    let columns = [
        col("crm", "users", "manager", "varchar"),
        col("crm", "companies", "company_name", "varchar"),
    ];

    assert!(same_schema().detect(&columns).is_empty());
}

#[test]
fn test_normalized_name() {
    let columns = [
        col("crm", "a", "customerid", "bigint"),
        col("crm", "b", "Customer_ID", "bigint"),
    ];

    let candidates = same_schema().detect(&columns);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].basis, JoinBasis::NormalizedName);
}

#[test]
fn test_plural_and_irregular_tables() {
    let columns = [
        col("shop", "products", "category_id", "bigint"),
        col("shop", "categories", "id", "bigint"),
        col("shop", "visits", "person_id", "bigint"),
        col("shop", "people", "id", "bigint"),
    ];

    let candidates = same_schema().detect(&columns);
    let fk: Vec<_> = pairs(&candidates)
        .into_iter()
        .filter(|(_, _, basis)| *basis == JoinBasis::ForeignKeySuffix)
        .map(|(left, right, _)| (left, right))
        .collect();

    assert!(fk.contains(&(
        "hive.shop.products.category_id".to_string(),
        "hive.shop.categories.id".to_string()
    )));
    assert!(fk.contains(&(
        "hive.shop.visits.person_id".to_string(),
        "hive.shop.people.id".to_string()
    )));
}

#[test]
fn test_strategy_scope() {
    let columns = [
        col("sales", "orders", "user_id", "integer"),
        col("identity", "users", "id", "integer"),
    ];

    assert!(same_schema().detect(&columns).is_empty());

    let global = JoinDetector::new(JoinStrategy::Global).detect(&columns);
    assert_eq!(global.len(), 1);
    assert_eq!(global[0].basis, JoinBasis::ForeignKeySuffix);
}

#[test]
fn test_ignored_types_and_schemas() {
    let columns = [
        col("shop", "orders", "created_at", "timestamp(3) with time zone"),
        col("shop", "returns", "created_at", "timestamp(3) with time zone"),
        col("shop", "orders", "price", "decimal(10,2)"),
        col("shop", "returns", "price", "decimal(10,2)"),
        col("information_schema", "tables", "table_id", "integer"),
        col("information_schema", "columns", "table_id", "integer"),
    ];

    assert!(JoinDetector::new(JoinStrategy::Global).detect(&columns).is_empty());
}

#[test]
fn test_same_table_pairs_skipped() {
    let columns = [
        col("hr", "employees", "id", "integer"),
        col("hr", "employees", "employee_id", "integer"),
    ];

    assert!(same_schema().detect(&columns).is_empty());
}

#[test]
fn test_candidate_display() {
    let columns = [
        col("shop", "orders", "user_id", "integer"),
        col("shop", "users", "id", "integer"),
    ];

    let candidates = same_schema().detect(&columns);

    assert_eq!(
        candidates[0].to_string(),
        "hive.shop.orders.user_id (integer) -> hive.shop.users.id (integer) [foreign key suffix]"
    );
}

#[tokio::test]
async fn test_detect_catalog_caches_result() {
    let source = StaticMetadataSource::new()
        .with_table("hive", "shop", "orders", &[("id", "bigint"), ("user_id", "bigint")])
        .with_table("hive", "shop", "users", &[("id", "bigint"), ("email", "varchar")]);
    let store = Arc::new(MemoryMetadataCache::new());
    let walker = MetadataWalker::new(Arc::new(source), store.clone(), WalkerOptions::default());

    let candidates = same_schema().detect_catalog(&walker, "hive").await;

    // orders.id <-> users.id by name, orders.user_id -> users.id by suffix.
    assert_eq!(candidates.len(), 2);
    let cached: Option<Vec<JoinCandidate>> = cache::load(store.as_ref(), &CachePath::joins("hive")).unwrap();
    assert_eq!(cached, Some(candidates));
}
