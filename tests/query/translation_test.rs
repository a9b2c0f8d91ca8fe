use catalogql::query::{translate, FilterInput, ParamValue, QueryError};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

fn assert_parses(sql: &str) {
    if let Err(e) = Parser::parse_sql(&GenericDialect {}, sql) {
        panic!("generated SQL does not parse: {}\n{}", e, sql);
    }
}

#[test]
fn test_two_filters_are_conjoined() {
    let filters = [
        FilterInput::new("age", "gt").int(25),
        FilterInput::new("name", "eq").string("Alice"),
    ];

    let query = translate("hive", "crm", "people", 100, &filters).unwrap();

    assert_eq!(
        query.sql,
        r#"SELECT t1.* FROM "hive"."crm"."people" t1 WHERE "age" > ? AND "name" = ? LIMIT 100"#
    );
    assert_eq!(
        query.params,
        vec![ParamValue::Int(25), ParamValue::String("Alice".to_string())]
    );
    assert_parses(&query.sql);
}

#[test]
fn test_params_as_json_args() {
    let filters = [
        FilterInput::new("active", "eq").boolean(true),
        FilterInput::new("score", "lt").float(2.5),
    ];

    let query = translate("pg", "public", "users", 10, &filters).unwrap();

    assert_eq!(
        query.args(),
        vec![serde_json::json!(true), serde_json::json!(2.5)]
    );
}

#[test]
fn test_missing_value_is_invalid_filter() {
    let filters = [FilterInput::new("age", "gt")];

    let err = translate("hive", "crm", "people", 100, &filters).unwrap_err();

    assert!(matches!(err, QueryError::InvalidFilter { ref field, .. } if field == "age"));
    assert!(err.to_string().starts_with("invalid filter"));
}

#[test]
fn test_two_values_is_invalid_filter() {
    let filters = [FilterInput::new("age", "gt").int(25).string("25")];

    assert!(matches!(
        translate("hive", "crm", "people", 100, &filters),
        Err(QueryError::InvalidFilter { .. })
    ));
}

#[test]
fn test_unknown_operator() {
    let filters = [FilterInput::new("age", "bogus").int(25)];

    let err = translate("hive", "crm", "people", 100, &filters).unwrap_err();

    assert!(matches!(err, QueryError::UnsupportedOperator(ref op) if op == "bogus"));
    assert_eq!(err.to_string(), "unsupported operator: bogus");
}

#[test]
fn test_declared_but_untranslated_operators() {
    for op in [
        "neq", "gte", "lte", "not_like", "in", "not_in", "is_null", "is_not_null", "between", "not_between",
    ] {
        let filters = [FilterInput::new("age", op).int(1)];
        assert!(
            matches!(
                translate("hive", "crm", "people", 100, &filters),
                Err(QueryError::UnsupportedOperator(_))
            ),
            "operator {} should be rejected",
            op
        );
    }
}

#[test]
fn test_operator_case_insensitive() {
    let filters = [FilterInput::new("age", "GT").int(25)];

    let query = translate("hive", "crm", "people", 100, &filters).unwrap();

    assert!(query.sql.contains(r#""age" > ?"#));
}

#[test]
fn test_first_bad_filter_fails_whole_call() {
    let filters = [
        FilterInput::new("age", "gt").int(25),
        FilterInput::new("name", "bogus").string("x"),
    ];

    assert!(translate("hive", "crm", "people", 100, &filters).is_err());
}

#[test]
fn test_quoted_identifier_escaping() {
    let filters = [FilterInput::new("say_U0022_hi", "eq").string("x")];

    let query = translate("hive", "crm", "people", 1, &filters).unwrap();

    assert!(query.sql.contains(r#""say""hi" = ?"#));
    assert_parses(&query.sql);
}

#[test]
fn test_zero_limit_allowed() {
    let query = translate("hive", "crm", "people", 0, &[]).unwrap();

    assert!(query.sql.ends_with("LIMIT 0"));
}
