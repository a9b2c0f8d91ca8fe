use catalogql::schema::types::{map_type, uses_key_value, OutputType, ScalarKind};

fn rendered(native: &str) -> String {
    map_type(native).to_string()
}

#[test]
fn test_scalar_mapping_table() {
    let cases = [
        ("boolean", "Boolean"),
        ("tinyint", "Int"),
        ("smallint", "Int"),
        ("integer", "Int"),
        ("int", "Int"),
        ("bigint", "String"),
        ("real", "Float"),
        ("double", "Float"),
        ("float", "Float"),
        ("varchar", "String"),
        ("date", "String"),
        ("timestamp with time zone", "String"),
        ("decimal(38,0)", "String"),
        ("uuid", "String"),
    ];

    for (native, expected) in cases {
        assert_eq!(rendered(native), expected, "native type {}", native);
    }
}

#[test]
fn test_arrays_wrap_element_type() {
    assert_eq!(rendered("array(varchar)"), "[String]");
    assert_eq!(rendered("array(double)"), "[Float]");
    assert_eq!(rendered("ARRAY(BOOLEAN)"), "[Boolean]");
    assert_eq!(rendered("array(array(bigint))"), "[[String]]");
}

#[test]
fn test_maps_become_key_value_lists() {
    let ty = map_type("map(varchar, array(integer))");

    assert_eq!(ty, OutputType::list(OutputType::Object("KeyValue".to_string())));
    assert!(uses_key_value(&ty));
    assert!(!uses_key_value(&map_type("array(varchar)")));
}

#[test]
fn test_row_types_are_strings() {
    assert_eq!(
        map_type("row(a integer, b varchar)"),
        OutputType::Scalar(ScalarKind::String)
    );
}
