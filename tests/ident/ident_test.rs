use std::sync::LazyLock;

use catalogql::ident::{is_valid_identifier, restore, sanitize};
use proptest::prelude::*;
use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_U[0-9A-Fa-f]{4,6}_").unwrap());

/// Conformant names are kept verbatim, so token text inside them decodes.
fn is_literal_token_name(name: &str) -> bool {
    is_valid_identifier(name) && TOKEN.is_match(name)
}

#[test]
fn test_conforming_names_pass_through() {
    for name in ["orders", "_tmp", "Order_Lines_2", "a"] {
        assert_eq!(sanitize(name), name);
        assert_eq!(restore(name), name);
    }
}

#[test]
fn test_engine_names_round_trip() {
    let names = [
        "web-logs",
        "2024",
        "user id",
        "caf\u{e9}",
        "\u{1F600}",
        "ma\u{f1}ana-2",
        "x.y.z",
        "\u{65e5}\u{672c}",
    ];

    for name in names {
        let encoded = sanitize(name);
        assert!(is_valid_identifier(&encoded), "{} -> {}", name, encoded);
        assert_eq!(restore(&encoded), name);
    }
}

#[test]
fn test_leading_digit_is_escaped() {
    assert_eq!(sanitize("2024"), "_U0032_024");
    assert_eq!(sanitize("1st_quarter"), "_U0031_st_quarter");
}

#[test]
fn test_escape_uses_uppercase_hex() {
    assert_eq!(sanitize("a\u{ff}b"), "a_U00FF_b");
    assert_eq!(sanitize("\u{10ffff}"), "_U10FFFF_");
}

#[test]
fn test_restore_accepts_lowercase_hex() {
    assert_eq!(restore("a_U00ff_b"), "a\u{ff}b");
}

#[test]
fn test_restore_keeps_invalid_tokens() {
    assert_eq!(restore("_UDFFF_"), "_UDFFF_");
    assert_eq!(restore("_U1234567_"), "_U1234567_");
    assert_eq!(restore("plain_U_text"), "plain_U_text");
}

#[test]
fn test_empty_name() {
    assert_eq!(sanitize(""), "");
    assert_eq!(restore(""), "");
}

#[test]
fn test_token_like_text_next_to_escape_round_trips() {
    for name in ["_UABCD-", "a_U0041 ", "col_Ubeef.x", "x_U0041_-", "_U10FFFF\u{e9}"] {
        let encoded = sanitize(name);
        assert!(is_valid_identifier(&encoded), "{} -> {}", name, encoded);
        assert_eq!(restore(&encoded), name, "{} -> {}", name, encoded);
    }
}

proptest! {
    #[test]
    fn sanitized_names_are_valid_identifiers(name in r"\PC+") {
        prop_assert!(is_valid_identifier(&sanitize(&name)));
    }

    #[test]
    fn arbitrary_names_round_trip(name in r"\PC*") {
        prop_assume!(!is_literal_token_name(&name));
        prop_assert_eq!(restore(&sanitize(&name)), name);
    }

    #[test]
    fn token_heavy_names_round_trip(name in r"[_UuA-Fa-f0-9 .\-é]{0,24}") {
        prop_assume!(!is_literal_token_name(&name));
        let encoded = sanitize(&name);
        prop_assert!(name.is_empty() || is_valid_identifier(&encoded));
        prop_assert_eq!(restore(&encoded), name);
    }
}
