//! Test utilities for SQL emission validation.

use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Validates that a generated statement parses.
///
/// `?` placeholders and double-quoted identifiers are accepted by the
/// generic dialect, which is close enough to the engine's grammar for the
/// statements this crate emits.
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&GenericDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT t1.* FROM \"hive\".\"sales\".\"orders\" t1 LIMIT 10").unwrap();
        validate_sql("SELECT * FROM \"t\" WHERE \"a\" = ? AND \"b\" LIKE ?").unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        assert!(validate_sql("SELEC * FORM users").is_err());
    }
}
