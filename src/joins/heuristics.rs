//! Name and type tests used by join detection.

use inflector::Inflector;

use super::JoinBasis;

/// Schemas that hold engine metadata rather than user tables.
const INTERNAL_SCHEMAS: [&str; 4] = ["information_schema", "pg_catalog", "system", "sys"];

/// Base types that never make useful join keys.
const NON_JOINABLE_TYPES: [&str; 18] = [
    "date",
    "time",
    "time with time zone",
    "timestamp",
    "timestamp with time zone",
    "boolean",
    "json",
    "jsonb",
    "interval",
    "blob",
    "array",
    "map",
    "row",
    "struct",
    "decimal",
    "float",
    "real",
    "varbinary",
];

/// Irregular plurals seen in table names that inflection gets wrong.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("analysis", "analyses"),
];

pub fn is_internal_schema(schema: &str) -> bool {
    INTERNAL_SCHEMAS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(schema))
}

/// Whether a column of this native type can take part in a join candidate.
///
/// Parameters are ignored (`decimal(10,2)` is `decimal`), and every
/// `varchar` flavor is excluded.
pub fn is_joinable_type(native_type: &str) -> bool {
    let lower = native_type.trim().to_lowercase();
    if lower.starts_with("varchar") || lower.starts_with("interval") {
        return false;
    }

    let base = match lower.find('(') {
        Some(i) => {
            // `timestamp(3) with time zone` keeps its suffix.
            let suffix = match lower.rfind(')') {
                Some(j) if j > i => &lower[j + 1..],
                _ => "",
            };
            format!("{}{}", lower[..i].trim_end(), suffix)
        }
        None => lower,
    };

    !NON_JOINABLE_TYPES.contains(&base.trim())
}

/// Underscores removed, lowercased.
pub fn normalize_column_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Pairwise joinability of two column names.
///
/// Exact (case-insensitive) match first, then normalized match, then shared
/// `_id` prefix.
pub fn joinability(left: &str, right: &str) -> Option<JoinBasis> {
    if left.eq_ignore_ascii_case(right) {
        return Some(JoinBasis::ExactName);
    }
    if normalize_column_name(left) == normalize_column_name(right) {
        return Some(JoinBasis::NormalizedName);
    }
    match (id_prefix(left), id_prefix(right)) {
        (Some(l), Some(r)) if l.eq_ignore_ascii_case(r) => Some(JoinBasis::NormalizedName),
        _ => None,
    }
}

/// `customer` for `customer_id`.
pub fn id_prefix(column: &str) -> Option<&str> {
    let len = column.len();
    if len > 3 && column.is_char_boundary(len - 3) && column[len - 3..].eq_ignore_ascii_case("_id") {
        Some(&column[..len - 3])
    } else {
        None
    }
}

/// Whether `table` is named after `prefix`: the prefix itself, the prefix
/// plus `s`, or its plural.
pub fn table_matches_prefix(table: &str, prefix: &str) -> bool {
    let table = table.to_lowercase();
    let prefix = prefix.to_lowercase();
    table == prefix || table == format!("{}s", prefix) || table == pluralize(&prefix)
}

/// Pluralize a word, irregulars first, then inflection rules.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return plural.to_string();
        }
    }
    lower.to_plural()
}
