//! Metadata types shared by discovery, schema assembly and join detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A column as reported by the engine's `DESCRIBE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    /// Column name.
    pub name: String,
    /// Engine-native type (e.g. `varchar`, `array(bigint)`).
    #[serde(rename = "type", alias = "native_type")]
    pub native_type: String,
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
        }
    }
}

/// A fully qualified column produced by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub native_type: String,
}

impl ColumnMetadata {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        native_type: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
            native_type: native_type.into(),
        }
    }

    /// `catalog.schema.table`
    pub fn table_name(&self) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, self.table)
    }

    /// `catalog.schema.table.column`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name(), self.column)
    }
}

impl fmt::Display for ColumnMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.qualified_name(), self.native_type)
    }
}

/// A result row keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;
