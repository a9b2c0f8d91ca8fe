//! Schema assembly.
//!
//! Walks the catalog tree once, builds one object type per table and one
//! query/subscription root field per table. Everything is registered into a
//! local [`TypeRegistry`] that is returned as a [`GeneratedSchema`] when the
//! walk completes; nothing is shared between builds.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{key_value_type, map_type, uses_key_value, FieldDef, ObjectType, OutputType, ScalarKind};
use crate::config::DiscoverySettings;
use crate::ident::is_valid_identifier;
use crate::metadata::{ColumnMetadata, MetadataWalker};

/// Type names the generated schema defines itself.
pub const RESERVED_TYPE_NAMES: [&str; 5] =
    ["Query", "Subscription", "FilterInput", "FilterOperator", "KeyValue"];

/// Errors that abort a schema build.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two tables (or a table and a built-in type) produce the same type name.
    #[error("type name '{name}' is produced by both {first} and {second}")]
    TypeNameCollision {
        name: String,
        first: String,
        second: String,
    },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// The table behind a root field. Names are as discovered (sanitized when
/// sanitizing is enabled).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TableRef {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// `catalog_schema_table`, used as both type name and field name.
    pub fn type_name(&self) -> String {
        format!("{}_{}_{}", self.catalog, self.schema, self.table)
    }

    /// `catalog.schema.table`
    pub fn qualified(&self) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

/// A root field argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentDef {
    pub name: String,
    /// Input type in SDL notation, e.g. `[FilterInput]`.
    pub ty: String,
    pub description: String,
}

/// A query or subscription root field exposing one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootField {
    pub name: String,
    pub description: String,
    pub ty: OutputType,
    pub args: Vec<ArgumentDef>,
    pub table: TableRef,
}

impl RootField {
    /// Root field for `table`, typed as a list of the table's object type.
    pub fn for_table(table: TableRef) -> Self {
        let name = table.type_name();
        Self {
            description: format!(
                "Catalog: {}, Schema: {}, Table: {}",
                table.catalog, table.schema, table.table
            ),
            ty: OutputType::list(OutputType::Object(name.clone())),
            args: table_arguments(),
            name,
            table,
        }
    }
}

fn table_arguments() -> Vec<ArgumentDef> {
    vec![
        ArgumentDef {
            name: "limit".to_string(),
            ty: ScalarKind::Int.name().to_string(),
            description: "Limit number of rows".to_string(),
        },
        ArgumentDef {
            name: "filters".to_string(),
            ty: "[FilterInput]".to_string(),
            description: "Filter selection".to_string(),
        },
    ]
}

/// The assembled schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSchema {
    /// Catalogs that passed discovery filters, for the `catalogs` field.
    pub catalogs: Vec<String>,
    /// Object types sorted by name.
    pub object_types: Vec<ObjectType>,
    pub query_fields: Vec<RootField>,
    pub subscription_fields: Vec<RootField>,
}

impl GeneratedSchema {
    pub fn root_field(&self, name: &str) -> Option<&RootField> {
        self.query_fields.iter().find(|f| f.name == name)
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.object_types.iter().find(|t| t.name == name)
    }

    pub fn table_count(&self) -> usize {
        self.query_fields.len()
    }
}

/// Accumulates types and root fields for one build.
#[derive(Debug, Default)]
struct TypeRegistry {
    /// type name -> (owning table, type)
    types: BTreeMap<String, (String, ObjectType)>,
    fields: BTreeMap<String, RootField>,
    needs_key_value: bool,
}

impl TypeRegistry {
    fn register(&mut self, table: TableRef, object: ObjectType) -> SchemaResult<()> {
        let owner = table.qualified();

        if RESERVED_TYPE_NAMES.contains(&object.name.as_str()) {
            return Err(SchemaError::TypeNameCollision {
                name: object.name,
                first: "a built-in type".to_string(),
                second: owner,
            });
        }
        if let Some((first, _)) = self.types.get(&object.name) {
            return Err(SchemaError::TypeNameCollision {
                name: object.name.clone(),
                first: first.clone(),
                second: owner,
            });
        }

        self.needs_key_value |= object.fields.iter().any(|f| uses_key_value(&f.ty));

        let field = RootField::for_table(table);
        self.fields.insert(field.name.clone(), field);
        self.types.insert(object.name.clone(), (owner, object));
        Ok(())
    }

    fn finish(self, catalogs: Vec<String>) -> GeneratedSchema {
        let mut object_types: Vec<ObjectType> =
            self.types.into_values().map(|(_, object)| object).collect();
        if self.needs_key_value {
            object_types.push(key_value_type().clone());
            object_types.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let query_fields: Vec<RootField> = self.fields.into_values().collect();
        GeneratedSchema {
            catalogs,
            object_types,
            subscription_fields: query_fields.clone(),
            query_fields,
        }
    }
}

/// Builds a [`GeneratedSchema`] from discovered metadata.
pub struct SchemaBuilder<'a> {
    walker: &'a MetadataWalker,
    discovery: &'a DiscoverySettings,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(walker: &'a MetadataWalker, discovery: &'a DiscoverySettings) -> Self {
        Self { walker, discovery }
    }

    /// Walk every visible catalog and assemble the schema.
    ///
    /// Discovery failures only hide the affected branch. A type name
    /// collision fails the whole build.
    pub async fn build(&self) -> SchemaResult<GeneratedSchema> {
        let mut registry = TypeRegistry::default();
        let mut visible = Vec::new();

        for catalog in sorted(self.walker.list_catalogs().await) {
            if !self.discovery.catalog_allowed(&catalog) || !self.name_allowed("catalog", &catalog) {
                continue;
            }
            visible.push(catalog.clone());

            for schema in sorted(self.walker.list_schemas(&catalog).await) {
                if !self.discovery.schema_allowed(&schema) || !self.name_allowed("schema", &schema) {
                    continue;
                }

                for table in sorted(self.walker.list_tables(&catalog, &schema).await) {
                    if !self.name_allowed("table", &table) {
                        continue;
                    }

                    let table = TableRef::new(catalog.as_str(), schema.as_str(), table);
                    let columns = self
                        .walker
                        .list_columns(&table.catalog, &table.schema, &table.table)
                        .await;

                    match self.table_type(&table, &columns) {
                        Some(object) => registry.register(table, object)?,
                        None => tracing::warn!(table = %table.qualified(), "table has no usable columns, skipped"),
                    }
                }
            }
        }

        let schema = registry.finish(visible);
        tracing::info!(
            tables = schema.table_count(),
            types = schema.object_types.len(),
            "schema built"
        );
        Ok(schema)
    }

    /// Object type for one table, or `None` when no column survives.
    pub fn table_type(&self, table: &TableRef, columns: &[ColumnMetadata]) -> Option<ObjectType> {
        let mut object = ObjectType::new(table.type_name());

        for column in columns {
            if !self.name_allowed("column", &column.column) {
                continue;
            }
            if object.fields.iter().any(|f| f.name == column.column) {
                tracing::warn!(column = %column.qualified_name(), "duplicate column name, skipped");
                continue;
            }
            object.fields.push(
                FieldDef::new(column.column.as_str(), map_type(&column.native_type))
                    .with_description(format!("Native type: {}", column.native_type)),
            );
        }

        if object.fields.is_empty() {
            None
        } else {
            Some(object)
        }
    }

    fn name_allowed(&self, kind: &str, name: &str) -> bool {
        if !self.discovery.ignore_invalid_names || is_valid_identifier(name) {
            return true;
        }
        tracing::debug!(kind, name, "invalid name, skipped");
        false
    }
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}
