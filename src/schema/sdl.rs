//! GraphQL SDL rendering.

use std::fmt::{self, Write};

use super::builder::{GeneratedSchema, RootField};
use super::types::{FieldDef, ObjectType};
use crate::query::FilterOperator;

/// Render the schema as SDL text.
pub fn render(schema: &GeneratedSchema) -> String {
    Sdl(schema).to_string()
}

/// Display adapter printing a [`GeneratedSchema`] as SDL.
pub struct Sdl<'a>(pub &'a GeneratedSchema);

impl fmt::Display for Sdl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = self.0;

        f.write_str("schema {\n  query: Query\n  subscription: Subscription\n}\n\n")?;

        write_filter_operator(f)?;
        f.write_char('\n')?;
        write_filter_input(f)?;

        for object in &schema.object_types {
            f.write_char('\n')?;
            write_object(f, object)?;
        }

        f.write_str("\ntype Query {\n")?;
        write_description(f, "Catalogs available for querying")?;
        f.write_str("  catalogs: [String]\n")?;
        for field in &schema.query_fields {
            write_root_field(f, field)?;
        }
        f.write_str("}\n")?;

        f.write_str("\ntype Subscription {\n")?;
        for field in &schema.subscription_fields {
            write_root_field(f, field)?;
        }
        f.write_str("}\n")
    }
}

fn write_filter_operator(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("\"SQL-compatible filter operations\"\nenum FilterOperator {\n")?;
    for op in FilterOperator::ALL {
        write_description(f, op.description())?;
        writeln!(f, "  {}", op.graphql_name())?;
    }
    f.write_str("}\n")
}

fn write_filter_input(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("input FilterInput {\n")?;
    write_description(f, "Column name")?;
    f.write_str("  field: String!\n")?;
    write_description(f, "Filter operation")?;
    f.write_str("  operator: FilterOperator!\n")?;
    f.write_str("  stringValue: String\n")?;
    f.write_str("  intValue: Int\n")?;
    f.write_str("  floatValue: Float\n")?;
    f.write_str("  booleanValue: Boolean\n")?;
    write_description(f, "ISO 8601 date")?;
    f.write_str("  dateValue: String\n")?;
    write_description(f, "List of values for IN, BETWEEN, etc.")?;
    f.write_str("  values: [String]\n")?;
    f.write_str("}\n")
}

fn write_object(f: &mut fmt::Formatter<'_>, object: &ObjectType) -> fmt::Result {
    writeln!(f, "type {} {{", object.name)?;
    for field in &object.fields {
        write_field(f, field)?;
    }
    f.write_str("}\n")
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &FieldDef) -> fmt::Result {
    if let Some(description) = &field.description {
        write_description(f, description)?;
    }
    writeln!(f, "  {}: {}", field.name, field.ty)
}

fn write_root_field(f: &mut fmt::Formatter<'_>, field: &RootField) -> fmt::Result {
    write_description(f, &field.description)?;
    let args = field
        .args
        .iter()
        .map(|a| format!("{}: {}", a.name, a.ty))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(f, "  {}({}): {}", field.name, args, field.ty)
}

fn write_description(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("  \"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    f.write_str("\"\n")
}
