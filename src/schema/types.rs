//! Output types and the native-type mapper.
//!
//! Maps engine column types (`varchar`, `array(bigint)`, `map(varchar, double)`,
//! `decimal(10,2)`, ...) onto GraphQL output types.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Name of the shared key/value object used for map columns.
pub const KEY_VALUE_TYPE_NAME: &str = "KeyValue";

/// GraphQL scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Boolean,
    Int,
    Float,
    String,
}

impl ScalarKind {
    /// GraphQL name of the scalar.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
        }
    }
}

/// A named field of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: OutputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: OutputType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named object type with ordered fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// GraphQL output type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of")]
pub enum OutputType {
    Scalar(ScalarKind),
    List(Box<OutputType>),
    /// Reference to a named object type registered in the schema.
    Object(String),
}

impl OutputType {
    pub fn list(inner: OutputType) -> Self {
        OutputType::List(Box::new(inner))
    }

    /// Name of the object type this output eventually refers to, if any.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            OutputType::Scalar(_) => None,
            OutputType::List(inner) => inner.object_name(),
            OutputType::Object(name) => Some(name),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Scalar(kind) => f.write_str(kind.name()),
            OutputType::List(inner) => write!(f, "[{}]", inner),
            OutputType::Object(name) => f.write_str(name),
        }
    }
}

static KEY_VALUE: LazyLock<ObjectType> = LazyLock::new(|| {
    ObjectType::new(KEY_VALUE_TYPE_NAME)
        .field(FieldDef::new("key", OutputType::Scalar(ScalarKind::String)))
        .field(FieldDef::new("value", OutputType::Scalar(ScalarKind::String)))
});

/// The process-wide `KeyValue { key: String, value: String }` definition.
pub fn key_value_type() -> &'static ObjectType {
    &KEY_VALUE
}

/// Map a native column type to its GraphQL output type.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Unknown
/// types fall back to `String`.
pub fn map_type(native: &str) -> OutputType {
    let native = native.trim().to_lowercase();

    if native.starts_with("array(") {
        return OutputType::list(map_type(inner_type(&native)));
    }

    if native.starts_with("map(") {
        // Key and value types are not modeled.
        return OutputType::list(OutputType::Object(KEY_VALUE_TYPE_NAME.to_string()));
    }

    if native.starts_with("decimal(") {
        return OutputType::Scalar(ScalarKind::String);
    }

    OutputType::Scalar(map_base_type(&native))
}

fn map_base_type(native: &str) -> ScalarKind {
    match native {
        "boolean" => ScalarKind::Boolean,
        "tinyint" | "smallint" | "integer" | "int" => ScalarKind::Int,
        // 64-bit integers lose precision as GraphQL Int/Float.
        "bigint" => ScalarKind::String,
        "real" | "double" | "float" => ScalarKind::Float,
        "varchar" | "char" | "varbinary" | "json" | "uuid" | "ipaddress" | "date" | "time"
        | "timestamp" | "interval" => ScalarKind::String,
        _ => ScalarKind::String,
    }
}

/// Extract the text between the first `(` and the last `)`.
fn inner_type(ty: &str) -> &str {
    let start = ty.find('(').map(|i| i + 1).unwrap_or(0);
    let end = ty.rfind(')').unwrap_or(ty.len());
    if start > end {
        return "";
    }
    ty[start..end].trim()
}

/// Whether mapping this native type references the `KeyValue` object.
pub fn uses_key_value(ty: &OutputType) -> bool {
    ty.object_name() == Some(KEY_VALUE_TYPE_NAME)
}
