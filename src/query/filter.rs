//! Filter arguments accepted by every table root field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::QueryError;

/// Comparison operators declared on the `FilterOperator` enum.
///
/// The translator implements `eq`, `lt`, `gt` and `like`; the rest are
/// declared for schema compatibility and rejected at translation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
    NotBetween,
}

impl FilterOperator {
    /// Declaration order.
    pub const ALL: [FilterOperator; 14] = [
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Like,
        FilterOperator::NotLike,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
        FilterOperator::Between,
        FilterOperator::NotBetween,
    ];

    /// Wire value, e.g. `not_like`.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "not_like",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
            FilterOperator::Between => "between",
            FilterOperator::NotBetween => "not_between",
        }
    }

    /// Enum value name in the generated schema, e.g. `NOT_LIKE`.
    pub fn graphql_name(self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    pub fn description(self) -> &'static str {
        match self {
            FilterOperator::Eq => "Equal to (=)",
            FilterOperator::Neq => "Not equal to (!= or <>)",
            FilterOperator::Gt => "Greater than (>)",
            FilterOperator::Gte => "Greater than or equal (>=)",
            FilterOperator::Lt => "Less than (<)",
            FilterOperator::Lte => "Less than or equal (<=)",
            FilterOperator::Like => "String match (LIKE)",
            FilterOperator::NotLike => "Not string match (NOT LIKE)",
            FilterOperator::In => "In list (IN)",
            FilterOperator::NotIn => "Not in list (NOT IN)",
            FilterOperator::IsNull => "Is NULL",
            FilterOperator::IsNotNull => "Is NOT NULL",
            FilterOperator::Between => "Between values",
            FilterOperator::NotBetween => "Not between values",
        }
    }

    /// Whether the translator can render this operator.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            FilterOperator::Eq | FilterOperator::Lt | FilterOperator::Gt | FilterOperator::Like
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = QueryError;

    /// Accepts the wire value or the schema enum name, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == lower)
            .ok_or_else(|| QueryError::UnsupportedOperator(s.to_string()))
    }
}

/// One filter argument as received from the client.
///
/// Exactly one value field must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterInput {
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    /// ISO 8601 date string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl FilterInput {
    pub fn new(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            ..Self::default()
        }
    }

    pub fn string(mut self, value: impl Into<String>) -> Self {
        self.string_value = Some(value.into());
        self
    }

    pub fn int(mut self, value: i64) -> Self {
        self.int_value = Some(value);
        self
    }

    pub fn float(mut self, value: f64) -> Self {
        self.float_value = Some(value);
        self
    }

    pub fn boolean(mut self, value: bool) -> Self {
        self.boolean_value = Some(value);
        self
    }

    pub fn date(mut self, value: impl Into<String>) -> Self {
        self.date_value = Some(value.into());
        self
    }

    pub fn list(mut self, values: Vec<String>) -> Self {
        self.values = Some(values);
        self
    }

    /// The single populated value.
    pub fn value(&self) -> Result<FilterValue, QueryError> {
        let mut found = Vec::with_capacity(1);
        if let Some(v) = &self.string_value {
            found.push(FilterValue::String(v.clone()));
        }
        if let Some(v) = self.int_value {
            found.push(FilterValue::Int(v));
        }
        if let Some(v) = self.float_value {
            found.push(FilterValue::Float(v));
        }
        if let Some(v) = self.boolean_value {
            found.push(FilterValue::Bool(v));
        }
        if let Some(v) = &self.date_value {
            found.push(FilterValue::Date(v.clone()));
        }
        if let Some(v) = &self.values {
            found.push(FilterValue::List(v.clone()));
        }

        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(QueryError::InvalidFilter {
                field: self.field.clone(),
                reason: "no value provided".to_string(),
            }),
            n => Err(QueryError::InvalidFilter {
                field: self.field.clone(),
                reason: format!("{} values provided, expected exactly one", n),
            }),
        }
    }
}

/// A filter value of one of the accepted kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::String(_) => "string",
            FilterValue::Int(_) => "int",
            FilterValue::Float(_) => "float",
            FilterValue::Bool(_) => "boolean",
            FilterValue::Date(_) => "date",
            FilterValue::List(_) => "list",
        }
    }
}

/// A validated filter: one field, one operator, one value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl TryFrom<&FilterInput> for FilterPredicate {
    type Error = QueryError;

    fn try_from(input: &FilterInput) -> Result<Self, Self::Error> {
        let value = input.value()?;
        let operator = input.operator.parse()?;
        Ok(Self {
            field: input.field.clone(),
            operator,
            value,
        })
    }
}
