//! Filter → SQL translation.
//!
//! Produces `SELECT t1.* FROM "catalog"."schema"."table" t1 [WHERE ...] LIMIT n`
//! with every filter value bound as a positional `?` parameter. Identifiers
//! arrive sanitized and are restored, then quoted.

use serde::Serialize;

use super::error::{QueryError, QueryResult};
use super::filter::{FilterInput, FilterOperator, FilterPredicate, FilterValue};
use crate::ident::restore;
use crate::sql::{Token, TokenStream};

const TABLE_ALIAS: &str = "t1";

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&ParamValue> for serde_json::Value {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Int(n) => serde_json::Value::from(*n),
            ParamValue::Float(f) => serde_json::Value::from(*f),
            ParamValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Query text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<ParamValue>,
}

impl BoundQuery {
    /// Parameters as JSON values, in placeholder order.
    pub fn args(&self) -> Vec<serde_json::Value> {
        self.params.iter().map(serde_json::Value::from).collect()
    }
}

/// Translate filters on one table into a bound query.
///
/// Filters are validated in order; the first bad one fails the whole call.
pub fn translate(
    catalog: &str,
    schema: &str,
    table: &str,
    limit: i64,
    filters: &[FilterInput],
) -> QueryResult<BoundQuery> {
    if limit < 0 {
        return Err(QueryError::InvalidLimit(limit));
    }

    let predicates = filters
        .iter()
        .map(FilterPredicate::try_from)
        .collect::<QueryResult<Vec<_>>>()?;

    let mut ts = TokenStream::new();
    ts.push(Token::Select)
        .space()
        .push(Token::Alias(TABLE_ALIAS.into()))
        .push(Token::Dot)
        .push(Token::Star)
        .space()
        .push(Token::From)
        .space()
        .push(Token::QualifiedIdent(vec![
            restore(catalog),
            restore(schema),
            restore(table),
        ]))
        .space()
        .push(Token::Alias(TABLE_ALIAS.into()));

    let mut params = Vec::with_capacity(predicates.len());
    for (i, predicate) in predicates.iter().enumerate() {
        ts.space().push(if i == 0 { Token::Where } else { Token::And }).space();
        render_predicate(&mut ts, &mut params, predicate)?;
    }

    ts.space()
        .push(Token::Limit)
        .space()
        .push(Token::LitInt(limit));

    debug_assert_eq!(ts.param_count(), params.len());
    Ok(BoundQuery {
        sql: ts.serialize(),
        params,
    })
}

fn render_predicate(
    ts: &mut TokenStream,
    params: &mut Vec<ParamValue>,
    predicate: &FilterPredicate,
) -> QueryResult<()> {
    let comparison = match predicate.operator {
        FilterOperator::Eq => Token::Eq,
        FilterOperator::Lt => Token::Lt,
        FilterOperator::Gt => Token::Gt,
        FilterOperator::Like => Token::Like,
        other => return Err(QueryError::UnsupportedOperator(other.as_str().to_string())),
    };

    if let FilterValue::List(_) = predicate.value {
        return Err(QueryError::InvalidFilter {
            field: predicate.field.clone(),
            reason: format!("operator '{}' takes a single value", predicate.operator),
        });
    }

    ts.push(Token::Ident(restore(&predicate.field)))
        .space()
        .push(comparison)
        .space();

    if predicate.operator == FilterOperator::Like {
        ts.param();
        params.push(ParamValue::String(format!("%{}%", like_text(&predicate.value))));
        return Ok(());
    }

    match &predicate.value {
        FilterValue::Date(date) => {
            ts.push(Token::Cast)
                .lparen()
                .param()
                .space()
                .push(Token::As)
                .space()
                .push(Token::TypeName("DATE"))
                .rparen();
            params.push(ParamValue::String(date.clone()));
        }
        value => {
            ts.param();
            params.push(scalar_param(value));
        }
    }
    Ok(())
}

fn scalar_param(value: &FilterValue) -> ParamValue {
    match value {
        FilterValue::String(s) | FilterValue::Date(s) => ParamValue::String(s.clone()),
        FilterValue::Int(n) => ParamValue::Int(*n),
        FilterValue::Float(f) => ParamValue::Float(*f),
        FilterValue::Bool(b) => ParamValue::Bool(*b),
        FilterValue::List(values) => ParamValue::String(values.join(",")),
    }
}

fn like_text(value: &FilterValue) -> String {
    match value {
        FilterValue::String(s) | FilterValue::Date(s) => s.clone(),
        FilterValue::Int(n) => n.to_string(),
        FilterValue::Float(f) => f.to_string(),
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::List(values) => values.join(","),
    }
}
