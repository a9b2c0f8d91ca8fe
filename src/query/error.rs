//! Query errors.

use crate::metadata::SourceError;

/// Request-scoped errors from filter translation and execution.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A filter has zero or several value fields set, or a value the
    /// operator cannot take.
    #[error("invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("invalid limit: {0} (must not be negative)")]
    InvalidLimit(i64),

    #[error("query failed: {0}")]
    Source(#[from] SourceError),
}

pub type QueryResult<T> = Result<T, QueryError>;
