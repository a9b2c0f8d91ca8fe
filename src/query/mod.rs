//! Table queries: filter arguments in, bound SQL out, rows back.
//!
//! ```text
//! [FilterInput] ──▶ FilterPredicate ──▶ BoundQuery ──▶ MetadataSource::execute_query
//!                                                              │
//!                                    rows with sanitized keys ◀┘
//! ```

mod error;
mod filter;
mod service;
mod translate;

pub use error::{QueryError, QueryResult};
pub use filter::{FilterInput, FilterOperator, FilterPredicate, FilterValue};
pub use service::{TableQueryService, DEFAULT_LIMIT};
pub use translate::{translate, BoundQuery, ParamValue};
