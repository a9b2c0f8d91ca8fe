//! # CatalogQL
//!
//! Exposes the catalogs of a distributed SQL engine as a generated GraphQL
//! schema, and translates filtered table queries back into SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Engine (via worker subprocess)                 │
//! │   catalogs / schemas / tables / columns / row queries    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata walker + cache]
//! ┌─────────────────────────────────────────────────────────┐
//! │              ColumnMetadata (sanitized names)            │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼ [schema builder]             ▼ [join detector]
//! ┌────────────────────────────┐  ┌────────────────────────┐
//! │  GeneratedSchema  →  SDL   │  │    JoinCandidate list   │
//! └────────────────────────────┘  └────────────────────────┘
//!            │
//!            ▼ [filter translation]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Parameterized SELECT  →  rows (sanitized keys)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod ident;
pub mod joins;
pub mod metadata;
pub mod query;
pub mod schema;
pub mod sql;
pub mod worker;

pub use config::Settings;
pub use ident::{restore, sanitize};
pub use joins::{JoinCandidate, JoinDetector, JoinStrategy};
pub use metadata::{ColumnMetadata, MetadataSource, MetadataWalker, WalkerOptions};
pub use query::{FilterInput, FilterOperator, QueryError, TableQueryService};
pub use schema::{GeneratedSchema, SchemaBuilder};
