//! Metadata discovery.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataWalker                             │
//! │  - catalog → schema → table → column                            │
//! │  - sanitizes names on the way out, restores them on the way in  │
//! │  - cache-first per call, failures cached as empty               │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐
//! │       MetadataSource         │  │        MetadataStore         │
//! │  WorkerMetadataSource        │  │  SqliteMetadataCache         │
//! │  StaticMetadataSource        │  │  MemoryMetadataCache         │
//! └──────────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use catalogql::metadata::{MetadataWalker, StaticMetadataSource};
//! use catalogql::cache::MemoryMetadataCache;
//!
//! let source = StaticMetadataSource::from_file("catalogs.json")?;
//! let walker = MetadataWalker::new(
//!     Arc::new(source),
//!     Arc::new(MemoryMetadataCache::new()),
//!     WalkerOptions::default(),
//! );
//!
//! for catalog in walker.list_catalogs().await {
//!     println!("{catalog}: {:?}", walker.list_schemas(&catalog).await);
//! }
//! ```

mod source;
mod static_source;
mod types;
mod walker;
mod worker_source;

pub use source::{MetadataSource, SourceError, SourceResult};
pub use static_source::StaticMetadataSource;
pub use types::*;
pub use walker::{MetadataWalker, WalkerOptions};
pub use worker_source::WorkerMetadataSource;
