//! Generated GraphQL schema.
//!
//! - [`types`] - output types and the native type mapper
//! - [`builder`] - walks discovered metadata into a [`GeneratedSchema`]
//! - [`sdl`] - prints a [`GeneratedSchema`] as SDL

pub mod builder;
pub mod sdl;
pub mod types;

pub use builder::{
    ArgumentDef, GeneratedSchema, RootField, SchemaBuilder, SchemaError, SchemaResult, TableRef,
};
pub use types::{key_value_type, map_type, FieldDef, ObjectType, OutputType, ScalarKind};
