//! Field-schema registry.
//!
//! Entities describe their fields once (name, declared scalar type,
//! accessor) instead of being inspected at query time.

mod fields;
mod value;

pub use fields::{Accessor, FieldDef, Schema, SchemaBuilder};
pub use value::{FieldType, Value};
