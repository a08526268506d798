//! Wire schema generation from declared tool signatures

pub mod generator;
pub mod render;

pub use generator::{SchemaError, SchemaGenerator, input_schema};
