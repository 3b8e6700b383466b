pub mod array_schema;
pub mod types;

pub use array_schema::{ArraySchema, Attribute, Dimension};
pub use types::TypeId;

#[cfg(test)]
mod types_test;
