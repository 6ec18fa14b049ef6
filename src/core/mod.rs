//! Core ABI model: the type tree and the value tree

pub mod types;
pub mod value;

pub use types::{FieldDescription, TupleField, Type, TypeKind};
pub use value::Value;
