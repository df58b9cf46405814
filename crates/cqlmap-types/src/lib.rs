//! Physical type model for the mapping layer: identifiers, the
//! simple-type catalog, physical encodings, decoded result cells, and
//! the per-target value-coercion pipeline.

pub mod convert;
pub mod data_type;
pub mod identifier;
pub mod simple;
pub mod value;

pub use convert::{ColumnTarget, TypeMismatch, convert_cell};
pub use data_type::{DataType, StructuredField, StructuredType};
pub use identifier::{CqlIdentifier, InvalidIdentifier};
pub use simple::{AppType, ScalarType, SimpleType, SimpleTypeCatalog, TypeKey};
pub use value::CqlValue;
