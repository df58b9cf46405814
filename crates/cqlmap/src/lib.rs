//! ## Crate layout
//! - `core`: the mapping registry, persistent entities/properties,
//!   verification, declarative overrides, and schema specifications.
//! - `types`: identifiers, the simple-type catalog, physical encodings,
//!   decoded result cells, and the value-coercion pipeline.
//!
//! The `prelude` module mirrors the surface embedders touch when wiring
//! a context and decoding results.

pub use cqlmap_core as core;
pub use cqlmap_types as types;

use thiserror::Error as ThisError;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Mapping(#[from] cqlmap_core::MappingError),

    #[error(transparent)]
    Conversion(#[from] cqlmap_types::TypeMismatch),
}

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use crate::core::{
        CustomConversions, EntityMapping, FieldMetadata, FieldRole, KeyOrdering, Mapping,
        MappingContext, MappingError, MetadataProvider, MetadataRegistry, PropertyMapping,
        RecordMetadata,
    };
    pub use crate::types::{
        AppType, ColumnTarget as _, CqlIdentifier, CqlValue, DataType, ScalarType, SimpleType,
        TypeKey, TypeMismatch, convert_cell,
    };
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn context_and_conversion_work_end_to_end() {
        let registry = MetadataRegistry::new().with_record(
            "app::Person",
            RecordMetadata::table(vec![
                FieldMetadata::partition_key("id", ScalarType::Text),
                FieldMetadata::new("age", ScalarType::Int),
            ]),
        );

        let context = MappingContext::new(registry);
        context.initialize().unwrap();

        let person = context
            .get_or_create_entity(&TypeKey::new("app::Person"))
            .unwrap();
        let spec = context.create_table_specification(&person).unwrap();
        assert_eq!(spec.partition_key_columns().len(), 1);

        let cell = CqlValue::Int(39);
        assert_eq!(convert_cell::<i32>(Some(&cell)).unwrap(), Some(39));
    }

    #[test]
    fn errors_wrap_transparently() {
        let mismatch = convert_cell::<bool>(Some(&CqlValue::Int(1))).unwrap_err();
        let err: crate::Error = mismatch.into();
        assert!(err.to_string().contains("boolean"));
    }
}
