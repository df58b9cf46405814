//! Mapping core: the registry that discovers record types, derives
//! their physical column/field layout, resolves per-property physical
//! encodings, and renders schema-creation specifications.

pub mod context;
pub mod convert;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod meta;
pub mod property;
pub mod spec;
pub mod structured;
pub mod verify;

pub use context::MappingContext;
pub use convert::CustomConversions;
pub use entity::{EntityKind, PersistentEntity};
pub use error::MappingError;
pub use mapping::{EntityMapping, Mapping, PropertyMapping};
pub use meta::{
    FieldMetadata, FieldRole, KeyOrdering, LiteralNameResolver, MetadataProvider,
    MetadataRegistry, NameOverride, NameResolver, RecordMetadata,
};
pub use property::{ColumnRole, PersistentProperty};
pub use spec::{
    ColumnKind, ColumnSpecification, CreateStructuredTypeSpecification,
    CreateTableSpecification, FieldSpecification,
};
pub use structured::{MapStructuredTypeResolver, StructuredTypeResolver};
pub use verify::{CompositeEntityVerifier, EntityVerifier};
