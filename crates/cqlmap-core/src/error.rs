use cqlmap_types::{CqlIdentifier, InvalidIdentifier, TypeKey};
use thiserror::Error as ThisError;

///
/// MappingError
///
/// Structural violations in entity/property configuration. These
/// indicate a programming or configuration defect; they surface to the
/// caller immediately and are never suppressed or auto-corrected.
///

#[derive(Debug, ThisError)]
pub enum MappingError {
    #[error("no partition key columns found in entity '{entity}'")]
    NoPartitionKey { entity: TypeKey },

    #[error("no fields in structured type '{entity}'")]
    EmptyStructuredType { entity: TypeKey },

    #[error("entity '{entity}' does not represent a composite key")]
    NotCompositeKey { entity: TypeKey },

    #[error("type '{type_key}' has a registered write conversion and cannot be mapped as an entity")]
    NotAnEntity { type_key: TypeKey },

    #[error("unknown persistent type '{type_key}'")]
    UnknownType { type_key: TypeKey },

    #[error("no metadata available for type '{type_key}'")]
    MissingMetadata { type_key: TypeKey },

    #[error("unknown persistent entity name '{name}' in mapping override")]
    UnknownEntity { name: String },

    #[error("unknown property '{property}' on entity '{entity}'")]
    UnknownProperty { entity: TypeKey, property: String },

    #[error("cannot resolve a physical encoding for property '{property}' of entity '{entity}'")]
    NoEncoding { entity: TypeKey, property: String },

    #[error("cannot resolve a physical encoding for type '{type_name}'")]
    NoTypeEncoding { type_name: String },

    #[error("structured type '{name}' cannot be resolved")]
    UnknownStructuredType { name: CqlIdentifier },

    #[error("verification of entity '{entity}' failed: {rule}")]
    Verification { entity: TypeKey, rule: String },

    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
}
