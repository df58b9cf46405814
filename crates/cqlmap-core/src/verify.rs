use crate::{
    context::MappingContext,
    entity::{EntityKind, PersistentEntity},
    error::MappingError,
    property::ColumnRole,
};

///
/// EntityVerifier
///
/// Pluggable structural validation run by [`PersistentEntity::verify`].
///

pub trait EntityVerifier: Send + Sync {
    fn verify(
        &self,
        entity: &PersistentEntity,
        context: &MappingContext,
    ) -> Result<(), MappingError>;
}

///
/// CompositeEntityVerifier
///
/// Default verifier enforcing the per-kind structural rules.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CompositeEntityVerifier;

impl CompositeEntityVerifier {
    fn fail(entity: &PersistentEntity, rule: impl Into<String>) -> MappingError {
        MappingError::Verification {
            entity: entity.type_key().clone(),
            rule: rule.into(),
        }
    }

    fn verify_table(entity: &PersistentEntity) -> Result<(), MappingError> {
        let identifiers = entity
            .properties()
            .iter()
            .filter(|p| p.role() == ColumnRole::Identifier)
            .count();

        if identifiers > 1 {
            return Err(Self::fail(
                entity,
                "more than one property is flagged as the identifier",
            ));
        }

        let has_partition_keys = entity
            .properties()
            .iter()
            .any(|p| p.role() == ColumnRole::PartitionKey);

        if identifiers > 0 && has_partition_keys {
            return Err(Self::fail(
                entity,
                "identifier and partition-key flags must not be combined",
            ));
        }

        Ok(())
    }

    fn verify_composite_key(entity: &PersistentEntity) -> Result<(), MappingError> {
        let mut partition_keys = 0usize;

        for property in entity.properties() {
            match property.role() {
                ColumnRole::PartitionKey => partition_keys += 1,
                ColumnRole::ClusterKey | ColumnRole::CompositeKeyGroup => {}
                ColumnRole::Identifier => {
                    return Err(Self::fail(
                        entity,
                        format!(
                            "composite key property '{}' must not be flagged as identifier",
                            property.name()
                        ),
                    ));
                }
                ColumnRole::Plain => {
                    return Err(Self::fail(
                        entity,
                        format!(
                            "composite key property '{}' carries no key role",
                            property.name()
                        ),
                    ));
                }
            }
        }

        // Nested groups may contribute the partition keys instead.
        let has_groups = entity
            .properties()
            .iter()
            .any(|p| p.role() == ColumnRole::CompositeKeyGroup);

        if partition_keys == 0 && !has_groups {
            return Err(Self::fail(entity, "composite key declares no partition key"));
        }

        Ok(())
    }

    fn verify_structured_type(entity: &PersistentEntity) -> Result<(), MappingError> {
        for property in entity.properties() {
            if property.role() != ColumnRole::Plain {
                return Err(Self::fail(
                    entity,
                    format!(
                        "structured type field '{}' must not declare a key role",
                        property.name()
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl EntityVerifier for CompositeEntityVerifier {
    fn verify(
        &self,
        entity: &PersistentEntity,
        _context: &MappingContext,
    ) -> Result<(), MappingError> {
        match entity.kind() {
            EntityKind::Table => Self::verify_table(entity),
            EntityKind::CompositeKey => Self::verify_composite_key(entity),
            EntityKind::StructuredType => Self::verify_structured_type(entity),
        }
    }
}
