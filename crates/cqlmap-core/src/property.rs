use crate::{
    error::MappingError,
    meta::{FieldMetadata, FieldRole, KeyOrdering, NameResolver},
};
use convert_case::{Case, Casing};
use cqlmap_types::{AppType, CqlIdentifier, DataType, TypeKey};
use std::sync::RwLock;

///
/// ColumnRole
///
/// Role of a property in the owning table's physical layout. A
/// composite-key group stands in for its terminal sub-properties and is
/// expanded during schema derivation, never emitted as one column.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnRole {
    Plain,
    PartitionKey,
    ClusterKey,
    CompositeKeyGroup,
    Identifier,
}

///
/// PersistentProperty
///
/// Metadata for one field of a record type: declared type, resolved
/// physical column name, role classification, cluster ordering, and an
/// optional explicit physical-type override.
///

#[derive(Debug)]
pub struct PersistentProperty {
    owner: TypeKey,
    name: String,
    declared: AppType,
    role: ColumnRole,
    ordering: KeyOrdering,
    column: RwLock<CqlIdentifier>,
    explicit_type: Option<DataType>,
    structured_type_name: Option<CqlIdentifier>,
}

impl PersistentProperty {
    /// Build a property from declared field metadata.
    ///
    /// `composite_group` is decided by the registry: a property whose
    /// declared type is registered as a composite key is always a
    /// composite-key group, overriding any declared role.
    pub(crate) fn from_metadata(
        owner: TypeKey,
        metadata: &FieldMetadata,
        composite_group: bool,
        resolver: &dyn NameResolver,
    ) -> Result<Self, MappingError> {
        let column = match &metadata.column {
            Some(column) => {
                CqlIdentifier::with_quoting(resolver.resolve(column), metadata.force_quote)?
            }
            None => CqlIdentifier::new(metadata.name.to_case(Case::Snake))?,
        };

        let role = if composite_group {
            ColumnRole::CompositeKeyGroup
        } else {
            match metadata.role {
                FieldRole::Plain => ColumnRole::Plain,
                FieldRole::PartitionKey => ColumnRole::PartitionKey,
                FieldRole::ClusterKey(_) => ColumnRole::ClusterKey,
                FieldRole::Identifier => ColumnRole::Identifier,
            }
        };

        let ordering = match metadata.role {
            FieldRole::ClusterKey(ordering) => ordering,
            _ => KeyOrdering::default(),
        };

        let structured_type_name = metadata
            .structured_type_name
            .as_deref()
            .map(str::parse::<CqlIdentifier>)
            .transpose()?;

        Ok(Self {
            owner,
            name: metadata.name.clone(),
            declared: metadata.declared.clone(),
            role,
            ordering,
            column: RwLock::new(column),
            explicit_type: metadata.explicit_type.clone(),
            structured_type_name,
        })
    }

    #[must_use]
    pub const fn owner(&self) -> &TypeKey {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn declared(&self) -> &AppType {
        &self.declared
    }

    #[must_use]
    pub const fn role(&self) -> ColumnRole {
        self.role
    }

    /// Ordering direction; meaningful for cluster-key columns only.
    #[must_use]
    pub const fn ordering(&self) -> KeyOrdering {
        self.ordering
    }

    #[must_use]
    pub fn column_name(&self) -> CqlIdentifier {
        self.column
            .read()
            .expect("property column lock poisoned while reading")
            .clone()
    }

    #[must_use]
    pub const fn explicit_type(&self) -> Option<&DataType> {
        self.explicit_type.as_ref()
    }

    #[must_use]
    pub const fn structured_type_name(&self) -> Option<&CqlIdentifier> {
        self.structured_type_name.as_ref()
    }

    #[must_use]
    pub const fn is_composite_key_group(&self) -> bool {
        matches!(self.role, ColumnRole::CompositeKeyGroup)
    }

    #[must_use]
    pub const fn is_partition_key(&self) -> bool {
        matches!(self.role, ColumnRole::PartitionKey)
    }

    #[must_use]
    pub const fn is_cluster_key(&self) -> bool {
        matches!(self.role, ColumnRole::ClusterKey)
    }

    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self.role, ColumnRole::Identifier)
    }

    #[must_use]
    pub const fn is_collection_like(&self) -> bool {
        self.declared.is_collection()
    }

    /// Replace the physical column name.
    pub fn set_column_name(&self, column: CqlIdentifier) {
        *self
            .column
            .write()
            .expect("property column lock poisoned while renaming") = column;
    }

    /// Toggle forced quoting; idempotent when unchanged, otherwise the
    /// column name is re-derived preserving its unquoted text.
    pub fn set_force_quote(&self, quote: bool) -> Result<(), MappingError> {
        let mut column = self
            .column
            .write()
            .expect("property column lock poisoned while requoting");

        if column.is_quoted() != quote {
            *column = CqlIdentifier::with_quoting(column.unquoted_text(), quote)?;
        }

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::LiteralNameResolver;
    use cqlmap_types::ScalarType;

    fn property(metadata: &FieldMetadata) -> PersistentProperty {
        PersistentProperty::from_metadata(
            TypeKey::new("app::Person"),
            metadata,
            false,
            &LiteralNameResolver,
        )
        .unwrap()
    }

    #[test]
    fn column_name_derives_snake_case_unquoted() {
        let prop = property(&FieldMetadata::new("firstName", ScalarType::Text));
        assert_eq!(prop.column_name().to_string(), "first_name");
    }

    #[test]
    fn explicit_column_override_wins_with_its_quoting() {
        let mut metadata = FieldMetadata::new("firstName", ScalarType::Text).with_column("Given");
        metadata.force_quote = true;

        let prop = property(&metadata);
        assert_eq!(prop.column_name().to_string(), "\"Given\"");
    }

    #[test]
    fn composite_group_overrides_declared_role() {
        let metadata = FieldMetadata::partition_key("key", AppType::record("app::Address"));
        let prop = PersistentProperty::from_metadata(
            TypeKey::new("app::Visit"),
            &metadata,
            true,
            &LiteralNameResolver,
        )
        .unwrap();

        assert_eq!(prop.role(), ColumnRole::CompositeKeyGroup);
    }

    #[test]
    fn force_quote_round_trip_preserves_text() {
        let prop = property(&FieldMetadata::new("age", ScalarType::Int));

        prop.set_force_quote(true).unwrap();
        assert!(prop.column_name().is_quoted());
        assert_eq!(prop.column_name().unquoted_text(), "age");

        prop.set_force_quote(true).unwrap();
        prop.set_force_quote(false).unwrap();
        assert_eq!(prop.column_name().to_string(), "age");
    }

    #[test]
    fn cluster_ordering_is_captured() {
        let prop = property(&FieldMetadata::cluster_key(
            "at",
            ScalarType::Timestamp,
            KeyOrdering::Descending,
        ));

        assert!(prop.is_cluster_key());
        assert_eq!(prop.ordering(), KeyOrdering::Descending);
    }
}
