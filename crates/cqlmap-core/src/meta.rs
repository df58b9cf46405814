use cqlmap_types::{AppType, DataType, TypeKey};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// KeyOrdering
///
/// Intra-partition ordering direction for a cluster-key column.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum KeyOrdering {
    #[default]
    Ascending,
    Descending,
}

///
/// FieldRole
///
/// Declared key role of a record field. `Identifier` marks a simple
/// single-column primary key; a field whose type is a composite-key
/// record is reclassified regardless of its declared role.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldRole {
    #[default]
    Plain,
    PartitionKey,
    ClusterKey(KeyOrdering),
    Identifier,
}

///
/// RecordMetadata
///
/// Declared metadata for one record type, as read from whatever source
/// the embedder wires in (descriptors, config, codegen).
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RecordMetadata {
    /// Explicit table declaration, when the type is declared a table.
    pub table: Option<NameOverride>,

    /// Explicit structured-type declaration.
    pub structured_type: Option<NameOverride>,

    /// Declared composite-key holder.
    pub composite_key: bool,

    /// Fields in declaration order.
    pub fields: Vec<FieldMetadata>,
}

impl RecordMetadata {
    #[must_use]
    pub fn table(fields: Vec<FieldMetadata>) -> Self {
        Self {
            table: Some(NameOverride::default()),
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn composite_key(fields: Vec<FieldMetadata>) -> Self {
        Self {
            composite_key: true,
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn structured_type(fields: Vec<FieldMetadata>) -> Self {
        Self {
            structured_type: Some(NameOverride::default()),
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let over = NameOverride {
            name: Some(name.into()),
            force_quote: false,
        };

        if self.structured_type.is_some() {
            self.structured_type = Some(over);
        } else {
            self.table = Some(over);
        }

        self
    }
}

///
/// NameOverride
///
/// An optional explicit physical name with its quoting flag.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NameOverride {
    pub name: Option<String>,
    pub force_quote: bool,
}

///
/// FieldMetadata
///
/// Declared metadata for one field of a record type.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldMetadata {
    pub name: String,
    pub declared: AppType,

    #[serde(default)]
    pub role: FieldRole,

    /// Explicit column name; derived from the field name otherwise.
    #[serde(default)]
    pub column: Option<String>,

    #[serde(default)]
    pub force_quote: bool,

    /// Explicit physical-type override; trusted verbatim.
    #[serde(default)]
    pub explicit_type: Option<DataType>,

    /// Explicit by-name reference to a structured type.
    #[serde(default)]
    pub structured_type_name: Option<String>,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>, declared: impl Into<AppType>) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            role: FieldRole::Plain,
            column: None,
            force_quote: false,
            explicit_type: None,
            structured_type_name: None,
        }
    }

    #[must_use]
    pub fn partition_key(name: impl Into<String>, declared: impl Into<AppType>) -> Self {
        Self {
            role: FieldRole::PartitionKey,
            ..Self::new(name, declared)
        }
    }

    #[must_use]
    pub fn cluster_key(
        name: impl Into<String>,
        declared: impl Into<AppType>,
        ordering: KeyOrdering,
    ) -> Self {
        Self {
            role: FieldRole::ClusterKey(ordering),
            ..Self::new(name, declared)
        }
    }

    #[must_use]
    pub fn identifier(name: impl Into<String>, declared: impl Into<AppType>) -> Self {
        Self {
            role: FieldRole::Identifier,
            ..Self::new(name, declared)
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_explicit_type(mut self, data_type: DataType) -> Self {
        self.explicit_type = Some(data_type);
        self
    }
}

///
/// MetadataProvider
///
/// Read-only capability handing the registry declared metadata for a
/// record type. Queried once per type during entity construction.
///

pub trait MetadataProvider: Send + Sync {
    fn record_metadata(&self, type_key: &TypeKey) -> Option<RecordMetadata>;
}

///
/// MetadataRegistry
///
/// In-memory `MetadataProvider` for embedders and tests.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MetadataRegistry {
    records: std::collections::HashMap<TypeKey, RecordMetadata>,
}

impl MetadataRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(mut self, key: impl Into<TypeKey>, metadata: RecordMetadata) -> Self {
        self.records.insert(key.into(), metadata);
        self
    }

    pub fn register(&mut self, key: impl Into<TypeKey>, metadata: RecordMetadata) {
        self.records.insert(key.into(), metadata);
    }
}

impl MetadataProvider for MetadataRegistry {
    fn record_metadata(&self, type_key: &TypeKey) -> Option<RecordMetadata> {
        self.records.get(type_key).cloned()
    }
}

///
/// NameResolver
///
/// Late-bound evaluation of explicit name overrides. The default
/// resolver treats override values as literal names.
///

pub trait NameResolver: Send + Sync {
    fn resolve(&self, template: &str) -> String;
}

///
/// LiteralNameResolver
///

#[derive(Clone, Copy, Debug, Default)]
pub struct LiteralNameResolver;

impl NameResolver for LiteralNameResolver {
    fn resolve(&self, template: &str) -> String {
        template.to_string()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use cqlmap_types::ScalarType;

    #[test]
    fn constructors_set_the_declared_role() {
        let field = FieldMetadata::partition_key("id", ScalarType::Uuid);
        assert_eq!(field.role, FieldRole::PartitionKey);

        let field = FieldMetadata::cluster_key("at", ScalarType::Timestamp, KeyOrdering::Descending);
        assert_eq!(field.role, FieldRole::ClusterKey(KeyOrdering::Descending));
    }

    #[test]
    fn registry_round_trips_metadata() {
        let registry = MetadataRegistry::new().with_record(
            "app::Person",
            RecordMetadata::table(vec![FieldMetadata::identifier("id", ScalarType::Text)]),
        );

        let metadata = registry.record_metadata(&TypeKey::new("app::Person")).unwrap();
        assert_eq!(metadata.fields.len(), 1);
        assert!(metadata.table.is_some());
        assert!(registry.record_metadata(&TypeKey::new("app::Ghost")).is_none());
    }

    #[test]
    fn ordering_parses_from_text() {
        assert_eq!(
            "Descending".parse::<KeyOrdering>().ok(),
            Some(KeyOrdering::Descending)
        );
    }

    #[test]
    fn literal_resolver_passes_names_through() {
        assert_eq!(LiteralNameResolver.resolve("people"), "people");
    }
}
