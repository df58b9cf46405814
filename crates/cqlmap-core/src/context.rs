use crate::{
    convert::CustomConversions,
    entity::{EntityKind, PersistentEntity},
    error::MappingError,
    mapping::Mapping,
    meta::{
        LiteralNameResolver, MetadataProvider, NameOverride, NameResolver, RecordMetadata,
    },
    property::PersistentProperty,
    spec::{CreateStructuredTypeSpecification, CreateTableSpecification},
    structured::{MapStructuredTypeResolver, StructuredTypeResolver},
    verify::{CompositeEntityVerifier, EntityVerifier},
};
use cqlmap_types::{
    AppType, CqlIdentifier, DataType, SimpleTypeCatalog, StructuredType, TypeKey,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, RwLock},
};

///
/// MappingContext
///
/// Process-wide registry of persistent entities. Constructed once at
/// startup, initialized with declarative overrides, then read-mostly.
/// Entity construction is memoized; every caller observes the same
/// entity instance for a given type.
///

pub struct MappingContext {
    provider: Arc<dyn MetadataProvider>,
    conversions: CustomConversions,
    structured_resolver: Arc<dyn StructuredTypeResolver>,
    verifier: Arc<dyn EntityVerifier>,
    name_resolver: Arc<dyn NameResolver>,
    mapping: Mapping,

    entities: RwLock<BTreeMap<TypeKey, Arc<PersistentEntity>>>,
    by_table_name: RwLock<BTreeMap<CqlIdentifier, BTreeSet<TypeKey>>>,
    composite_keys: RwLock<BTreeSet<TypeKey>>,
    structured_types: RwLock<BTreeSet<TypeKey>>,
    tables: RwLock<BTreeSet<TypeKey>>,
}

impl MappingContext {
    pub fn new(provider: impl MetadataProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
            conversions: CustomConversions::default(),
            structured_resolver: Arc::new(MapStructuredTypeResolver::default()),
            verifier: Arc::new(CompositeEntityVerifier),
            name_resolver: Arc::new(LiteralNameResolver),
            mapping: Mapping::default(),
            entities: RwLock::new(BTreeMap::new()),
            by_table_name: RwLock::new(BTreeMap::new()),
            composite_keys: RwLock::new(BTreeSet::new()),
            structured_types: RwLock::new(BTreeSet::new()),
            tables: RwLock::new(BTreeSet::new()),
        }
    }

    #[must_use]
    pub fn with_custom_conversions(mut self, conversions: CustomConversions) -> Self {
        self.conversions = conversions;
        self
    }

    #[must_use]
    pub fn with_structured_type_resolver(
        mut self,
        resolver: impl StructuredTypeResolver + 'static,
    ) -> Self {
        self.structured_resolver = Arc::new(resolver);
        self
    }

    #[must_use]
    pub fn with_verifier(mut self, verifier: impl EntityVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    #[must_use]
    pub fn with_name_resolver(mut self, resolver: impl NameResolver + 'static) -> Self {
        self.name_resolver = Arc::new(resolver);
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Apply the declarative overrides and verify the touched entities.
    ///
    /// Called once after construction; an unknown entity or property
    /// name is a configuration defect and aborts initialization.
    pub fn initialize(&self) -> Result<(), MappingError> {
        for entity_mapping in &self.mapping.entities {
            let entity = self
                .get_or_create_entity(&entity_mapping.type_key)
                .map_err(|err| match err {
                    MappingError::MissingMetadata { type_key } => MappingError::UnknownEntity {
                        name: type_key.to_string(),
                    },
                    other => other,
                })?;

            if let Some(table_name) = &entity_mapping.table_name {
                let name = CqlIdentifier::with_quoting(
                    self.name_resolver.resolve(table_name),
                    entity_mapping.force_quote,
                )?;
                self.rename_entity(&entity, name);
            }

            for property_mapping in &entity_mapping.properties {
                let property = entity
                    .property(&property_mapping.property_name)
                    .ok_or_else(|| MappingError::UnknownProperty {
                        entity: entity_mapping.type_key.clone(),
                        property: property_mapping.property_name.clone(),
                    })?;

                property.set_force_quote(property_mapping.force_quote)?;

                if let Some(column_name) = &property_mapping.column_name {
                    property.set_column_name(CqlIdentifier::with_quoting(
                        self.name_resolver.resolve(column_name),
                        property_mapping.force_quote,
                    )?);
                }
            }

            entity.verify(self.verifier.as_ref(), self)?;
        }

        Ok(())
    }

    /// Look up or build the entity for an application type.
    ///
    /// Simple types and types with a registered write conversion never
    /// produce an entity; neither do collection types themselves.
    pub fn entity_of(
        &self,
        ty: &AppType,
    ) -> Result<Option<Arc<PersistentEntity>>, MappingError> {
        if SimpleTypeCatalog::is_simple(ty) || self.conversions.has_write_target(ty) {
            return Ok(None);
        }

        match ty.record_key() {
            Some(key) => self.get_or_create_entity(key).map(Some),
            None => Ok(None),
        }
    }

    /// Look up or build the entity for a record type, memoized.
    ///
    /// The entity is registered before its properties are built so that
    /// reference cycles resolve to the same (eventually complete)
    /// instance instead of recursing forever.
    pub fn get_or_create_entity(
        &self,
        type_key: &TypeKey,
    ) -> Result<Arc<PersistentEntity>, MappingError> {
        {
            let entities = self.entities.read().expect("entity registry lock poisoned");
            if let Some(entity) = entities.get(type_key) {
                return Ok(Arc::clone(entity));
            }
        }

        if self
            .conversions
            .has_write_target(&AppType::Record(type_key.clone()))
        {
            return Err(MappingError::NotAnEntity {
                type_key: type_key.clone(),
            });
        }

        let metadata = self
            .provider
            .record_metadata(type_key)
            .ok_or_else(|| MappingError::MissingMetadata {
                type_key: type_key.clone(),
            })?;

        let kind = if metadata.structured_type.is_some() {
            EntityKind::StructuredType
        } else if metadata.composite_key {
            EntityKind::CompositeKey
        } else {
            EntityKind::Table
        };

        let declared_name = if kind == EntityKind::StructuredType {
            metadata.structured_type.as_ref()
        } else {
            metadata.table.as_ref()
        };
        let explicit_name = self.explicit_name(declared_name)?;

        let shell = Arc::new(PersistentEntity::new(
            type_key.clone(),
            kind,
            metadata.table.is_some(),
            explicit_name,
        ));

        {
            let mut entities = self.entities.write().expect("entity registry lock poisoned");
            if let Some(existing) = entities.get(type_key) {
                // Another caller won the construction race.
                return Ok(Arc::clone(existing));
            }
            entities.insert(type_key.clone(), Arc::clone(&shell));
        }

        let properties = self.build_properties(type_key, &metadata)?;
        shell.assign_properties(properties);

        self.index_entity(&shell)?;

        Ok(shell)
    }

    fn explicit_name(
        &self,
        declared: Option<&NameOverride>,
    ) -> Result<Option<CqlIdentifier>, MappingError> {
        let Some(declared) = declared else {
            return Ok(None);
        };

        declared
            .name
            .as_deref()
            .map(|name| {
                CqlIdentifier::with_quoting(self.name_resolver.resolve(name), declared.force_quote)
                    .map_err(MappingError::from)
            })
            .transpose()
    }

    // Depth-first: referenced record types are built before the
    // property that needs their classification.
    fn build_properties(
        &self,
        type_key: &TypeKey,
        metadata: &RecordMetadata,
    ) -> Result<Vec<Arc<PersistentProperty>>, MappingError> {
        let mut properties = Vec::with_capacity(metadata.fields.len());

        for field in &metadata.fields {
            let mut composite_group = false;

            let actual = field.declared.actual();
            if let Some(dep_key) = actual.record_key() {
                if !self.conversions.has_write_target(actual) {
                    let dep = self.get_or_create_entity(dep_key)?;

                    if !field.declared.is_collection() {
                        self.promote_composite(&dep);
                        composite_group = dep.is_composite_key();
                    }
                }
            }

            let property = PersistentProperty::from_metadata(
                type_key.clone(),
                field,
                composite_group,
                self.name_resolver.as_ref(),
            )?;

            properties.push(Arc::new(property));
        }

        Ok(properties)
    }

    // A record referenced as a field type becomes a composite-key
    // holder when it is key-shaped: no table declaration of its own and
    // at least one partition-key property.
    fn promote_composite(&self, entity: &Arc<PersistentEntity>) {
        if entity.kind() != EntityKind::Table || entity.table_declared() {
            return;
        }

        let key_shaped = entity.properties().iter().any(|p| p.is_partition_key());
        if !key_shaped {
            return;
        }

        entity.reclassify_composite();
        self.composite_keys
            .write()
            .expect("composite index lock poisoned")
            .insert(entity.type_key().clone());
    }

    fn index_entity(&self, entity: &Arc<PersistentEntity>) -> Result<(), MappingError> {
        let name = entity.name()?;
        let type_key = entity.type_key().clone();

        self.by_table_name
            .write()
            .expect("table name index lock poisoned")
            .entry(name)
            .or_default()
            .insert(type_key.clone());

        match entity.kind() {
            EntityKind::CompositeKey => {
                self.composite_keys
                    .write()
                    .expect("composite index lock poisoned")
                    .insert(type_key);
            }
            EntityKind::StructuredType => {
                self.structured_types
                    .write()
                    .expect("structured index lock poisoned")
                    .insert(type_key);
            }
            EntityKind::Table => {
                if entity.table_declared() {
                    self.tables
                        .write()
                        .expect("table index lock poisoned")
                        .insert(type_key);
                }
            }
        }

        Ok(())
    }

    /// The entity previously registered for a type.
    pub fn existing_entity(
        &self,
        type_key: &TypeKey,
    ) -> Result<Arc<PersistentEntity>, MappingError> {
        self.entities
            .read()
            .expect("entity registry lock poisoned")
            .get(type_key)
            .map(Arc::clone)
            .ok_or_else(|| MappingError::UnknownType {
                type_key: type_key.clone(),
            })
    }

    #[must_use]
    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.entities
            .read()
            .expect("entity registry lock poisoned")
            .contains_key(type_key)
    }

    #[must_use]
    pub fn table_entities(&self) -> Vec<Arc<PersistentEntity>> {
        self.collect(&self.tables)
    }

    #[must_use]
    pub fn composite_key_entities(&self) -> Vec<Arc<PersistentEntity>> {
        self.collect(&self.composite_keys)
    }

    #[must_use]
    pub fn structured_type_entities(&self) -> Vec<Arc<PersistentEntity>> {
        self.collect(&self.structured_types)
    }

    /// All registered entities, or only declared table entities when
    /// composite-key and structured types are excluded.
    #[must_use]
    pub fn entities(&self, include_key_and_structured: bool) -> Vec<Arc<PersistentEntity>> {
        if include_key_and_structured {
            self.entities
                .read()
                .expect("entity registry lock poisoned")
                .values()
                .map(Arc::clone)
                .collect()
        } else {
            self.table_entities()
        }
    }

    fn collect(&self, index: &RwLock<BTreeSet<TypeKey>>) -> Vec<Arc<PersistentEntity>> {
        let keys = index.read().expect("entity index lock poisoned");
        let entities = self.entities.read().expect("entity registry lock poisoned");

        keys.iter()
            .filter_map(|key| entities.get(key).map(Arc::clone))
            .collect()
    }

    /// Resolve the physical encoding for a property.
    ///
    /// Rule order is significant: explicit overrides always win;
    /// structured-type membership is checked before generic custom
    /// conversion; collection unwrapping applies only when the
    /// container itself has no direct write target.
    pub fn data_type(&self, property: &PersistentProperty) -> Result<DataType, MappingError> {
        // A composite-key group is expanded during schema derivation and
        // never emitted as one column; its own encoding is the raw
        // structured handle of the key class.
        if property.is_composite_key_group() {
            if let Some(explicit) = property.explicit_type() {
                return Ok(explicit.clone());
            }

            let key = self.record_key_of(property)?;
            let entity = self.existing_entity(key)?;

            return Ok(DataType::Structured(StructuredType::named(entity.name()?)));
        }

        if let Some(explicit) = property.explicit_type() {
            return Ok(explicit.clone());
        }

        if let Some(name) = property.structured_type_name() {
            let handle = self.structured_resolver.resolve(name).ok_or_else(|| {
                MappingError::UnknownStructuredType { name: name.clone() }
            })?;

            return Ok(DataType::Structured(handle));
        }

        if let Some(key) = property.declared().record_key() {
            if let Ok(entity) = self.existing_entity(key) {
                if entity.is_structured_type() {
                    return Ok(DataType::Structured(StructuredType::named(entity.name()?)));
                }
            }
        }

        if let Some(target) = self.conversions.write_target(property.declared()) {
            return self.data_type_of(target);
        }

        if property.is_collection_like() {
            if let Some(target) = self.conversions.write_target(property.declared().actual()) {
                let element = self.data_type_of(target)?;

                let collection = match property.declared() {
                    AppType::List(_) => DataType::list(element),
                    _ => DataType::set(element),
                };

                return Ok(collection);
            }
        }

        self.natural_data_type(property.declared())
            .ok_or_else(|| MappingError::NoEncoding {
                entity: property.owner().clone(),
                property: property.name().to_string(),
            })
    }

    /// Resolve the physical encoding for a raw application type.
    pub fn data_type_of(&self, ty: &AppType) -> Result<DataType, MappingError> {
        let effective = self.conversions.write_target(ty).unwrap_or(ty);

        self.natural_data_type(effective)
            .ok_or_else(|| MappingError::NoTypeEncoding {
                type_name: effective.to_string(),
            })
    }

    // Catalog-driven encoding, extended to registered structured types.
    fn natural_data_type(&self, ty: &AppType) -> Option<DataType> {
        match ty {
            AppType::Scalar(scalar) => {
                Some(DataType::Simple(SimpleTypeCatalog::encoding(*scalar)))
            }
            AppType::List(element) => self.natural_data_type(element).map(DataType::list),
            AppType::Set(element) => self.natural_data_type(element).map(DataType::set),
            AppType::Record(key) => {
                let entity = self.existing_entity(key).ok()?;
                if entity.is_structured_type() {
                    Some(DataType::Structured(StructuredType::named(
                        entity.name().ok()?,
                    )))
                } else {
                    None
                }
            }
        }
    }

    /// Derive the table specification for an entity.
    ///
    /// Composite-key groups are expanded into their terminal properties
    /// first; a specification with zero partition keys is invalid and
    /// never returned.
    pub fn create_table_specification(
        &self,
        entity: &PersistentEntity,
    ) -> Result<CreateTableSpecification, MappingError> {
        let mut specification = CreateTableSpecification::new(entity.name()?);

        for property in entity.properties() {
            if !property.is_composite_key_group() {
                continue;
            }

            let key = self.record_key_of(property)?;
            let key_entity = self.existing_entity(key)?;

            for terminal in key_entity.composite_key_properties(self)? {
                let data_type = self.data_type(&terminal)?;

                if terminal.is_partition_key() {
                    specification.partition_key_column(terminal.column_name(), data_type);
                } else {
                    specification.clustered_key_column(
                        terminal.column_name(),
                        data_type,
                        terminal.ordering(),
                    );
                }
            }
        }

        for property in entity.properties() {
            if property.is_composite_key_group() {
                continue;
            }

            let data_type = self.data_type(property)?;

            if property.is_identifier() || property.is_partition_key() {
                specification.partition_key_column(property.column_name(), data_type);
            } else if property.is_cluster_key() {
                specification.clustered_key_column(
                    property.column_name(),
                    data_type,
                    property.ordering(),
                );
            } else {
                specification.column(property.column_name(), data_type);
            }
        }

        if specification.partition_key_columns().is_empty() {
            return Err(MappingError::NoPartitionKey {
                entity: entity.type_key().clone(),
            });
        }

        Ok(specification)
    }

    /// Derive the structured-type specification for an entity.
    pub fn create_structured_type_specification(
        &self,
        entity: &PersistentEntity,
    ) -> Result<CreateStructuredTypeSpecification, MappingError> {
        let mut specification = CreateStructuredTypeSpecification::new(entity.name()?);

        for property in entity.properties() {
            specification.field(property.column_name(), self.data_type(property)?);
        }

        if specification.fields().is_empty() {
            return Err(MappingError::EmptyStructuredType {
                entity: entity.type_key().clone(),
            });
        }

        Ok(specification)
    }

    /// Whether any registered entity maps to this physical table name.
    #[must_use]
    pub fn uses_table_name(&self, name: &CqlIdentifier) -> bool {
        self.by_table_name
            .read()
            .expect("table name index lock poisoned")
            .contains_key(name)
    }

    /// Whether any registered entity maps to, or explicitly references,
    /// this structured-type name.
    #[must_use]
    pub fn uses_structured_type_name(&self, name: &CqlIdentifier) -> bool {
        let mapped = self
            .structured_type_entities()
            .iter()
            .any(|entity| entity.name().is_ok_and(|n| n == *name));

        if mapped {
            return true;
        }

        // A structured type may be referenced only by an explicit
        // override, without any record type mapped under its name.
        self.entities(true).iter().any(|entity| {
            entity
                .properties()
                .iter()
                .any(|property| property.structured_type_name() == Some(name))
        })
    }

    /// Apply an explicit rename, swapping the reverse index atomically.
    pub fn rename_entity(&self, entity: &Arc<PersistentEntity>, name: CqlIdentifier) {
        let mut by_name = self
            .by_table_name
            .write()
            .expect("table name index lock poisoned");

        let previous = entity.set_name(name.clone());

        if let Some(previous) = previous {
            if let Some(keys) = by_name.get_mut(&previous) {
                keys.remove(entity.type_key());
                if keys.is_empty() {
                    by_name.remove(&previous);
                }
            }
        }

        by_name
            .entry(name)
            .or_default()
            .insert(entity.type_key().clone());
    }

    /// Toggle forced quoting on an entity, re-deriving and re-indexing
    /// its physical name when the flag changes.
    pub fn set_entity_force_quote(
        &self,
        entity: &Arc<PersistentEntity>,
        quote: bool,
    ) -> Result<(), MappingError> {
        let mut by_name = self
            .by_table_name
            .write()
            .expect("table name index lock poisoned");

        if let Some((previous, renamed)) = entity.set_force_quote(quote)? {
            if let Some(keys) = by_name.get_mut(&previous) {
                keys.remove(entity.type_key());
                if keys.is_empty() {
                    by_name.remove(&previous);
                }
            }

            by_name
                .entry(renamed)
                .or_default()
                .insert(entity.type_key().clone());
        }

        Ok(())
    }

    #[must_use]
    pub const fn custom_conversions(&self) -> &CustomConversions {
        &self.conversions
    }

    #[must_use]
    pub fn verifier(&self) -> &dyn EntityVerifier {
        self.verifier.as_ref()
    }

    fn record_key_of<'a>(
        &self,
        property: &'a PersistentProperty,
    ) -> Result<&'a TypeKey, MappingError> {
        property
            .declared()
            .record_key()
            .ok_or_else(|| MappingError::NoEncoding {
                entity: property.owner().clone(),
                property: property.name().to_string(),
            })
    }
}

///
/// TESTS
///
