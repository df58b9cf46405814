use crate::{
    context::MappingContext,
    error::MappingError,
    property::PersistentProperty,
    verify::EntityVerifier,
};
use convert_case::{Case, Casing};
use cqlmap_types::{CqlIdentifier, TypeKey};
use std::sync::{
    Arc, OnceLock, RwLock,
    atomic::{AtomicBool, Ordering},
};

///
/// EntityKind
///
/// Structural classification of a record type. Composite-key holders
/// never appear as whole-row tables; their fields are expanded into the
/// referencing table's key columns.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Table,
    CompositeKey,
    StructuredType,
}

// Explicit and cached names share one lock so rename and force-quote
// toggles swap both without a window where neither is set.
#[derive(Debug, Default)]
struct NameState {
    explicit: Option<CqlIdentifier>,
    resolved: Option<CqlIdentifier>,
}

///
/// PersistentEntity
///
/// Metadata for one record type: ordered properties, structural kind,
/// and the lazily resolved physical name. Constructed by the registry;
/// a shell (no properties yet) is visible in the registry only to
/// terminate reference cycles during construction.
///

#[derive(Debug)]
pub struct PersistentEntity {
    type_key: TypeKey,
    kind: RwLock<EntityKind>,
    table_declared: bool,
    names: RwLock<NameState>,
    properties: OnceLock<Vec<Arc<PersistentProperty>>>,
    verified: AtomicBool,
}

impl PersistentEntity {
    pub(crate) fn new(
        type_key: TypeKey,
        kind: EntityKind,
        table_declared: bool,
        explicit_name: Option<CqlIdentifier>,
    ) -> Self {
        Self {
            type_key,
            kind: RwLock::new(kind),
            table_declared,
            names: RwLock::new(NameState {
                explicit: explicit_name,
                resolved: None,
            }),
            properties: OnceLock::new(),
            verified: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        *self.kind.read().expect("entity kind lock poisoned")
    }

    #[must_use]
    pub fn is_composite_key(&self) -> bool {
        self.kind() == EntityKind::CompositeKey
    }

    #[must_use]
    pub fn is_structured_type(&self) -> bool {
        self.kind() == EntityKind::StructuredType
    }

    /// Whether the type carries an explicit table declaration.
    #[must_use]
    pub const fn table_declared(&self) -> bool {
        self.table_declared
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified.load(Ordering::Acquire)
    }

    /// Properties in declaration order; empty while the entity is a
    /// construction shell.
    #[must_use]
    pub fn properties(&self) -> &[Arc<PersistentProperty>] {
        self.properties.get().map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Arc<PersistentProperty>> {
        self.properties().iter().find(|p| p.name() == name)
    }

    pub(crate) fn assign_properties(&self, properties: Vec<Arc<PersistentProperty>>) {
        // Construction assigns exactly once; a lost race leaves the
        // winner's identical list in place.
        let _ = self.properties.set(properties);
    }

    pub(crate) fn reclassify_composite(&self) {
        *self.kind.write().expect("entity kind lock poisoned") = EntityKind::CompositeKey;
    }

    /// The resolved physical name, computed on first access and cached.
    ///
    /// An explicit declarative name wins with its quoting flag; the
    /// default is the unquoted snake_case of the type's simple name.
    pub fn name(&self) -> Result<CqlIdentifier, MappingError> {
        {
            let names = self.names.read().expect("entity name lock poisoned");
            if let Some(resolved) = &names.resolved {
                return Ok(resolved.clone());
            }
        }

        let mut names = self.names.write().expect("entity name lock poisoned");
        if let Some(resolved) = &names.resolved {
            return Ok(resolved.clone());
        }

        let resolved = match &names.explicit {
            Some(explicit) => explicit.clone(),
            None => CqlIdentifier::new(self.type_key.simple_name().to_case(Case::Snake))?,
        };

        names.resolved = Some(resolved.clone());

        Ok(resolved)
    }

    /// Apply an explicit rename. Returns the previously resolved name
    /// so the registry can swap its reverse index.
    pub(crate) fn set_name(&self, name: CqlIdentifier) -> Option<CqlIdentifier> {
        let mut names = self.names.write().expect("entity name lock poisoned");
        let previous = names.resolved.take();

        names.explicit = Some(name.clone());
        names.resolved = Some(name);

        previous
    }

    /// Toggle forced quoting. Idempotent when unchanged; otherwise the
    /// name is re-derived preserving its unquoted text. Returns the
    /// `(old, new)` pair when the name changed.
    pub(crate) fn set_force_quote(
        &self,
        quote: bool,
    ) -> Result<Option<(CqlIdentifier, CqlIdentifier)>, MappingError> {
        let current = self.name()?;
        if current.is_quoted() == quote {
            return Ok(None);
        }

        let renamed = CqlIdentifier::with_quoting(current.unquoted_text(), quote)?;

        let mut names = self.names.write().expect("entity name lock poisoned");
        names.explicit = Some(renamed.clone());
        names.resolved = Some(renamed.clone());

        Ok(Some((current, renamed)))
    }

    /// Run structural validation through the pluggable verifier and
    /// force name resolution.
    pub fn verify(
        &self,
        verifier: &dyn EntityVerifier,
        context: &MappingContext,
    ) -> Result<(), MappingError> {
        verifier.verify(self, context)?;
        self.name()?;
        self.verified.store(true, Ordering::Release);

        Ok(())
    }

    /// Flatten nested composite-key groups depth-first into the ordered
    /// list of terminal properties.
    pub fn composite_key_properties(
        &self,
        context: &MappingContext,
    ) -> Result<Vec<Arc<PersistentProperty>>, MappingError> {
        if !self.is_composite_key() {
            return Err(MappingError::NotCompositeKey {
                entity: self.type_key.clone(),
            });
        }

        let mut terminals = Vec::new();
        self.collect_key_properties(context, &mut terminals)?;

        Ok(terminals)
    }

    fn collect_key_properties(
        &self,
        context: &MappingContext,
        terminals: &mut Vec<Arc<PersistentProperty>>,
    ) -> Result<(), MappingError> {
        for property in self.properties() {
            if property.is_composite_key_group() {
                let key = property.declared().record_key().ok_or_else(|| {
                    MappingError::UnknownType {
                        type_key: self.type_key.clone(),
                    }
                })?;

                context
                    .existing_entity(key)?
                    .collect_key_properties(context, terminals)?;
            } else {
                terminals.push(Arc::clone(property));
            }
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

    fn table(type_key: &str, explicit: Option<CqlIdentifier>) -> PersistentEntity {
        PersistentEntity::new(TypeKey::new(type_key), EntityKind::Table, true, explicit)
    }

    #[test]
    fn default_name_is_snake_case_of_the_simple_name() {
        let entity = table("app::OrderLine", None);
        assert_eq!(entity.name().unwrap().to_string(), "order_line");
    }

    #[test]
    fn explicit_name_wins_with_its_quoting() {
        let explicit = CqlIdentifier::quoted("Orders").unwrap();
        let entity = table("app::OrderLine", Some(explicit));
        assert_eq!(entity.name().unwrap().to_string(), "\"Orders\"");
    }

    #[test]
    fn name_is_resolved_once_and_invalidated_by_rename() {
        let entity = table("app::OrderLine", None);
        let first = entity.name().unwrap();
        assert_eq!(entity.name().unwrap(), first);

        let renamed = CqlIdentifier::new("orders").unwrap();
        let previous = entity.set_name(renamed.clone());
        assert_eq!(previous, Some(first));
        assert_eq!(entity.name().unwrap(), renamed);
    }

    #[test]
    fn force_quote_preserves_unquoted_text() {
        let entity = table("app::OrderLine", None);

        let changed = entity.set_force_quote(true).unwrap();
        let (old, new) = changed.unwrap();
        assert_eq!(old.to_string(), "order_line");
        assert_eq!(new.unquoted_text(), "order_line");
        assert!(new.is_quoted());

        // unchanged flag is a no-op
        assert!(entity.set_force_quote(true).unwrap().is_none());
    }

    #[test]
    fn shells_expose_no_properties() {
        let entity = table("app::OrderLine", None);
        assert!(entity.properties().is_empty());
        assert!(entity.property("anything").is_none());
    }
}
