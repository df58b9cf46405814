use cqlmap_types::TypeKey;
use serde::{Deserialize, Serialize};

///
/// Mapping
///
/// Declarative per-entity overrides applied exactly once during
/// context initialization. Serde-borne so overrides can come from
/// configuration as well as code.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Mapping {
    #[serde(default)]
    pub entities: Vec<EntityMapping>,
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityMapping) -> Self {
        self.entities.push(entity);
        self
    }
}

///
/// EntityMapping
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EntityMapping {
    pub type_key: TypeKey,

    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default)]
    pub force_quote: bool,

    #[serde(default)]
    pub properties: Vec<PropertyMapping>,
}

impl EntityMapping {
    pub fn new(type_key: impl Into<TypeKey>) -> Self {
        Self {
            type_key: type_key.into(),
            table_name: None,
            force_quote: false,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_force_quote(mut self, force_quote: bool) -> Self {
        self.force_quote = force_quote;
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyMapping) -> Self {
        self.properties.push(property);
        self
    }
}

///
/// PropertyMapping
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PropertyMapping {
    pub property_name: String,

    #[serde(default)]
    pub column_name: Option<String>,

    #[serde(default)]
    pub force_quote: bool,
}

impl PropertyMapping {
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            column_name: None,
            force_quote: false,
        }
    }

    #[must_use]
    pub fn with_column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_force_quote(mut self, force_quote: bool) -> Self {
        self.force_quote = force_quote;
        self
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_round_trips_through_json() {
        let mapping = Mapping::new().with_entity(
            EntityMapping::new("app::Person")
                .with_table_name("people")
                .with_property(PropertyMapping::new("firstName").with_column_name("given")),
        );

        let json = serde_json::to_string(&mapping).unwrap();
        let decoded: Mapping = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.entities.len(), 1);
        assert_eq!(decoded.entities[0].table_name.as_deref(), Some("people"));
        assert_eq!(
            decoded.entities[0].properties[0].column_name.as_deref(),
            Some("given")
        );
    }

    #[test]
    fn overrides_default_to_absent() {
        let decoded: EntityMapping =
            serde_json::from_str(r#"{"type_key": "app::Person"}"#).unwrap();

        assert!(decoded.table_name.is_none());
        assert!(!decoded.force_quote);
        assert!(decoded.properties.is_empty());
    }
}
