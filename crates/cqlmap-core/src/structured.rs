use cqlmap_types::{CqlIdentifier, StructuredType};
use std::collections::HashMap;

///
/// StructuredTypeResolver
///
/// By-name resolution of structured-type handles, consulted when an
/// explicit override names a structured type that is not mapped to any
/// record type.
///

pub trait StructuredTypeResolver: Send + Sync {
    fn resolve(&self, name: &CqlIdentifier) -> Option<StructuredType>;
}

///
/// MapStructuredTypeResolver
///
/// Map-backed resolver for embedders and tests. The default instance
/// resolves nothing.
///

#[derive(Clone, Debug, Default)]
pub struct MapStructuredTypeResolver {
    types: HashMap<CqlIdentifier, StructuredType>,
}

impl MapStructuredTypeResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, structured: StructuredType) -> Self {
        self.types.insert(structured.name().clone(), structured);
        self
    }
}

impl StructuredTypeResolver for MapStructuredTypeResolver {
    fn resolve(&self, name: &CqlIdentifier) -> Option<StructuredType> {
        self.types.get(name).cloned()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_names_only() {
        let name = CqlIdentifier::new("address").unwrap();
        let resolver =
            MapStructuredTypeResolver::new().with_type(StructuredType::named(name.clone()));

        assert!(resolver.resolve(&name).is_some());
        assert!(resolver.resolve(&CqlIdentifier::new("missing").unwrap()).is_none());
    }
}
