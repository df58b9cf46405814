use cqlmap_types::{AppType, TypeKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

///
/// CustomConversions
///
/// Registered write-target substitutions: values of a user type are
/// physically stored as another type. Types with a write target are
/// never mapped as record entities.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CustomConversions {
    write_targets: HashMap<TypeKey, AppType>,
}

impl CustomConversions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_write_target(mut self, source: impl Into<TypeKey>, target: AppType) -> Self {
        self.write_targets.insert(source.into(), target);
        self
    }

    pub fn register(&mut self, source: impl Into<TypeKey>, target: AppType) {
        self.write_targets.insert(source.into(), target);
    }

    #[must_use]
    pub fn has_write_target(&self, ty: &AppType) -> bool {
        self.write_target(ty).is_some()
    }

    #[must_use]
    pub fn write_target(&self, ty: &AppType) -> Option<&AppType> {
        ty.record_key().and_then(|key| self.write_targets.get(key))
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
    fn record_sources_resolve_to_their_target() {
        let conversions =
            CustomConversions::new().with_write_target("app::Money", ScalarType::Text.into());

        let money = AppType::record("app::Money");
        assert!(conversions.has_write_target(&money));
        assert_eq!(
            conversions.write_target(&money),
            Some(&AppType::Scalar(ScalarType::Text))
        );
    }

    #[test]
    fn scalars_and_unregistered_records_have_no_target() {
        let conversions = CustomConversions::new();

        assert!(!conversions.has_write_target(&AppType::Scalar(ScalarType::Int)));
        assert!(!conversions.has_write_target(&AppType::record("app::Person")));
    }
}
