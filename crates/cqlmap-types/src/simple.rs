use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// SimpleType
///
/// Atomic physical encodings of the wide store.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum SimpleType {
    BigInt,
    Blob,
    Boolean,
    Date,
    Decimal,
    Double,
    Float,
    Inet,
    Int,
    Text,
    Timestamp,
    Uuid,
    VarInt,
}

impl SimpleType {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::BigInt | Self::Decimal | Self::Double | Self::Float | Self::Int | Self::VarInt
        )
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Timestamp)
    }
}

///
/// ScalarType
///
/// Application-side scalar types the mapping layer recognizes directly.
/// Such types must never be treated as nested record types.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum ScalarType {
    BigDecimal,
    BigInteger,
    Blob,
    Boolean,
    Date,
    Double,
    Float,
    Inet,
    Int,
    Long,
    Text,
    Timestamp,
    Uuid,
}

///
/// SimpleTypeCatalog
///
/// Fixed, immutable table mapping primitive-like application types to
/// their atomic physical encodings.
///

pub struct SimpleTypeCatalog;

impl SimpleTypeCatalog {
    /// The atomic encoding for an application scalar.
    #[must_use]
    pub const fn encoding(scalar: ScalarType) -> SimpleType {
        match scalar {
            ScalarType::BigDecimal => SimpleType::Decimal,
            ScalarType::BigInteger => SimpleType::VarInt,
            ScalarType::Blob => SimpleType::Blob,
            ScalarType::Boolean => SimpleType::Boolean,
            ScalarType::Date => SimpleType::Date,
            ScalarType::Double => SimpleType::Double,
            ScalarType::Float => SimpleType::Float,
            ScalarType::Inet => SimpleType::Inet,
            ScalarType::Int => SimpleType::Int,
            ScalarType::Long => SimpleType::BigInt,
            ScalarType::Text => SimpleType::Text,
            ScalarType::Timestamp => SimpleType::Timestamp,
            ScalarType::Uuid => SimpleType::Uuid,
        }
    }

    /// Membership test: does this application type map directly to an
    /// atomic encoding, independent of any entity?
    #[must_use]
    pub const fn is_simple(ty: &AppType) -> bool {
        matches!(ty, AppType::Scalar(_))
    }
}

///
/// TypeKey
///
/// Path-like name identifying an application record type.
/// The last `::`-separated segment is the simple name used for
/// default physical-name derivation.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The unqualified type name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

///
/// AppType
///
/// An application-declared type as seen by the mapping layer.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AppType {
    /// Ordered collection; element order is significant.
    List(Box<AppType>),
    /// A named application record type.
    Record(TypeKey),
    Scalar(ScalarType),
    /// Unordered collection.
    Set(Box<AppType>),
}

impl AppType {
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn record(key: impl Into<TypeKey>) -> Self {
        Self::Record(key.into())
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_))
    }

    /// The element type for collections.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::List(element) | Self::Set(element) => Some(element),
            Self::Record(_) | Self::Scalar(_) => None,
        }
    }

    /// The element type for collections; the type itself otherwise.
    #[must_use]
    pub fn actual(&self) -> &Self {
        self.element().unwrap_or(self)
    }

    #[must_use]
    pub const fn record_key(&self) -> Option<&TypeKey> {
        match self {
            Self::Record(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Record(key) => write!(f, "{key}"),
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Set(element) => write!(f, "set<{element}>"),
        }
    }
}

impl From<ScalarType> for AppType {
    fn from(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<TypeKey> for AppType {
    fn from(key: TypeKey) -> Self {
        Self::Record(key)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_simple_and_records_are_not() {
        assert!(SimpleTypeCatalog::is_simple(&AppType::Scalar(ScalarType::Int)));
        assert!(!SimpleTypeCatalog::is_simple(&AppType::record("app::Person")));
        assert!(!SimpleTypeCatalog::is_simple(&AppType::list(
            ScalarType::Text.into()
        )));
    }

    #[test]
    fn catalog_maps_integer_widths() {
        assert_eq!(SimpleTypeCatalog::encoding(ScalarType::Int), SimpleType::Int);
        assert_eq!(
            SimpleTypeCatalog::encoding(ScalarType::Long),
            SimpleType::BigInt
        );
        assert_eq!(
            SimpleTypeCatalog::encoding(ScalarType::BigInteger),
            SimpleType::VarInt
        );
    }

    #[test]
    fn type_key_simple_name_strips_path() {
        assert_eq!(TypeKey::new("app::orders::Visit").simple_name(), "Visit");
        assert_eq!(TypeKey::new("Visit").simple_name(), "Visit");
    }

    #[test]
    fn actual_unwraps_collections_only() {
        let list = AppType::list(ScalarType::Text.into());
        assert_eq!(list.actual(), &AppType::Scalar(ScalarType::Text));

        let scalar = AppType::Scalar(ScalarType::Int);
        assert_eq!(scalar.actual(), &scalar);
    }

    #[test]
    fn simple_type_parses_from_name() {
        assert_eq!("VarInt".parse::<SimpleType>().ok(), Some(SimpleType::VarInt));
        assert!("NotAType".parse::<SimpleType>().is_err());
    }
}
