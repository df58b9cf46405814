use crate::{
    identifier::CqlIdentifier,
    simple::{AppType, SimpleType, SimpleTypeCatalog},
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// DataType
///
/// The physical encoding assigned to a column or field: atomic,
/// collection, or structured. Element order is significant for `List`
/// and irrelevant for `Set`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DataType {
    List(Box<DataType>),
    Set(Box<DataType>),
    Simple(SimpleType),
    Structured(StructuredType),
}

impl DataType {
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    /// The natural encoding of an application type, derived straight
    /// from the simple-type catalog. Record types have no natural
    /// encoding here; resolving those requires the mapping registry.
    #[must_use]
    pub fn natural_of(ty: &AppType) -> Option<Self> {
        match ty {
            AppType::Scalar(scalar) => Some(Self::Simple(SimpleTypeCatalog::encoding(*scalar))),
            AppType::List(element) => Self::natural_of(element).map(Self::list),
            AppType::Set(element) => Self::natural_of(element).map(Self::set),
            AppType::Record(_) => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Set(element) => write!(f, "set<{element}>"),
            Self::Simple(simple) => write!(f, "{simple}"),
            Self::Structured(structured) => write!(f, "frozen<{}>", structured.name()),
        }
    }
}

impl From<SimpleType> for DataType {
    fn from(simple: SimpleType) -> Self {
        Self::Simple(simple)
    }
}

///
/// StructuredType
///
/// Handle to a named, reusable structured type. A handle may be
/// name-only when it comes from a by-name resolver; field layout is
/// carried when the source knows it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StructuredType {
    name: CqlIdentifier,
    fields: Vec<StructuredField>,
}

impl StructuredType {
    /// A name-only handle.
    #[must_use]
    pub const fn named(name: CqlIdentifier) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub const fn new(name: CqlIdentifier, fields: Vec<StructuredField>) -> Self {
        Self { name, fields }
    }

    #[must_use]
    pub const fn name(&self) -> &CqlIdentifier {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[StructuredField] {
        &self.fields
    }
}

///
/// StructuredField
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StructuredField {
    pub name: CqlIdentifier,
    pub data_type: DataType,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::ScalarType;

    #[test]
    fn natural_encoding_of_scalars() {
        assert_eq!(
            DataType::natural_of(&AppType::Scalar(ScalarType::Text)),
            Some(DataType::Simple(SimpleType::Text))
        );
    }

    #[test]
    fn natural_encoding_of_collections_recurses() {
        let ty = AppType::list(ScalarType::Int.into());
        assert_eq!(
            DataType::natural_of(&ty),
            Some(DataType::list(SimpleType::Int.into()))
        );

        let ty = AppType::set(ScalarType::Uuid.into());
        assert_eq!(
            DataType::natural_of(&ty),
            Some(DataType::set(SimpleType::Uuid.into()))
        );
    }

    #[test]
    fn record_types_have_no_natural_encoding() {
        assert_eq!(DataType::natural_of(&AppType::record("app::Person")), None);
        assert_eq!(
            DataType::natural_of(&AppType::list(AppType::record("app::Person"))),
            None
        );
    }

    #[test]
    fn display_renders_nested_collections() {
        let ty = DataType::list(DataType::Simple(SimpleType::Text));
        assert_eq!(ty.to_string(), "list<Text>");
    }
}
