use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::Serialize;
use std::net::IpAddr;
use time::Date;
use uuid::Uuid;

///
/// CqlValue
///
/// A decoded result cell. Carries whatever concrete representation the
/// result-decoding layer produced; the conversion pipeline in
/// [`crate::convert`] turns it into a caller-requested target type.
///
/// `Timestamp` is milliseconds since the Unix epoch, UTC.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum CqlValue {
    BigInt(i64),
    Blob(Vec<u8>),
    Boolean(bool),
    Date(Date),
    Decimal(Decimal),
    Double(f64),
    Float(f32),
    Inet(IpAddr),
    Int(i32),
    List(Vec<CqlValue>),
    Null,
    Set(Vec<CqlValue>),
    Text(String),
    Timestamp(i64),
    Uuid(Uuid),
    VarInt(BigInt),
}

impl CqlValue {
    /// Name of the runtime representation, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BigInt(_) => "bigint",
            Self::Blob(_) => "blob",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Decimal(_) => "decimal",
            Self::Double(_) => "double",
            Self::Float(_) => "float",
            Self::Inet(_) => "inet",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Null => "null",
            Self::Set(_) => "set",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
            Self::VarInt(_) => "varint",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for CqlValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for CqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for CqlValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<f32> for CqlValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for CqlValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for CqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for CqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<Uuid> for CqlValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<IpAddr> for CqlValue {
    fn from(v: IpAddr) -> Self {
        Self::Inet(v)
    }
}

impl From<BigInt> for CqlValue {
    fn from(v: BigInt) -> Self {
        Self::VarInt(v)
    }
}

impl From<Decimal> for CqlValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Date> for CqlValue {
    fn from(v: Date) -> Self {
        Self::Date(v)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_representation() {
        assert_eq!(CqlValue::Int(1).kind(), "int");
        assert_eq!(CqlValue::Null.kind(), "null");
        assert_eq!(CqlValue::Blob(vec![1]).kind(), "blob");
    }

    #[test]
    fn from_impls_pick_the_wire_variant() {
        assert_eq!(CqlValue::from(7i32), CqlValue::Int(7));
        assert_eq!(CqlValue::from(7i64), CqlValue::BigInt(7));
        assert_eq!(CqlValue::from("x"), CqlValue::Text("x".to_string()));
    }

    #[test]
    fn cells_serialize_for_diagnostics() {
        let json = serde_json::to_string(&CqlValue::Int(7)).unwrap();
        assert_eq!(json, r#"{"Int":7}"#);

        let json = serde_json::to_string(&CqlValue::Null).unwrap();
        assert_eq!(json, "\"Null\"");
    }
}
