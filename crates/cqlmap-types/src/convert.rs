use crate::value::CqlValue;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    sync::OnceLock,
};
use thiserror::Error as ThisError;
use time::{Date, OffsetDateTime, format_description::FormatItem};
use uuid::Uuid;

// Largest integer magnitude a double can hold without rounding.
const F64_SAFE_I64: i64 = 1i64 << 53;

static DATE_FORMAT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();

///
/// TypeMismatch
///
/// A cell's runtime representation admits no coercion to the requested
/// target type. Conversion is deterministic; this is never retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot convert {actual} value to {target}")]
pub struct TypeMismatch {
    pub target: &'static str,
    pub actual: &'static str,
}

impl TypeMismatch {
    fn new<T: ColumnTarget>(value: &CqlValue) -> Self {
        Self {
            target: T::target_name(),
            actual: value.kind(),
        }
    }
}

///
/// ColumnTarget
///
/// One conversion unit per supported target type. `coerce` applies a
/// single best-effort widening/parsing step from the cell's source
/// representation; a cell already carrying the target representation is
/// returned unchanged.
///

pub trait ColumnTarget: Sized {
    fn target_name() -> &'static str;

    /// Value produced for a null or absent cell.
    fn absent() -> Option<Self> {
        None
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch>;
}

/// Convert a result cell to the requested target type.
///
/// Absence (no cell, or a `Null` cell) yields the target's defined
/// empty value and never fails on its own.
pub fn convert_cell<T: ColumnTarget>(cell: Option<&CqlValue>) -> Result<Option<T>, TypeMismatch> {
    match cell {
        None | Some(CqlValue::Null) => Ok(T::absent()),
        Some(value) => T::coerce(value).map(Some),
    }
}

impl ColumnTarget for bool {
    fn target_name() -> &'static str {
        "boolean"
    }

    // An absent boolean cell reads as false.
    fn absent() -> Option<Self> {
        Some(false)
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        match value {
            CqlValue::Boolean(v) => Ok(*v),
            CqlValue::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            CqlValue::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(TypeMismatch::new::<Self>(value)),
        }
    }
}

impl ColumnTarget for i32 {
    fn target_name() -> &'static str {
        "integer"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let narrowed = match value {
            CqlValue::Int(v) => Some(*v),
            CqlValue::BigInt(v) => Self::try_from(*v).ok(),
            CqlValue::VarInt(v) => v.to_i32(),
            CqlValue::Decimal(v) if v.fract().is_zero() => v.to_i32(),
            CqlValue::Text(s) => s.parse().ok(),
            _ => None,
        };

        narrowed.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for i64 {
    fn target_name() -> &'static str {
        "long"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let widened = match value {
            CqlValue::BigInt(v) | CqlValue::Timestamp(v) => Some(*v),
            CqlValue::Int(v) => Some(Self::from(*v)),
            CqlValue::VarInt(v) => v.to_i64(),
            CqlValue::Decimal(v) if v.fract().is_zero() => v.to_i64(),
            CqlValue::Text(s) => s.parse().ok(),
            _ => None,
        };

        widened.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for f32 {
    fn target_name() -> &'static str {
        "float"
    }

    #[expect(clippy::cast_possible_truncation)]
    #[expect(clippy::float_cmp)]
    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let converted = match value {
            CqlValue::Float(v) => Some(*v),
            // Doubles narrow only when the value survives the round trip.
            CqlValue::Double(v) => {
                let narrowed = *v as Self;
                (f64::from(narrowed) == *v).then_some(narrowed)
            }
            CqlValue::Int(v) => v.to_f32(),
            CqlValue::Text(s) => s.parse().ok(),
            _ => None,
        };

        converted.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for f64 {
    fn target_name() -> &'static str {
        "double"
    }

    #[expect(clippy::cast_precision_loss)]
    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let widened = match value {
            CqlValue::Double(v) => Some(*v),
            CqlValue::Float(v) => Some(Self::from(*v)),
            CqlValue::Int(v) => Some(Self::from(*v)),
            CqlValue::BigInt(v) if v.abs() <= F64_SAFE_I64 => Some(*v as Self),
            CqlValue::VarInt(v) => v
                .to_i64()
                .filter(|i| i.abs() <= F64_SAFE_I64)
                .map(|i| i as Self),
            CqlValue::Decimal(v) => v.to_f64(),
            CqlValue::Text(s) => s.parse().ok(),
            _ => None,
        };

        widened.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for BigInt {
    fn target_name() -> &'static str {
        "big integer"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let converted = match value {
            CqlValue::VarInt(v) => Some(v.clone()),
            CqlValue::Int(v) => Some(Self::from(*v)),
            CqlValue::BigInt(v) => Some(Self::from(*v)),
            CqlValue::Decimal(v) if v.fract().is_zero() => v.to_i128().map(Self::from),
            CqlValue::Text(s) => s.parse().ok(),
            _ => None,
        };

        converted.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for Decimal {
    fn target_name() -> &'static str {
        "big decimal"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let converted = match value {
            CqlValue::Decimal(v) => Some(*v),
            CqlValue::Int(v) => Some(Self::from(*v)),
            CqlValue::BigInt(v) => Some(Self::from(*v)),
            CqlValue::VarInt(v) => v.to_i64().map(Self::from),
            CqlValue::Float(v) => Self::from_f32(*v),
            CqlValue::Double(v) => Self::from_f64(*v),
            CqlValue::Text(s) => s.parse().ok(),
            _ => None,
        };

        converted.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for Date {
    fn target_name() -> &'static str {
        "date"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let converted = match value {
            CqlValue::Date(v) => Some(*v),
            CqlValue::Timestamp(millis) | CqlValue::BigInt(millis) => date_from_millis(*millis),
            CqlValue::Text(s) => parse_date(s),
            _ => None,
        };

        converted.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for Uuid {
    fn target_name() -> &'static str {
        "uuid"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let converted = match value {
            CqlValue::Uuid(v) => Some(*v),
            CqlValue::Text(s) => Self::parse_str(s).ok(),
            // Byte layout must match the 16-byte encoding exactly.
            CqlValue::Blob(bytes) => Self::from_slice(bytes).ok(),
            _ => None,
        };

        converted.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for IpAddr {
    fn target_name() -> &'static str {
        "inet address"
    }

    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        let converted = match value {
            CqlValue::Inet(v) => Some(*v),
            CqlValue::Text(s) => s.parse().ok(),
            CqlValue::Blob(bytes) => inet_from_bytes(bytes),
            _ => None,
        };

        converted.ok_or_else(|| TypeMismatch::new::<Self>(value))
    }
}

impl ColumnTarget for Vec<u8> {
    fn target_name() -> &'static str {
        "blob"
    }

    // Blob targets accept only the blob representation; nothing widens
    // into raw bytes.
    fn coerce(value: &CqlValue) -> Result<Self, TypeMismatch> {
        match value {
            CqlValue::Blob(bytes) => Ok(bytes.clone()),
            _ => Err(TypeMismatch::new::<Self>(value)),
        }
    }
}

fn date_from_millis(millis: i64) -> Option<Date> {
    OffsetDateTime::from_unix_timestamp(millis.div_euclid(1000))
        .ok()
        .map(OffsetDateTime::date)
}

/// Parse an ISO `YYYY-MM-DD` string.
fn parse_date(s: &str) -> Option<Date> {
    let format = DATE_FORMAT
        .get_or_init(|| time::format_description::parse("[year]-[month]-[day]").unwrap());

    Date::parse(s, format).ok()
}

fn inet_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(|octets| IpAddr::V4(Ipv4Addr::from(octets))),
        16 => <[u8; 16]>::try_from(bytes)
            .ok()
            .map(|octets| IpAddr::V6(Ipv6Addr::from(octets))),
        _ => None,
    }
}

///
/// TESTS
///
