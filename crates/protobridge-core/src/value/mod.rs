//! Typed scalar values and their conversion to and from physical storage.

use crate::message::{DynamicMessage, MessageError, Value};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use protobridge_primitives::{
    ScalarKind,
    types::{Date, Decimal, Duration, Timestamp},
};
use protobridge_schema::descriptor::{DescriptorPool, well_known};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// ConversionError
///
/// A value could not be read or coerced as the expected scalar kind.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("expected {expected}, found {found}")]
pub struct ConversionError {
    pub expected: ScalarKind,
    pub found: String,
}

impl ConversionError {
    pub fn new(expected: ScalarKind, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

///
/// ScalarValue
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum ScalarValue {
    Bool(bool),
    Bytes(Vec<u8>),
    Date(Date),
    Decimal(Decimal),
    Duration(Duration),
    Float32(f32),
    Float64(f64),
    Int32(i32),
    Int64(i64),
    Key(String),
    String(String),
    Timestamp(Timestamp),
    Uint32(u32),
    Uint64(u64),
}

macro_rules! impl_scalar_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_scalar_from! {
    bool => Bool,
    Vec<u8> => Bytes,
    Date => Date,
    Decimal => Decimal,
    Duration => Duration,
    f32 => Float32,
    f64 => Float64,
    i32 => Int32,
    i64 => Int64,
    String => String,
    Timestamp => Timestamp,
    u32 => Uint32,
    u64 => Uint64,
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl ScalarValue {
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Bytes(_) => ScalarKind::Bytes,
            Self::Date(_) => ScalarKind::Date,
            Self::Decimal(_) => ScalarKind::Decimal,
            Self::Duration(_) => ScalarKind::Duration,
            Self::Float32(_) => ScalarKind::Float32,
            Self::Float64(_) => ScalarKind::Float64,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Key(_) => ScalarKind::Key,
            Self::String(_) => ScalarKind::String,
            Self::Timestamp(_) => ScalarKind::Timestamp,
            Self::Uint32(_) => ScalarKind::Uint32,
            Self::Uint64(_) => ScalarKind::Uint64,
        }
    }

    /// Zero value of a kind.
    #[must_use]
    pub fn default_for(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool(false),
            ScalarKind::Bytes => Self::Bytes(Vec::new()),
            ScalarKind::Date => Self::Date(Date::EPOCH),
            ScalarKind::Decimal => Self::Decimal(Decimal::ZERO),
            ScalarKind::Duration => Self::Duration(Duration::ZERO),
            ScalarKind::Float32 => Self::Float32(0.0),
            ScalarKind::Float64 => Self::Float64(0.0),
            ScalarKind::Int32 => Self::Int32(0),
            ScalarKind::Int64 => Self::Int64(0),
            ScalarKind::Key => Self::Key(String::new()),
            ScalarKind::String => Self::String(String::new()),
            ScalarKind::Timestamp => Self::Timestamp(Timestamp::EPOCH),
            ScalarKind::Uint32 => Self::Uint32(0),
            ScalarKind::Uint64 => Self::Uint64(0),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Key(s) | Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int32(v) => Some(i128::from(*v)),
            Self::Int64(v) => Some(i128::from(*v)),
            Self::Uint32(v) => Some(i128::from(*v)),
            Self::Uint64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert into `kind`, range-checking integers and parsing text into
    /// the structured kinds. Lossy conversions fail.
    pub fn coerce(self, kind: ScalarKind) -> Result<Self, ConversionError> {
        if self.kind() == kind {
            return Ok(self);
        }
        let mismatch = || ConversionError::new(kind, self.describe());

        match (&self, kind) {
            (Self::String(s), ScalarKind::Key) => Ok(Self::Key(s.clone())),
            (Self::Key(s), ScalarKind::String) => Ok(Self::String(s.clone())),
            (Self::String(s), _) => Self::parse(kind, s),

            _ if kind.is_integer() => self
                .as_i128()
                .or_else(|| self.as_f64().and_then(integral))
                .and_then(|n| Self::from_i128(kind, n))
                .ok_or_else(mismatch),

            _ if kind.is_float() => {
                #[expect(clippy::cast_precision_loss)]
                let wide = self
                    .as_f64()
                    .or_else(|| self.as_i128().map(|n| n as f64))
                    .ok_or_else(mismatch)?;

                #[expect(clippy::cast_possible_truncation)]
                let narrowed = if kind == ScalarKind::Float32 {
                    Self::Float32(wide as f32)
                } else {
                    Self::Float64(wide)
                };

                Ok(narrowed)
            }

            _ => Err(mismatch()),
        }
    }

    /// Read a text literal as `kind`. Bytes have no text form here; the
    /// codec owns their base64 alphabet.
    pub fn parse(kind: ScalarKind, text: &str) -> Result<Self, ConversionError> {
        let invalid = || ConversionError::new(kind, format!("'{text}'"));

        let value = match kind {
            ScalarKind::Bool => match text {
                "true" => Self::Bool(true),
                "false" => Self::Bool(false),
                _ => return Err(invalid()),
            },
            ScalarKind::Bytes => return Err(invalid()),
            ScalarKind::Date => Self::Date(Date::parse(text).map_err(|_| invalid())?),
            ScalarKind::Decimal => Self::Decimal(Decimal::parse(text).map_err(|_| invalid())?),
            ScalarKind::Duration => Self::Duration(Duration::parse(text).map_err(|_| invalid())?),
            ScalarKind::Float32 => {
                #[expect(clippy::cast_possible_truncation)]
                let f = parse_float(text).ok_or_else(invalid)? as f32;
                Self::Float32(f)
            }
            ScalarKind::Float64 => Self::Float64(parse_float(text).ok_or_else(invalid)?),
            ScalarKind::Int32 => Self::Int32(text.parse().map_err(|_| invalid())?),
            ScalarKind::Int64 => Self::Int64(text.parse().map_err(|_| invalid())?),
            ScalarKind::Key => Self::Key(text.to_string()),
            ScalarKind::String => Self::String(text.to_string()),
            ScalarKind::Timestamp => {
                Self::Timestamp(Timestamp::parse_rfc3339(text).map_err(|_| invalid())?)
            }
            ScalarKind::Uint32 => Self::Uint32(text.parse().map_err(|_| invalid())?),
            ScalarKind::Uint64 => Self::Uint64(text.parse().map_err(|_| invalid())?),
        };

        Ok(value)
    }

    /// Physical form, building the well-known message for message-backed kinds.
    pub fn to_value(&self, pool: &DescriptorPool) -> Result<Value, MessageError> {
        let value = match self {
            Self::Bool(v) => Value::Bool(*v),
            Self::Bytes(v) => Value::Bytes(v.clone()),
            Self::Float32(v) => Value::F32(*v),
            Self::Float64(v) => Value::F64(*v),
            Self::Int32(v) => Value::I32(*v),
            Self::Int64(v) => Value::I64(*v),
            Self::Key(v) | Self::String(v) => Value::String(v.clone()),
            Self::Uint32(v) => Value::U32(*v),
            Self::Uint64(v) => Value::U64(*v),

            Self::Date(d) => {
                let mut m = DynamicMessage::new_by_name(pool, well_known::DATE)?;
                m.set(well_known::YEAR, Value::I32(d.year()));
                m.set(well_known::MONTH, Value::I32(i32::from(d.month())));
                m.set(well_known::DAY, Value::I32(i32::from(d.day())));
                Value::Message(Box::new(m))
            }
            Self::Decimal(d) => {
                let mut m = DynamicMessage::new_by_name(pool, well_known::DECIMAL)?;
                m.set(well_known::DECIMAL_VALUE, Value::String(d.to_string()));
                Value::Message(Box::new(m))
            }
            Self::Duration(d) => seconds_nanos(pool, well_known::DURATION, d.seconds(), d.nanos())?,
            Self::Timestamp(t) => {
                seconds_nanos(pool, well_known::TIMESTAMP, t.seconds(), t.nanos())?
            }
        };

        Ok(value)
    }

    /// Read a physical value as `kind`.
    pub fn from_value(kind: ScalarKind, value: &Value) -> Result<Self, ConversionError> {
        let mismatch = || ConversionError::new(kind, describe_value(value));

        let scalar = match (kind, value) {
            (ScalarKind::Bool, Value::Bool(v)) => Self::Bool(*v),
            (ScalarKind::Bytes, Value::Bytes(v)) => Self::Bytes(v.clone()),
            (ScalarKind::Float32, Value::F32(v)) => Self::Float32(*v),
            (ScalarKind::Float64, Value::F64(v)) => Self::Float64(*v),
            (ScalarKind::Int32, Value::I32(v)) => Self::Int32(*v),
            (ScalarKind::Int64, Value::I64(v)) => Self::Int64(*v),
            (ScalarKind::Key, Value::String(v)) => Self::Key(v.clone()),
            (ScalarKind::String, Value::String(v)) => Self::String(v.clone()),
            (ScalarKind::Uint32, Value::U32(v)) => Self::Uint32(*v),
            (ScalarKind::Uint64, Value::U64(v)) => Self::Uint64(*v),

            (ScalarKind::Date, Value::Message(m)) => {
                let part = |n| match m.get(n) {
                    Some(Value::I32(v)) => Some(*v),
                    None => Some(0),
                    _ => None,
                };
                let year = part(well_known::YEAR).ok_or_else(mismatch)?;
                let month = part(well_known::MONTH).and_then(|v| u8::try_from(v).ok());
                let day = part(well_known::DAY).and_then(|v| u8::try_from(v).ok());
                let (Some(month), Some(day)) = (month, day) else {
                    return Err(mismatch());
                };
                Self::Date(Date::new_checked(year, month, day).ok_or_else(mismatch)?)
            }
            (ScalarKind::Decimal, Value::Message(m)) => match m.get(well_known::DECIMAL_VALUE) {
                Some(Value::String(s)) => Self::Decimal(Decimal::parse(s).map_err(|_| mismatch())?),
                None => Self::Decimal(Decimal::ZERO),
                Some(_) => return Err(mismatch()),
            },
            (ScalarKind::Duration, Value::Message(m)) => {
                let (seconds, nanos) = read_seconds_nanos(m).ok_or_else(mismatch)?;
                Self::Duration(Duration::new_checked(seconds, nanos).ok_or_else(mismatch)?)
            }
            (ScalarKind::Timestamp, Value::Message(m)) => {
                let (seconds, nanos) = read_seconds_nanos(m).ok_or_else(mismatch)?;
                Self::Timestamp(Timestamp::new_checked(seconds, nanos).ok_or_else(mismatch)?)
            }

            _ => return Err(mismatch()),
        };

        Ok(scalar)
    }

    fn from_i128(kind: ScalarKind, n: i128) -> Option<Self> {
        Some(match kind {
            ScalarKind::Int32 => Self::Int32(i32::try_from(n).ok()?),
            ScalarKind::Int64 => Self::Int64(i64::try_from(n).ok()?),
            ScalarKind::Uint32 => Self::Uint32(u32::try_from(n).ok()?),
            ScalarKind::Uint64 => Self::Uint64(u64::try_from(n).ok()?),
            _ => return None,
        })
    }

    // Short description used in conversion errors.
    fn describe(&self) -> String {
        format!("{} {self}", self.kind())
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Bytes(v) => f.write_str(&STANDARD.encode(v)),
            Self::Date(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Duration(v) => write!(f, "{v}"),
            Self::Float32(v) => f.write_str(&format_float(f64::from(*v))),
            Self::Float64(v) => f.write_str(&format_float(*v)),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Key(v) | Self::String(v) => f.write_str(v),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
        }
    }
}

/// Float text with the JSON string tokens for non-finite values.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

pub(crate) fn parse_float(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => text.parse().ok(),
    }
}

fn integral(f: f64) -> Option<i128> {
    #[expect(clippy::cast_possible_truncation)]
    let n = f as i128;

    #[expect(clippy::cast_precision_loss)]
    let exact = f.is_finite() && f.fract() == 0.0 && n as f64 == f;

    exact.then_some(n)
}

fn seconds_nanos(
    pool: &DescriptorPool,
    type_name: &str,
    seconds: i64,
    nanos: i32,
) -> Result<Value, MessageError> {
    let mut m = DynamicMessage::new_by_name(pool, type_name)?;
    m.set(well_known::SECONDS, Value::I64(seconds));
    m.set(well_known::NANOS, Value::I32(nanos));

    Ok(Value::Message(Box::new(m)))
}

fn read_seconds_nanos(m: &DynamicMessage) -> Option<(i64, i32)> {
    let seconds = match m.get(well_known::SECONDS) {
        Some(Value::I64(v)) => *v,
        None => 0,
        _ => return None,
    };
    let nanos = match m.get(well_known::NANOS) {
        Some(Value::I32(v)) => *v,
        None => 0,
        _ => return None,
    };

    Some((seconds, nanos))
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Bool(_) => "bool".into(),
        Value::Bytes(_) => "bytes".into(),
        Value::Enum(_) => "enum".into(),
        Value::F32(_) => "float32".into(),
        Value::F64(_) => "float64".into(),
        Value::I32(_) => "int32".into(),
        Value::I64(_) => "int64".into(),
        Value::List(_) => "list".into(),
        Value::Map(_) => "map".into(),
        Value::Message(m) => format!("message {}", m.full_name()),
        Value::String(_) => "string".into(),
        Value::U32(_) => "uint32".into(),
        Value::U64(_) => "uint64".into(),
    }
}

///
/// TESTS
///
