//! Well-known message types that the schema builder special-cases into
//! scalar and any schemas instead of objects.

use crate::descriptor::{FieldDescriptor, FieldKind, MessageBuilder, MessageDescriptor};
use protobridge_primitives::ScalarKind;

pub const TIMESTAMP: &str = "google.protobuf.Timestamp";
pub const DURATION: &str = "google.protobuf.Duration";
pub const STRUCT: &str = "google.protobuf.Struct";
pub const DATE: &str = "protobridge.types.Date";
pub const DECIMAL: &str = "protobridge.types.Decimal";
pub const ANY: &str = "protobridge.types.Any";

// Any field numbers.
pub const ANY_TYPE_NAME: u32 = 1;
pub const ANY_PROTO: u32 = 2;
pub const ANY_JSON: u32 = 3;

// Timestamp / Duration field numbers.
pub const SECONDS: u32 = 1;
pub const NANOS: u32 = 2;

// Date field numbers.
pub const YEAR: u32 = 1;
pub const MONTH: u32 = 2;
pub const DAY: u32 = 3;

// Decimal field number.
pub const DECIMAL_VALUE: u32 = 1;

// Polymorph wrappers carry their Any in a field with this name.
pub const POLYMORPH_VALUE: &str = "value";

///
/// WellKnown
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WellKnown {
    Any,
    Date,
    Decimal,
    Duration,
    Struct,
    Timestamp,
}

impl WellKnown {
    #[must_use]
    pub fn from_full_name(full_name: &str) -> Option<Self> {
        match full_name {
            ANY => Some(Self::Any),
            DATE => Some(Self::Date),
            DECIMAL => Some(Self::Decimal),
            DURATION => Some(Self::Duration),
            STRUCT => Some(Self::Struct),
            TIMESTAMP => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Scalar kind for the well-known types that read as scalars.
    #[must_use]
    pub const fn scalar_kind(self) -> Option<ScalarKind> {
        match self {
            Self::Date => Some(ScalarKind::Date),
            Self::Decimal => Some(ScalarKind::Decimal),
            Self::Duration => Some(ScalarKind::Duration),
            Self::Timestamp => Some(ScalarKind::Timestamp),
            Self::Any | Self::Struct => None,
        }
    }

    /// Scalar kind a message type reads as, if it is a scalar-backed well-known type.
    #[must_use]
    pub fn scalar_kind_of(full_name: &str) -> Option<ScalarKind> {
        Self::from_full_name(full_name).and_then(Self::scalar_kind)
    }
}

/// Descriptors registered by `DescriptorPool::with_well_known_types`.
#[must_use]
pub fn descriptors() -> Vec<MessageDescriptor> {
    let seconds_nanos = |name: &str| {
        MessageBuilder::new("google.protobuf", name)
            .field(FieldDescriptor::new("seconds", SECONDS, FieldKind::Int64))
            .field(FieldDescriptor::new("nanos", NANOS, FieldKind::Int32))
            .build()
    };

    vec![
        seconds_nanos("Timestamp"),
        seconds_nanos("Duration"),
        // Registered so lookups resolve; the builder rejects it by name.
        MessageBuilder::new("google.protobuf", "Struct").build(),
        MessageBuilder::new("protobridge.types", "Date")
            .field(FieldDescriptor::new("year", YEAR, FieldKind::Int32))
            .field(FieldDescriptor::new("month", MONTH, FieldKind::Int32))
            .field(FieldDescriptor::new("day", DAY, FieldKind::Int32))
            .build(),
        MessageBuilder::new("protobridge.types", "Decimal")
            .field(FieldDescriptor::new(
                "value",
                DECIMAL_VALUE,
                FieldKind::String,
            ))
            .build(),
        MessageBuilder::new("protobridge.types", "Any")
            .field(FieldDescriptor::new(
                "type_name",
                ANY_TYPE_NAME,
                FieldKind::String,
            ))
            .field(FieldDescriptor::new("proto", ANY_PROTO, FieldKind::Bytes))
            .field(FieldDescriptor::new("json", ANY_JSON, FieldKind::Bytes))
            .build(),
    ]
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;

    #[test]
    fn every_well_known_name_is_registered() {
        let pool = DescriptorPool::with_well_known_types();

        for name in [TIMESTAMP, DURATION, STRUCT, DATE, DECIMAL, ANY] {
            assert!(pool.message(name).is_some(), "{name} missing");
            assert!(WellKnown::from_full_name(name).is_some());
        }
    }
}
