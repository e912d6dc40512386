//! Shared scalar vocabulary for protobridge: the canonical `ScalarKind`
//! with its capability metadata, and the wire-level value types that back the
//! date, decimal, timestamp and duration scalars.

#[macro_use]
mod macros;

pub mod types;

use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ScalarFamily
///
/// Coarse routing family used when converting between scalar kinds.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarFamily {
    Bool,
    Bytes,
    Float,
    Integer,
    Temporal,
    Text,
}

///
/// ScalarMetadata
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScalarMetadata {
    pub label: &'static str,
    pub family: ScalarFamily,
    pub is_signed: bool,
    pub is_wide_integer: bool,
    pub is_message_backed: bool,
}

///
/// ScalarKind
///
/// Canonical scalar kind shared by the schema model, the reflection engine
/// and the codec.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
pub enum ScalarKind {
    Bool,
    Bytes,
    Date,
    Decimal,
    Duration,
    Float32,
    Float64,
    Int32,
    Int64,
    Key,
    String,
    Timestamp,
    Uint32,
    Uint64,
}

impl ScalarKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Bool,
        Self::Bytes,
        Self::Date,
        Self::Decimal,
        Self::Duration,
        Self::Float32,
        Self::Float64,
        Self::Int32,
        Self::Int64,
        Self::Key,
        Self::String,
        Self::Timestamp,
        Self::Uint32,
        Self::Uint64,
    ];

    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        self.metadata().label
    }

    #[must_use]
    pub const fn family(self) -> ScalarFamily {
        self.metadata().family
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self.family(), ScalarFamily::Integer)
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self.family(), ScalarFamily::Float)
    }

    /// 64-bit integers travel as JSON strings to survive 53-bit consumers.
    #[must_use]
    pub const fn is_wide_integer(self) -> bool {
        self.metadata().is_wide_integer
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        self.metadata().is_signed
    }

    /// Kinds physically stored as a well-known message rather than a
    /// primitive field value.
    #[must_use]
    pub const fn is_message_backed(self) -> bool {
        self.metadata().is_message_backed
    }

    /// Inclusive integer bounds for integer kinds.
    #[must_use]
    pub const fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::Uint32 => Some((0, u32::MAX as i128)),
            Self::Uint64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// TESTS
///
