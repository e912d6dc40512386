use crate::types::TypeParseError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

///
/// Timestamp
///
/// Seconds and nanoseconds since the Unix epoch, matching the layout of
/// `google.protobuf.Timestamp`. `nanos` is always in `0..1_000_000_000`.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    seconds: i64,
    nanos: i32,
}

impl Timestamp {
    pub const EPOCH: Self = Self {
        seconds: 0,
        nanos: 0,
    };

    /// Construct from raw parts, rejecting out-of-range nanos or instants
    /// that cannot be rendered as RFC 3339.
    #[must_use]
    pub fn new_checked(seconds: i64, nanos: i32) -> Option<Self> {
        let sub = u32::try_from(nanos).ok()?;
        DateTime::<Utc>::from_timestamp(seconds, sub)?;

        if sub >= 1_000_000_000 {
            return None;
        }

        Some(Self { seconds, nanos })
    }

    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, TypeParseError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|_| TypeParseError::InvalidTimestamp(s.to_string()))?;

        let nanos = i32::try_from(dt.timestamp_subsec_nanos())
            .map_err(|_| TypeParseError::InvalidTimestamp(s.to_string()))?;

        Ok(Self {
            seconds: dt.timestamp(),
            nanos,
        })
    }

    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    #[must_use]
    pub const fn nanos(self) -> i32 {
        self.nanos
    }

    fn to_datetime(self) -> Option<DateTime<Utc>> {
        let sub = u32::try_from(self.nanos).ok()?;
        DateTime::<Utc>::from_timestamp(self.seconds, sub)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => Err(fmt::Error),
        }
    }
}

impl FromStr for Timestamp {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_rfc3339(s)
    }
}

///
/// TESTS
///
