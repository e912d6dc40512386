use crate::types::TypeParseError;
use rust_decimal::Decimal as WrappedDecimal;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

///
/// Decimal
///
/// Arbitrary-scale decimal carried as its canonical string form on the wire.
/// The scale is preserved, so `1.50` stays `1.50`.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Decimal(WrappedDecimal);

impl Decimal {
    pub const ZERO: Self = Self(WrappedDecimal::ZERO);

    /// Construct a decimal from mantissa and scale.
    #[must_use]
    pub fn new(num: i64, scale: u32) -> Self {
        Self(WrappedDecimal::new(num, scale))
    }

    pub fn parse(s: &str) -> Result<Self, TypeParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed != s {
            return Err(TypeParseError::InvalidDecimal(s.to_string()));
        }

        WrappedDecimal::from_str(s)
            .map(Self)
            .map_err(|_| TypeParseError::InvalidDecimal(s.to_string()))
    }

    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.0.scale()
    }

    #[must_use]
    pub const fn inner(&self) -> WrappedDecimal {
        self.0
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Decimal {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<WrappedDecimal> for Decimal {
    fn from(value: WrappedDecimal) -> Self {
        Self(value)
    }
}

///
/// TESTS
///
