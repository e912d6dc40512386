use crate::types::TypeParseError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use time::{Date as TimeDate, Month};

///
/// Date
///
/// Calendar date without a time zone. Components are always a valid
/// proleptic Gregorian date.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    pub const EPOCH: Self = Self {
        year: 1970,
        month: 1,
        day: 1,
    };

    /// Construct a date, returning `None` for impossible calendar dates.
    #[must_use]
    pub fn new_checked(year: i32, month: u8, day: u8) -> Option<Self> {
        let month_value = Month::try_from(month).ok()?;
        TimeDate::from_calendar_date(year, month_value, day).ok()?;

        Some(Self { year, month, day })
    }

    /// Parse an ISO `YYYY-MM-DD` string into a `Date`.
    pub fn parse(s: &str) -> Result<Self, TypeParseError> {
        let invalid = || TypeParseError::InvalidDate(s.to_string());

        let mut parts = s.splitn(3, '-');
        let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if y.len() != 4 || m.len() != 2 || d.len() != 2 {
            return Err(invalid());
        }

        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u8>().map_err(|_| invalid())?;
        let day = d.parse::<u8>().map_err(|_| invalid())?;

        Self::new_checked(year, month, day).ok_or_else(invalid)
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the month component (1–12)
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Returns the day-of-month component (1–31)
    #[must_use]
    pub const fn day(self) -> u8 {
        self.day
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_iso_dates() {
        let date = Date::parse("2024-02-29").expect("leap day should parse");

        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));
        assert_eq!(date.to_string(), "2024-02-29");
    }

    #[test]
    fn rejects_impossible_dates() {
        for input in ["2023-02-29", "2024-13-01", "2024-1-01", "20240101", "abcd-ef-gh"] {
            assert!(Date::parse(input).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn ordering_follows_calendar() {
        let a = Date::new_checked(2023, 12, 31).unwrap();
        let b = Date::new_checked(2024, 1, 1).unwrap();

        assert!(a < b);
    }
}
