use crate::types::TypeParseError;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

///
/// Duration
///
/// Signed span matching `google.protobuf.Duration`: `seconds` and `nanos`
/// always share a sign. Rendered as decimal seconds with an `s` suffix.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Duration {
    seconds: i64,
    nanos: i32,
}

impl Duration {
    pub const ZERO: Self = Self {
        seconds: 0,
        nanos: 0,
    };

    #[must_use]
    pub fn new_checked(seconds: i64, nanos: i32) -> Option<Self> {
        if i64::from(nanos).abs() >= NANOS_PER_SECOND {
            return None;
        }
        if (seconds > 0 && nanos < 0) || (seconds < 0 && nanos > 0) {
            return None;
        }

        Some(Self { seconds, nanos })
    }

    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn parse(s: &str) -> Result<Self, TypeParseError> {
        let invalid = || TypeParseError::InvalidDuration(s.to_string());

        let body = s.strip_suffix('s').ok_or_else(invalid)?;
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };

        let (whole, frac) = match body.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (body, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let seconds = whole.parse::<i64>().map_err(|_| invalid())?;
        let nanos = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<9}");
            padded.parse::<i32>().map_err(|_| invalid())?
        };

        if negative {
            Ok(Self {
                seconds: -seconds,
                nanos: -nanos,
            })
        } else {
            Ok(Self { seconds, nanos })
        }
    }

    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    #[must_use]
    pub const fn nanos(self) -> i32 {
        self.nanos
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.seconds < 0 || self.nanos < 0;
        let seconds = self.seconds.unsigned_abs();
        let nanos = self.nanos.unsigned_abs();

        if negative {
            f.write_str("-")?;
        }

        if nanos == 0 {
            write!(f, "{seconds}s")
        } else if nanos % 1_000_000 == 0 {
            write!(f, "{seconds}.{:03}s", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            write!(f, "{seconds}.{:06}s", nanos / 1_000)
        } else {
            write!(f, "{seconds}.{nanos:09}s")
        }
    }
}

impl FromStr for Duration {
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
    use proptest::prelude::*;

    #[test]
    fn renders_protobuf_style() {
        assert_eq!(Duration::from_seconds(3).to_string(), "3s");
        assert_eq!(Duration::new_checked(1, 500_000_000).unwrap().to_string(), "1.500s");
        assert_eq!(Duration::new_checked(0, -1_000).unwrap().to_string(), "-0.000001s");
    }

    #[test]
    fn parse_round_trips() {
        for input in ["0s", "1.500s", "-2.000000001s", "86400s"] {
            let parsed = Duration::parse(input).unwrap();
            assert_eq!(parsed.to_string(), input);
        }
    }

    #[test]
    fn negative_fraction_keeps_sign_on_both_parts() {
        let d = Duration::parse("-1.5s").unwrap();

        assert_eq!((d.seconds(), d.nanos()), (-1, -500_000_000));
    }

    #[test]
    fn rejects_malformed() {
        for input in ["1", "s", "1.s5", "1.0000000001s", "+1s", "1,5s"] {
            assert!(Duration::parse(input).is_err(), "{input} should be rejected");
        }
    }

    proptest! {
        #[test]
        fn display_then_parse_is_identity(seconds in 0i64..1_000_000_000, nanos in 0i32..1_000_000_000, negative in any::<bool>()) {
            let d = if negative {
                Duration::new_checked(-seconds, -nanos).unwrap()
            } else {
                Duration::new_checked(seconds, nanos).unwrap()
            };

            prop_assert_eq!(Duration::parse(&d.to_string()).unwrap(), d);
        }
    }
}
