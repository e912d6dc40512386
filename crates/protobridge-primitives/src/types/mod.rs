mod date;
mod decimal;
mod duration;
mod timestamp;

pub use date::Date;
pub use decimal::Decimal;
pub use duration::Duration;
pub use timestamp::Timestamp;

use thiserror::Error as ThisError;

///
/// TypeParseError
///
/// Failure to read one of the wire-level scalar literals.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TypeParseError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid decimal '{0}'")]
    InvalidDecimal(String),

    #[error("invalid duration '{0}': expected seconds with an 's' suffix")]
    InvalidDuration(String),

    #[error("invalid timestamp '{0}': expected RFC 3339")]
    InvalidTimestamp(String),
}
