//! Runtime for protobridge: message storage, reflection over live values,
//! the JSON and query codec, and rule validation.

pub mod codec;
pub mod message;
pub mod reflect;
pub mod validate;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

use thiserror::Error as ThisError;

///
/// Prelude
///
/// Handles and values only; errors and codec entry points stay in their
/// modules.
///

pub mod prelude {
    pub use crate::{
        message::{DynamicMessage, Location, Step},
        reflect::{AnyValue, Field, PropertySet},
        value::ScalarValue,
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    CodecError(#[from] codec::CodecError),

    #[error(transparent)]
    ConversionError(#[from] value::ConversionError),

    #[error(transparent)]
    MessageError(#[from] message::MessageError),

    #[error(transparent)]
    ReflectError(#[from] reflect::ReflectError),

    #[error(transparent)]
    SchemaError(#[from] protobridge_schema::SchemaError),

    #[error(transparent)]
    ValidateError(#[from] validate::ValidateError),

    #[error(transparent)]
    WireError(#[from] message::wire::WireError),
}
