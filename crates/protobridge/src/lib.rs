//! ## Crate layout
//! - `primitives`: scalar kinds and the date, decimal, timestamp and duration
//!   value types.
//! - `schema`: descriptor contract, annotations and the cached schema graph.
//! - `core`: message storage, reflection, the JSON/query codec and validation.
//!
//! The common path is: register descriptors in a `DescriptorPool`, wrap it in
//! a `SchemaSet`, then decode, reflect over, validate and encode
//! `DynamicMessage` values against it.

pub use protobridge_core as core;
pub use protobridge_primitives as primitives;
pub use protobridge_schema as schema;

pub use protobridge_core::{
    Error,
    codec::{
        CodecError, DecodeOptions, EncodeOptions, decode_json, decode_json_with, decode_query,
        encode_json, encode_json_with, parse_query,
    },
    validate::{ValidateError, ValidationIssues, validate},
};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use protobridge_core::prelude::*;
    pub use protobridge_schema::prelude::*;
}
