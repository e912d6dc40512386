//! Schema model for protobridge.
//!
//! Turns a descriptor graph plus side-channel annotations into a normalized
//! graph of root schemas (objects, oneofs, enums, polymorphic unions) whose
//! cross references are name keys into a shared `SchemaSet` arena.

pub mod build;
pub mod descriptor;
pub mod naming;
pub mod node;

use thiserror::Error as ThisError;

pub use build::{BuildError, SchemaError, SchemaOptions, SchemaSet};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{SchemaOptions, SchemaSet},
        descriptor::{
            DescriptorPool, EnumBuilder, FieldDescriptor, FieldKind, Label, MessageBuilder,
            MessageDescriptor,
        },
        node::*,
    };
    pub use protobridge_primitives::ScalarKind;
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    DescriptorError(#[from] descriptor::DescriptorError),

    #[error(transparent)]
    SchemaError(#[from] SchemaError),
}
