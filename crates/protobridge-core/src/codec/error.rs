use crate::{message::wire::WireError, reflect::ReflectError};
use protobridge_primitives::ScalarKind;
use protobridge_schema::SchemaError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// CodecError
///
/// Decode and encode failures. Frames wrap the leaf in `Context` on the way
/// out, so the outermost error carries the full dotted path.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum CodecError {
    #[error("{path}: {source}")]
    Context {
        path: ErrorPath,
        #[source]
        source: Box<Self>,
    },

    #[error("'!type' names '{expected}' but '{found}' is set")]
    DiscriminatorMismatch { expected: String, found: String },

    #[error("invalid base64 '{0}'")]
    InvalidBase64(String),

    #[error("invalid {kind} literal '{value}'")]
    InvalidLiteral { kind: ScalarKind, value: String },

    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("multiple keys found in oneof")]
    MultipleOneofKeys,

    #[error("'{schema}' has no property '{property}'")]
    NoSuchProperty { schema: String, property: String },

    #[error("no type found in Any")]
    NoTypeInAny,

    #[error("{value} is out of range for {kind}")]
    OutOfRange { kind: ScalarKind, value: String },

    /// Query value of the wrong shape; the key is carried by the path.
    #[error("{0}")]
    QueryShape(&'static str),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("type '{0}' is not allowed here")]
    TypeNotAllowed(String),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown enum option '{0}'")]
    UnknownEnumOption(String),

    #[error("no descriptor registered for '{0}'")]
    UnknownType(String),

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl CodecError {
    /// Record the property or map key the error occurred under.
    #[must_use]
    pub fn with_field(self, field: impl Into<String>) -> Self {
        self.within(PathStep::Field(field.into()))
    }

    /// Record the array index the error occurred at.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.within(PathStep::Index(index))
    }

    /// The rendered path (`aBar[1].barId`), if any frame added one.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        self.error_path().map(ToString::to_string)
    }

    #[must_use]
    pub const fn error_path(&self) -> Option<&ErrorPath> {
        match self {
            Self::Context { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The innermost error without path context.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }

    pub(crate) fn json(err: &serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }

    fn within(self, step: PathStep) -> Self {
        match self {
            Self::Context { mut path, source } => {
                path.0.push(step);
                Self::Context { path, source }
            }
            source => Self::Context {
                path: ErrorPath(vec![step]),
                source: Box::new(source),
            },
        }
    }
}

///
/// PathStep
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathStep {
    Field(String),
    Index(usize),
}

///
/// ErrorPath
///
/// Steps from the document root to the failing value. Frames add their step
/// on the way out, so storage is innermost first.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorPath(Vec<PathStep>);

impl ErrorPath {
    /// Steps in document order, outermost first.
    pub fn steps(&self) -> impl Iterator<Item = &PathStep> {
        self.0.iter().rev()
    }
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps().enumerate() {
            match step {
                PathStep::Field(name) if i == 0 => f.write_str(name)?,
                PathStep::Field(name) => write!(f, ".{name}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }

        Ok(())
    }
}

///
/// TESTS
///
