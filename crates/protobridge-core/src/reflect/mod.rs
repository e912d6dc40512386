//! Reflection over live message values.
//!
//! A `PropertySet` pairs a container root schema with a location inside one
//! document message. Each property becomes a `Field` handle; handles hold the
//! schema and an absolute location but never the message itself, so reads
//! take `&DynamicMessage` and writes take `&mut DynamicMessage`.
//!
//! Reads never allocate. Writes walk from the document root and create every
//! missing ancestor once.

mod any;
mod array;
mod container;
mod map;
mod property_set;
mod scalar;


pub use any::{AnyField, AnyValue, PolymorphField};
pub use array::{ContainerArrayField, EnumArrayField, ScalarArrayField};
pub use container::ContainerField;
pub use map::{ContainerMapField, EnumMapField, ScalarMapField};
pub use property_set::PropertySet;
pub use scalar::{EnumField, ScalarField};

use crate::{
    message::{DynamicMessage, Location, MessageError, Step, Value},
    value::ConversionError,
};
use protobridge_schema::{
    SchemaError, SchemaSet,
    descriptor::{DescriptorPool, well_known},
    node::{FieldSchema, Ref, RootSchema},
};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// ReflectError
///
/// Every variant names the field it concerns.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ReflectError {
    #[error("field '{field}' does not accept Any type '{type_name}'")]
    AnyTypeNotAllowed { field: String, type_name: String },

    #[error("field '{field}': {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error("field '{field}' needs a json or proto payload")]
    EmptyAny { field: String },

    #[error("field '{field}': index {index} out of range (len {len})")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("field '{field}' has no key '{key}'")]
    MissingKey { field: String, key: String },

    #[error("field '{field}': {source}")]
    Schema {
        field: String,
        #[source]
        source: SchemaError,
    },

    #[error("field '{field}': {source}")]
    Storage {
        field: String,
        #[source]
        source: MessageError,
    },

    #[error("field '{field}' has no enum option '{option}'")]
    UnknownEnumOption { field: String, option: String },

    #[error("'{schema}' has no property '{field}'")]
    UnknownProperty { schema: String, field: String },

    #[error("field '{field}' is {actual}, not {expected}")]
    WrongKind {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl ReflectError {
    /// Name of the field the error concerns.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::AnyTypeNotAllowed { field, .. }
            | Self::Conversion { field, .. }
            | Self::EmptyAny { field }
            | Self::IndexOutOfRange { field, .. }
            | Self::MissingKey { field, .. }
            | Self::Schema { field, .. }
            | Self::Storage { field, .. }
            | Self::UnknownEnumOption { field, .. }
            | Self::UnknownProperty { field, .. }
            | Self::WrongKind { field, .. } => field,
        }
    }
}

/// Property set for the message at the document root.
pub fn new_root<'s>(
    schemas: &'s SchemaSet,
    schema: &Arc<RootSchema>,
) -> Result<PropertySet<'s>, ReflectError> {
    PropertySet::new(schemas, Arc::clone(schema), Location::root())
}

/// Property set for a document message, building its schema if needed.
pub fn for_message<'s>(
    schemas: &'s SchemaSet,
    message: &DynamicMessage,
) -> Result<PropertySet<'s>, ReflectError> {
    let full_name = message.full_name();
    let schema = schemas
        .schema_for_name(&full_name)
        .map_err(|source| ReflectError::Schema {
            field: full_name,
            source,
        })?;

    new_root(schemas, &schema)
}

///
/// Field
///
/// Live handle to one property or collection element. Exactly one `as_*`
/// query answers for each variant.
///

#[derive(Debug)]
pub enum Field<'s> {
    Any(AnyField<'s>),
    ContainerArray(ContainerArrayField<'s>),
    ContainerMap(ContainerMapField<'s>),
    Enum(EnumField<'s>),
    EnumArray(EnumArrayField<'s>),
    EnumMap(EnumMapField<'s>),
    Object(ContainerField<'s>),
    Oneof(ContainerField<'s>),
    Polymorph(PolymorphField<'s>),
    Scalar(ScalarField<'s>),
    ScalarArray(ScalarArrayField<'s>),
    ScalarMap(ScalarMapField<'s>),
}

macro_rules! field_dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Field::Any($f) => $body,
            Field::ContainerArray($f) => $body,
            Field::ContainerMap($f) => $body,
            Field::Enum($f) => $body,
            Field::EnumArray($f) => $body,
            Field::EnumMap($f) => $body,
            Field::Object($f) | Field::Oneof($f) => $body,
            Field::Polymorph($f) => $body,
            Field::Scalar($f) => $body,
            Field::ScalarArray($f) => $body,
            Field::ScalarMap($f) => $body,
        }
    };
}

macro_rules! capability {
    ($lt:lifetime; $( $fn:ident => $variant:ident ( $ty:ident ) ),* $(,)?) => {
        $(
            #[must_use]
            pub const fn $fn(&self) -> Option<&$ty<$lt>> {
                match self {
                    Self::$variant(f) => Some(f),
                    _ => None,
                }
            }
        )*
    };
}

impl<'s> Field<'s> {
    pub(crate) fn new(
        schemas: &'s SchemaSet,
        name: String,
        location: Location,
        schema: &FieldSchema,
        is_virtual: bool,
    ) -> Result<Self, ReflectError> {
        let core = FieldCore {
            schemas,
            name,
            location,
        };

        let field = match schema {
            FieldSchema::Scalar(s) => Self::Scalar(ScalarField::new(core, s.clone())),
            FieldSchema::Enum(e) => Self::Enum(EnumField::new(core, e)?),
            FieldSchema::Object(o) => Self::Object(ContainerField::new(core, &o.target, false)?),
            FieldSchema::Oneof(o) => Self::Oneof(ContainerField::new(core, &o.target, is_virtual)?),
            FieldSchema::Any(a) => Self::Any(AnyField::new(core, a.clone())),
            FieldSchema::Polymorph(p) => Self::Polymorph(PolymorphField::new(core, &p.target)?),

            FieldSchema::Array(a) => match a.items.as_ref() {
                FieldSchema::Scalar(s) => Self::ScalarArray(ScalarArrayField::new(core, s.clone())),
                FieldSchema::Enum(e) => Self::EnumArray(EnumArrayField::new(core, e)?),
                item if item.is_container() => {
                    Self::ContainerArray(ContainerArrayField::new(core, item.clone())?)
                }
                item => return Err(core.wrong_kind("array of containers", item.label())),
            },

            FieldSchema::Map(m) => match m.items.as_ref() {
                FieldSchema::Scalar(s) => Self::ScalarMap(ScalarMapField::new(core, s.clone())),
                FieldSchema::Enum(e) => Self::EnumMap(EnumMapField::new(core, e)?),
                item if item.is_container() => {
                    Self::ContainerMap(ContainerMapField::new(core, item.clone())?)
                }
                item => return Err(core.wrong_kind("map of containers", item.label())),
            },
        };

        Ok(field)
    }

    capability! { 's;
        as_scalar => Scalar(ScalarField),
        as_enum => Enum(EnumField),
        as_object => Object(ContainerField),
        as_oneof => Oneof(ContainerField),
        as_any => Any(AnyField),
        as_polymorph => Polymorph(PolymorphField),
        as_array_of_scalar => ScalarArray(ScalarArrayField),
        as_array_of_enum => EnumArray(EnumArrayField),
        as_array_of_container => ContainerArray(ContainerArrayField),
        as_map_of_scalar => ScalarMap(ScalarMapField),
        as_map_of_enum => EnumMap(EnumMapField),
        as_map_of_container => ContainerMap(ContainerMapField),
    }

    /// Object or oneof handle, whichever this is.
    #[must_use]
    pub const fn as_container(&self) -> Option<&ContainerField<'s>> {
        match self {
            Self::Object(f) | Self::Oneof(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        field_dispatch!(self, f => f.core().name.as_str())
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        field_dispatch!(self, f => &f.core().location)
    }

    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Any(_) => "any",
            Self::ContainerArray(_) => "array of containers",
            Self::ContainerMap(_) => "map of containers",
            Self::Enum(_) => "enum",
            Self::EnumArray(_) => "array of enums",
            Self::EnumMap(_) => "map of enums",
            Self::Object(_) => "object",
            Self::Oneof(_) => "oneof",
            Self::Polymorph(_) => "polymorph",
            Self::Scalar(_) => "scalar",
            Self::ScalarArray(_) => "array of scalars",
            Self::ScalarMap(_) => "map of scalars",
        }
    }

    /// Physical presence, except for virtual oneofs which are set when any
    /// member is. Collections are set when non-empty.
    #[must_use]
    pub fn is_set(&self, msg: &DynamicMessage) -> bool {
        match self {
            Self::Object(f) | Self::Oneof(f) => f.is_set(msg),
            Self::ScalarArray(f) => !f.is_empty(msg),
            Self::EnumArray(f) => !f.is_empty(msg),
            Self::ContainerArray(f) => !f.is_empty(msg),
            Self::ScalarMap(f) => !f.is_empty(msg),
            Self::EnumMap(f) => !f.is_empty(msg),
            Self::ContainerMap(f) => !f.is_empty(msg),
            Self::Any(f) => f.is_set(msg),
            Self::Polymorph(f) => f.is_set(msg),
            _ => self.core().is_present(msg),
        }
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        match self {
            Self::Object(f) | Self::Oneof(f) => f.clear(msg),
            _ => self.core().remove(msg),
        }
    }

    /// Mark the field present with its zero value; containers become empty
    /// messages. Any and polymorph values have no default and fail with
    /// `EmptyAny`.
    pub fn set_default(&self, msg: &mut DynamicMessage) -> Result<(), ReflectError> {
        match self {
            Self::Scalar(f) => f.set_default(msg),
            Self::Enum(f) => f.set_number(msg, 0),
            Self::Object(f) | Self::Oneof(f) => f.ensure(msg),
            Self::Any(f) => Err(f.empty()),
            Self::Polymorph(f) => Err(f.value().empty()),
            Self::ScalarArray(_) | Self::EnumArray(_) | Self::ContainerArray(_) => {
                self.core().list_mut(msg).map(Vec::clear)
            }
            Self::ScalarMap(_) | Self::EnumMap(_) | Self::ContainerMap(_) => {
                self.core().map_mut(msg).map(BTreeMap::clear)
            }
        }
    }

    fn core(&self) -> &FieldCore<'s> {
        field_dispatch!(self, f => f.core())
    }
}

///
/// FieldCore
///
/// State shared by every handle: the schema set, the property name and the
/// absolute location of the value.
///

#[derive(Clone, Debug)]
pub(crate) struct FieldCore<'s> {
    pub(crate) schemas: &'s SchemaSet,
    pub(crate) name: String,
    pub(crate) location: Location,
}

impl<'s> FieldCore<'s> {
    pub(crate) fn pool(&self) -> &'s DescriptorPool {
        self.schemas.pool()
    }

    pub(crate) fn with_location(&self, location: Location) -> Self {
        Self {
            schemas: self.schemas,
            name: self.name.clone(),
            location,
        }
    }

    pub(crate) fn lookup<'m>(&self, msg: &'m DynamicMessage) -> Option<&'m Value> {
        msg.lookup(self.location.steps())
    }

    pub(crate) fn is_present(&self, msg: &DynamicMessage) -> bool {
        self.lookup(msg).is_some()
    }

    /// The message holding this value, created along with its ancestors.
    pub(crate) fn ensure_parent<'m>(
        &self,
        msg: &'m mut DynamicMessage,
    ) -> Result<(&'m mut DynamicMessage, u32), ReflectError> {
        let Some((parent, number)) = self.location.split_field() else {
            return Err(self.storage(MessageError::InvalidPath(self.location.to_string())));
        };
        let parent = msg
            .ensure_message(self.pool(), parent)
            .map_err(|e| self.storage(e))?;

        Ok((parent, number))
    }

    /// The message at this location, created along with its ancestors.
    pub(crate) fn ensure_message<'m>(
        &self,
        msg: &'m mut DynamicMessage,
    ) -> Result<&'m mut DynamicMessage, ReflectError> {
        msg.ensure_message(self.pool(), self.location.steps())
            .map_err(|e| self.storage(e))
    }

    pub(crate) fn write(&self, msg: &mut DynamicMessage, value: Value) -> Result<(), ReflectError> {
        let (parent, number) = self.ensure_parent(msg)?;
        parent.set(number, value);

        Ok(())
    }

    /// Drop the value. Elements are reset to an empty message instead, so
    /// sibling indices stay stable.
    pub(crate) fn remove(&self, msg: &mut DynamicMessage) {
        match self.location.steps().split_last() {
            Some((Step::Field(number), parent)) => {
                if let Some(parent) = msg.lookup_message_mut(parent) {
                    parent.clear(*number);
                }
            }
            Some(_) => {
                if let Some(Value::Message(m)) = msg.lookup_mut(self.location.steps()) {
                    **m = DynamicMessage::new(Arc::clone(m.descriptor()));
                }
            }
            None => {}
        }
    }

    pub(crate) fn list<'m>(&self, msg: &'m DynamicMessage) -> &'m [Value] {
        self.lookup(msg)
            .and_then(Value::as_list)
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn list_mut<'m>(
        &self,
        msg: &'m mut DynamicMessage,
    ) -> Result<&'m mut Vec<Value>, ReflectError> {
        let (parent, number) = self.ensure_parent(msg)?;

        parent.list_mut(number).map_err(|e| self.storage(e))
    }

    pub(crate) fn map<'m>(
        &self,
        msg: &'m DynamicMessage,
    ) -> Option<&'m BTreeMap<String, Value>> {
        self.lookup(msg).and_then(Value::as_map)
    }

    pub(crate) fn map_mut<'m>(
        &self,
        msg: &'m mut DynamicMessage,
    ) -> Result<&'m mut BTreeMap<String, Value>, ReflectError> {
        let (parent, number) = self.ensure_parent(msg)?;

        parent.map_mut(number).map_err(|e| self.storage(e))
    }

    pub(crate) fn resolve(
        &self,
        target: &Ref,
    ) -> Result<Arc<RootSchema>, ReflectError> {
        self.schemas.resolve(target).map_err(|e| self.schema(e))
    }

    pub(crate) fn storage(&self, source: MessageError) -> ReflectError {
        ReflectError::Storage {
            field: self.name.clone(),
            source,
        }
    }

    pub(crate) fn schema(&self, source: SchemaError) -> ReflectError {
        ReflectError::Schema {
            field: self.name.clone(),
            source,
        }
    }

    pub(crate) fn conversion(&self, source: ConversionError) -> ReflectError {
        ReflectError::Conversion {
            field: self.name.clone(),
            source,
        }
    }

    pub(crate) fn wrong_kind(&self, expected: &'static str, actual: &'static str) -> ReflectError {
        ReflectError::WrongKind {
            field: self.name.clone(),
            expected,
            actual,
        }
    }

    pub(crate) fn out_of_range(&self, index: usize, len: usize) -> ReflectError {
        ReflectError::IndexOutOfRange {
            field: self.name.clone(),
            index,
            len,
        }
    }

    pub(crate) fn missing_key(&self, key: &str) -> ReflectError {
        ReflectError::MissingKey {
            field: self.name.clone(),
            key: key.to_string(),
        }
    }
}

/// Full name of the message backing a container item schema.
pub(crate) fn item_message(
    core: &FieldCore<'_>,
    item: &FieldSchema,
) -> Result<String, ReflectError> {
    let target = match item {
        FieldSchema::Any(_) => return Ok(well_known::ANY.to_string()),
        FieldSchema::Object(o) => &o.target,
        FieldSchema::Oneof(o) => &o.target,
        FieldSchema::Polymorph(p) => &p.target,
        other => return Err(core.wrong_kind("container", other.label())),
    };

    core.resolve(target)?
        .message()
        .map(ToString::to_string)
        .ok_or_else(|| core.wrong_kind("container", "enum"))
}

pub(crate) const fn root_label(root: &RootSchema) -> &'static str {
    match root {
        RootSchema::Enum(_) => "enum",
        RootSchema::Object(_) => "object",
        RootSchema::Oneof(_) => "oneof",
        RootSchema::Polymorph(_) => "polymorph",
    }
}
