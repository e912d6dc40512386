use crate::{
    message::{DynamicMessage, Value},
    reflect::{FieldCore, ReflectError},
};
use protobridge_schema::{
    descriptor::well_known::{ANY_JSON, ANY_PROTO, ANY_TYPE_NAME},
    node::{AnySchema, Ref, RootSchema},
};
use std::cell::OnceCell;

///
/// AnyValue
///
/// Contents of an `Any` envelope. At least one payload is present on every
/// value the reflection layer hands out; envelopes without one read as unset.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnyValue {
    pub type_name: String,
    pub json: Option<Vec<u8>>,
    pub proto: Option<Vec<u8>>,
}

impl AnyValue {
    #[must_use]
    pub fn from_json(type_name: impl Into<String>, json: Vec<u8>) -> Self {
        Self {
            type_name: type_name.into(),
            json: Some(json),
            proto: None,
        }
    }

    #[must_use]
    pub fn from_proto(type_name: impl Into<String>, proto: Vec<u8>) -> Self {
        Self {
            type_name: type_name.into(),
            json: None,
            proto: Some(proto),
        }
    }

    #[must_use]
    pub const fn has_payload(&self) -> bool {
        self.json.is_some() || self.proto.is_some()
    }
}

///
/// AnyField
///

#[derive(Debug)]
pub struct AnyField<'s> {
    core: FieldCore<'s>,
    schema: AnySchema,
}

impl<'s> AnyField<'s> {
    pub(crate) const fn new(core: FieldCore<'s>, schema: AnySchema) -> Self {
        Self { core, schema }
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    /// Accepted type names; empty means unrestricted.
    #[must_use]
    pub fn allowed_types(&self) -> &[String] {
        &self.schema.types
    }

    #[must_use]
    pub fn allows(&self, type_name: &str) -> bool {
        self.schema.allows(type_name)
    }

    pub fn get(&self, msg: &DynamicMessage) -> Result<Option<AnyValue>, ReflectError> {
        let Some(value) = self.core.lookup(msg) else {
            return Ok(None);
        };
        let Value::Message(envelope) = value else {
            return Err(self.core.wrong_kind("any", "another value"));
        };

        let type_name = match envelope.get(ANY_TYPE_NAME) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        let bytes = |number| match envelope.get(number) {
            Some(Value::Bytes(b)) => Some(b.clone()),
            _ => None,
        };

        let value = AnyValue {
            type_name,
            json: bytes(ANY_JSON),
            proto: bytes(ANY_PROTO),
        };

        // An envelope without a payload holds nothing.
        Ok(value.has_payload().then_some(value))
    }

    /// Holds a value with a payload; a bare envelope does not count.
    #[must_use]
    pub fn is_set(&self, msg: &DynamicMessage) -> bool {
        matches!(self.get(msg), Ok(Some(_)))
    }

    /// Replace the envelope contents. The type must be allowed and a payload
    /// must be present.
    pub fn set(&self, msg: &mut DynamicMessage, value: AnyValue) -> Result<(), ReflectError> {
        if !value.has_payload() {
            return Err(self.empty());
        }
        if !self.allows(&value.type_name) {
            return Err(ReflectError::AnyTypeNotAllowed {
                field: self.core.name.clone(),
                type_name: value.type_name,
            });
        }

        let envelope = self.core.ensure_message(msg)?;
        for number in [ANY_TYPE_NAME, ANY_PROTO, ANY_JSON] {
            envelope.clear(number);
        }
        envelope.set(ANY_TYPE_NAME, Value::String(value.type_name));
        if let Some(json) = value.json {
            envelope.set(ANY_JSON, Value::Bytes(json));
        }
        if let Some(proto) = value.proto {
            envelope.set(ANY_PROTO, Value::Bytes(proto));
        }

        Ok(())
    }

    pub fn ensure(&self, msg: &mut DynamicMessage) -> Result<(), ReflectError> {
        self.core.ensure_message(msg).map(|_| ())
    }

    pub(crate) fn empty(&self) -> ReflectError {
        ReflectError::EmptyAny {
            field: self.core.name.clone(),
        }
    }
}

///
/// PolymorphField
///
/// Wrapper message holding one member type inside an `Any` value field.
///

#[derive(Debug)]
pub struct PolymorphField<'s> {
    core: FieldCore<'s>,
    members: Vec<String>,
    value_field: u32,
    value: OnceCell<AnyField<'s>>,
}

impl<'s> PolymorphField<'s> {
    pub(crate) fn new(core: FieldCore<'s>, target: &Ref) -> Result<Self, ReflectError> {
        let root = core.resolve(target)?;
        let RootSchema::Polymorph(schema) = &*root else {
            return Err(core.wrong_kind("polymorph", super::root_label(&root)));
        };

        Ok(Self {
            members: schema.member_names(),
            value_field: schema.value_field,
            core,
            value: OnceCell::new(),
        })
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    #[must_use]
    pub fn allows(&self, type_name: &str) -> bool {
        self.members.iter().any(|m| m == type_name)
    }

    /// The `Any` handle for the wrapper's value field.
    pub fn value(&self) -> &AnyField<'s> {
        self.value.get_or_init(|| {
            AnyField::new(
                self.core.with_location(self.core.location.field(self.value_field)),
                AnySchema {
                    types: self.members.clone(),
                },
            )
        })
    }

    pub fn get(&self, msg: &DynamicMessage) -> Result<Option<AnyValue>, ReflectError> {
        self.value().get(msg)
    }

    #[must_use]
    pub fn is_set(&self, msg: &DynamicMessage) -> bool {
        self.value().is_set(msg)
    }

    pub fn set(&self, msg: &mut DynamicMessage, value: AnyValue) -> Result<(), ReflectError> {
        self.value().set(msg, value)
    }

    pub fn ensure(&self, msg: &mut DynamicMessage) -> Result<(), ReflectError> {
        self.core.ensure_message(msg).map(|_| ())
    }
}
