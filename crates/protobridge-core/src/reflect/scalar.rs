use crate::{
    message::{DynamicMessage, Value},
    reflect::{FieldCore, ReflectError},
    value::ScalarValue,
};
use protobridge_primitives::ScalarKind;
use protobridge_schema::{
    descriptor::EnumRules,
    node::{EnumRef, EnumSchema, RootSchema, ScalarSchema},
};

///
/// ScalarField
///

#[derive(Debug)]
pub struct ScalarField<'s> {
    core: FieldCore<'s>,
    schema: ScalarSchema,
}

impl<'s> ScalarField<'s> {
    pub(crate) const fn new(core: FieldCore<'s>, schema: ScalarSchema) -> Self {
        Self { core, schema }
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.schema.kind
    }

    #[must_use]
    pub const fn schema(&self) -> &ScalarSchema {
        &self.schema
    }

    /// The stored value, or `None` when the field is unset.
    pub fn get(&self, msg: &DynamicMessage) -> Result<Option<ScalarValue>, ReflectError> {
        self.core
            .lookup(msg)
            .map(|value| read_scalar(&self.core, self.kind(), value))
            .transpose()
    }

    /// Store a value, coercing it to the field's kind first.
    pub fn set(
        &self,
        msg: &mut DynamicMessage,
        value: impl Into<ScalarValue>,
    ) -> Result<(), ReflectError> {
        let value = write_scalar(&self.core, self.kind(), value.into())?;

        self.core.write(msg, value)
    }

    pub fn set_default(&self, msg: &mut DynamicMessage) -> Result<(), ReflectError> {
        self.set(msg, ScalarValue::default_for(self.kind()))
    }
}

///
/// EnumField
///
/// Values are stored as option numbers. Names are accepted short or long.
///

#[derive(Debug)]
pub struct EnumField<'s> {
    core: FieldCore<'s>,
    schema: EnumSchema,
    rules: Option<EnumRules>,
}

impl<'s> EnumField<'s> {
    pub(crate) fn new(core: FieldCore<'s>, target: &EnumRef) -> Result<Self, ReflectError> {
        let schema = resolve_enum(&core, target)?;

        Ok(Self {
            core,
            schema,
            rules: target.rules.clone(),
        })
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    #[must_use]
    pub const fn schema(&self) -> &EnumSchema {
        &self.schema
    }

    #[must_use]
    pub const fn rules(&self) -> Option<&EnumRules> {
        self.rules.as_ref()
    }

    #[must_use]
    pub fn get(&self, msg: &DynamicMessage) -> Option<i32> {
        match self.core.lookup(msg) {
            Some(Value::Enum(n)) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the stored option, if it is a known one.
    #[must_use]
    pub fn get_name(&self, msg: &DynamicMessage) -> Option<&str> {
        self.get(msg)
            .and_then(|n| self.schema.option_by_number(n))
            .map(|o| o.name.as_str())
    }

    pub fn set_number(&self, msg: &mut DynamicMessage, number: i32) -> Result<(), ReflectError> {
        let number = check_number(&self.core, &self.schema, number)?;

        self.core.write(msg, Value::Enum(number))
    }

    pub fn set_name(&self, msg: &mut DynamicMessage, name: &str) -> Result<(), ReflectError> {
        let number = number_for(&self.core, &self.schema, name)?;

        self.core.write(msg, Value::Enum(number))
    }
}

/// Schema of the enum a ref points at.
pub(crate) fn resolve_enum(core: &FieldCore<'_>, target: &EnumRef) -> Result<EnumSchema, ReflectError> {
    let root = core.resolve(&target.target)?;

    match &*root {
        RootSchema::Enum(schema) => Ok(schema.clone()),
        other => Err(core.wrong_kind("enum", super::root_label(other))),
    }
}

pub(crate) fn number_for(
    core: &FieldCore<'_>,
    schema: &EnumSchema,
    name: &str,
) -> Result<i32, ReflectError> {
    schema
        .option(name)
        .map(|o| o.number)
        .ok_or_else(|| ReflectError::UnknownEnumOption {
            field: core.name.clone(),
            option: name.to_string(),
        })
}

pub(crate) fn check_number(
    core: &FieldCore<'_>,
    schema: &EnumSchema,
    number: i32,
) -> Result<i32, ReflectError> {
    schema
        .option_by_number(number)
        .map(|o| o.number)
        .ok_or_else(|| ReflectError::UnknownEnumOption {
            field: core.name.clone(),
            option: number.to_string(),
        })
}

pub(crate) fn read_enum(core: &FieldCore<'_>, value: &Value) -> Result<i32, ReflectError> {
    match value {
        Value::Enum(n) => Ok(*n),
        _ => Err(core.wrong_kind("enum", "another value")),
    }
}

pub(crate) fn read_scalar(
    core: &FieldCore<'_>,
    kind: ScalarKind,
    value: &Value,
) -> Result<ScalarValue, ReflectError> {
    ScalarValue::from_value(kind, value).map_err(|e| core.conversion(e))
}

pub(crate) fn write_scalar(
    core: &FieldCore<'_>,
    kind: ScalarKind,
    value: ScalarValue,
) -> Result<Value, ReflectError> {
    value
        .coerce(kind)
        .map_err(|e| core.conversion(e))?
        .to_value(core.pool())
        .map_err(|e| core.storage(e))
}
