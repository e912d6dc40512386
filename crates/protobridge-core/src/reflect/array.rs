use crate::{
    message::{DynamicMessage, Value},
    reflect::{
        Field, FieldCore, ReflectError, item_message,
        scalar::{check_number, number_for, read_enum, read_scalar, resolve_enum, write_scalar},
    },
    value::ScalarValue,
};
use protobridge_primitives::ScalarKind;
use protobridge_schema::{
    descriptor::EnumRules,
    node::{EnumRef, EnumSchema, FieldSchema, ScalarSchema},
};

///
/// ScalarArrayField
///

#[derive(Debug)]
pub struct ScalarArrayField<'s> {
    core: FieldCore<'s>,
    item: ScalarSchema,
}

impl<'s> ScalarArrayField<'s> {
    pub(crate) const fn new(core: FieldCore<'s>, item: ScalarSchema) -> Self {
        Self { core, item }
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.item.kind
    }

    #[must_use]
    pub const fn item_schema(&self) -> &ScalarSchema {
        &self.item
    }

    #[must_use]
    pub fn len(&self, msg: &DynamicMessage) -> usize {
        self.core.list(msg).len()
    }

    #[must_use]
    pub fn is_empty(&self, msg: &DynamicMessage) -> bool {
        self.core.list(msg).is_empty()
    }

    pub fn get(&self, msg: &DynamicMessage, index: usize) -> Result<ScalarValue, ReflectError> {
        let items = self.core.list(msg);
        let value = items
            .get(index)
            .ok_or_else(|| self.core.out_of_range(index, items.len()))?;

        read_scalar(&self.core, self.kind(), value)
    }

    pub fn values(&self, msg: &DynamicMessage) -> Result<Vec<ScalarValue>, ReflectError> {
        self.core
            .list(msg)
            .iter()
            .map(|v| read_scalar(&self.core, self.kind(), v))
            .collect()
    }

    pub fn set(
        &self,
        msg: &mut DynamicMessage,
        index: usize,
        value: impl Into<ScalarValue>,
    ) -> Result<(), ReflectError> {
        let value = write_scalar(&self.core, self.kind(), value.into())?;
        let items = self.core.list_mut(msg)?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| self.core.out_of_range(index, len))?;
        *slot = value;

        Ok(())
    }

    pub fn append(
        &self,
        msg: &mut DynamicMessage,
        value: impl Into<ScalarValue>,
    ) -> Result<(), ReflectError> {
        let value = write_scalar(&self.core, self.kind(), value.into())?;
        self.core.list_mut(msg)?.push(value);

        Ok(())
    }

    pub fn remove(&self, msg: &mut DynamicMessage, index: usize) -> Result<(), ReflectError> {
        remove_at(&self.core, msg, index)
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        self.core.remove(msg);
    }
}

///
/// EnumArrayField
///

#[derive(Debug)]
pub struct EnumArrayField<'s> {
    core: FieldCore<'s>,
    schema: EnumSchema,
    rules: Option<EnumRules>,
}

impl<'s> EnumArrayField<'s> {
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
    pub fn len(&self, msg: &DynamicMessage) -> usize {
        self.core.list(msg).len()
    }

    #[must_use]
    pub fn is_empty(&self, msg: &DynamicMessage) -> bool {
        self.core.list(msg).is_empty()
    }

    pub fn get(&self, msg: &DynamicMessage, index: usize) -> Result<i32, ReflectError> {
        let items = self.core.list(msg);
        let value = items
            .get(index)
            .ok_or_else(|| self.core.out_of_range(index, items.len()))?;

        read_enum(&self.core, value)
    }

    pub fn values(&self, msg: &DynamicMessage) -> Result<Vec<i32>, ReflectError> {
        self.core
            .list(msg)
            .iter()
            .map(|v| read_enum(&self.core, v))
            .collect()
    }

    pub fn set(
        &self,
        msg: &mut DynamicMessage,
        index: usize,
        number: i32,
    ) -> Result<(), ReflectError> {
        let number = check_number(&self.core, &self.schema, number)?;
        let items = self.core.list_mut(msg)?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| self.core.out_of_range(index, len))?;
        *slot = Value::Enum(number);

        Ok(())
    }

    pub fn append(&self, msg: &mut DynamicMessage, number: i32) -> Result<(), ReflectError> {
        let number = check_number(&self.core, &self.schema, number)?;
        self.core.list_mut(msg)?.push(Value::Enum(number));

        Ok(())
    }

    pub fn append_name(&self, msg: &mut DynamicMessage, name: &str) -> Result<(), ReflectError> {
        let number = number_for(&self.core, &self.schema, name)?;
        self.core.list_mut(msg)?.push(Value::Enum(number));

        Ok(())
    }

    pub fn remove(&self, msg: &mut DynamicMessage, index: usize) -> Result<(), ReflectError> {
        remove_at(&self.core, msg, index)
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        self.core.remove(msg);
    }
}

///
/// ContainerArrayField
///
/// Elements are objects, oneofs, polymorphs or `Any` envelopes. Element
/// handles are built on request and address the element by index.
///

#[derive(Debug)]
pub struct ContainerArrayField<'s> {
    core: FieldCore<'s>,
    item: FieldSchema,
    message: String,
}

impl<'s> ContainerArrayField<'s> {
    pub(crate) fn new(core: FieldCore<'s>, item: FieldSchema) -> Result<Self, ReflectError> {
        let message = item_message(&core, &item)?;

        Ok(Self {
            core,
            item,
            message,
        })
    }

    pub(crate) const fn core(&self) -> &FieldCore<'s> {
        &self.core
    }

    #[must_use]
    pub const fn item_schema(&self) -> &FieldSchema {
        &self.item
    }

    /// Full name of the element message type.
    #[must_use]
    pub fn item_message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn len(&self, msg: &DynamicMessage) -> usize {
        self.core.list(msg).len()
    }

    #[must_use]
    pub fn is_empty(&self, msg: &DynamicMessage) -> bool {
        self.core.list(msg).is_empty()
    }

    /// Handle for the element at `index`, which must exist.
    pub fn get(&self, msg: &DynamicMessage, index: usize) -> Result<Field<'s>, ReflectError> {
        let len = self.len(msg);
        if index >= len {
            return Err(self.core.out_of_range(index, len));
        }

        self.element(index)
    }

    pub fn elements(&self, msg: &DynamicMessage) -> Result<Vec<Field<'s>>, ReflectError> {
        (0..self.len(msg)).map(|i| self.element(i)).collect()
    }

    /// Push an empty element and return its handle.
    pub fn append_new(&self, msg: &mut DynamicMessage) -> Result<Field<'s>, ReflectError> {
        let fresh = DynamicMessage::new_by_name(self.core.pool(), &self.message)
            .map_err(|e| self.core.storage(e))?;
        let items = self.core.list_mut(msg)?;
        items.push(Value::Message(Box::new(fresh)));
        let index = items.len() - 1;

        self.element(index)
    }

    pub fn remove(&self, msg: &mut DynamicMessage, index: usize) -> Result<(), ReflectError> {
        remove_at(&self.core, msg, index)
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        self.core.remove(msg);
    }

    fn element(&self, index: usize) -> Result<Field<'s>, ReflectError> {
        Field::new(
            self.core.schemas,
            self.core.name.clone(),
            self.core.location.index(index),
            &self.item,
            false,
        )
    }
}

fn remove_at(
    core: &FieldCore<'_>,
    msg: &mut DynamicMessage,
    index: usize,
) -> Result<(), ReflectError> {
    let len = core.list(msg).len();
    if index >= len {
        return Err(core.out_of_range(index, len));
    }
    core.list_mut(msg)?.remove(index);

    Ok(())
}
