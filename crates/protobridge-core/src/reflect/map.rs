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
use std::collections::BTreeMap;

// Keys of the stored map, in order.
fn keys(core: &FieldCore<'_>, msg: &DynamicMessage) -> Vec<String> {
    core.map(msg)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

fn entry<'m>(
    core: &FieldCore<'_>,
    msg: &'m DynamicMessage,
    key: &str,
) -> Result<&'m Value, ReflectError> {
    core.map(msg)
        .and_then(|m| m.get(key))
        .ok_or_else(|| core.missing_key(key))
}

fn remove_key(core: &FieldCore<'_>, msg: &mut DynamicMessage, key: &str) -> bool {
    if core.map(msg).is_none_or(|m| !m.contains_key(key)) {
        return false;
    }

    core.map_mut(msg)
        .is_ok_and(|m| m.remove(key).is_some())
}

///
/// ScalarMapField
///

#[derive(Debug)]
pub struct ScalarMapField<'s> {
    core: FieldCore<'s>,
    item: ScalarSchema,
}

impl<'s> ScalarMapField<'s> {
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
        self.core.map(msg).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, msg: &DynamicMessage) -> bool {
        self.len(msg) == 0
    }

    #[must_use]
    pub fn keys(&self, msg: &DynamicMessage) -> Vec<String> {
        keys(&self.core, msg)
    }

    pub fn get(&self, msg: &DynamicMessage, key: &str) -> Result<ScalarValue, ReflectError> {
        read_scalar(&self.core, self.kind(), entry(&self.core, msg, key)?)
    }

    pub fn entries(
        &self,
        msg: &DynamicMessage,
    ) -> Result<Vec<(String, ScalarValue)>, ReflectError> {
        self.core
            .map(msg)
            .into_iter()
            .flatten()
            .map(|(k, v)| read_scalar(&self.core, self.kind(), v).map(|s| (k.clone(), s)))
            .collect()
    }

    pub fn set(
        &self,
        msg: &mut DynamicMessage,
        key: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Result<(), ReflectError> {
        let value = write_scalar(&self.core, self.kind(), value.into())?;
        self.core.map_mut(msg)?.insert(key.into(), value);

        Ok(())
    }

    /// Returns whether the key was present.
    pub fn remove(&self, msg: &mut DynamicMessage, key: &str) -> bool {
        remove_key(&self.core, msg, key)
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        self.core.remove(msg);
    }
}

///
/// EnumMapField
///

#[derive(Debug)]
pub struct EnumMapField<'s> {
    core: FieldCore<'s>,
    schema: EnumSchema,
    rules: Option<EnumRules>,
}

impl<'s> EnumMapField<'s> {
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
        self.core.map(msg).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, msg: &DynamicMessage) -> bool {
        self.len(msg) == 0
    }

    #[must_use]
    pub fn keys(&self, msg: &DynamicMessage) -> Vec<String> {
        keys(&self.core, msg)
    }

    pub fn get(&self, msg: &DynamicMessage, key: &str) -> Result<i32, ReflectError> {
        read_enum(&self.core, entry(&self.core, msg, key)?)
    }

    pub fn entries(&self, msg: &DynamicMessage) -> Result<Vec<(String, i32)>, ReflectError> {
        self.core
            .map(msg)
            .into_iter()
            .flatten()
            .map(|(k, v)| read_enum(&self.core, v).map(|n| (k.clone(), n)))
            .collect()
    }

    pub fn set(
        &self,
        msg: &mut DynamicMessage,
        key: impl Into<String>,
        number: i32,
    ) -> Result<(), ReflectError> {
        let number = check_number(&self.core, &self.schema, number)?;
        self.core.map_mut(msg)?.insert(key.into(), Value::Enum(number));

        Ok(())
    }

    pub fn set_name(
        &self,
        msg: &mut DynamicMessage,
        key: impl Into<String>,
        name: &str,
    ) -> Result<(), ReflectError> {
        let number = number_for(&self.core, &self.schema, name)?;
        self.core.map_mut(msg)?.insert(key.into(), Value::Enum(number));

        Ok(())
    }

    pub fn remove(&self, msg: &mut DynamicMessage, key: &str) -> bool {
        remove_key(&self.core, msg, key)
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        self.core.remove(msg);
    }
}

///
/// ContainerMapField
///

#[derive(Debug)]
pub struct ContainerMapField<'s> {
    core: FieldCore<'s>,
    item: FieldSchema,
    message: String,
}

impl<'s> ContainerMapField<'s> {
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

    #[must_use]
    pub fn item_message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn len(&self, msg: &DynamicMessage) -> usize {
        self.core.map(msg).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, msg: &DynamicMessage) -> bool {
        self.len(msg) == 0
    }

    #[must_use]
    pub fn keys(&self, msg: &DynamicMessage) -> Vec<String> {
        keys(&self.core, msg)
    }

    /// Handle for the entry at `key`, which must exist.
    pub fn get(&self, msg: &DynamicMessage, key: &str) -> Result<Field<'s>, ReflectError> {
        entry(&self.core, msg, key)?;

        self.element(key)
    }

    pub fn entries(&self, msg: &DynamicMessage) -> Result<Vec<(String, Field<'s>)>, ReflectError> {
        self.keys(msg)
            .into_iter()
            .map(|k| self.element(&k).map(|f| (k, f)))
            .collect()
    }

    /// Insert an empty entry at `key`, replacing any existing one.
    pub fn insert_new(
        &self,
        msg: &mut DynamicMessage,
        key: &str,
    ) -> Result<Field<'s>, ReflectError> {
        let fresh = DynamicMessage::new_by_name(self.core.pool(), &self.message)
            .map_err(|e| self.core.storage(e))?;
        self.core
            .map_mut(msg)?
            .insert(key.to_string(), Value::Message(Box::new(fresh)));

        self.element(key)
    }

    pub fn remove(&self, msg: &mut DynamicMessage, key: &str) -> bool {
        remove_key(&self.core, msg, key)
    }

    pub fn clear(&self, msg: &mut DynamicMessage) {
        self.core.remove(msg);
    }

    fn element(&self, key: &str) -> Result<Field<'s>, ReflectError> {
        Field::new(
            self.core.schemas,
            self.core.name.clone(),
            self.core.location.key(key),
            &self.item,
            false,
        )
    }
}
