//! In-memory descriptor contract consumed by the schema builder.
//!
//! Descriptors describe the *physical* message layout (field numbers, kinds,
//! oneof groups) plus side-channel annotations. They are supplied by the
//! caller and never mutated once registered in a `DescriptorPool`.

pub mod annotation;
pub mod builder;
pub mod well_known;

pub use annotation::*;
pub use builder::{EnumBuilder, MessageBuilder};

use crate::naming;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// DescriptorError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DescriptorError {
    #[error("type '{0}' is already registered")]
    DuplicateType(String),

    #[error("message '{message}' declares field number {number} more than once")]
    DuplicateFieldNumber { message: String, number: u32 },

    #[error("message '{message}' declares field name '{name}' more than once")]
    DuplicateFieldName { message: String, name: String },

    #[error("message '{message}' field '{field}' references missing oneof index {index}")]
    InvalidOneofIndex {
        message: String,
        field: String,
        index: usize,
    },

    #[error("message '{message}' field '{field}' uses reserved field number 0")]
    ZeroFieldNumber { message: String, field: String },
}

///
/// DescriptorPool
///
/// Registry of message and enum descriptors keyed by full name.
///

#[derive(Clone, Debug, Default)]
pub struct DescriptorPool {
    messages: BTreeMap<String, Arc<MessageDescriptor>>,
    enums: BTreeMap<String, Arc<EnumDescriptor>>,
}

impl DescriptorPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool pre-populated with the well-known scalar and any messages.
    #[must_use]
    pub fn with_well_known_types() -> Self {
        let mut pool = Self::new();
        for desc in well_known::descriptors() {
            pool.messages.insert(desc.full_name(), Arc::new(desc));
        }

        pool
    }

    pub fn add_message(&mut self, desc: MessageDescriptor) -> Result<(), DescriptorError> {
        let full_name = desc.full_name();
        if self.messages.contains_key(&full_name) || self.enums.contains_key(&full_name) {
            return Err(DescriptorError::DuplicateType(full_name));
        }
        desc.check()?;

        self.messages.insert(full_name, Arc::new(desc));

        Ok(())
    }

    pub fn add_enum(&mut self, desc: EnumDescriptor) -> Result<(), DescriptorError> {
        let full_name = desc.full_name();
        if self.messages.contains_key(&full_name) || self.enums.contains_key(&full_name) {
            return Err(DescriptorError::DuplicateType(full_name));
        }

        self.enums.insert(full_name, Arc::new(desc));

        Ok(())
    }

    #[must_use]
    pub fn message(&self, full_name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.messages.get(full_name)
    }

    #[must_use]
    pub fn enumeration(&self, full_name: &str) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(full_name)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Arc<MessageDescriptor>> {
        self.messages.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Arc<EnumDescriptor>> {
        self.enums.values()
    }
}

///
/// MessageDescriptor
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessageDescriptor {
    pub package: String,
    pub name: String,
    pub fields: Vec<FieldDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oneofs: Vec<OneofDescriptor>,

    #[serde(default)]
    pub annotations: MessageAnnotations,
}

impl MessageDescriptor {
    #[must_use]
    pub fn full_name(&self) -> String {
        naming::full_name(&self.package, &self.name)
    }

    #[must_use]
    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields belonging to the oneof group at `index`, in declaration order.
    pub fn oneof_members(&self, index: usize) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.oneof == Some(index))
    }

    /// Field numbers sharing a oneof group with `number`, excluding itself.
    #[must_use]
    pub fn oneof_siblings(&self, number: u32) -> Vec<u32> {
        let Some(index) = self.field(number).and_then(|f| f.oneof) else {
            return Vec::new();
        };

        self.oneof_members(index)
            .map(|f| f.number)
            .filter(|n| *n != number)
            .collect()
    }

    fn check(&self) -> Result<(), DescriptorError> {
        let message = self.full_name();
        let mut numbers = BTreeMap::new();
        let mut names = BTreeMap::new();

        for field in &self.fields {
            if field.number == 0 {
                return Err(DescriptorError::ZeroFieldNumber {
                    message,
                    field: field.name.clone(),
                });
            }
            if numbers.insert(field.number, ()).is_some() {
                return Err(DescriptorError::DuplicateFieldNumber {
                    message,
                    number: field.number,
                });
            }
            if names.insert(field.name.as_str(), ()).is_some() {
                return Err(DescriptorError::DuplicateFieldName {
                    message,
                    name: field.name.clone(),
                });
            }
            if let Some(index) = field.oneof
                && index >= self.oneofs.len()
            {
                return Err(DescriptorError::InvalidOneofIndex {
                    message,
                    field: field.name.clone(),
                    index,
                });
            }
        }

        Ok(())
    }
}

///
/// FieldKind
///
/// Physical value kind of a field (or of a map's value).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldKind {
    Bool,
    Bytes,
    Double,
    Enum(String),
    Float,
    Int32,
    Int64,
    Message(String),
    String,
    Uint32,
    Uint64,
}

impl FieldKind {
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self, Self::Message(_))
    }

    #[must_use]
    pub fn message_name(&self) -> Option<&str> {
        match self {
            Self::Message(name) => Some(name),
            _ => None,
        }
    }
}

///
/// Label
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Label {
    #[default]
    Singular,
    Optional,
    Repeated,
    Map {
        key: FieldKind,
    },
}

impl Label {
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        matches!(self, Self::Repeated)
    }

    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map { .. })
    }

    #[must_use]
    pub const fn is_singular(&self) -> bool {
        matches!(self, Self::Singular | Self::Optional)
    }
}

///
/// FieldDescriptor
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub json_name: String,
    pub number: u32,
    pub kind: FieldKind,

    #[serde(default)]
    pub label: Label,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<usize>,

    #[serde(default)]
    pub annotations: FieldAnnotations,
}

impl FieldDescriptor {
    /// A singular field with a lowerCamel json name derived from `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        let name = name.into();

        Self {
            json_name: naming::json_name(&name),
            name,
            number,
            kind,
            label: Label::Singular,
            oneof: None,
            annotations: FieldAnnotations::default(),
        }
    }

    #[must_use]
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.label = Label::Optional;
        self
    }

    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.label = Label::Repeated;
        self
    }

    /// Turn the field into a string-keyed map whose values are `kind`.
    #[must_use]
    pub fn map(mut self) -> Self {
        self.label = Label::Map {
            key: FieldKind::String,
        };
        self
    }

    #[must_use]
    pub fn map_keyed_by(mut self, key: FieldKind) -> Self {
        self.label = Label::Map { key };
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.annotations.required = true;
        self
    }

    #[must_use]
    pub fn flatten(mut self) -> Self {
        self.annotations.flatten = true;
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: FieldRules) -> Self {
        self.annotations.rules = Some(rules);
        self
    }

    #[must_use]
    pub fn key(mut self, format: KeyFormat) -> Self {
        self.annotations.key = Some(format);
        self
    }

    #[must_use]
    pub fn any_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotations.any_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn single_form(mut self, alias: impl Into<String>) -> Self {
        self.annotations.single_form = Some(alias.into());
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.annotations.description = Some(text.into());
        self
    }
}

///
/// OneofDescriptor
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OneofDescriptor {
    pub name: String,

    /// Proto3 `optional` fields are wrapped in a synthetic single-member group.
    #[serde(default)]
    pub synthetic: bool,

    #[serde(default)]
    pub annotations: OneofAnnotations,
}

///
/// EnumDescriptor
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnumDescriptor {
    pub package: String,
    pub name: String,
    pub values: Vec<EnumValueDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumDescriptor {
    #[must_use]
    pub fn full_name(&self) -> String {
        naming::full_name(&self.package, &self.name)
    }
}

///
/// EnumValueDescriptor
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MessageDescriptor {
        MessageBuilder::new("test.v1", "Sample")
            .field(FieldDescriptor::new("first_name", 1, FieldKind::String))
            .oneof(
                "type",
                false,
                vec![
                    FieldDescriptor::new("a", 2, FieldKind::String),
                    FieldDescriptor::new("b", 3, FieldKind::Int32),
                ],
            )
            .build()
    }

    #[test]
    fn json_names_are_derived_in_lower_camel() {
        let desc = sample();

        assert_eq!(desc.fields[0].json_name, "firstName");
        assert_eq!(desc.full_name(), "test.v1.Sample");
    }

    #[test]
    fn oneof_siblings_exclude_self() {
        let desc = sample();

        assert_eq!(desc.oneof_siblings(2), vec![3]);
        assert!(desc.oneof_siblings(1).is_empty());
    }

    #[test]
    fn pool_rejects_duplicates() {
        let mut pool = DescriptorPool::new();
        pool.add_message(sample()).unwrap();

        assert_eq!(
            pool.add_message(sample()).unwrap_err(),
            DescriptorError::DuplicateType("test.v1.Sample".to_string())
        );
    }

    #[test]
    fn pool_rejects_duplicate_field_numbers() {
        let desc = MessageBuilder::new("test.v1", "Dup")
            .field(FieldDescriptor::new("a", 1, FieldKind::String))
            .field(FieldDescriptor::new("b", 1, FieldKind::String))
            .build();

        let err = DescriptorPool::new().add_message(desc).unwrap_err();
        assert!(matches!(err, DescriptorError::DuplicateFieldNumber { number: 1, .. }));
    }

    #[test]
    fn descriptors_deserialize_from_json() {
        let desc: MessageDescriptor = serde_json::from_value(serde_json::json!({
            "package": "test.v1",
            "name": "FromJson",
            "fields": [
                { "name": "tags", "json_name": "tags", "number": 1, "kind": "String", "label": "Repeated" }
            ]
        }))
        .expect("descriptor json should deserialize");

        assert!(desc.fields[0].label.is_repeated());
        assert!(desc.annotations.polymorph.is_none());
    }
}
