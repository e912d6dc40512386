//! Physical storage for message values.
//!
//! A `DynamicMessage` holds field values by number, shaped by its descriptor.
//! Only the reflection layer reads and writes it; the codec never does.

mod path;
pub mod wire;

pub use path::{Location, Step};

use protobridge_schema::descriptor::{DescriptorPool, Label, MessageDescriptor};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// MessageError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MessageError {
    #[error("'{message}' has no field number {number}")]
    UnknownField { message: String, number: u32 },

    #[error("field {number} of '{message}' does not hold a message")]
    NotAMessage { message: String, number: u32 },

    #[error("field {number} of '{message}' holds an unexpected value shape")]
    UnexpectedShape { message: String, number: u32 },

    #[error("no descriptor registered for '{0}'")]
    UnknownType(String),

    #[error("index {index} is out of range for field {number} (len {len})")]
    MissingElement {
        number: u32,
        index: usize,
        len: usize,
    },

    #[error("path {0} does not lead to a message field")]
    InvalidPath(String),
}

///
/// Value
///
/// Physical field value. Message-backed scalars (timestamps, dates and so
/// on) are stored as their well-known message.
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum Value {
    Bool(bool),
    Bytes(Vec<u8>),
    Enum(i32),
    F32(f32),
    F64(f64),
    I32(i32),
    I64(i64),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
    Message(Box<DynamicMessage>),
    String(String),
    U32(u32),
    U64(u64),
}

impl Value {
    #[must_use]
    pub const fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

///
/// DynamicMessage
///

#[derive(Clone, Debug)]
pub struct DynamicMessage {
    descriptor: Arc<MessageDescriptor>,
    fields: BTreeMap<u32, Value>,
}

// Same type and same field values; descriptors are not compared structurally.
impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.descriptor, &other.descriptor);

        (Arc::ptr_eq(a, b) || (a.package == b.package && a.name == b.name))
            && self.fields == other.fields
    }
}

impl DynamicMessage {
    #[must_use]
    pub const fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// An empty message of the named type.
    pub fn new_by_name(pool: &DescriptorPool, full_name: &str) -> Result<Self, MessageError> {
        pool.message(full_name)
            .map(|desc| Self::new(Arc::clone(desc)))
            .ok_or_else(|| MessageError::UnknownType(full_name.to_string()))
    }

    #[must_use]
    pub const fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        self.descriptor.full_name()
    }

    #[must_use]
    pub fn get(&self, number: u32) -> Option<&Value> {
        self.fields.get(&number)
    }

    pub fn get_mut(&mut self, number: u32) -> Option<&mut Value> {
        self.fields.get_mut(&number)
    }

    #[must_use]
    pub fn has(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// Store a field value, clearing any oneof siblings first.
    pub fn set(&mut self, number: u32, value: Value) {
        for sibling in self.descriptor.oneof_siblings(number) {
            self.fields.remove(&sibling);
        }
        self.fields.insert(number, value);
    }

    pub fn clear(&mut self, number: u32) -> Option<Value> {
        self.fields.remove(&number)
    }

    pub fn fields(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The value at `steps` below this message, without allocating.
    #[must_use]
    pub fn lookup(&self, steps: &[Step]) -> Option<&Value> {
        let (Step::Field(first), rest) = steps.split_first()? else {
            return None;
        };
        let mut value = self.get(*first)?;

        for step in rest {
            value = match (step, value) {
                (Step::Field(number), Value::Message(m)) => m.get(*number)?,
                (Step::Index(index), Value::List(items)) => items.get(*index)?,
                (Step::Key(key), Value::Map(map)) => map.get(key)?,
                _ => return None,
            };
        }

        Some(value)
    }

    /// The message at `steps`; the empty path is this message.
    #[must_use]
    pub fn lookup_message(&self, steps: &[Step]) -> Option<&Self> {
        if steps.is_empty() {
            return Some(self);
        }

        self.lookup(steps).and_then(Value::as_message)
    }

    /// Mutable access to an existing value; never creates anything.
    pub fn lookup_mut(&mut self, steps: &[Step]) -> Option<&mut Value> {
        let (Step::Field(first), rest) = steps.split_first()? else {
            return None;
        };
        let mut value = self.fields.get_mut(first)?;

        for step in rest {
            value = match (step, value) {
                (Step::Field(number), Value::Message(m)) => m.fields.get_mut(number)?,
                (Step::Index(index), Value::List(items)) => items.get_mut(*index)?,
                (Step::Key(key), Value::Map(map)) => map.get_mut(key)?,
                _ => return None,
            };
        }

        Some(value)
    }

    pub fn lookup_message_mut(&mut self, steps: &[Step]) -> Option<&mut Self> {
        if steps.is_empty() {
            return Some(self);
        }

        match self.lookup_mut(steps)? {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Walk `steps`, creating every missing message on the way, and return
    /// the message at the end. List elements must already exist; missing map
    /// entries are created.
    pub fn ensure_message(
        &mut self,
        pool: &DescriptorPool,
        steps: &[Step],
    ) -> Result<&mut Self, MessageError> {
        let Some((first, rest)) = steps.split_first() else {
            return Ok(self);
        };
        let Step::Field(number) = first else {
            return Err(MessageError::InvalidPath(first.to_string()));
        };
        let number = *number;

        let descriptor = Arc::clone(&self.descriptor);
        let field = descriptor
            .field(number)
            .ok_or_else(|| MessageError::UnknownField {
                message: descriptor.full_name(),
                number,
            })?;
        let child_type = field
            .kind
            .message_name()
            .ok_or_else(|| MessageError::NotAMessage {
                message: descriptor.full_name(),
                number,
            })?;

        match &field.label {
            Label::Singular | Label::Optional => {
                if !matches!(self.fields.get(&number), Some(Value::Message(_))) {
                    let child = Self::new_by_name(pool, child_type)?;
                    self.set(number, Value::Message(Box::new(child)));
                }
                match self.fields.get_mut(&number) {
                    Some(Value::Message(child)) => child.ensure_message(pool, rest),
                    _ => Err(MessageError::NotAMessage {
                        message: descriptor.full_name(),
                        number,
                    }),
                }
            }

            Label::Repeated => {
                let Some((Step::Index(index), rest)) = rest.split_first() else {
                    return Err(MessageError::InvalidPath(Step::Field(number).to_string()));
                };
                let items = self.list_mut(number)?;
                let len = items.len();
                match items.get_mut(*index) {
                    Some(Value::Message(child)) => child.ensure_message(pool, rest),
                    Some(_) => Err(MessageError::NotAMessage {
                        message: descriptor.full_name(),
                        number,
                    }),
                    None => Err(MessageError::MissingElement {
                        number,
                        index: *index,
                        len,
                    }),
                }
            }

            Label::Map { .. } => {
                let Some((Step::Key(key), rest)) = rest.split_first() else {
                    return Err(MessageError::InvalidPath(Step::Field(number).to_string()));
                };
                let fresh = Self::new_by_name(pool, child_type)?;
                let entry = self
                    .map_mut(number)?
                    .entry(key.clone())
                    .or_insert_with(|| Value::Message(Box::new(fresh)));
                match entry {
                    Value::Message(child) => child.ensure_message(pool, rest),
                    _ => Err(MessageError::NotAMessage {
                        message: descriptor.full_name(),
                        number,
                    }),
                }
            }
        }
    }

    /// The list stored in `number`, created empty if absent.
    pub fn list_mut(&mut self, number: u32) -> Result<&mut Vec<Value>, MessageError> {
        let message = self.descriptor.full_name();
        match self
            .fields
            .entry(number)
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(items) => Ok(items),
            _ => Err(MessageError::UnexpectedShape { message, number }),
        }
    }

    /// The map stored in `number`, created empty if absent.
    pub fn map_mut(&mut self, number: u32) -> Result<&mut BTreeMap<String, Value>, MessageError> {
        let message = self.descriptor.full_name();
        match self
            .fields
            .entry(number)
            .or_insert_with(|| Value::Map(BTreeMap::new()))
        {
            Value::Map(map) => Ok(map),
            _ => Err(MessageError::UnexpectedShape { message, number }),
        }
    }
}

///
/// TESTS
///
