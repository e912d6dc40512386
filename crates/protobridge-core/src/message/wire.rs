//! Binary protocol-buffer encoding of a `DynamicMessage`.
//!
//! Used for the opaque form of Any payloads. Numeric repeated fields are
//! written packed; decoding accepts packed and unpacked input alike. Unknown
//! fields are skipped.

use crate::message::{DynamicMessage, MessageError, Value};
use bytes::{Buf, BufMut};
use protobridge_schema::descriptor::{DescriptorPool, FieldDescriptor, FieldKind, Label};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

const MAX_VARINT_LEN: usize = 10;
const MAP_KEY: u32 = 1;
const MAP_VALUE: u32 = 2;

///
/// WireError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum WireError {
    #[error("input ended inside a value")]
    Truncated,

    #[error("varint is longer than {MAX_VARINT_LEN} bytes")]
    VarintOverflow,

    #[error("field {number} cannot be read from wire type {wire_type}")]
    InvalidWireType { number: u32, wire_type: u8 },

    #[error("field {number} holds invalid utf-8")]
    InvalidUtf8 { number: u32 },

    #[error("field number 0 is not allowed")]
    ZeroFieldNumber,

    #[error("groups are not supported (field {number})")]
    UnsupportedGroup { number: u32 },

    #[error(transparent)]
    Message(#[from] MessageError),
}

///
/// WireType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum WireType {
    Varint,
    Fixed64,
    Len,
    StartGroup,
    EndGroup,
    Fixed32,
}

impl WireType {
    const fn from_tag(tag: u64) -> Option<Self> {
        match tag & 0x7 {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::Len),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    const fn bits(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::Len => 2,
            Self::StartGroup => 3,
            Self::EndGroup => 4,
            Self::Fixed32 => 5,
        }
    }

    /// Wire type a value of `kind` is written with.
    const fn of(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Bool
            | FieldKind::Enum(_)
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Uint32
            | FieldKind::Uint64 => Self::Varint,
            FieldKind::Double => Self::Fixed64,
            FieldKind::Float => Self::Fixed32,
            FieldKind::Bytes | FieldKind::Message(_) | FieldKind::String => Self::Len,
        }
    }
}

const fn is_packable(kind: &FieldKind) -> bool {
    !matches!(WireType::of(kind), WireType::Len)
}

// ---------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------

/// Encode a message to its binary form.
#[must_use]
pub fn encode(message: &DynamicMessage) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(message, &mut buf);

    buf
}

fn encode_into(message: &DynamicMessage, buf: &mut impl BufMut) {
    let descriptor = message.descriptor();

    for (number, value) in message.fields() {
        let Some(field) = descriptor.field(number) else {
            continue;
        };

        match (&field.label, value) {
            (Label::Repeated, Value::List(items)) if is_packable(&field.kind) => {
                if items.is_empty() {
                    continue;
                }
                let mut packed = Vec::new();
                for item in items {
                    put_raw(&mut packed, item);
                }
                put_key(buf, number, WireType::Len);
                put_len(buf, &packed);
            }
            (Label::Repeated, Value::List(items)) => {
                for item in items {
                    put_field(buf, number, &field.kind, item);
                }
            }
            (Label::Map { .. }, Value::Map(map)) => {
                for (key, item) in map {
                    let mut entry = Vec::new();
                    put_field(&mut entry, MAP_KEY, &FieldKind::String, &Value::String(key.clone()));
                    put_field(&mut entry, MAP_VALUE, &field.kind, item);
                    put_key(buf, number, WireType::Len);
                    put_len(buf, &entry);
                }
            }
            (_, value) => put_field(buf, number, &field.kind, value),
        }
    }
}

fn put_field(buf: &mut impl BufMut, number: u32, kind: &FieldKind, value: &Value) {
    put_key(buf, number, WireType::of(kind));

    match value {
        Value::String(s) => put_len(buf, s.as_bytes()),
        Value::Bytes(b) => put_len(buf, b),
        Value::Message(m) => put_len(buf, &encode(m)),
        other => put_raw(buf, other),
    }
}

// Fixed-width and varint payloads, without a key.
fn put_raw(buf: &mut impl BufMut, value: &Value) {
    match value {
        Value::Bool(v) => put_varint(buf, u64::from(*v)),
        Value::Enum(v) | Value::I32(v) => put_varint(buf, i64::from(*v).cast_unsigned()),
        Value::I64(v) => put_varint(buf, v.cast_unsigned()),
        Value::U32(v) => put_varint(buf, u64::from(*v)),
        Value::U64(v) => put_varint(buf, *v),
        Value::F32(v) => buf.put_u32_le(v.to_bits()),
        Value::F64(v) => buf.put_u64_le(v.to_bits()),
        Value::Bytes(_)
        | Value::List(_)
        | Value::Map(_)
        | Value::Message(_)
        | Value::String(_) => {}
    }
}

fn put_key(buf: &mut impl BufMut, number: u32, wire_type: WireType) {
    put_varint(buf, (u64::from(number) << 3) | u64::from(wire_type.bits()));
}

fn put_len(buf: &mut impl BufMut, bytes: &[u8]) {
    put_varint(buf, bytes.len() as u64);
    buf.put_slice(bytes);
}

fn put_varint(buf: &mut impl BufMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

// ---------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------

/// Decode binary input as a message of the named type.
pub fn decode(
    pool: &DescriptorPool,
    full_name: &str,
    mut bytes: &[u8],
) -> Result<DynamicMessage, WireError> {
    let mut message = DynamicMessage::new_by_name(pool, full_name)?;
    decode_into(pool, &mut bytes, &mut message)?;

    Ok(message)
}

/// Merge binary input into an existing message.
pub fn decode_into(
    pool: &DescriptorPool,
    buf: &mut &[u8],
    message: &mut DynamicMessage,
) -> Result<(), WireError> {
    let descriptor = Arc::clone(message.descriptor());

    while buf.has_remaining() {
        let (number, wire_type) = get_key(buf)?;
        let Some(field) = descriptor.field(number) else {
            skip(buf, number, wire_type)?;
            continue;
        };

        match &field.label {
            Label::Repeated => {
                if wire_type == WireType::Len && is_packable(&field.kind) {
                    let mut packed = get_len(buf)?;
                    while packed.has_remaining() {
                        let item = get_raw(&mut packed, field)?;
                        message.list_mut(number)?.push(item);
                    }
                } else {
                    let item = get_value(pool, buf, field, &field.kind, wire_type, None)?;
                    message.list_mut(number)?.push(item);
                }
            }
            Label::Map { .. } => {
                expect(number, wire_type, WireType::Len)?;
                let mut entry = get_len(buf)?;
                let (key, item) = get_map_entry(pool, &mut entry, field)?;
                message.map_mut(number)?.insert(key, item);
            }
            Label::Singular | Label::Optional => {
                let existing = match message.clear(number) {
                    Some(Value::Message(m)) => Some(*m),
                    _ => None,
                };
                let value = get_value(pool, buf, field, &field.kind, wire_type, existing)?;
                message.set(number, value);
            }
        }
    }

    Ok(())
}

fn get_map_entry(
    pool: &DescriptorPool,
    entry: &mut &[u8],
    field: &FieldDescriptor,
) -> Result<(String, Value), WireError> {
    let mut key = String::new();
    let mut item = None;

    while entry.has_remaining() {
        let (number, wire_type) = get_key(entry)?;
        match number {
            MAP_KEY => {
                expect(field.number, wire_type, WireType::Len)?;
                key = get_string(entry, field.number)?;
            }
            MAP_VALUE => {
                item = Some(get_value(pool, entry, field, &field.kind, wire_type, None)?);
            }
            _ => skip(entry, number, wire_type)?,
        }
    }

    let item = match item {
        Some(item) => item,
        None => default_value(pool, &field.kind)?,
    };

    Ok((key, item))
}

fn get_value(
    pool: &DescriptorPool,
    buf: &mut &[u8],
    field: &FieldDescriptor,
    kind: &FieldKind,
    wire_type: WireType,
    existing: Option<DynamicMessage>,
) -> Result<Value, WireError> {
    expect(field.number, wire_type, WireType::of(kind))?;

    match kind {
        FieldKind::String => Ok(Value::String(get_string(buf, field.number)?)),
        FieldKind::Bytes => Ok(Value::Bytes(get_len(buf)?.to_vec())),
        FieldKind::Message(name) => {
            let mut child = match existing {
                Some(child) => child,
                None => DynamicMessage::new_by_name(pool, name)?,
            };
            let mut inner = get_len(buf)?;
            decode_into(pool, &mut inner, &mut child)?;

            Ok(Value::Message(Box::new(child)))
        }
        _ => get_raw(buf, field),
    }
}

fn get_raw(buf: &mut &[u8], field: &FieldDescriptor) -> Result<Value, WireError> {
    // Truncation to 32 bits follows the protobuf rules for int32 and enums.
    #[expect(clippy::cast_possible_truncation)]
    let value = match field.kind {
        FieldKind::Bool => Value::Bool(get_varint(buf)? != 0),
        FieldKind::Enum(_) => Value::Enum(get_varint(buf)? as i32),
        FieldKind::Int32 => Value::I32(get_varint(buf)? as i32),
        FieldKind::Int64 => Value::I64(get_varint(buf)?.cast_signed()),
        FieldKind::Uint32 => Value::U32(get_varint(buf)? as u32),
        FieldKind::Uint64 => Value::U64(get_varint(buf)?),
        FieldKind::Float => {
            need(buf, 4)?;
            Value::F32(f32::from_bits(buf.get_u32_le()))
        }
        FieldKind::Double => {
            need(buf, 8)?;
            Value::F64(f64::from_bits(buf.get_u64_le()))
        }
        FieldKind::Bytes | FieldKind::Message(_) | FieldKind::String => {
            return Err(WireError::InvalidWireType {
                number: field.number,
                wire_type: WireType::Varint.bits(),
            });
        }
    };

    Ok(value)
}

/// Zero value of a field kind, as a missing map value decodes to.
fn default_value(pool: &DescriptorPool, kind: &FieldKind) -> Result<Value, WireError> {
    Ok(match kind {
        FieldKind::Bool => Value::Bool(false),
        FieldKind::Bytes => Value::Bytes(Vec::new()),
        FieldKind::Double => Value::F64(0.0),
        FieldKind::Enum(_) => Value::Enum(0),
        FieldKind::Float => Value::F32(0.0),
        FieldKind::Int32 => Value::I32(0),
        FieldKind::Int64 => Value::I64(0),
        FieldKind::Message(name) => {
            Value::Message(Box::new(DynamicMessage::new_by_name(pool, name)?))
        }
        FieldKind::String => Value::String(String::new()),
        FieldKind::Uint32 => Value::U32(0),
        FieldKind::Uint64 => Value::U64(0),
    })
}

fn get_key(buf: &mut &[u8]) -> Result<(u32, WireType), WireError> {
    let tag = get_varint(buf)?;
    let number = u32::try_from(tag >> 3).map_err(|_| WireError::VarintOverflow)?;
    if number == 0 {
        return Err(WireError::ZeroFieldNumber);
    }
    let wire_type = WireType::from_tag(tag).ok_or(WireError::InvalidWireType {
        number,
        wire_type: (tag & 0x7) as u8,
    })?;

    Ok((number, wire_type))
}

fn get_varint(buf: &mut &[u8]) -> Result<u64, WireError> {
    let mut value = 0u64;

    for i in 0..MAX_VARINT_LEN {
        need(buf, 1)?;
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte < 0x80 {
            return Ok(value);
        }
    }

    Err(WireError::VarintOverflow)
}

fn get_len<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], WireError> {
    let len = usize::try_from(get_varint(buf)?).map_err(|_| WireError::Truncated)?;
    need(buf, len)?;
    let slice: &'a [u8] = buf;
    let (head, tail) = slice.split_at(len);
    *buf = tail;

    Ok(head)
}

fn get_string(buf: &mut &[u8], number: u32) -> Result<String, WireError> {
    let bytes = get_len(buf)?;

    String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidUtf8 { number })
}

fn skip(buf: &mut &[u8], number: u32, wire_type: WireType) -> Result<(), WireError> {
    match wire_type {
        WireType::Varint => {
            get_varint(buf)?;
        }
        WireType::Fixed64 => {
            need(buf, 8)?;
            buf.advance(8);
        }
        WireType::Fixed32 => {
            need(buf, 4)?;
            buf.advance(4);
        }
        WireType::Len => {
            get_len(buf)?;
        }
        WireType::StartGroup | WireType::EndGroup => {
            return Err(WireError::UnsupportedGroup { number });
        }
    }

    Ok(())
}

const fn expect(number: u32, found: WireType, expected: WireType) -> Result<(), WireError> {
    if found.bits() == expected.bits() {
        Ok(())
    } else {
        Err(WireError::InvalidWireType {
            number,
            wire_type: found.bits(),
        })
    }
}

const fn need(buf: &&[u8], len: usize) -> Result<(), WireError> {
    if buf.len() < len {
        Err(WireError::Truncated)
    } else {
        Ok(())
    }
}

///
/// TESTS
///
