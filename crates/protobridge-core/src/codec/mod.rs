//! JSON and URL-query codec driven by reflection.
//!
//! Oneofs and Any values travel as `{"!type": name, ...}` envelopes, 64-bit
//! integers as strings, and bytes as base64. The codec only talks to the
//! reflection layer; physical storage stays behind `Field` handles.

mod base64;
mod decode;
mod encode;
mod error;
mod query;


pub use error::{CodecError, ErrorPath, PathStep};
pub use query::parse_query;

use crate::{message::DynamicMessage, reflect::ReflectError};
use decode::Decoder;
use encode::Encoder;
use protobridge_schema::SchemaSet;
use query::QueryDecoder;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

///
/// DecodeOptions
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Also store Any payloads in their binary form.
    pub resolve_any: bool,
}

///
/// EncodeOptions
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Emit enum numbers instead of short option names.
    pub enum_as_number: bool,
}

/// Decode JSON bytes into `msg` with default options.
pub fn decode_json(
    schemas: &SchemaSet,
    msg: &mut DynamicMessage,
    bytes: &[u8],
) -> Result<(), CodecError> {
    decode_json_with(schemas, msg, bytes, &DecodeOptions::default())
}

pub fn decode_json_with(
    schemas: &SchemaSet,
    msg: &mut DynamicMessage,
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<(), CodecError> {
    let json: JsonValue = serde_json::from_slice(bytes).map_err(|e| CodecError::json(&e))?;

    decode_value_with(schemas, msg, &json, options)
}

/// Decode an already parsed JSON document.
pub fn decode_value(
    schemas: &SchemaSet,
    msg: &mut DynamicMessage,
    json: &JsonValue,
) -> Result<(), CodecError> {
    decode_value_with(schemas, msg, json, &DecodeOptions::default())
}

pub fn decode_value_with(
    schemas: &SchemaSet,
    msg: &mut DynamicMessage,
    json: &JsonValue,
    options: &DecodeOptions,
) -> Result<(), CodecError> {
    Decoder::new(schemas, options)
        .decode_root(msg, json)
        .inspect_err(|err| log_failure("decode", msg, err))
}

/// Decode query parameters, as produced by [`parse_query`], into `msg`.
pub fn decode_query(
    schemas: &SchemaSet,
    msg: &mut DynamicMessage,
    params: &BTreeMap<String, Vec<String>>,
) -> Result<(), CodecError> {
    QueryDecoder::new(schemas, &DecodeOptions::default())
        .decode(msg, params)
        .inspect_err(|err| log_failure("query decode", msg, err))
}

/// Encode `msg` as compact JSON bytes.
pub fn encode_json(schemas: &SchemaSet, msg: &DynamicMessage) -> Result<Vec<u8>, CodecError> {
    encode_json_with(schemas, msg, &EncodeOptions::default())
}

pub fn encode_json_with(
    schemas: &SchemaSet,
    msg: &DynamicMessage,
    options: &EncodeOptions,
) -> Result<Vec<u8>, CodecError> {
    let json = encode_value_with(schemas, msg, options)?;

    serde_json::to_vec(&json).map_err(|e| CodecError::json(&e))
}

/// Encode `msg` into a JSON value tree.
pub fn encode_value(schemas: &SchemaSet, msg: &DynamicMessage) -> Result<JsonValue, CodecError> {
    encode_value_with(schemas, msg, &EncodeOptions::default())
}

pub fn encode_value_with(
    schemas: &SchemaSet,
    msg: &DynamicMessage,
    options: &EncodeOptions,
) -> Result<JsonValue, CodecError> {
    Encoder::new(schemas, options)
        .encode_root(msg)
        .inspect_err(|err| log_failure("encode", msg, err))
}

// Name of a JSON token kind, for error messages.
pub(crate) const fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn log_failure(op: &str, msg: &DynamicMessage, err: &CodecError) {
    let type_name = msg.full_name();
    match err.leaf() {
        CodecError::Reflect(ReflectError::Schema { .. }) | CodecError::Schema(_) => {
            tracing::warn!(%type_name, path = err.path(), error = %err, "{op} failed on schema");
        }
        _ => tracing::debug!(%type_name, path = err.path(), error = %err, "{op} failed"),
    }
}
