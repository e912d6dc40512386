use crate::{
    codec::{CodecError, DecodeOptions, base64, json_kind},
    message::{DynamicMessage, wire},
    reflect::{self, AnyValue, ContainerField, Field, PropertySet},
    value::{ScalarValue, parse_float},
};
use protobridge_primitives::ScalarKind;
use protobridge_schema::{SchemaSet, node::EnumSchema};
use serde_json::{Map, Number, Value as JsonValue};

pub(crate) const DISCRIMINATOR: &str = "!type";
pub(crate) const ANY_VALUE: &str = "value";

type JsonObject = Map<String, JsonValue>;

///
/// Decoder
///
/// Walks a parsed JSON document against the reflection tree of one message.
///

pub(crate) struct Decoder<'a> {
    schemas: &'a SchemaSet,
    options: &'a DecodeOptions,
}

impl<'a> Decoder<'a> {
    pub(crate) const fn new(schemas: &'a SchemaSet, options: &'a DecodeOptions) -> Self {
        Self { schemas, options }
    }

    /// Decode a JSON object into the document message itself.
    pub(crate) fn decode_root(
        &self,
        msg: &mut DynamicMessage,
        json: &JsonValue,
    ) -> Result<(), CodecError> {
        let props = reflect::for_message(self.schemas, msg)?;
        let obj = expect_object(json)?;

        self.decode_container(&props, msg, obj)
    }

    pub(crate) fn decode_field(
        &self,
        field: &Field<'_>,
        msg: &mut DynamicMessage,
        json: &JsonValue,
    ) -> Result<(), CodecError> {
        if json.is_null() {
            field.clear(msg);
            return Ok(());
        }

        match field {
            Field::Scalar(f) => f.set(msg, decode_scalar(f.kind(), json)?)?,
            Field::Enum(f) => f.set_number(msg, decode_enum(f.schema(), json)?)?,

            Field::Object(f) | Field::Oneof(f) => {
                let obj = expect_object(json)?;
                self.decode_nested(f, msg, obj)?;
            }

            Field::Any(f) => {
                let value = self.decode_any(json, |t| f.allows(t))?;
                f.set(msg, value)?;
            }
            Field::Polymorph(f) => {
                let value = self.decode_any(json, |t| f.allows(t))?;
                f.set(msg, value)?;
            }

            Field::ScalarArray(f) => {
                let items = expect_array(json)?;
                f.clear(msg);
                for (i, item) in items.iter().enumerate() {
                    decode_scalar(f.kind(), item)
                        .and_then(|v| f.append(msg, v).map_err(CodecError::from))
                        .map_err(|e| e.with_index(i))?;
                }
            }
            Field::EnumArray(f) => {
                let items = expect_array(json)?;
                f.clear(msg);
                for (i, item) in items.iter().enumerate() {
                    decode_enum(f.schema(), item)
                        .and_then(|n| f.append(msg, n).map_err(CodecError::from))
                        .map_err(|e| e.with_index(i))?;
                }
            }
            Field::ContainerArray(f) => {
                let items = expect_array(json)?;
                f.clear(msg);
                for (i, item) in items.iter().enumerate() {
                    f.append_new(msg)
                        .map_err(CodecError::from)
                        .and_then(|element| self.decode_field(&element, msg, item))
                        .map_err(|e| e.with_index(i))?;
                }
            }

            Field::ScalarMap(f) => {
                let obj = expect_object(json)?;
                f.clear(msg);
                for (key, item) in obj {
                    decode_scalar(f.kind(), item)
                        .and_then(|v| f.set(msg, key.as_str(), v).map_err(CodecError::from))
                        .map_err(|e| e.with_field(key))?;
                }
            }
            Field::EnumMap(f) => {
                let obj = expect_object(json)?;
                f.clear(msg);
                for (key, item) in obj {
                    decode_enum(f.schema(), item)
                        .and_then(|n| f.set(msg, key.as_str(), n).map_err(CodecError::from))
                        .map_err(|e| e.with_field(key))?;
                }
            }
            Field::ContainerMap(f) => {
                let obj = expect_object(json)?;
                f.clear(msg);
                for (key, item) in obj {
                    f.insert_new(msg, key)
                        .map_err(CodecError::from)
                        .and_then(|entry| self.decode_field(&entry, msg, item))
                        .map_err(|e| e.with_field(key))?;
                }
            }
        }

        Ok(())
    }

    // Objects always materialize; oneofs only when something selects a
    // branch, so `{}` leaves them unset.
    fn decode_nested(
        &self,
        field: &ContainerField<'_>,
        msg: &mut DynamicMessage,
        obj: &JsonObject,
    ) -> Result<(), CodecError> {
        if !field.is_oneof() || !obj.is_empty() {
            field.ensure(msg)?;
        }

        self.decode_container(field.properties()?, msg, obj)
    }

    fn decode_container(
        &self,
        props: &PropertySet<'_>,
        msg: &mut DynamicMessage,
        obj: &JsonObject,
    ) -> Result<(), CodecError> {
        if props.is_oneof() {
            return self.decode_oneof(props, msg, obj);
        }

        for (key, value) in obj {
            let field = lookup(props, key)?;
            self.decode_field(field, msg, value)
                .map_err(|e| e.with_field(key))?;
        }

        Ok(())
    }

    fn decode_oneof(
        &self,
        props: &PropertySet<'_>,
        msg: &mut DynamicMessage,
        obj: &JsonObject,
    ) -> Result<(), CodecError> {
        let discriminator = match obj.get(DISCRIMINATOR) {
            None => None,
            Some(JsonValue::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Err(CodecError::UnexpectedToken {
                    expected: "string",
                    found: json_kind(other),
                }
                .with_field(DISCRIMINATOR));
            }
        };

        let mut branches = obj.iter().filter(|(k, _)| *k != DISCRIMINATOR);
        let branch = branches.next();
        if branches.next().is_some() {
            return Err(CodecError::MultipleOneofKeys);
        }

        match (branch, discriminator) {
            (Some((key, value)), expected) => {
                if let Some(expected) = expected
                    && expected != key.as_str()
                {
                    return Err(CodecError::DiscriminatorMismatch {
                        expected: expected.to_string(),
                        found: key.clone(),
                    });
                }
                let field = lookup(props, key)?;
                self.decode_field(field, msg, value)
                    .map_err(|e| e.with_field(key))
            }

            // Selected but empty.
            (None, Some(expected)) => {
                let field = lookup(props, expected)?;
                field
                    .set_default(msg)
                    .map_err(|e| CodecError::from(e).with_field(expected))
            }

            (None, None) => Ok(()),
        }
    }

    /// Read an `{"!type", "value"}` envelope. The payload is kept as JSON
    /// and, when enabled, also resolved into the binary form.
    fn decode_any(
        &self,
        json: &JsonValue,
        allows: impl Fn(&str) -> bool,
    ) -> Result<AnyValue, CodecError> {
        let obj = expect_object(json)?;
        for key in obj.keys() {
            if key != DISCRIMINATOR && key != ANY_VALUE {
                return Err(CodecError::NoSuchProperty {
                    schema: "Any".to_string(),
                    property: key.clone(),
                });
            }
        }

        let type_name = match obj.get(DISCRIMINATOR) {
            None => return Err(CodecError::NoTypeInAny),
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) => {
                return Err(CodecError::UnexpectedToken {
                    expected: "string",
                    found: json_kind(other),
                }
                .with_field(DISCRIMINATOR));
            }
        };
        if !allows(&type_name) {
            return Err(CodecError::TypeNotAllowed(type_name));
        }

        let payload = obj
            .get(ANY_VALUE)
            .cloned()
            .unwrap_or_else(|| JsonValue::Object(Map::new()));
        let json = serde_json::to_vec(&payload).map_err(|e| CodecError::json(&e))?;

        let proto = if self.options.resolve_any {
            let mut inner = DynamicMessage::new_by_name(self.schemas.pool(), &type_name)
                .map_err(|_| CodecError::UnknownType(type_name.clone()))?;
            self.decode_root(&mut inner, &payload)
                .map_err(|e| e.with_field(ANY_VALUE))?;
            Some(wire::encode(&inner))
        } else {
            None
        };

        Ok(AnyValue {
            type_name,
            json: Some(json),
            proto,
        })
    }
}

fn lookup<'p, 's>(props: &'p PropertySet<'s>, key: &str) -> Result<&'p Field<'s>, CodecError> {
    props
        .get_property(key)
        .ok_or_else(|| CodecError::NoSuchProperty {
            schema: props.schema().full_name(),
            property: key.to_string(),
        })
}

fn expect_object(json: &JsonValue) -> Result<&JsonObject, CodecError> {
    json.as_object().ok_or_else(|| CodecError::UnexpectedToken {
        expected: "object",
        found: json_kind(json),
    })
}

fn expect_array(json: &JsonValue) -> Result<&Vec<JsonValue>, CodecError> {
    json.as_array().ok_or_else(|| CodecError::UnexpectedToken {
        expected: "array",
        found: json_kind(json),
    })
}

/// Token-level scalar decode.
pub(crate) fn decode_scalar(kind: ScalarKind, json: &JsonValue) -> Result<ScalarValue, CodecError> {
    let unexpected = |expected| CodecError::UnexpectedToken {
        expected,
        found: json_kind(json),
    };

    match (kind, json) {
        (ScalarKind::Bool, JsonValue::Bool(b)) => Ok(ScalarValue::Bool(*b)),
        (ScalarKind::Bool, _) => Err(unexpected("boolean")),

        (ScalarKind::String, JsonValue::String(s)) => Ok(ScalarValue::String(s.clone())),
        (ScalarKind::Key, JsonValue::String(s)) => Ok(ScalarValue::Key(s.clone())),
        (ScalarKind::String | ScalarKind::Key, _) => Err(unexpected("string")),

        (k, JsonValue::Number(n)) if k.is_integer() => integer_from_number(k, n),
        (k, JsonValue::String(s)) if k.is_integer() => scalar_from_text(k, s),
        (k, _) if k.is_integer() => Err(unexpected("integer")),

        (k, JsonValue::Number(n)) if k.is_float() => float_from_number(k, n),
        (k, JsonValue::String(s)) if k.is_float() => scalar_from_text(k, s),
        (k, _) if k.is_float() => Err(unexpected("number")),

        (k, JsonValue::String(s)) => scalar_from_text(k, s),
        (_, _) => Err(unexpected("string")),
    }
}

/// Scalar from a text literal, as found in JSON strings and query values.
pub(crate) fn scalar_from_text(kind: ScalarKind, text: &str) -> Result<ScalarValue, CodecError> {
    if kind == ScalarKind::Bytes {
        return base64::decode(text).map(ScalarValue::Bytes);
    }
    if kind.is_integer() {
        let n = text.parse::<i128>().map_err(|_| CodecError::InvalidLiteral {
            kind,
            value: text.to_string(),
        })?;
        return integer_in_range(kind, n);
    }
    if kind == ScalarKind::Float32
        && let Some(f) = parse_float(text)
        && f.is_finite()
        && f.abs() > f64::from(f32::MAX)
    {
        return Err(CodecError::OutOfRange {
            kind,
            value: text.to_string(),
        });
    }

    ScalarValue::parse(kind, text).map_err(|_| CodecError::InvalidLiteral {
        kind,
        value: text.to_string(),
    })
}

fn integer_from_number(kind: ScalarKind, n: &Number) -> Result<ScalarValue, CodecError> {
    let wide = n
        .as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
        .ok_or_else(|| CodecError::InvalidLiteral {
            kind,
            value: n.to_string(),
        })?;

    integer_in_range(kind, wide)
}

fn integer_in_range(kind: ScalarKind, n: i128) -> Result<ScalarValue, CodecError> {
    let value = match kind {
        ScalarKind::Int32 => i32::try_from(n).ok().map(ScalarValue::Int32),
        ScalarKind::Int64 => i64::try_from(n).ok().map(ScalarValue::Int64),
        ScalarKind::Uint32 => u32::try_from(n).ok().map(ScalarValue::Uint32),
        ScalarKind::Uint64 => u64::try_from(n).ok().map(ScalarValue::Uint64),
        _ => None,
    };

    value.ok_or_else(|| CodecError::OutOfRange {
        kind,
        value: n.to_string(),
    })
}

fn float_from_number(kind: ScalarKind, n: &Number) -> Result<ScalarValue, CodecError> {
    let f = n.as_f64().ok_or_else(|| CodecError::InvalidLiteral {
        kind,
        value: n.to_string(),
    })?;

    if kind == ScalarKind::Float32 {
        if f.abs() > f64::from(f32::MAX) {
            return Err(CodecError::OutOfRange {
                kind,
                value: n.to_string(),
            });
        }
        #[expect(clippy::cast_possible_truncation)]
        return Ok(ScalarValue::Float32(f as f32));
    }

    Ok(ScalarValue::Float64(f))
}

/// Enum option number from a short name, long name or number.
pub(crate) fn decode_enum(schema: &EnumSchema, json: &JsonValue) -> Result<i32, CodecError> {
    let option = match json {
        JsonValue::String(s) => schema.option(s),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .and_then(|n| schema.option_by_number(n)),
        other => {
            return Err(CodecError::UnexpectedToken {
                expected: "enum name or number",
                found: json_kind(other),
            });
        }
    };

    option.map(|o| o.number).ok_or_else(|| {
        CodecError::UnknownEnumOption(match json {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    })
}

/// Enum option number from query text: a name or a number.
pub(crate) fn enum_from_text(schema: &EnumSchema, text: &str) -> Result<i32, CodecError> {
    let option = schema.option(text).or_else(|| {
        text.parse::<i32>()
            .ok()
            .and_then(|n| schema.option_by_number(n))
    });

    option
        .map(|o| o.number)
        .ok_or_else(|| CodecError::UnknownEnumOption(text.to_string()))
}
