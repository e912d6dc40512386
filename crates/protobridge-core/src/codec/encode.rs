use crate::{
    codec::{
        CodecError, EncodeOptions, base64,
        decode::{ANY_VALUE, DISCRIMINATOR},
    },
    message::{DynamicMessage, wire},
    reflect::{self, AnyValue, ContainerField, Field, PropertySet},
    value::{ScalarValue, format_float},
};
use protobridge_schema::{SchemaSet, node::EnumSchema};
use serde_json::{Map, Number, Value as JsonValue};

///
/// Encoder
///

pub(crate) struct Encoder<'a> {
    schemas: &'a SchemaSet,
    options: &'a EncodeOptions,
}

impl<'a> Encoder<'a> {
    pub(crate) const fn new(schemas: &'a SchemaSet, options: &'a EncodeOptions) -> Self {
        Self { schemas, options }
    }

    pub(crate) fn encode_root(&self, msg: &DynamicMessage) -> Result<JsonValue, CodecError> {
        let props = reflect::for_message(self.schemas, msg)?;

        self.encode_container(&props, msg)
    }

    fn encode_container(
        &self,
        props: &PropertySet<'_>,
        msg: &DynamicMessage,
    ) -> Result<JsonValue, CodecError> {
        if props.is_oneof() {
            let branch = props.fields().iter().find(|f| f.is_set(msg));
            return self.encode_branch(branch, msg);
        }

        let mut out = Map::new();
        for field in props.fields() {
            if !field.is_set(msg) {
                continue;
            }
            let value = self
                .encode_field(field, msg)
                .map_err(|e| e.with_field(field.name()))?;
            out.insert(field.name().to_string(), value);
        }

        Ok(JsonValue::Object(out))
    }

    // `{"!type": branch, branch: value}`, or `{}` when nothing is selected.
    fn encode_branch(
        &self,
        branch: Option<&Field<'_>>,
        msg: &DynamicMessage,
    ) -> Result<JsonValue, CodecError> {
        let mut out = Map::new();
        if let Some(field) = branch {
            let name = field.name();
            let value = self
                .encode_field(field, msg)
                .map_err(|e| e.with_field(name))?;
            out.insert(DISCRIMINATOR.to_string(), JsonValue::String(name.to_string()));
            out.insert(name.to_string(), value);
        }

        Ok(JsonValue::Object(out))
    }

    fn encode_nested(
        &self,
        field: &ContainerField<'_>,
        msg: &DynamicMessage,
    ) -> Result<JsonValue, CodecError> {
        if field.is_oneof() {
            return self.encode_branch(field.which(msg)?, msg);
        }

        self.encode_container(field.properties()?, msg)
    }

    fn encode_field(
        &self,
        field: &Field<'_>,
        msg: &DynamicMessage,
    ) -> Result<JsonValue, CodecError> {
        let json = match field {
            Field::Scalar(f) => f.get(msg)?.map_or(JsonValue::Null, |v| encode_scalar(&v)),
            Field::Enum(f) => f
                .get(msg)
                .map_or(JsonValue::Null, |n| self.encode_enum(f.schema(), n)),

            Field::Object(f) | Field::Oneof(f) => self.encode_nested(f, msg)?,

            Field::Any(f) => match f.get(msg)? {
                Some(value) => self.encode_any(value)?,
                None => JsonValue::Null,
            },
            Field::Polymorph(f) => match f.get(msg)? {
                Some(value) => self.encode_any(value)?,
                None => JsonValue::Object(Map::new()),
            },

            Field::ScalarArray(f) => {
                JsonValue::Array(f.values(msg)?.iter().map(encode_scalar).collect())
            }
            Field::EnumArray(f) => JsonValue::Array(
                f.values(msg)?
                    .into_iter()
                    .map(|n| self.encode_enum(f.schema(), n))
                    .collect(),
            ),
            Field::ContainerArray(f) => {
                let mut items = Vec::with_capacity(f.len(msg));
                for (i, element) in f.elements(msg)?.iter().enumerate() {
                    items.push(
                        self.encode_field(element, msg)
                            .map_err(|e| e.with_index(i))?,
                    );
                }
                JsonValue::Array(items)
            }

            Field::ScalarMap(f) => JsonValue::Object(
                f.entries(msg)?
                    .into_iter()
                    .map(|(k, v)| (k, encode_scalar(&v)))
                    .collect(),
            ),
            Field::EnumMap(f) => JsonValue::Object(
                f.entries(msg)?
                    .into_iter()
                    .map(|(k, n)| (k, self.encode_enum(f.schema(), n)))
                    .collect(),
            ),
            Field::ContainerMap(f) => {
                let mut out = Map::new();
                for (key, entry) in f.entries(msg)? {
                    let value = self
                        .encode_field(&entry, msg)
                        .map_err(|e| e.with_field(&key))?;
                    out.insert(key, value);
                }
                JsonValue::Object(out)
            }
        };

        Ok(json)
    }

    // Short option name, or the number when asked for or unknown.
    fn encode_enum(&self, schema: &EnumSchema, number: i32) -> JsonValue {
        match schema.option_by_number(number) {
            Some(option) if !self.options.enum_as_number => JsonValue::String(option.name.clone()),
            _ => JsonValue::Number(number.into()),
        }
    }

    // The JSON payload wins; a binary-only payload is decoded and re-encoded
    // through reflection.
    fn encode_any(&self, value: AnyValue) -> Result<JsonValue, CodecError> {
        let inner = match (&value.json, &value.proto) {
            (Some(json), _) => serde_json::from_slice(json).map_err(|e| CodecError::json(&e))?,
            (None, Some(proto)) => {
                let message = wire::decode(self.schemas.pool(), &value.type_name, proto)?;
                self.encode_root(&message)?
            }
            (None, None) => JsonValue::Object(Map::new()),
        };

        let mut out = Map::new();
        out.insert(DISCRIMINATOR.to_string(), JsonValue::String(value.type_name));
        out.insert(ANY_VALUE.to_string(), inner);

        Ok(JsonValue::Object(out))
    }
}

/// 64-bit integers are quoted; other numbers are bare unless non-finite.
pub(crate) fn encode_scalar(value: &ScalarValue) -> JsonValue {
    match value {
        ScalarValue::Bool(b) => JsonValue::Bool(*b),
        ScalarValue::Bytes(b) => JsonValue::String(base64::encode(b)),
        ScalarValue::Int32(n) => JsonValue::Number((*n).into()),
        ScalarValue::Uint32(n) => JsonValue::Number((*n).into()),
        ScalarValue::Float32(f) => {
            // Widen through the shortest f32 text so 0.1 stays 0.1.
            float_json(f.to_string().parse().unwrap_or_else(|_| f64::from(*f)))
        }
        ScalarValue::Float64(f) => float_json(*f),
        other => JsonValue::String(other.to_string()),
    }
}

fn float_json(f: f64) -> JsonValue {
    Number::from_f64(f).map_or_else(|| JsonValue::String(format_float(f)), JsonValue::Number)
}
