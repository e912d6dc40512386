use crate::{
    codec::{
        CodecError, DecodeOptions,
        decode::{Decoder, enum_from_text, scalar_from_text},
    },
    message::DynamicMessage,
    reflect::{self, Field, PropertySet},
};
use protobridge_schema::SchemaSet;
use std::collections::BTreeMap;

/// Split a raw query string into its key → values map. A leading `?` is
/// ignored; repeated keys keep their order.
#[must_use]
pub fn parse_query(raw: &str) -> BTreeMap<String, Vec<String>> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    params
}

///
/// QueryDecoder
///
/// Dotted keys walk container properties; the terminal property takes the
/// values. Every error is reported once, with the full key as its path.
///

pub(crate) struct QueryDecoder<'a> {
    schemas: &'a SchemaSet,
    options: &'a DecodeOptions,
}

impl<'a> QueryDecoder<'a> {
    pub(crate) const fn new(schemas: &'a SchemaSet, options: &'a DecodeOptions) -> Self {
        Self { schemas, options }
    }

    pub(crate) fn decode(
        &self,
        msg: &mut DynamicMessage,
        params: &BTreeMap<String, Vec<String>>,
    ) -> Result<(), CodecError> {
        let root = reflect::for_message(self.schemas, msg)?;

        for (key, values) in params {
            self.decode_param(&root, msg, key, values)
                .map_err(|e| e.with_field(key))?;
        }

        Ok(())
    }

    fn decode_param(
        &self,
        root: &PropertySet<'_>,
        msg: &mut DynamicMessage,
        key: &str,
        values: &[String],
    ) -> Result<(), CodecError> {
        let field = resolve_path(root, key)?;
        let single_value = || {
            single(values).ok_or(CodecError::QueryShape("expected a single value"))
        };

        match field {
            Field::Scalar(f) => {
                let text = single_value()?;
                f.set(msg, scalar_from_text(f.kind(), text)?)?;
            }
            Field::Enum(f) => {
                let text = single_value()?;
                f.set_number(msg, enum_from_text(f.schema(), text)?)?;
            }
            Field::ScalarArray(f) => {
                for text in values {
                    f.append(msg, scalar_from_text(f.kind(), text)?)?;
                }
            }
            Field::EnumArray(f) => {
                for text in values {
                    f.append(msg, enum_from_text(f.schema(), text)?)?;
                }
            }

            // Containers take one embedded JSON document.
            container => {
                let text = single_value()?;
                let opening = if matches!(container, Field::ContainerArray(_)) {
                    '['
                } else {
                    '{'
                };
                if !text.trim_start().starts_with(opening) {
                    return Err(CodecError::QueryShape(if opening == '[' {
                        "expected an embedded JSON array"
                    } else {
                        "expected an embedded JSON object"
                    }));
                }

                let json: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| CodecError::json(&e))?;
                Decoder::new(self.schemas, self.options).decode_field(container, msg, &json)?;
            }
        }

        Ok(())
    }
}

// Walk every segment but the last through container properties.
fn resolve_path<'p, 's>(
    root: &'p PropertySet<'s>,
    key: &str,
) -> Result<&'p Field<'s>, CodecError> {
    let mut props = root;
    let mut segments = key.split('.').peekable();

    while let Some(segment) = segments.next() {
        let field = props
            .get_property(segment)
            .ok_or_else(|| CodecError::NoSuchProperty {
                schema: props.schema().full_name(),
                property: segment.to_string(),
            })?;
        if segments.peek().is_none() {
            return Ok(field);
        }

        props = field
            .as_container()
            .ok_or(CodecError::QueryShape("path segment is not an object"))?
            .properties()?;
    }

    Err(CodecError::QueryShape("empty key"))
}

fn single(values: &[String]) -> Option<&str> {
    match values {
        [one] => Some(one),
        _ => None,
    }
}
