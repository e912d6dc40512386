//! Rule checking over a reflected message.
//!
//! The walker visits every set property, applies the rules its schema
//! carries and records each violation under the property's JSON path.
//! Violations never stop the walk; only reflection failures do.

mod rules;

#[cfg(test)]
mod tests;

use crate::{
    message::DynamicMessage,
    reflect::{self, ContainerField, Field, PropertySet, ReflectError},
};
use derive_more::{Deref, IntoIterator};
use protobridge_schema::{
    SchemaSet,
    node::{FieldSchema, Property},
};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// ValidateError
///

#[derive(Debug, ThisError)]
pub enum ValidateError {
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationIssues),

    #[error(transparent)]
    Reflect(#[from] ReflectError),
}

///
/// ValidationIssues
///
/// JSON path → messages, in path order.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct ValidationIssues(BTreeMap<String, Vec<String>>);

impl ValidationIssues {
    /// Messages recorded at `path`, if any.
    #[must_use]
    pub fn at(&self, path: &str) -> &[String] {
        self.0.get(path).map_or(&[], Vec::as_slice)
    }

    fn push(&mut self, path: String, message: String) {
        self.0.entry(path).or_default().push(message);
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                if path.is_empty() {
                    f.write_str(message)?;
                } else {
                    write!(f, "{path}: {message}")?;
                }
            }
        }

        Ok(())
    }
}

///
/// PathSegment
///

#[derive(Clone, Debug)]
enum PathSegment {
    Field(String),
    Index(usize),
    Key(String),
}

fn render_path(path: &[PathSegment]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for seg in path {
        match seg {
            PathSegment::Field(name) | PathSegment::Key(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            PathSegment::Index(i) => {
                let _ = write!(out, "[{i}]");
            }
        }
    }

    out
}

///
/// IssueSink
///
/// Where rule checks report; the walker fixes the path.
///

pub(crate) trait IssueSink {
    fn add_issue(&mut self, message: String);
}

/// Validate the document message `msg` against its schema's rules.
pub fn validate(schemas: &SchemaSet, msg: &DynamicMessage) -> Result<(), ValidateError> {
    let props = reflect::for_message(schemas, msg)?;
    let mut validator = Validator::default();

    validator.visit_properties(&props, msg)?;

    let issues = validator.issues;
    if issues.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            type_name = %msg.full_name(),
            count = issues.len(),
            "validation failed"
        );
        Err(ValidateError::ValidationFailed(issues))
    }
}

///
/// Validator
///

#[derive(Default)]
struct Validator {
    path: Vec<PathSegment>,
    issues: ValidationIssues,
}

impl IssueSink for Validator {
    fn add_issue(&mut self, message: String) {
        let key = render_path(&self.path);
        self.issues.push(key, message);
    }
}

impl Validator {
    fn with_segment<T>(
        &mut self,
        seg: PathSegment,
        f: impl FnOnce(&mut Self) -> Result<T, ReflectError>,
    ) -> Result<T, ReflectError> {
        self.path.push(seg);
        let out = f(self);
        self.path.pop();

        out
    }

    fn visit_properties(
        &mut self,
        props: &PropertySet<'_>,
        msg: &DynamicMessage,
    ) -> Result<(), ReflectError> {
        for (property, field) in props.list_properties().iter().zip(props.fields()) {
            self.with_segment(PathSegment::Field(property.name.clone()), |v| {
                v.visit_property(property, field, msg)
            })?;
        }

        Ok(())
    }

    fn visit_property(
        &mut self,
        property: &Property,
        field: &Field<'_>,
        msg: &DynamicMessage,
    ) -> Result<(), ReflectError> {
        let set = field.is_set(msg);
        if property.required && !set {
            self.add_issue("value is required".to_string());
        }

        match &property.schema {
            FieldSchema::Array(schema) => {
                if let Some(rules) = &schema.rules {
                    let items = msg
                        .lookup(field.location().steps())
                        .and_then(|v| v.as_list())
                        .map_or(&[][..], Vec::as_slice);
                    rules::check_repeated(rules, items, self);
                }
            }
            FieldSchema::Map(schema) => {
                if let Some(rules) = &schema.rules {
                    let len = msg
                        .lookup(field.location().steps())
                        .and_then(|v| v.as_map())
                        .map_or(0, BTreeMap::len);
                    rules::check_map(rules, len, self);
                }
            }
            _ => {}
        }

        if set {
            self.visit_value(field, msg)?;
        }

        Ok(())
    }

    fn visit_value(&mut self, field: &Field<'_>, msg: &DynamicMessage) -> Result<(), ReflectError> {
        match field {
            Field::Scalar(f) => {
                if let Some(value) = f.get(msg)? {
                    rules::check_scalar(f.schema(), &value, self);
                }
            }
            Field::Enum(f) => {
                if let Some(number) = f.get(msg) {
                    rules::check_enum(f.schema(), f.rules(), number, self);
                }
            }

            Field::Object(f) | Field::Oneof(f) => self.visit_container(f, msg)?,

            // Opaque payloads.
            Field::Any(_) | Field::Polymorph(_) => {}

            Field::ScalarArray(f) => {
                for (i, value) in f.values(msg)?.iter().enumerate() {
                    self.path.push(PathSegment::Index(i));
                    rules::check_scalar(f.item_schema(), value, self);
                    self.path.pop();
                }
            }
            Field::EnumArray(f) => {
                for (i, number) in f.values(msg)?.into_iter().enumerate() {
                    self.path.push(PathSegment::Index(i));
                    rules::check_enum(f.schema(), f.rules(), number, self);
                    self.path.pop();
                }
            }
            Field::ContainerArray(f) => {
                for (i, element) in f.elements(msg)?.iter().enumerate() {
                    self.with_segment(PathSegment::Index(i), |v| v.visit_value(element, msg))?;
                }
            }

            Field::ScalarMap(f) => {
                for (key, value) in f.entries(msg)? {
                    self.path.push(PathSegment::Key(key));
                    rules::check_scalar(f.item_schema(), &value, self);
                    self.path.pop();
                }
            }
            Field::EnumMap(f) => {
                for (key, number) in f.entries(msg)? {
                    self.path.push(PathSegment::Key(key));
                    rules::check_enum(f.schema(), f.rules(), number, self);
                    self.path.pop();
                }
            }
            Field::ContainerMap(f) => {
                for (key, entry) in f.entries(msg)? {
                    self.with_segment(PathSegment::Key(key), |v| v.visit_value(&entry, msg))?;
                }
            }
        }

        Ok(())
    }

    fn visit_container(
        &mut self,
        field: &ContainerField<'_>,
        msg: &DynamicMessage,
    ) -> Result<(), ReflectError> {
        if field.is_set(msg) {
            self.visit_properties(field.properties()?, msg)?;
        }

        Ok(())
    }
}
