use crate::{
    build::{
        BuildError,
        session::{BuildSession, is_oneof_root},
    },
    descriptor::{
        EnumDescriptor, FieldDescriptor, FieldKind, FieldRules, KeyFormat, Label,
        MessageDescriptor, ScalarRules, well_known::WellKnown,
    },
    naming,
    node::{
        AnySchema, ArraySchema, EnumRef, FieldSchema, MapSchema, ObjectRef, OneofRef,
        PolymorphRef, ScalarSchema,
    },
};
use protobridge_primitives::{
    ScalarKind,
    types::{Date, Decimal},
};
use regex::Regex;
use std::fmt::Display;

///
/// FieldCtx
///
/// Names the field an annotation error is reported against.
///

pub(super) struct FieldCtx {
    pub(super) type_name: String,
    pub(super) field: String,
}

impl FieldCtx {
    pub(super) fn new(desc: &MessageDescriptor, field: &FieldDescriptor) -> Self {
        Self {
            type_name: desc.full_name(),
            field: field.name.clone(),
        }
    }

    pub(super) fn malformed(&self, message: impl Into<String>) -> BuildError {
        BuildError::MalformedAnnotation {
            type_name: self.type_name.clone(),
            field: self.field.clone(),
            message: message.into(),
        }
    }

    fn compile(&self, pattern: &str) -> Result<Regex, BuildError> {
        Regex::new(pattern).map_err(|e| self.malformed(format!("invalid pattern: {e}")))
    }

    fn check_order<T: PartialOrd + Display>(
        &self,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), BuildError> {
        match (min, max) {
            (Some(min), Some(max)) if min > max => {
                Err(self.malformed(format!("min {min} is greater than max {max}")))
            }
            _ => Ok(()),
        }
    }
}

impl BuildSession<'_> {
    pub(super) fn field_schema(
        &mut self,
        desc: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<FieldSchema, BuildError> {
        let ctx = FieldCtx::new(desc, field);
        let rules = field.annotations.rules.clone().unwrap_or_default();

        if field.annotations.single_form.is_some() && !field.label.is_repeated() {
            return Err(ctx.malformed("single_form requires a repeated field"));
        }

        match &field.label {
            Label::Map { key } => {
                if *key != FieldKind::String {
                    return Err(BuildError::MapKeyNotString {
                        type_name: ctx.type_name,
                        field: ctx.field,
                    });
                }
                if rules.repeated.is_some() {
                    return Err(ctx.malformed("repeated rules do not apply to a map"));
                }
                if let Some(map) = &rules.map {
                    ctx.check_order(map.min_pairs, map.max_pairs)?;
                }

                let items = self.item_schema(&ctx, field, &rules)?;

                Ok(FieldSchema::Map(MapSchema {
                    items: Box::new(items),
                    rules: rules.map,
                }))
            }
            Label::Repeated => {
                if rules.map.is_some() {
                    return Err(ctx.malformed("map rules do not apply to a repeated field"));
                }
                if let Some(repeated) = &rules.repeated {
                    ctx.check_order(repeated.min_items, repeated.max_items)?;
                }

                let items = self.item_schema(&ctx, field, &rules)?;

                Ok(FieldSchema::Array(ArraySchema {
                    items: Box::new(items),
                    rules: rules.repeated,
                }))
            }
            Label::Singular | Label::Optional => {
                if rules.repeated.is_some() || rules.map.is_some() {
                    return Err(ctx.malformed("collection rules on a singular field"));
                }

                self.item_schema(&ctx, field, &rules)
            }
        }
    }

    // Schema of the value itself, ignoring the label.
    fn item_schema(
        &mut self,
        ctx: &FieldCtx,
        field: &FieldDescriptor,
        rules: &FieldRules,
    ) -> Result<FieldSchema, BuildError> {
        let ann = &field.annotations;
        let is_any = matches!(
            field.kind.message_name().and_then(WellKnown::from_full_name),
            Some(WellKnown::Any)
        );

        if !ann.any_types.is_empty() && !is_any {
            return Err(ctx.malformed("any_types requires an Any field"));
        }
        if ann.key.is_some() && field.kind != FieldKind::String {
            return Err(ctx.malformed("a key format requires a string field"));
        }
        if rules.enumeration.is_some() && !matches!(field.kind, FieldKind::Enum(_)) {
            return Err(ctx.malformed("enum rules on a non-enum field"));
        }

        let kind = match &field.kind {
            FieldKind::Bool => ScalarKind::Bool,
            FieldKind::Bytes => ScalarKind::Bytes,
            FieldKind::Double => ScalarKind::Float64,
            FieldKind::Float => ScalarKind::Float32,
            FieldKind::Int32 => ScalarKind::Int32,
            FieldKind::Int64 => ScalarKind::Int64,
            FieldKind::String => ScalarKind::String,
            FieldKind::Uint32 => ScalarKind::Uint32,
            FieldKind::Uint64 => ScalarKind::Uint64,
            FieldKind::Enum(name) => return self.enum_schema(ctx, name, rules),
            FieldKind::Message(name) => match WellKnown::from_full_name(name) {
                Some(WellKnown::Any) => {
                    if rules.scalar.is_some() {
                        return Err(ctx.malformed("scalar rules do not apply to an Any field"));
                    }
                    for type_name in &ann.any_types {
                        self.message(type_name)?;
                    }

                    return Ok(FieldSchema::Any(AnySchema {
                        types: ann.any_types.clone(),
                    }));
                }
                Some(WellKnown::Struct) => {
                    return Err(BuildError::UnsupportedWellKnown(name.clone()));
                }
                Some(well_known) => match well_known.scalar_kind() {
                    Some(kind) => kind,
                    None => return Err(BuildError::UnsupportedWellKnown(name.clone())),
                },
                None => return self.message_schema(ctx, name, rules),
            },
        };

        scalar_schema(ctx, kind, field, rules)
    }

    fn enum_schema(
        &mut self,
        ctx: &FieldCtx,
        name: &str,
        rules: &FieldRules,
    ) -> Result<FieldSchema, BuildError> {
        if rules.scalar.is_some() {
            return Err(ctx.malformed("scalar rules do not apply to an enum field"));
        }

        let desc = self
            .set
            .pool()
            .enumeration(name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownType(name.to_string()))?;

        if let Some(enum_rules) = &rules.enumeration {
            for option in enum_rules.allow.iter().chain(&enum_rules.not_in) {
                if !enum_has_option(&desc, option) {
                    return Err(ctx.malformed(format!(
                        "enum rule names unknown option '{option}' of '{name}'"
                    )));
                }
            }
        }

        Ok(FieldSchema::Enum(EnumRef {
            target: self.reference(name)?,
            rules: rules.enumeration.clone(),
        }))
    }

    fn message_schema(
        &mut self,
        ctx: &FieldCtx,
        name: &str,
        rules: &FieldRules,
    ) -> Result<FieldSchema, BuildError> {
        if rules.scalar.is_some() {
            return Err(ctx.malformed("scalar rules do not apply to a message field"));
        }

        let desc = self.message(name)?;
        let target = self.reference(name)?;

        Ok(if desc.annotations.polymorph.is_some() {
            FieldSchema::Polymorph(PolymorphRef { target })
        } else if is_oneof_root(&desc) {
            FieldSchema::Oneof(OneofRef { target })
        } else {
            FieldSchema::Object(ObjectRef { target })
        })
    }
}

fn scalar_schema(
    ctx: &FieldCtx,
    kind: ScalarKind,
    field: &FieldDescriptor,
    rules: &FieldRules,
) -> Result<FieldSchema, BuildError> {
    let key = field.annotations.key.clone();
    let kind = if key.is_some() { ScalarKind::Key } else { kind };

    let key_pattern = match &key {
        Some(KeyFormat::Pattern(pattern)) => Some(ctx.compile(pattern)?),
        _ => None,
    };

    let mut pattern = None;
    if let Some(scalar_rules) = &rules.scalar {
        check_scalar_rules(ctx, kind, scalar_rules)?;

        if let ScalarRules::String {
            pattern: Some(p), ..
        } = scalar_rules
        {
            pattern = Some(ctx.compile(p)?);
        }
    }

    Ok(FieldSchema::Scalar(ScalarSchema {
        kind,
        rules: rules.scalar.clone(),
        key,
        pattern,
        key_pattern,
    }))
}

fn enum_has_option(desc: &EnumDescriptor, option: &str) -> bool {
    let prefix = naming::enum_prefix(&desc.name);

    desc.values
        .iter()
        .any(|v| v.name == option || v.name == format!("{prefix}{option}"))
}

fn check_scalar_rules(
    ctx: &FieldCtx,
    kind: ScalarKind,
    rules: &ScalarRules,
) -> Result<(), BuildError> {
    match rules {
        ScalarRules::String {
            min_len, max_len, ..
        } if matches!(kind, ScalarKind::String | ScalarKind::Key) => {
            ctx.check_order(*min_len, *max_len)
        }

        ScalarRules::Integer { min, max, .. } if kind.is_integer() => {
            if let Some((lo, hi)) = kind.integer_bounds() {
                for bound in [min, max].into_iter().flatten() {
                    if *bound < lo || *bound > hi {
                        return Err(
                            ctx.malformed(format!("integer bound {bound} is outside the {kind} range"))
                        );
                    }
                }
            }
            ctx.check_order(*min, *max)
        }

        ScalarRules::Float { min, max, .. } if kind.is_float() => {
            if [min, max].into_iter().flatten().any(|b| b.is_nan()) {
                return Err(ctx.malformed("float bounds cannot be NaN"));
            }
            ctx.check_order(*min, *max)
        }

        ScalarRules::Bytes { min_len, max_len } if kind == ScalarKind::Bytes => {
            ctx.check_order(*min_len, *max_len)
        }

        ScalarRules::Date { min, max } if kind == ScalarKind::Date => {
            let parse = |literal: &Option<String>| {
                literal
                    .as_deref()
                    .map(Date::parse)
                    .transpose()
                    .map_err(|e| ctx.malformed(e.to_string()))
            };
            ctx.check_order(parse(min)?, parse(max)?)
        }

        ScalarRules::Decimal { min, max } if kind == ScalarKind::Decimal => {
            let parse = |literal: &Option<String>| {
                literal
                    .as_deref()
                    .map(Decimal::parse)
                    .transpose()
                    .map_err(|e| ctx.malformed(e.to_string()))
            };
            ctx.check_order(parse(min)?, parse(max)?)
        }

        _ => Err(ctx.malformed(format!(
            "{} rules do not apply to {kind} fields",
            rules.kind_label()
        ))),
    }
}
