use crate::{
    descriptor::{EnumRules, KeyFormat, MapRules, RepeatedRules, ScalarRules},
    node::Ref,
};
use protobridge_primitives::ScalarKind;
use regex::Regex;

///
/// FieldSchema
///
/// Type of a single property or container element.
///

#[derive(Clone, Debug)]
#[remain::sorted]
pub enum FieldSchema {
    Any(AnySchema),
    Array(ArraySchema),
    Enum(EnumRef),
    Map(MapSchema),
    Object(ObjectRef),
    Oneof(OneofRef),
    Polymorph(PolymorphRef),
    Scalar(ScalarSchema),
}

impl FieldSchema {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Any(_) => "any",
            Self::Array(_) => "array",
            Self::Enum(_) => "enum",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Oneof(_) => "oneof",
            Self::Polymorph(_) => "polymorph",
            Self::Scalar(_) => "scalar",
        }
    }

    /// Object, oneof, any and polymorph values are mutable sub-trees.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Any(_) | Self::Object(_) | Self::Oneof(_) | Self::Polymorph(_)
        )
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Map(_))
    }

    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(s) => Some(s.kind),
            _ => None,
        }
    }

    pub(crate) fn collect_refs(&self, out: &mut Vec<Ref>) {
        match self {
            Self::Enum(r) => out.push(r.target.clone()),
            Self::Object(r) => out.push(r.target.clone()),
            Self::Oneof(r) => out.push(r.target.clone()),
            Self::Polymorph(r) => out.push(r.target.clone()),
            Self::Array(a) => a.items.collect_refs(out),
            Self::Map(m) => m.items.collect_refs(out),
            Self::Any(_) | Self::Scalar(_) => {}
        }
    }
}

///
/// ScalarSchema
///

#[derive(Clone, Debug)]
pub struct ScalarSchema {
    pub kind: ScalarKind,
    pub rules: Option<ScalarRules>,
    pub key: Option<KeyFormat>,

    /// Compiled string-rule pattern.
    pub pattern: Option<Regex>,

    /// Compiled `KeyFormat::Pattern`.
    pub key_pattern: Option<Regex>,
}

impl ScalarSchema {
    #[must_use]
    pub const fn plain(kind: ScalarKind) -> Self {
        Self {
            kind,
            rules: None,
            key: None,
            pattern: None,
            key_pattern: None,
        }
    }
}

///
/// EnumRef
///

#[derive(Clone, Debug)]
pub struct EnumRef {
    pub target: Ref,
    pub rules: Option<EnumRules>,
}

///
/// ObjectRef
///

#[derive(Clone, Debug)]
pub struct ObjectRef {
    pub target: Ref,
}

///
/// OneofRef
///

#[derive(Clone, Debug)]
pub struct OneofRef {
    pub target: Ref,
}

///
/// AnySchema
///

#[derive(Clone, Debug, Default)]
pub struct AnySchema {
    /// Accepted full type names; empty accepts every type.
    pub types: Vec<String>,
}

impl AnySchema {
    #[must_use]
    pub fn allows(&self, type_name: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t == type_name)
    }
}

///
/// PolymorphRef
///

#[derive(Clone, Debug)]
pub struct PolymorphRef {
    pub target: Ref,
}

///
/// ArraySchema
///

#[derive(Clone, Debug)]
pub struct ArraySchema {
    pub items: Box<FieldSchema>,
    pub rules: Option<RepeatedRules>,
}

///
/// MapSchema
///
/// Always string-keyed.
///

#[derive(Clone, Debug)]
pub struct MapSchema {
    pub items: Box<FieldSchema>,
    pub rules: Option<MapRules>,
}
