//! Side-channel annotations attached to descriptors.
//!
//! These mirror the custom options a descriptor carries for validation rules,
//! key formats and the flatten/expose/any-restriction markers. They are plain
//! serde types so callers can load them from whatever format they keep them in.

use serde::{Deserialize, Serialize};
use std::ops::Not;

///
/// FieldAnnotations
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct FieldAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<FieldRules>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyFormat>,

    #[serde(skip_serializing_if = "Not::not")]
    pub flatten: bool,

    /// Allow-list of full type names accepted by an Any field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_types: Vec<String>,

    /// Singular alias the config parser accepts for a repeated field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_form: Option<String>,
}

///
/// FieldRules
///
/// At most one rule block applies to a given field kind; the builder rejects
/// mismatches.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct FieldRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ScalarRules>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<EnumRules>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeated: Option<RepeatedRules>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapRules>,
}

impl FieldRules {
    #[must_use]
    pub fn scalar(rules: ScalarRules) -> Self {
        Self {
            scalar: Some(rules),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn enumeration(rules: EnumRules) -> Self {
        Self {
            enumeration: Some(rules),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn repeated(rules: RepeatedRules) -> Self {
        Self {
            repeated: Some(rules),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn map(rules: MapRules) -> Self {
        Self {
            map: Some(rules),
            ..Self::default()
        }
    }
}

///
/// ScalarRules
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ScalarRules {
    Bytes {
        #[serde(default)]
        min_len: Option<usize>,
        #[serde(default)]
        max_len: Option<usize>,
    },

    /// Bounds are `YYYY-MM-DD` literals.
    Date {
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },

    /// Bounds are canonical decimal literals.
    Decimal {
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },

    Float {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        exclusive_min: bool,
        #[serde(default)]
        exclusive_max: bool,
        #[serde(default)]
        finite: bool,
    },

    Integer {
        #[serde(default)]
        min: Option<i128>,
        #[serde(default)]
        max: Option<i128>,
        #[serde(default)]
        exclusive_min: bool,
        #[serde(default)]
        exclusive_max: bool,
    },

    String {
        #[serde(default)]
        min_len: Option<usize>,
        #[serde(default)]
        max_len: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
    },
}

impl ScalarRules {
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Bytes { .. } => "bytes",
            Self::Date { .. } => "date",
            Self::Decimal { .. } => "decimal",
            Self::Float { .. } => "float",
            Self::Integer { .. } => "integer",
            Self::String { .. } => "string",
        }
    }
}

///
/// EnumRules
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EnumRules {
    #[serde(rename = "in", skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_in: Vec<String>,
}

///
/// RepeatedRules
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RepeatedRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    #[serde(skip_serializing_if = "Not::not")]
    pub unique: bool,
}

///
/// MapRules
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MapRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pairs: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pairs: Option<usize>,
}

///
/// KeyFormat
///
/// Turns a string field into a `key` scalar.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum KeyFormat {
    Id62,
    Informal,
    Pattern(String),
    Uuid,
}

///
/// MessageAnnotations
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MessageAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `Some(true)` forces oneof semantics, `Some(false)` forbids inference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_oneof: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityAnnotation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub polymorph: Option<PolymorphAnnotation>,

    /// Full names of the polymorphic unions this message belongs to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub polymorph_member_of: Vec<String>,
}

///
/// EntityAnnotation
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityAnnotation {
    pub entity: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
}

///
/// PolymorphAnnotation
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PolymorphAnnotation {
    pub members: Vec<String>,
}

///
/// OneofAnnotations
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct OneofAnnotations {
    #[serde(skip_serializing_if = "Not::not")]
    pub expose: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

///
/// TESTS
///
