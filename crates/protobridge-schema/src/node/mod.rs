mod r#enum;
mod field;
mod object;
mod oneof;
mod polymorph;
mod property;

pub use field::*;
pub use object::ObjectSchema;
pub use oneof::OneofSchema;
pub use polymorph::PolymorphSchema;
pub use property::{Property, PropertyLocation};
pub use r#enum::{EnumOption, EnumSchema};

use crate::naming;
use serde::Serialize;
use std::{
    cmp::Ordering,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

///
/// Ref
///
/// Key of a root schema inside a `SchemaSet`. A ref carries no pointer to
/// its target, so self-referential graphs are plain key cycles. Two refs are
/// equal exactly when they name the same type.
///

#[derive(Clone, Debug, Serialize)]
pub struct Ref {
    pub package: String,
    pub name: String,
}

impl Ref {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn from_full_name(full_name: &str) -> Self {
        let (package, name) = naming::split_full_name(full_name);

        Self::new(package, name)
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        naming::full_name(&self.package, &self.name)
    }

    // Bytes of the full name; the package/name split is not part of identity.
    fn name_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let dot = if self.package.is_empty() { "" } else { "." };

        [self.package.as_str(), dot, self.name.as_str()]
            .into_iter()
            .flat_map(str::bytes)
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.name_bytes().eq(other.name_bytes())
    }
}

impl Eq for Ref {}

impl Hash for Ref {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name().hash(state);
    }
}

impl PartialOrd for Ref {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ref {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name_bytes().cmp(other.name_bytes())
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

///
/// RootSchema
///

#[derive(Clone, Debug)]
#[remain::sorted]
pub enum RootSchema {
    Enum(EnumSchema),
    Object(ObjectSchema),
    Oneof(OneofSchema),
    Polymorph(PolymorphSchema),
}

impl RootSchema {
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::Enum(s) => &s.package,
            Self::Object(s) => &s.package,
            Self::Oneof(s) => &s.package,
            Self::Polymorph(s) => &s.package,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(s) => &s.name,
            Self::Object(s) => &s.name,
            Self::Oneof(s) => &s.name,
            Self::Polymorph(s) => &s.name,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        naming::full_name(self.package(), self.name())
    }

    #[must_use]
    pub fn to_ref(&self) -> Ref {
        Ref::new(self.package(), self.name())
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Enum(s) => s.description.as_deref(),
            Self::Object(s) => s.description.as_deref(),
            Self::Oneof(s) => s.description.as_deref(),
            Self::Polymorph(s) => s.description.as_deref(),
        }
    }

    /// Properties of container roots; enums and unions have none.
    #[must_use]
    pub fn properties(&self) -> Option<&[Property]> {
        match self {
            Self::Object(s) => Some(&s.properties),
            Self::Oneof(s) => Some(&s.properties),
            Self::Enum(_) | Self::Polymorph(_) => None,
        }
    }

    /// Full name of the message physically backing this root, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Object(s) => Some(&s.message),
            Self::Oneof(s) => Some(&s.message),
            Self::Polymorph(s) => Some(&s.message),
            Self::Enum(_) => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Self::Object(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_oneof(&self) -> Option<&OneofSchema> {
        match self {
            Self::Oneof(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_enum(&self) -> Option<&EnumSchema> {
        match self {
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_polymorph(&self) -> Option<&PolymorphSchema> {
        match self {
            Self::Polymorph(s) => Some(s),
            _ => None,
        }
    }

    /// Every ref this root points at, in declaration order.
    #[must_use]
    pub fn refs(&self) -> Vec<Ref> {
        let mut out = Vec::new();

        match self {
            Self::Enum(_) => {}
            Self::Object(s) => {
                for prop in &s.properties {
                    prop.schema.collect_refs(&mut out);
                }
                out.extend(s.polymorph_member_of.iter().cloned());
            }
            Self::Oneof(s) => {
                for prop in &s.properties {
                    prop.schema.collect_refs(&mut out);
                }
            }
            Self::Polymorph(s) => out.extend(s.members.iter().cloned()),
        }

        out
    }
}

///
/// TESTS
///
