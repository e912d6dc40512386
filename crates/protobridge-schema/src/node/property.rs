use crate::node::FieldSchema;

///
/// PropertyLocation
///
/// Where a property's value lives, relative to the message backing the root
/// that owns the property.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyLocation {
    /// Field numbers walked from the owning message to the value.
    Physical(Vec<u32>),

    /// No single field holds the value; it is synthesized from the fields of
    /// the message reached by this prefix (empty for the owning message).
    Virtual(Vec<u32>),
}

impl PropertyLocation {
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual(_))
    }

    #[must_use]
    pub fn path(&self) -> &[u32] {
        match self {
            Self::Physical(path) | Self::Virtual(path) => path,
        }
    }

    /// The same location seen from a message one flatten level up.
    #[must_use]
    pub fn prefixed(&self, number: u32) -> Self {
        let prefix = |path: &[u32]| {
            let mut out = Vec::with_capacity(path.len() + 1);
            out.push(number);
            out.extend_from_slice(path);
            out
        };

        match self {
            Self::Physical(path) => Self::Physical(prefix(path)),
            Self::Virtual(path) => Self::Virtual(prefix(path)),
        }
    }
}

///
/// Property
///

#[derive(Clone, Debug)]
pub struct Property {
    /// Client-visible (JSON) name.
    pub name: String,
    pub location: PropertyLocation,
    pub schema: FieldSchema,
    pub required: bool,
    pub explicitly_optional: bool,
    pub description: Option<String>,
    pub single_form: Option<String>,
}

impl Property {
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.location.is_virtual()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixing_keeps_the_location_kind() {
        let physical = PropertyLocation::Physical(vec![1]).prefixed(7);
        let virt = PropertyLocation::Virtual(vec![]).prefixed(7);

        assert_eq!(physical, PropertyLocation::Physical(vec![7, 1]));
        assert_eq!(virt, PropertyLocation::Virtual(vec![7]));
    }
}
