use crate::node::Property;

///
/// OneofSchema
///
/// Discriminated union: at most one property is set at a time. Either a
/// whole wrapper message, or an exposed oneof group of `message`.
///

#[derive(Clone, Debug)]
pub struct OneofSchema {
    pub package: String,
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<Property>,

    /// Full name of the backing message.
    pub message: String,

    /// Group name when this root was promoted from an exposed oneof group.
    pub group: Option<String>,
}

impl OneofSchema {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub const fn is_exposed_group(&self) -> bool {
        self.group.is_some()
    }
}
