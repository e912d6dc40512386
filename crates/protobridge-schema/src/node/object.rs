use crate::{
    descriptor::EntityAnnotation,
    node::{Property, Ref},
};

///
/// ObjectSchema
///

#[derive(Clone, Debug)]
pub struct ObjectSchema {
    pub package: String,
    pub name: String,
    pub description: Option<String>,
    pub entity: Option<EntityAnnotation>,

    /// Client-visible properties in declaration order, with flattened
    /// children already spliced in.
    pub properties: Vec<Property>,

    pub polymorph_member_of: Vec<Ref>,

    /// Full name of the backing message.
    pub message: String,
}

impl ObjectSchema {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}
