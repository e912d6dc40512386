use crate::{
    message::{DynamicMessage, Location},
    reflect::{Field, ReflectError},
};
use protobridge_schema::{
    SchemaSet,
    node::{Property, RootSchema},
};
use std::sync::Arc;

///
/// PropertySet
///
/// Field handles for every property of one object or oneof root, anchored at
/// `base`. Properties keep schema order.
///

#[derive(Debug)]
pub struct PropertySet<'s> {
    root: Arc<RootSchema>,
    base: Location,
    fields: Vec<Field<'s>>,
}

impl<'s> PropertySet<'s> {
    pub(crate) fn new(
        schemas: &'s SchemaSet,
        root: Arc<RootSchema>,
        base: Location,
    ) -> Result<Self, ReflectError> {
        let Some(properties) = root.properties() else {
            return Err(ReflectError::WrongKind {
                field: root.full_name(),
                expected: "object or oneof",
                actual: super::root_label(&root),
            });
        };

        let fields = properties
            .iter()
            .map(|p| {
                Field::new(
                    schemas,
                    p.name.clone(),
                    base.fields(p.location.path()),
                    &p.schema,
                    p.is_virtual(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, base, fields })
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<RootSchema> {
        &self.root
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.base
    }

    #[must_use]
    pub fn is_oneof(&self) -> bool {
        matches!(*self.root, RootSchema::Oneof(_))
    }

    #[must_use]
    pub fn list_properties(&self) -> &[Property] {
        self.root.properties().unwrap_or_default()
    }

    #[must_use]
    pub fn fields(&self) -> &[Field<'s>] {
        &self.fields
    }

    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Field<'s>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Like `get_property`, but fails with the schema name when absent.
    pub fn property(&self, name: &str) -> Result<&Field<'s>, ReflectError> {
        self.get_property(name)
            .ok_or_else(|| ReflectError::UnknownProperty {
                schema: self.root.full_name(),
                field: name.to_string(),
            })
    }

    /// The array property whose singular alias is `alias`.
    #[must_use]
    pub fn get_single_form(&self, alias: &str) -> Option<&Field<'s>> {
        self.pairs()
            .find(|(p, _)| p.single_form.as_deref() == Some(alias))
            .map(|(_, f)| f)
    }

    /// Visit properties in order until `visit` returns false.
    pub fn range_properties(&self, mut visit: impl FnMut(&Property, &Field<'s>) -> bool) {
        for (property, field) in self.pairs() {
            if !visit(property, field) {
                break;
            }
        }
    }

    /// Like `range_properties`, skipping properties unset in `msg`.
    pub fn range_set_properties(
        &self,
        msg: &DynamicMessage,
        mut visit: impl FnMut(&Property, &Field<'s>) -> bool,
    ) {
        self.range_properties(|property, field| !field.is_set(msg) || visit(property, field));
    }

    #[must_use]
    pub fn any_set(&self, msg: &DynamicMessage) -> bool {
        self.fields.iter().any(|f| f.is_set(msg))
    }

    fn pairs(&self) -> impl Iterator<Item = (&Property, &Field<'s>)> {
        self.list_properties().iter().zip(&self.fields)
    }
}
