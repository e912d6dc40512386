use crate::{
    build::{
        BuildError,
        field::FieldCtx,
        session::{BuildSession, is_oneof_root},
    },
    descriptor::{
        FieldDescriptor, FieldKind, Label, MessageDescriptor,
        well_known::{self, WellKnown},
    },
    naming,
    node::{
        FieldSchema, ObjectSchema, OneofRef, OneofSchema, PolymorphSchema, Property,
        PropertyLocation, Ref, RootSchema,
    },
};
use std::collections::BTreeSet;

impl BuildSession<'_> {
    pub(super) fn build_object(
        &mut self,
        desc: &MessageDescriptor,
    ) -> Result<ObjectSchema, BuildError> {
        let properties = self.object_properties(desc)?;
        let polymorph_member_of = desc
            .annotations
            .polymorph_member_of
            .iter()
            .map(|union| self.reference(union))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ObjectSchema {
            package: desc.package.clone(),
            name: desc.name.clone(),
            description: desc.annotations.description.clone(),
            entity: desc.annotations.entity.clone(),
            properties,
            polymorph_member_of,
            message: desc.full_name(),
        })
    }

    pub(super) fn build_oneof(&mut self, desc: &MessageDescriptor) -> Result<OneofSchema, BuildError> {
        let properties = desc
            .fields
            .iter()
            .map(|field| self.union_member(desc, field))
            .collect::<Result<Vec<_>, _>>()?;

        let full_name = desc.full_name();
        check_unique(&full_name, &properties)?;

        Ok(OneofSchema {
            package: desc.package.clone(),
            name: desc.name.clone(),
            description: desc.annotations.description.clone(),
            properties,
            message: full_name,
            group: None,
        })
    }

    pub(super) fn build_polymorph(
        &mut self,
        desc: &MessageDescriptor,
    ) -> Result<PolymorphSchema, BuildError> {
        let full_name = desc.full_name();
        let members = desc
            .annotations
            .polymorph
            .as_ref()
            .map(|p| p.members.clone())
            .unwrap_or_default();

        let value_field = match desc.fields.as_slice() {
            [field]
                if field.name == well_known::POLYMORPH_VALUE
                    && field.label == Label::Singular
                    && field.kind == FieldKind::Message(well_known::ANY.to_string()) =>
            {
                field.number
            }
            _ => {
                return Err(BuildError::MalformedAnnotation {
                    type_name: full_name,
                    field: well_known::POLYMORPH_VALUE.to_string(),
                    message: "a polymorph must have exactly one singular Any field named 'value'"
                        .to_string(),
                });
            }
        };
        if members.is_empty() {
            return Err(BuildError::MalformedAnnotation {
                type_name: full_name,
                field: well_known::POLYMORPH_VALUE.to_string(),
                message: "a polymorph needs at least one member".to_string(),
            });
        }

        let mut refs = Vec::with_capacity(members.len());
        for member in &members {
            self.message(member)?;
            refs.push(self.reference(member)?);
        }

        Ok(PolymorphSchema {
            package: desc.package.clone(),
            name: desc.name.clone(),
            description: desc.annotations.description.clone(),
            members: refs,
            value_field,
            message: full_name,
        })
    }

    /// Client-visible properties of an object message, flattening as needed.
    fn object_properties(&mut self, desc: &MessageDescriptor) -> Result<Vec<Property>, BuildError> {
        let mut properties = Vec::new();
        let mut exposed = BTreeSet::new();

        for field in &desc.fields {
            if let Some(index) = field.oneof
                && let Some(group) = desc.oneofs.get(index)
                && !group.synthetic
                && group.annotations.expose
            {
                if exposed.insert(index) {
                    properties.push(self.exposed_group(desc, index)?);
                }
                continue;
            }

            if field.annotations.flatten {
                properties.extend(self.flatten(desc, field)?);
            } else {
                properties.push(self.property(desc, field)?);
            }
        }

        check_unique(&desc.full_name(), &properties)?;

        Ok(properties)
    }

    /// Promote a oneof group to its own root and return the virtual
    /// property standing in for it on the parent.
    fn exposed_group(
        &mut self,
        desc: &MessageDescriptor,
        index: usize,
    ) -> Result<Property, BuildError> {
        let group = &desc.oneofs[index];
        let name = format!("{}.{}", desc.name, group.name);
        let full_name = naming::full_name(&desc.package, &name);

        if !self.is_known(&full_name) {
            let properties = desc
                .oneof_members(index)
                .map(|field| self.union_member(desc, field))
                .collect::<Result<Vec<_>, _>>()?;
            check_unique(&full_name, &properties)?;

            self.insert_built(
                full_name,
                RootSchema::Oneof(OneofSchema {
                    package: desc.package.clone(),
                    name: name.clone(),
                    description: group.annotations.description.clone(),
                    properties,
                    message: desc.full_name(),
                    group: Some(group.name.clone()),
                }),
            );
        }

        Ok(Property {
            name: naming::json_name(&group.name),
            location: PropertyLocation::Virtual(Vec::new()),
            schema: FieldSchema::Oneof(OneofRef {
                target: Ref::new(desc.package.clone(), name),
            }),
            required: false,
            explicitly_optional: false,
            description: group.annotations.description.clone(),
            single_form: None,
        })
    }

    fn flatten(
        &mut self,
        desc: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<Vec<Property>, BuildError> {
        let ctx = FieldCtx::new(desc, field);

        let child_name = match (&field.kind, &field.label) {
            (FieldKind::Message(name), Label::Singular | Label::Optional)
                if WellKnown::from_full_name(name).is_none() =>
            {
                name.clone()
            }
            _ => return Err(ctx.malformed("flatten requires a singular object message field")),
        };

        if child_name == ctx.type_name || self.flatten_stack.contains(&child_name) {
            return Err(BuildError::CircularFlatten {
                type_name: child_name,
            });
        }
        let max = self.set.options().max_flatten_depth;
        if self.flatten_stack.len() >= max {
            return Err(BuildError::FlattenTooDeep {
                type_name: child_name,
                max,
            });
        }

        let child = self.message(&child_name)?;
        if child.annotations.polymorph.is_some() || is_oneof_root(&child) {
            return Err(ctx.malformed("flatten requires an object message, not a union"));
        }

        self.flatten_stack.push(child_name);
        let result = self.object_properties(&child);
        self.flatten_stack.pop();

        Ok(result?
            .into_iter()
            .map(|mut prop| {
                prop.location = prop.location.prefixed(field.number);
                prop
            })
            .collect())
    }

    fn union_member(
        &mut self,
        desc: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<Property, BuildError> {
        if field.annotations.flatten {
            return Err(FieldCtx::new(desc, field).malformed("oneof members cannot be flattened"));
        }
        if !field.label.is_singular() {
            return Err(FieldCtx::new(desc, field).malformed("oneof members must be singular"));
        }

        self.property(desc, field)
    }

    fn property(
        &mut self,
        desc: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<Property, BuildError> {
        let schema = self.field_schema(desc, field)?;

        Ok(Property {
            name: field.json_name.clone(),
            location: PropertyLocation::Physical(vec![field.number]),
            schema,
            required: field.annotations.required,
            explicitly_optional: field.label == Label::Optional,
            description: field.annotations.description.clone(),
            single_form: field.annotations.single_form.clone(),
        })
    }
}

fn check_unique(type_name: &str, properties: &[Property]) -> Result<(), BuildError> {
    let mut seen = BTreeSet::new();
    for prop in properties {
        if !seen.insert(prop.name.as_str()) {
            return Err(BuildError::DuplicateProperty {
                type_name: type_name.to_string(),
                property: prop.name.clone(),
            });
        }
    }

    Ok(())
}
