use crate::descriptor::{
    EntityAnnotation, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, MessageAnnotations,
    MessageDescriptor, OneofAnnotations, OneofDescriptor, PolymorphAnnotation,
};

///
/// MessageBuilder
///
/// Chainable constructor for `MessageDescriptor`. Oneof groups are declared
/// together with their member fields so the group index never has to be
/// spelled out by hand.
///

#[derive(Clone, Debug)]
pub struct MessageBuilder {
    desc: MessageDescriptor,
}

impl MessageBuilder {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            desc: MessageDescriptor {
                package: package.into(),
                name: name.into(),
                fields: Vec::new(),
                oneofs: Vec::new(),
                annotations: MessageAnnotations::default(),
            },
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.desc.fields.push(field);
        self
    }

    /// Declare a oneof group and append its member fields.
    #[must_use]
    pub fn oneof(
        mut self,
        name: impl Into<String>,
        expose: bool,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Self {
        let index = self.desc.oneofs.len();
        self.desc.oneofs.push(OneofDescriptor {
            name: name.into(),
            synthetic: false,
            annotations: OneofAnnotations {
                expose,
                description: None,
            },
        });

        for mut field in fields {
            field.oneof = Some(index);
            self.desc.fields.push(field);
        }

        self
    }

    /// A proto3 `optional` field: wrapped in its own synthetic oneof group.
    #[must_use]
    pub fn optional_field(mut self, field: FieldDescriptor) -> Self {
        let index = self.desc.oneofs.len();
        self.desc.oneofs.push(OneofDescriptor {
            name: format!("_{}", field.name),
            synthetic: true,
            annotations: OneofAnnotations::default(),
        });

        let mut field = field.optional();
        field.oneof = Some(index);
        self.desc.fields.push(field);

        self
    }

    #[must_use]
    pub fn is_oneof(mut self, is_oneof: bool) -> Self {
        self.desc.annotations.is_oneof = Some(is_oneof);
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: impl Into<String>, part: Option<&str>) -> Self {
        self.desc.annotations.entity = Some(EntityAnnotation {
            entity: entity.into(),
            part: part.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn polymorph<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desc.annotations.polymorph = Some(PolymorphAnnotation {
            members: members.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn polymorph_member_of(mut self, union: impl Into<String>) -> Self {
        self.desc.annotations.polymorph_member_of.push(union.into());
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.desc.annotations.description = Some(text.into());
        self
    }

    #[must_use]
    pub fn build(self) -> MessageDescriptor {
        self.desc
    }
}

///
/// EnumBuilder
///

#[derive(Clone, Debug)]
pub struct EnumBuilder {
    desc: EnumDescriptor,
}

impl EnumBuilder {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            desc: EnumDescriptor {
                package: package.into(),
                name: name.into(),
                values: Vec::new(),
                description: None,
            },
        }
    }

    #[must_use]
    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.desc.values.push(EnumValueDescriptor {
            name: name.into(),
            number,
            description: None,
        });
        self
    }

    #[must_use]
    pub fn described_value(
        mut self,
        name: impl Into<String>,
        number: i32,
        description: impl Into<String>,
    ) -> Self {
        self.desc.values.push(EnumValueDescriptor {
            name: name.into(),
            number,
            description: Some(description.into()),
        });
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.desc.description = Some(text.into());
        self
    }

    #[must_use]
    pub fn build(self) -> EnumDescriptor {
        self.desc
    }
}
