use crate::{
    build::{BuildError, session::BuildSession},
    descriptor::EnumDescriptor,
    naming,
    node::{EnumOption, EnumSchema},
};

impl BuildSession<'_> {
    pub(super) fn build_enum(desc: &EnumDescriptor) -> Result<EnumSchema, BuildError> {
        let has_unspecified = desc
            .values
            .iter()
            .any(|v| v.number == 0 && v.name.ends_with("UNSPECIFIED"));
        if !has_unspecified {
            return Err(BuildError::MissingUnspecified {
                type_name: desc.full_name(),
            });
        }

        let prefix = naming::enum_prefix(&desc.name);
        let options = desc
            .values
            .iter()
            .map(|v| EnumOption {
                name: v
                    .name
                    .strip_prefix(prefix.as_str())
                    .unwrap_or(&v.name)
                    .to_string(),
                number: v.number,
                description: v.description.clone(),
            })
            .collect();

        Ok(EnumSchema {
            package: desc.package.clone(),
            name: desc.name.clone(),
            description: desc.description.clone(),
            prefix,
            options,
        })
    }
}
