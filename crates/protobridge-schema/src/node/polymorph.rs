use crate::node::Ref;

///
/// PolymorphSchema
///
/// Union over a closed list of member messages, physically a wrapper whose
/// single `value` field is an Any.
///

#[derive(Clone, Debug)]
pub struct PolymorphSchema {
    pub package: String,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<Ref>,

    /// Number of the wrapper's Any-typed `value` field.
    pub value_field: u32,

    /// Full name of the wrapper message.
    pub message: String,
}

impl PolymorphSchema {
    #[must_use]
    pub fn allows(&self, type_name: &str) -> bool {
        self.members.iter().any(|m| m.full_name() == type_name)
    }

    #[must_use]
    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().map(Ref::full_name).collect()
    }
}
