///
/// EnumSchema
///
/// Options are stored by short name; the long wire name is
/// `prefix + short name`.
///

#[derive(Clone, Debug)]
pub struct EnumSchema {
    pub package: String,
    pub name: String,
    pub description: Option<String>,
    pub prefix: String,
    pub options: Vec<EnumOption>,
}

impl EnumSchema {
    /// Look up an option by short or long (prefixed) name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&EnumOption> {
        let short = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);

        self.options.iter().find(|o| o.name == short)
    }

    #[must_use]
    pub fn option_by_number(&self, number: i32) -> Option<&EnumOption> {
        self.options.iter().find(|o| o.number == number)
    }

    #[must_use]
    pub fn long_name(&self, option: &EnumOption) -> String {
        format!("{}{}", self.prefix, option.name)
    }
}

///
/// EnumOption
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumOption {
    pub name: String,
    pub number: i32,
    pub description: Option<String>,
}

///
/// TESTS
///
