//! Name derivation shared by descriptors and the schema builder.

use convert_case::{Case, Casing};

/// `package.Name`, or just `Name` for the empty package.
#[must_use]
pub fn full_name(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// Split a full name at its last dot into `(package, name)`.
#[must_use]
pub fn split_full_name(full_name: &str) -> (&str, &str) {
    full_name.rsplit_once('.').unwrap_or(("", full_name))
}

/// lowerCamel client-visible name for a proto field or oneof group.
#[must_use]
pub fn json_name(field_name: &str) -> String {
    field_name.to_case(Case::Camel)
}

/// Shared prefix carried by every value of an enum: `TEST_ENUM_` for `TestEnum`.
#[must_use]
pub fn enum_prefix(enum_name: &str) -> String {
    let mut prefix = enum_name.to_case(Case::Snake).to_uppercase();
    prefix.push('_');

    prefix
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_cases_field_names() {
        assert_eq!(json_name("w_oneof_string"), "wOneofString");
        assert_eq!(json_name("s_bar"), "sBar");
        assert_eq!(json_name("id"), "id");
    }

    #[test]
    fn enum_prefix_is_screaming_snake() {
        assert_eq!(enum_prefix("TestEnum"), "TEST_ENUM_");
        assert_eq!(enum_prefix("Status"), "STATUS_");
    }

    #[test]
    fn full_names_split_at_last_dot() {
        assert_eq!(full_name("a.b", "C"), "a.b.C");
        assert_eq!(split_full_name("a.b.C"), ("a.b", "C"));
        assert_eq!(split_full_name("C"), ("", "C"));
    }
}
