use crate::{message::Value, validate::IssueSink, value::ScalarValue};
use protobridge_primitives::types::{Date, Decimal};
use protobridge_schema::{
    descriptor::{EnumRules, KeyFormat, MapRules, RepeatedRules, ScalarRules},
    node::{EnumSchema, ScalarSchema},
};
use std::fmt::Display;

// Base62 ids are 128-bit values, 22 characters long.
const ID62_LEN: usize = 22;

pub(crate) fn check_scalar(schema: &ScalarSchema, value: &ScalarValue, sink: &mut dyn IssueSink) {
    if let Some(key) = &schema.key
        && let Some(text) = value.as_str()
    {
        check_key(schema, key, text, sink);
    }

    let Some(rules) = &schema.rules else {
        return;
    };

    match (rules, value) {
        (
            ScalarRules::String {
                min_len, max_len, ..
            },
            ScalarValue::String(s) | ScalarValue::Key(s),
        ) => {
            check_len("length", s.chars().count(), *min_len, *max_len, sink);
            if let Some(pattern) = &schema.pattern
                && !pattern.is_match(s)
            {
                sink.add_issue(format!("does not match pattern '{}'", pattern.as_str()));
            }
        }

        (ScalarRules::Bytes { min_len, max_len }, ScalarValue::Bytes(b)) => {
            check_len("length", b.len(), *min_len, *max_len, sink);
        }

        (
            ScalarRules::Integer {
                min,
                max,
                exclusive_min,
                exclusive_max,
            },
            value,
        ) => {
            if let Some(n) = value.as_i128() {
                check_bounds(&n, min.as_ref(), max.as_ref(), *exclusive_min, *exclusive_max, sink);
            }
        }

        (
            ScalarRules::Float {
                min,
                max,
                exclusive_min,
                exclusive_max,
                finite,
            },
            value,
        ) => {
            let Some(f) = value.as_f64() else {
                return;
            };
            if *finite && !f.is_finite() {
                sink.add_issue(format!("{f} is not a finite number"));
                return;
            }
            check_bounds(&f, min.as_ref(), max.as_ref(), *exclusive_min, *exclusive_max, sink);
        }

        (ScalarRules::Date { min, max }, ScalarValue::Date(d)) => {
            let min = min.as_deref().and_then(|s| Date::parse(s).ok());
            let max = max.as_deref().and_then(|s| Date::parse(s).ok());
            check_bounds(d, min.as_ref(), max.as_ref(), false, false, sink);
        }

        (ScalarRules::Decimal { min, max }, ScalarValue::Decimal(d)) => {
            let min = min.as_deref().and_then(|s| Decimal::parse(s).ok());
            let max = max.as_deref().and_then(|s| Decimal::parse(s).ok());
            check_bounds(d, min.as_ref(), max.as_ref(), false, false, sink);
        }

        _ => {}
    }
}

fn check_key(schema: &ScalarSchema, format: &KeyFormat, text: &str, sink: &mut dyn IssueSink) {
    let ok = match format {
        KeyFormat::Uuid => is_uuid(text),
        KeyFormat::Id62 => text.len() == ID62_LEN && text.bytes().all(|b| b.is_ascii_alphanumeric()),
        KeyFormat::Informal => !text.is_empty() && !text.chars().any(char::is_whitespace),
        KeyFormat::Pattern(_) => schema
            .key_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(text)),
    };

    if !ok {
        let label = match format {
            KeyFormat::Uuid => "a uuid",
            KeyFormat::Id62 => "a base62 id",
            KeyFormat::Informal => "an informal key",
            KeyFormat::Pattern(_) => "a key matching its pattern",
        };
        sink.add_issue(format!("'{text}' is not {label}"));
    }
}

// Canonical 8-4-4-4-12 hex form, either case.
fn is_uuid(text: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let mut parts = text.split('-');
    let shaped = GROUPS.iter().all(|len| {
        parts
            .next()
            .is_some_and(|p| p.len() == *len && p.bytes().all(|b| b.is_ascii_hexdigit()))
    });

    shaped && parts.next().is_none()
}

pub(crate) fn check_enum(
    schema: &EnumSchema,
    rules: Option<&EnumRules>,
    number: i32,
    sink: &mut dyn IssueSink,
) {
    let Some(option) = schema.option_by_number(number) else {
        sink.add_issue(format!("{number} is not an option of {}.{}", schema.package, schema.name));
        return;
    };
    let Some(rules) = rules else {
        return;
    };

    let names = |list: &[String]| {
        list.iter()
            .any(|name| schema.option(name).is_some_and(|o| o.number == number))
    };
    if !rules.allow.is_empty() && !names(&rules.allow) {
        sink.add_issue(format!("'{}' is not an allowed option", option.name));
    }
    if names(&rules.not_in) {
        sink.add_issue(format!("'{}' is a forbidden option", option.name));
    }
}

pub(crate) fn check_repeated(rules: &RepeatedRules, items: &[Value], sink: &mut dyn IssueSink) {
    check_len("item count", items.len(), rules.min_items, rules.max_items, sink);

    if rules.unique
        && let Some(i) = (1..items.len()).find(|&i| items[..i].contains(&items[i]))
    {
        sink.add_issue(format!("item {i} repeats an earlier item"));
    }
}

pub(crate) fn check_map(rules: &MapRules, len: usize, sink: &mut dyn IssueSink) {
    check_len("pair count", len, rules.min_pairs, rules.max_pairs, sink);
}

fn check_len(
    what: &str,
    len: usize,
    min: Option<usize>,
    max: Option<usize>,
    sink: &mut dyn IssueSink,
) {
    if let Some(min) = min
        && len < min
    {
        sink.add_issue(format!("{what} {len} is below the minimum of {min}"));
    }
    if let Some(max) = max
        && len > max
    {
        sink.add_issue(format!("{what} {len} is above the maximum of {max}"));
    }
}

fn check_bounds<T: PartialOrd + Display>(
    value: &T,
    min: Option<&T>,
    max: Option<&T>,
    exclusive_min: bool,
    exclusive_max: bool,
    sink: &mut dyn IssueSink,
) {
    if let Some(min) = min {
        let below = if exclusive_min { value <= min } else { value < min };
        if below {
            let op = if exclusive_min { "greater than" } else { "at least" };
            sink.add_issue(format!("{value} must be {op} {min}"));
        }
    }
    if let Some(max) = max {
        let above = if exclusive_max { value >= max } else { value > max };
        if above {
            let op = if exclusive_max { "less than" } else { "at most" };
            sink.add_issue(format!("{value} must be {op} {max}"));
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collected(Vec<String>);

    impl IssueSink for Collected {
        fn add_issue(&mut self, message: String) {
            self.0.push(message);
        }
    }

    #[test]
    fn uuid_shape() {
        assert!(is_uuid("0b7d3c1e-5f0a-4e8b-9c2d-1a2b3c4d5e6f"));
        assert!(is_uuid("0B7D3C1E-5F0A-4E8B-9C2D-1A2B3C4D5E6F"));
        assert!(!is_uuid("0b7d3c1e5f0a4e8b9c2d1a2b3c4d5e6f"));
        assert!(!is_uuid("0b7d3c1e-5f0a-4e8b-9c2d-1a2b3c4d5e6f-00"));
        assert!(!is_uuid("0b7d3c1e-5f0a-4e8b-9c2d-1a2b3c4d5e6g"));
    }

    #[test]
    fn exclusive_bounds_reject_the_bound() {
        let mut sink = Collected::default();

        check_bounds(&5, Some(&5), Some(&10), true, false, &mut sink);
        check_bounds(&10, Some(&5), Some(&10), false, false, &mut sink);

        assert_eq!(sink.0, vec!["5 must be greater than 5"]);
    }

    #[test]
    fn repeated_rules_report_count_and_duplicates() {
        let mut sink = Collected::default();
        let rules = RepeatedRules {
            min_items: None,
            max_items: Some(2),
            unique: true,
        };
        let items = [Value::I32(1), Value::I32(2), Value::I32(1)];

        check_repeated(&rules, &items, &mut sink);

        assert_eq!(
            sink.0,
            vec![
                "item count 3 is above the maximum of 2",
                "item 2 repeats an earlier item",
            ]
        );
    }
}
