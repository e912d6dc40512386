use crate::{
    codec::decode_value,
    message::DynamicMessage,
    test_fixtures::init_tracing,
    validate::{ValidateError, ValidationIssues, validate},
};
use protobridge_schema::{
    SchemaSet,
    descriptor::{
        DescriptorPool, EnumBuilder, EnumRules, FieldDescriptor, FieldKind, FieldRules, KeyFormat,
        MapRules, MessageBuilder, RepeatedRules, ScalarRules, well_known,
    },
};
use serde_json::{Value as JsonValue, json};

const PKG: &str = "test.rules.v1";

fn ty(name: &str) -> String {
    format!("{PKG}.{name}")
}

fn string_rules(min_len: Option<usize>, max_len: Option<usize>, pattern: Option<&str>) -> FieldRules {
    FieldRules::scalar(ScalarRules::String {
        min_len,
        max_len,
        pattern: pattern.map(str::to_string),
    })
}

fn schemas() -> SchemaSet {
    let mut pool = DescriptorPool::with_well_known_types();

    pool.add_enum(
        EnumBuilder::new(PKG, "Status")
            .value("STATUS_UNSPECIFIED", 0)
            .value("STATUS_ON", 1)
            .value("STATUS_OFF", 2)
            .build(),
    )
    .unwrap();

    let child = MessageBuilder::new(PKG, "Child").field(
        FieldDescriptor::new("code", 1, FieldKind::String)
            .required()
            .rules(string_rules(Some(1), None, None)),
    );

    let rules = MessageBuilder::new(PKG, "Rules")
        .field(
            FieldDescriptor::new("name", 1, FieldKind::String)
                .required()
                .rules(string_rules(Some(2), Some(5), Some("^[a-z]+$"))),
        )
        .field(
            FieldDescriptor::new("count", 2, FieldKind::Int32).rules(FieldRules::scalar(
                ScalarRules::Integer {
                    min: Some(0),
                    max: Some(10),
                    exclusive_min: false,
                    exclusive_max: true,
                },
            )),
        )
        .field(
            FieldDescriptor::new("ratio", 3, FieldKind::Double).rules(FieldRules::scalar(
                ScalarRules::Float {
                    min: Some(0.0),
                    max: Some(1.0),
                    exclusive_min: false,
                    exclusive_max: false,
                    finite: true,
                },
            )),
        )
        .field(
            FieldDescriptor::new("blob", 4, FieldKind::Bytes).rules(FieldRules::scalar(
                ScalarRules::Bytes {
                    min_len: None,
                    max_len: Some(2),
                },
            )),
        )
        .field(
            FieldDescriptor::new("day", 5, FieldKind::Message(well_known::DATE.to_string()))
                .rules(FieldRules::scalar(ScalarRules::Date {
                    min: Some("2024-01-01".into()),
                    max: None,
                })),
        )
        .field(
            FieldDescriptor::new("price", 6, FieldKind::Message(well_known::DECIMAL.to_string()))
                .rules(FieldRules::scalar(ScalarRules::Decimal {
                    min: None,
                    max: Some("9.99".into()),
                })),
        )
        .field(FieldDescriptor::new("id", 7, FieldKind::String).key(KeyFormat::Uuid))
        .field(
            FieldDescriptor::new("tags", 8, FieldKind::String)
                .repeated()
                .rules(FieldRules {
                    repeated: Some(RepeatedRules {
                        min_items: Some(1),
                        max_items: Some(3),
                        unique: true,
                    }),
                    ..string_rules(None, Some(3), None)
                }),
        )
        .field(
            FieldDescriptor::new("status", 9, FieldKind::Enum(ty("Status"))).rules(
                FieldRules::enumeration(EnumRules {
                    allow: vec!["ON".into()],
                    not_in: Vec::new(),
                }),
            ),
        )
        .field(
            FieldDescriptor::new("labels", 10, FieldKind::String)
                .map()
                .rules(FieldRules::map(MapRules {
                    min_pairs: None,
                    max_pairs: Some(1),
                })),
        )
        .field(FieldDescriptor::new("child", 11, FieldKind::Message(ty("Child"))))
        .field(FieldDescriptor::new("children", 12, FieldKind::Message(ty("Child"))).repeated())
        .field(
            FieldDescriptor::new("statuses", 13, FieldKind::Enum(ty("Status")))
                .repeated()
                .rules(FieldRules::enumeration(EnumRules {
                    allow: Vec::new(),
                    not_in: vec!["STATUS_OFF".into()],
                })),
        );

    pool.add_message(child.build()).unwrap();
    pool.add_message(rules.build()).unwrap();

    SchemaSet::new(pool)
}

fn message(set: &SchemaSet, json: &JsonValue) -> DynamicMessage {
    let mut msg = DynamicMessage::new_by_name(set.pool(), &ty("Rules")).unwrap();
    decode_value(set, &mut msg, json).unwrap();
    msg
}

fn issues(set: &SchemaSet, json: &JsonValue) -> ValidationIssues {
    init_tracing();
    match validate(set, &message(set, json)) {
        Err(ValidateError::ValidationFailed(issues)) => issues,
        other => panic!("expected validation issues, got {other:?}"),
    }
}

fn valid() -> JsonValue {
    json!({
        "name": "abc",
        "count": 3,
        "ratio": 0.5,
        "blob": "AQI=",
        "day": "2024-06-01",
        "price": "1.50",
        "id": "0b7d3c1e-5f0a-4e8b-9c2d-1a2b3c4d5e6f",
        "tags": ["a", "b"],
        "status": "ON",
        "labels": { "k": "v" },
        "child": { "code": "x" },
        "children": [{ "code": "y" }],
        "statuses": ["ON"]
    })
}

#[test]
fn valid_message_passes() {
    let set = schemas();

    validate(&set, &message(&set, &valid())).unwrap();
}

#[test]
fn every_violation_is_collected() {
    let set = schemas();
    let issues = issues(
        &set,
        &json!({
            "count": 10,
            "ratio": "Infinity",
            "blob": "AQID",
            "day": "2023-12-31",
            "price": "10.00",
            "id": "not-a-uuid",
            "tags": ["a", "toolong", "a", "b"],
            "status": "OFF",
            "labels": { "a": "1", "b": "2" }
        }),
    );

    assert_eq!(issues.at("name"), ["value is required"]);
    assert_eq!(issues.at("count"), ["10 must be less than 10"]);
    assert_eq!(issues.at("ratio"), ["inf is not a finite number"]);
    assert_eq!(issues.at("blob"), ["length 3 is above the maximum of 2"]);
    assert_eq!(issues.at("day"), ["2023-12-31 must be at least 2024-01-01"]);
    assert_eq!(issues.at("price"), ["10.00 must be at most 9.99"]);
    assert_eq!(issues.at("id"), ["'not-a-uuid' is not a uuid"]);
    assert_eq!(
        issues.at("tags"),
        [
            "item count 4 is above the maximum of 3",
            "item 2 repeats an earlier item",
        ]
    );
    assert_eq!(issues.at("tags[1]"), ["length 7 is above the maximum of 3"]);
    assert_eq!(issues.at("status"), ["'OFF' is not an allowed option"]);
    assert_eq!(issues.at("labels"), ["pair count 2 is above the maximum of 1"]);
}

#[test]
fn string_rules_check_length_and_pattern() {
    let set = schemas();
    let mut doc = valid();
    doc["name"] = json!("A");

    let issues = issues(&set, &doc);
    assert_eq!(
        issues.at("name"),
        [
            "length 1 is below the minimum of 2",
            "does not match pattern '^[a-z]+$'",
        ]
    );
    assert_eq!(issues.len(), 1);
}

#[test]
fn nested_messages_report_full_paths() {
    let set = schemas();
    let mut doc = valid();
    doc["child"] = json!({});
    doc["children"] = json!([{ "code": "ok" }, { "code": "" }]);
    doc["statuses"] = json!(["ON", "OFF"]);

    let issues = issues(&set, &doc);
    assert_eq!(issues.at("child.code"), ["value is required"]);
    assert_eq!(issues.at("children[1].code"), ["length 0 is below the minimum of 1"]);
    assert_eq!(issues.at("statuses[1]"), ["'OFF' is a forbidden option"]);
    assert_eq!(issues.len(), 3);
}

#[test]
fn empty_repeated_field_is_below_minimum() {
    let set = schemas();
    let mut doc = valid();
    doc.as_object_mut().unwrap().remove("tags");

    let issues = issues(&set, &doc);
    assert_eq!(issues.at("tags"), ["item count 0 is below the minimum of 1"]);
}

#[test]
fn issues_render_in_path_order() {
    let set = schemas();
    let err = validate(&set, &message(&set, &json!({ "count": -1 }))).unwrap_err();

    assert_eq!(
        err.to_string(),
        "validation failed: count: -1 must be at least 0; name: value is required; \
         tags: item count 0 is below the minimum of 1"
    );

    let ValidateError::ValidationFailed(issues) = err else {
        panic!("expected issues");
    };
    let paths: Vec<_> = (&issues).into_iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(paths, ["count", "name", "tags"]);
}
