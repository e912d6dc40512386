use crate::{
    build::{BuildError, SchemaError, SchemaOptions, SchemaSet},
    descriptor::{
        DescriptorPool, EnumBuilder, EnumRules, FieldDescriptor, FieldKind, FieldRules,
        KeyFormat, MessageBuilder, ScalarRules, well_known,
    },
    node::{FieldSchema, PropertyLocation, Ref, RootSchema},
};
use protobridge_primitives::ScalarKind;
use std::sync::Arc;

const PKG: &str = "test.schema.v1";

fn msg(name: &str) -> MessageBuilder {
    MessageBuilder::new(PKG, name)
}

fn ty(name: &str) -> String {
    format!("{PKG}.{name}")
}

fn pool_with(messages: Vec<MessageBuilder>) -> DescriptorPool {
    let mut pool = DescriptorPool::with_well_known_types();
    for m in messages {
        pool.add_message(m.build()).unwrap();
    }
    pool
}

fn build_err(set: &SchemaSet, name: &str) -> BuildError {
    match set.schema_for_name(&ty(name)) {
        Err(SchemaError::Build(err)) => err,
        other => panic!("expected build error, got {other:?}"),
    }
}

fn property_names(schema: &RootSchema) -> Vec<&str> {
    schema
        .properties()
        .unwrap()
        .iter()
        .map(|p| p.name.as_str())
        .collect()
}

///
/// LINKAGE
///

#[test]
fn self_referential_object_links() {
    let pool = pool_with(vec![
        msg("Node")
            .field(FieldDescriptor::new("label", 1, FieldKind::String))
            .field(FieldDescriptor::new("parent", 2, FieldKind::Message(ty("Node"))))
            .field(FieldDescriptor::new("children", 3, FieldKind::Message(ty("Node"))).repeated()),
    ]);
    let set = SchemaSet::new(pool);

    let schema = set.schema_for_name(&ty("Node")).unwrap();
    let parent = schema.as_object().unwrap().property("parent").unwrap();

    let FieldSchema::Object(target) = &parent.schema else {
        panic!("parent should be an object ref");
    };
    assert!(set.is_linked(&target.target));
    assert!(Arc::ptr_eq(&set.resolve(&target.target).unwrap(), &schema));
    assert!(set.unlinked_refs().is_empty());
}

#[test]
fn cycle_through_inferred_oneof_links() {
    let pool = pool_with(vec![
        msg("Literal").field(FieldDescriptor::new("value", 1, FieldKind::String)),
        msg("Expr").oneof(
            "type",
            false,
            vec![
                FieldDescriptor::new("literal", 1, FieldKind::Message(ty("Literal"))),
                FieldDescriptor::new("negate", 2, FieldKind::Message(ty("Expr"))),
            ],
        ),
        msg("Program").field(FieldDescriptor::new("body", 1, FieldKind::Message(ty("Expr")))),
    ]);
    let set = SchemaSet::new(pool);

    let program = set.schema_for_name(&ty("Program")).unwrap();
    let body = &program.properties().unwrap()[0];
    assert!(matches!(body.schema, FieldSchema::Oneof(_)));

    let expr = set.schema_for_name(&ty("Expr")).unwrap();
    assert_eq!(property_names(&expr), vec!["literal", "negate"]);
    assert!(set.unlinked_refs().is_empty());
    assert_eq!(set.len(), 3);
}

#[test]
fn cached_schema_is_returned_on_second_request() {
    let pool = pool_with(vec![msg("Plain").field(FieldDescriptor::new("a", 1, FieldKind::Bool))]);
    let set = SchemaSet::new(pool);

    let first = set.schema_for_name(&ty("Plain")).unwrap();
    let second = set.schema_for(set.pool().message(&ty("Plain")).unwrap()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn resolving_an_unbuilt_ref_is_an_error() {
    let set = SchemaSet::new(DescriptorPool::new());
    let target = Ref::new(PKG, "Nothing");

    assert_eq!(set.resolve(&target).unwrap_err(), SchemaError::Unlinked(target));
}

///
/// ENUMS
///

#[test]
fn enum_prefix_and_short_names() {
    let mut pool = pool_with(vec![]);
    pool.add_enum(
        EnumBuilder::new(PKG, "Color")
            .value("COLOR_UNSPECIFIED", 0)
            .value("COLOR_RED", 1)
            .value("COLOR_DEEP_BLUE", 2)
            .build(),
    )
    .unwrap();
    let set = SchemaSet::new(pool);

    let schema = set.schema_for_name(&ty("Color")).unwrap();
    let color = schema.as_enum().unwrap();

    assert_eq!(color.prefix, "COLOR_");
    let names: Vec<_> = color.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["UNSPECIFIED", "RED", "DEEP_BLUE"]);
}

#[test]
fn enum_without_unspecified_zero_fails_and_caches_nothing() {
    let mut pool = pool_with(vec![
        msg("Holder")
            .field(FieldDescriptor::new("inner", 1, FieldKind::Message(ty("Inner"))))
            .field(FieldDescriptor::new("mood", 2, FieldKind::Enum(ty("Mood")))),
        msg("Inner").field(FieldDescriptor::new("a", 1, FieldKind::String)),
    ]);
    pool.add_enum(
        EnumBuilder::new(PKG, "Mood")
            .value("MOOD_HAPPY", 0)
            .value("MOOD_SAD", 1)
            .build(),
    )
    .unwrap();
    let set = SchemaSet::new(pool);

    assert_eq!(
        build_err(&set, "Holder"),
        BuildError::MissingUnspecified {
            type_name: ty("Mood")
        }
    );
    assert!(set.is_empty());

    // the sibling that did build is not cached either
    assert!(set.names().is_empty());
}

#[test]
fn enum_rules_must_name_real_options() {
    let mut pool = pool_with(vec![msg("Pick").field(
        FieldDescriptor::new("mood", 1, FieldKind::Enum(ty("Mood"))).rules(FieldRules::enumeration(
            EnumRules {
                allow: vec!["HAPPY".into(), "MOOD_GRUMPY".into()],
                not_in: vec![],
            },
        )),
    )]);
    pool.add_enum(
        EnumBuilder::new(PKG, "Mood")
            .value("MOOD_UNSPECIFIED", 0)
            .value("MOOD_HAPPY", 1)
            .build(),
    )
    .unwrap();
    let set = SchemaSet::new(pool);

    assert!(matches!(
        build_err(&set, "Pick"),
        BuildError::MalformedAnnotation { message, .. } if message.contains("MOOD_GRUMPY")
    ));
}

///
/// FLATTEN
///

#[test]
fn flatten_splices_child_properties_once() {
    let pool = pool_with(vec![
        msg("Inner")
            .field(FieldDescriptor::new("field_from_flattened", 1, FieldKind::String))
            .field(FieldDescriptor::new("other", 2, FieldKind::Int32)),
        msg("Outer")
            .field(FieldDescriptor::new("inner", 5, FieldKind::Message(ty("Inner"))).flatten())
            .field(FieldDescriptor::new("own", 6, FieldKind::Bool)),
    ]);
    let set = SchemaSet::new(pool);

    let first = set.schema_for_name(&ty("Outer")).unwrap();
    let second = set.schema_for_name(&ty("Outer")).unwrap();

    assert_eq!(
        property_names(&second),
        vec!["fieldFromFlattened", "other", "own"]
    );
    assert!(Arc::ptr_eq(&first, &second));

    let spliced = first.as_object().unwrap().property("fieldFromFlattened").unwrap();
    assert_eq!(spliced.location, PropertyLocation::Physical(vec![5, 1]));
}

#[test]
fn nested_flatten_prefixes_every_level() {
    let pool = pool_with(vec![
        msg("Leaf").field(FieldDescriptor::new("deep", 3, FieldKind::String)),
        msg("Middle").field(FieldDescriptor::new("leaf", 2, FieldKind::Message(ty("Leaf"))).flatten()),
        msg("Top").field(FieldDescriptor::new("middle", 1, FieldKind::Message(ty("Middle"))).flatten()),
    ]);
    let set = SchemaSet::new(pool);

    let top = set.schema_for_name(&ty("Top")).unwrap();
    let deep = &top.properties().unwrap()[0];

    assert_eq!(deep.name, "deep");
    assert_eq!(deep.location, PropertyLocation::Physical(vec![1, 2, 3]));
}

#[test]
fn flatten_name_clash_is_rejected() {
    let pool = pool_with(vec![
        msg("Inner").field(FieldDescriptor::new("name", 1, FieldKind::String)),
        msg("Outer")
            .field(FieldDescriptor::new("inner", 1, FieldKind::Message(ty("Inner"))).flatten())
            .field(FieldDescriptor::new("name", 2, FieldKind::String)),
    ]);
    let set = SchemaSet::new(pool);

    assert_eq!(
        build_err(&set, "Outer"),
        BuildError::DuplicateProperty {
            type_name: ty("Outer"),
            property: "name".to_string(),
        }
    );
}

#[test]
fn circular_flatten_is_rejected() {
    let pool = pool_with(vec![
        msg("A").field(FieldDescriptor::new("b", 1, FieldKind::Message(ty("B"))).flatten()),
        msg("B").field(FieldDescriptor::new("a", 1, FieldKind::Message(ty("A"))).flatten()),
    ]);
    let set = SchemaSet::new(pool);

    assert!(matches!(
        build_err(&set, "A"),
        BuildError::CircularFlatten { .. }
    ));
    assert!(set.is_empty());
}

#[test]
fn flatten_of_a_type_that_refers_back_is_allowed() {
    let pool = pool_with(vec![
        msg("Owner")
            .field(FieldDescriptor::new("details", 1, FieldKind::Message(ty("Details"))).flatten()),
        msg("Details")
            .field(FieldDescriptor::new("note", 1, FieldKind::String))
            .field(FieldDescriptor::new("sub", 2, FieldKind::Message(ty("Owner")))),
    ]);
    let set = SchemaSet::new(pool);

    let owner = set.schema_for_name(&ty("Owner")).unwrap();

    assert_eq!(property_names(&owner), vec!["note", "sub"]);
    assert!(set.unlinked_refs().is_empty());
}

#[test]
fn flatten_depth_is_bounded_by_options() {
    let pool = pool_with(vec![
        msg("C").field(FieldDescriptor::new("c", 1, FieldKind::String)),
        msg("B").field(FieldDescriptor::new("to_c", 1, FieldKind::Message(ty("C"))).flatten()),
        msg("A").field(FieldDescriptor::new("to_b", 1, FieldKind::Message(ty("B"))).flatten()),
    ]);
    let set = SchemaSet::with_options(pool, SchemaOptions { max_flatten_depth: 1 });

    assert_eq!(
        build_err(&set, "A"),
        BuildError::FlattenTooDeep {
            type_name: ty("C"),
            max: 1
        }
    );
}

#[test]
fn flatten_on_repeated_field_is_malformed() {
    let pool = pool_with(vec![
        msg("Inner").field(FieldDescriptor::new("a", 1, FieldKind::String)),
        msg("Outer").field(
            FieldDescriptor::new("inner", 1, FieldKind::Message(ty("Inner")))
                .repeated()
                .flatten(),
        ),
    ]);
    let set = SchemaSet::new(pool);

    assert!(matches!(
        build_err(&set, "Outer"),
        BuildError::MalformedAnnotation { .. }
    ));
}

///
/// ONEOFS
///

#[test]
fn exposed_oneof_becomes_virtual_property() {
    let pool = pool_with(vec![
        msg("Bar").field(FieldDescriptor::new("id", 1, FieldKind::String)),
        msg("Choice")
            .field(FieldDescriptor::new("title", 1, FieldKind::String))
            .oneof(
                "the_pick",
                true,
                vec![
                    FieldDescriptor::new("pick_text", 2, FieldKind::String),
                    FieldDescriptor::new("pick_bar", 3, FieldKind::Message(ty("Bar"))),
                ],
            ),
    ]);
    let set = SchemaSet::new(pool);

    let choice = set.schema_for_name(&ty("Choice")).unwrap();
    assert_eq!(property_names(&choice), vec!["title", "thePick"]);

    let pick = choice.as_object().unwrap().property("thePick").unwrap();
    assert_eq!(pick.location, PropertyLocation::Virtual(vec![]));

    let FieldSchema::Oneof(target) = &pick.schema else {
        panic!("exposed group should be a oneof ref");
    };
    assert_eq!(target.target.name, "Choice.the_pick");

    let group = set.resolve(&target.target).unwrap();
    let group = group.as_oneof().unwrap();
    assert_eq!(group.group.as_deref(), Some("the_pick"));
    assert_eq!(group.message, ty("Choice"));

    let members: Vec<_> = group.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(members, vec!["pickText", "pickBar"]);
}

#[test]
fn exposed_group_ref_matches_its_root() {
    let pool = pool_with(vec![msg("Choice").oneof(
        "kind",
        true,
        vec![
            FieldDescriptor::new("a", 1, FieldKind::String),
            FieldDescriptor::new("b", 2, FieldKind::String),
        ],
    )]);
    let set = SchemaSet::new(pool);

    let group = set.schema_for_name(&ty("Choice.kind")).unwrap();
    let choice = set.schema_for_name(&ty("Choice")).unwrap();
    let FieldSchema::Oneof(kind) = &choice.as_object().unwrap().property("kind").unwrap().schema
    else {
        panic!("exposed group should be a oneof ref");
    };

    assert_eq!(group.to_ref(), kind.target);
    assert_eq!(Ref::from_full_name(&ty("Choice.kind")), kind.target);
    assert!(Arc::ptr_eq(&set.resolve(&kind.target).unwrap(), &group));
}

#[test]
fn exposed_group_can_be_requested_by_name() {
    let pool = pool_with(vec![msg("Choice").oneof(
        "kind",
        true,
        vec![
            FieldDescriptor::new("a", 1, FieldKind::String),
            FieldDescriptor::new("b", 2, FieldKind::String),
        ],
    )]);
    let set = SchemaSet::new(pool);

    let group = set.schema_for_name(&ty("Choice.kind")).unwrap();

    assert!(group.as_oneof().is_some_and(|o| o.is_exposed_group()));
    assert!(set.schema_for_name(&ty("Choice")).is_ok());
}

#[test]
fn unexposed_oneof_members_stay_plain_properties() {
    let pool = pool_with(vec![msg("Loose").oneof(
        "kind",
        false,
        vec![
            FieldDescriptor::new("a", 1, FieldKind::String),
            FieldDescriptor::new("b", 2, FieldKind::String),
        ],
    )]);
    let set = SchemaSet::new(pool);

    let schema = set.schema_for_name(&ty("Loose")).unwrap();

    assert!(schema.as_object().is_some());
    assert_eq!(property_names(&schema), vec!["a", "b"]);
}

#[test]
fn oneof_inference_respects_override() {
    let wrapper = |name: &str| {
        msg(name).oneof(
            "type",
            false,
            vec![FieldDescriptor::new("bar", 1, FieldKind::Message(ty("Bar")))],
        )
    };
    let pool = pool_with(vec![
        msg("Bar").field(FieldDescriptor::new("id", 1, FieldKind::String)),
        wrapper("Inferred"),
        wrapper("Forced").is_oneof(false),
        msg("Scalars")
            .oneof(
                "type",
                false,
                vec![FieldDescriptor::new("s", 1, FieldKind::String)],
            ),
        msg("Explicit")
            .field(FieldDescriptor::new("s", 1, FieldKind::String))
            .is_oneof(true),
    ]);
    let set = SchemaSet::new(pool);

    let kind = |name: &str| match &*set.schema_for_name(&ty(name)).unwrap() {
        RootSchema::Object(_) => "object",
        RootSchema::Oneof(_) => "oneof",
        _ => "other",
    };

    assert_eq!(kind("Inferred"), "oneof");
    assert_eq!(kind("Forced"), "object");
    assert_eq!(kind("Scalars"), "object");
    assert_eq!(kind("Explicit"), "oneof");
}

#[test]
fn synthetic_optional_groups_do_not_count() {
    let pool = pool_with(vec![
        msg("Bar").field(FieldDescriptor::new("id", 1, FieldKind::String)),
        msg("Opt")
            .optional_field(FieldDescriptor::new("maybe", 1, FieldKind::Message(ty("Bar")))),
    ]);
    let set = SchemaSet::new(pool);

    let schema = set.schema_for_name(&ty("Opt")).unwrap();
    let maybe = &schema.as_object().unwrap().properties[0];

    assert!(maybe.explicitly_optional);
    assert!(!maybe.is_virtual());
}

///
/// FIELDS
///

#[test]
fn well_known_messages_become_scalars_and_any() {
    let pool = pool_with(vec![
        msg("Bar").field(FieldDescriptor::new("id", 1, FieldKind::String)),
        msg("Times")
            .field(FieldDescriptor::new("at", 1, FieldKind::Message(well_known::TIMESTAMP.into())))
            .field(FieldDescriptor::new("took", 2, FieldKind::Message(well_known::DURATION.into())))
            .field(FieldDescriptor::new("on", 3, FieldKind::Message(well_known::DATE.into())))
            .field(FieldDescriptor::new("cost", 4, FieldKind::Message(well_known::DECIMAL.into())))
            .field(
                FieldDescriptor::new("blob", 5, FieldKind::Message(well_known::ANY.into()))
                    .any_types([ty("Bar")]),
            )
            .field(FieldDescriptor::new("id", 6, FieldKind::String).key(KeyFormat::Uuid)),
    ]);
    let set = SchemaSet::new(pool);

    let schema = set.schema_for_name(&ty("Times")).unwrap();
    let kinds: Vec<_> = schema
        .properties()
        .unwrap()
        .iter()
        .map(|p| p.schema.scalar_kind())
        .collect();

    assert_eq!(
        kinds,
        vec![
            Some(ScalarKind::Timestamp),
            Some(ScalarKind::Duration),
            Some(ScalarKind::Date),
            Some(ScalarKind::Decimal),
            None,
            Some(ScalarKind::Key),
        ]
    );

    let FieldSchema::Any(any) = &schema.properties().unwrap()[4].schema else {
        panic!("blob should be an any");
    };
    assert!(any.allows(&ty("Bar")));
    assert!(!any.allows(&ty("Times")));
}

#[test]
fn struct_is_rejected() {
    let pool = pool_with(vec![msg("Loose").field(FieldDescriptor::new(
        "data",
        1,
        FieldKind::Message(well_known::STRUCT.into()),
    ))]);
    let set = SchemaSet::new(pool);

    assert_eq!(
        build_err(&set, "Loose"),
        BuildError::UnsupportedWellKnown(well_known::STRUCT.to_string())
    );
}

#[test]
fn map_keys_must_be_strings() {
    let pool = pool_with(vec![msg("Counts").field(
        FieldDescriptor::new("by_id", 1, FieldKind::Int32).map_keyed_by(FieldKind::Int64),
    )]);
    let set = SchemaSet::new(pool);

    assert!(matches!(
        build_err(&set, "Counts"),
        BuildError::MapKeyNotString { field, .. } if field == "by_id"
    ));
}

#[test]
fn collections_wrap_item_schemas() {
    let pool = pool_with(vec![
        msg("Bar").field(FieldDescriptor::new("id", 1, FieldKind::String)),
        msg("Bag")
            .field(FieldDescriptor::new("tags", 1, FieldKind::String).repeated())
            .field(FieldDescriptor::new("bars", 2, FieldKind::Message(ty("Bar"))).map()),
    ]);
    let set = SchemaSet::new(pool);

    let bag = set.schema_for_name(&ty("Bag")).unwrap();
    let props = bag.properties().unwrap();

    let FieldSchema::Array(tags) = &props[0].schema else {
        panic!("tags should be an array");
    };
    assert_eq!(tags.items.scalar_kind(), Some(ScalarKind::String));

    let FieldSchema::Map(bars) = &props[1].schema else {
        panic!("bars should be a map");
    };
    assert!(matches!(*bars.items, FieldSchema::Object(_)));
}

#[test]
fn malformed_scalar_rules_are_rejected() {
    let cases = [
        (
            FieldKind::Int32,
            ScalarRules::Integer {
                min: None,
                max: Some(1 << 40),
                exclusive_min: false,
                exclusive_max: false,
            },
        ),
        (
            FieldKind::Uint64,
            ScalarRules::Integer {
                min: Some(10),
                max: Some(5),
                exclusive_min: false,
                exclusive_max: false,
            },
        ),
        (
            FieldKind::String,
            ScalarRules::String {
                min_len: None,
                max_len: None,
                pattern: Some("([".into()),
            },
        ),
        (
            FieldKind::Int64,
            ScalarRules::String {
                min_len: Some(1),
                max_len: None,
                pattern: None,
            },
        ),
        (
            FieldKind::Message(well_known::DATE.into()),
            ScalarRules::Date {
                min: Some("2024-02-30".into()),
                max: None,
            },
        ),
        (
            FieldKind::Message(well_known::DECIMAL.into()),
            ScalarRules::Decimal {
                min: Some("2.5".into()),
                max: Some("1.0".into()),
            },
        ),
    ];

    for (index, (kind, rules)) in cases.into_iter().enumerate() {
        let name = format!("Case{index}");
        let pool = pool_with(vec![msg(&name).field(
            FieldDescriptor::new("value", 1, kind).rules(FieldRules::scalar(rules)),
        )]);
        let set = SchemaSet::new(pool);

        assert!(
            matches!(
                build_err(&set, &name),
                BuildError::MalformedAnnotation { .. }
            ),
            "case {index} should be malformed"
        );
    }
}

#[test]
fn valid_rules_are_carried_with_compiled_pattern() {
    let pool = pool_with(vec![msg("Named").field(
        FieldDescriptor::new("slug", 1, FieldKind::String).rules(FieldRules::scalar(
            ScalarRules::String {
                min_len: Some(1),
                max_len: Some(32),
                pattern: Some("^[a-z-]+$".into()),
            },
        )),
    )]);
    let set = SchemaSet::new(pool);

    let schema = set.schema_for_name(&ty("Named")).unwrap();
    let FieldSchema::Scalar(slug) = &schema.properties().unwrap()[0].schema else {
        panic!("slug should be scalar");
    };

    assert!(slug.pattern.as_ref().is_some_and(|re| re.is_match("a-b")));
    assert!(slug.rules.is_some());
}

///
/// POLYMORPH
///

#[test]
fn polymorph_links_its_members() {
    let pool = pool_with(vec![
        msg("Circle")
            .field(FieldDescriptor::new("radius", 1, FieldKind::Double))
            .polymorph_member_of(ty("Shape")),
        msg("Square").field(FieldDescriptor::new("side", 1, FieldKind::Double)),
        msg("Shape")
            .field(FieldDescriptor::new("value", 1, FieldKind::Message(well_known::ANY.into())))
            .polymorph([ty("Circle"), ty("Square")]),
        msg("Canvas").field(FieldDescriptor::new("shape", 1, FieldKind::Message(ty("Shape")))),
    ]);
    let set = SchemaSet::new(pool);

    let canvas = set.schema_for_name(&ty("Canvas")).unwrap();
    assert!(matches!(
        canvas.properties().unwrap()[0].schema,
        FieldSchema::Polymorph(_)
    ));

    let shape = set.schema_for_name(&ty("Shape")).unwrap();
    let shape = shape.as_polymorph().unwrap();
    assert_eq!(shape.member_names(), vec![ty("Circle"), ty("Square")]);
    assert!(shape.allows(&ty("Square")));
    assert_eq!(shape.value_field, 1);

    let circle = set.schema_for_name(&ty("Circle")).unwrap();
    assert_eq!(circle.as_object().unwrap().polymorph_member_of.len(), 1);
    assert!(set.unlinked_refs().is_empty());
}

#[test]
fn polymorph_needs_an_any_value_field() {
    let pool = pool_with(vec![
        msg("Circle").field(FieldDescriptor::new("radius", 1, FieldKind::Double)),
        msg("Shape")
            .field(FieldDescriptor::new("value", 1, FieldKind::String))
            .polymorph([ty("Circle")]),
    ]);
    let set = SchemaSet::new(pool);

    assert!(matches!(
        build_err(&set, "Shape"),
        BuildError::MalformedAnnotation { .. }
    ));
}

#[test]
fn unknown_field_type_fails() {
    let pool = pool_with(vec![msg("Dangling").field(FieldDescriptor::new(
        "ghost",
        1,
        FieldKind::Message(ty("Ghost")),
    ))]);
    let set = SchemaSet::new(pool);

    assert_eq!(build_err(&set, "Dangling"), BuildError::UnknownType(ty("Ghost")));
    assert!(matches!(
        set.schema_for_name(&ty("Nope")),
        Err(SchemaError::Build(BuildError::UnknownType(_)))
    ));
}

#[test]
fn schema_set_is_shareable_across_threads() {
    let pool = pool_with(vec![msg("Shared").field(FieldDescriptor::new("a", 1, FieldKind::String))]);
    let set = Arc::new(SchemaSet::new(pool));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let set = Arc::clone(&set);
            std::thread::spawn(move || set.schema_for_name(&ty("Shared")).unwrap())
        })
        .collect();
    let built: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for schema in &built[1..] {
        assert!(Arc::ptr_eq(&built[0], schema));
    }
}
