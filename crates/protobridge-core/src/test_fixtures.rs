//! Shared `test.foo.v1` descriptors for reflection, codec and validation
//! tests.

use crate::message::DynamicMessage;
use protobridge_schema::{
    SchemaSet,
    descriptor::{
        DescriptorPool, EnumBuilder, FieldDescriptor, FieldKind, KeyFormat, MessageBuilder,
        well_known,
    },
};
use tracing_subscriber::EnvFilter;

pub const PKG: &str = "test.foo.v1";

pub fn ty(name: &str) -> String {
    format!("{PKG}.{name}")
}

fn message(name: &str) -> FieldKind {
    FieldKind::Message(ty(name))
}

fn well_known(name: &str) -> FieldKind {
    FieldKind::Message(name.to_string())
}

pub fn pool() -> DescriptorPool {
    let mut pool = DescriptorPool::with_well_known_types();

    pool.add_enum(
        EnumBuilder::new(PKG, "TestEnum")
            .value("TEST_ENUM_UNSPECIFIED", 0)
            .value("TEST_ENUM_FOO", 1)
            .value("TEST_ENUM_BAR", 2)
            .build(),
    )
    .unwrap();

    let messages = [
        MessageBuilder::new(PKG, "Bar")
            .field(FieldDescriptor::new("bar_id", 1, FieldKind::String))
            .field(FieldDescriptor::new("bar_field", 2, FieldKind::String))
            .polymorph_member_of(ty("Thing")),
        MessageBuilder::new(PKG, "FlattenedChild").field(FieldDescriptor::new(
            "field_from_flattened",
            1,
            FieldKind::String,
        )),
        MessageBuilder::new(PKG, "WOneof").is_oneof(true).oneof(
            "type",
            false,
            vec![
                FieldDescriptor::new("w_oneof_string", 1, FieldKind::String),
                FieldDescriptor::new("w_oneof_bar", 2, message("Bar")),
                FieldDescriptor::new("w_oneof_any", 3, well_known(well_known::ANY)),
            ],
        ),
        MessageBuilder::new(PKG, "Thing")
            .field(FieldDescriptor::new("value", 1, well_known(well_known::ANY)))
            .polymorph([ty("Bar")]),
        MessageBuilder::new(PKG, "Foo")
            .field(FieldDescriptor::new("s_string", 1, FieldKind::String))
            .field(FieldDescriptor::new("s_bool", 2, FieldKind::Bool))
            .field(FieldDescriptor::new("s_int32", 3, FieldKind::Int32))
            .field(FieldDescriptor::new("s_int64", 4, FieldKind::Int64))
            .field(FieldDescriptor::new("s_uint32", 5, FieldKind::Uint32))
            .field(FieldDescriptor::new("s_uint64", 6, FieldKind::Uint64))
            .field(FieldDescriptor::new("s_float", 7, FieldKind::Float))
            .field(FieldDescriptor::new("s_double", 8, FieldKind::Double))
            .field(FieldDescriptor::new("s_bytes", 9, FieldKind::Bytes))
            .field(FieldDescriptor::new("s_bar", 10, message("Bar")))
            .field(
                FieldDescriptor::new("a_string", 11, FieldKind::String)
                    .repeated()
                    .single_form("aStr"),
            )
            .field(FieldDescriptor::new("a_bar", 12, message("Bar")).repeated())
            .field(FieldDescriptor::new("m_string", 13, FieldKind::String).map())
            .field(FieldDescriptor::new("m_bar", 14, message("Bar")).map())
            .field(FieldDescriptor::new("enum", 15, FieldKind::Enum(ty("TestEnum"))))
            .field(FieldDescriptor::new("ts", 16, well_known(well_known::TIMESTAMP)))
            .field(FieldDescriptor::new("date", 17, well_known(well_known::DATE)))
            .field(FieldDescriptor::new("decimal", 18, well_known(well_known::DECIMAL)))
            .field(FieldDescriptor::new("w_oneof", 19, message("WOneof")))
            .oneof(
                "exposed_choice",
                true,
                vec![
                    FieldDescriptor::new("choice_string", 20, FieldKind::String),
                    FieldDescriptor::new("choice_bar", 21, message("Bar")),
                ],
            )
            .field(FieldDescriptor::new("any", 22, well_known(well_known::ANY)))
            .field(
                FieldDescriptor::new("restricted_any", 23, well_known(well_known::ANY))
                    .any_types([ty("Bar")]),
            )
            .field(FieldDescriptor::new("flattened", 24, message("FlattenedChild")).flatten())
            .field(FieldDescriptor::new("recursive", 25, message("Foo")))
            .field(FieldDescriptor::new("thing", 26, message("Thing")))
            .field(FieldDescriptor::new("a_enum", 27, FieldKind::Enum(ty("TestEnum"))).repeated())
            .field(FieldDescriptor::new("m_enum", 28, FieldKind::Enum(ty("TestEnum"))).map())
            .field(FieldDescriptor::new("duration", 29, well_known(well_known::DURATION)))
            .field(FieldDescriptor::new("s_key", 30, FieldKind::String).key(KeyFormat::Uuid))
            .field(FieldDescriptor::new("a_int64", 31, FieldKind::Int64).repeated()),
    ];
    for m in messages {
        pool.add_message(m.build()).unwrap();
    }

    pool
}

pub fn schemas() -> SchemaSet {
    SchemaSet::new(pool())
}

pub fn new_message(set: &SchemaSet, name: &str) -> DynamicMessage {
    DynamicMessage::new_by_name(set.pool(), &ty(name)).unwrap()
}

pub fn foo(set: &SchemaSet) -> DynamicMessage {
    new_message(set, "Foo")
}

/// Route codec and schema logs to the test harness; `RUST_LOG` filters.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
