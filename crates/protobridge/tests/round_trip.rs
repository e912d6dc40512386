use protobridge::{
    CodecError, ValidateError, decode_json, decode_query, encode_json, parse_query,
    prelude::*,
    schema::descriptor::{FieldRules, ScalarRules, well_known},
    validate,
};
use serde_json::{Value as JsonValue, json};

const PKG: &str = "shop.orders.v1";

fn schemas() -> SchemaSet {
    let mut pool = DescriptorPool::with_well_known_types();

    pool.add_enum(
        EnumBuilder::new(PKG, "OrderStatus")
            .value("ORDER_STATUS_UNSPECIFIED", 0)
            .value("ORDER_STATUS_OPEN", 1)
            .value("ORDER_STATUS_SHIPPED", 2)
            .build(),
    )
    .unwrap();

    let line = MessageBuilder::new(PKG, "Line")
        .field(FieldDescriptor::new("sku", 1, FieldKind::String).required())
        .field(
            FieldDescriptor::new("quantity", 2, FieldKind::Uint32).rules(FieldRules::scalar(
                ScalarRules::Integer {
                    min: Some(1),
                    max: None,
                    exclusive_min: false,
                    exclusive_max: false,
                },
            )),
        );

    let order = MessageBuilder::new(PKG, "Order")
        .field(FieldDescriptor::new("order_id", 1, FieldKind::String).required())
        .field(FieldDescriptor::new(
            "status",
            2,
            FieldKind::Enum(format!("{PKG}.OrderStatus")),
        ))
        .field(FieldDescriptor::new("total_cents", 3, FieldKind::Int64))
        .field(FieldDescriptor::new(
            "placed_at",
            4,
            FieldKind::Message(well_known::TIMESTAMP.to_string()),
        ))
        .field(FieldDescriptor::new("lines", 5, FieldKind::Message(format!("{PKG}.Line"))).repeated());

    pool.add_message(line.build()).unwrap();
    pool.add_message(order.build()).unwrap();

    SchemaSet::new(pool)
}

fn new_order(set: &SchemaSet) -> DynamicMessage {
    DynamicMessage::new_by_name(set.pool(), &format!("{PKG}.Order")).unwrap()
}

#[test]
fn decode_validate_encode() {
    let set = schemas();
    let mut order = new_order(&set);
    let doc = json!({
        "orderId": "o-1",
        "status": "SHIPPED",
        "totalCents": "1999",
        "placedAt": "2024-05-06T07:08:09Z",
        "lines": [{ "sku": "A1", "quantity": 2 }]
    });

    decode_json(&set, &mut order, doc.to_string().as_bytes()).unwrap();
    validate(&set, &order).unwrap();

    let out: JsonValue = serde_json::from_slice(&encode_json(&set, &order).unwrap()).unwrap();
    assert_eq!(out, doc);
}

#[test]
fn validation_reports_nested_paths() {
    let set = schemas();
    let mut order = new_order(&set);

    decode_json(&set, &mut order, br#"{"lines":[{"quantity":0}]}"#).unwrap();

    let Err(ValidateError::ValidationFailed(issues)) = validate(&set, &order) else {
        panic!("expected issues");
    };
    assert_eq!(issues.at("orderId"), ["value is required"]);
    assert_eq!(issues.at("lines[0].sku"), ["value is required"]);
    assert_eq!(issues.at("lines[0].quantity"), ["0 must be at least 1"]);
}

#[test]
fn query_parameters_fill_the_same_fields() {
    let set = schemas();
    let mut order = new_order(&set);

    let params = parse_query("?orderId=o-2&status=ORDER_STATUS_OPEN&totalCents=5");
    decode_query(&set, &mut order, &params).unwrap();

    let out: JsonValue = serde_json::from_slice(&encode_json(&set, &order).unwrap()).unwrap();
    assert_eq!(
        out,
        json!({ "orderId": "o-2", "status": "OPEN", "totalCents": "5" })
    );
}

#[test]
fn reflection_reads_what_the_codec_wrote() {
    let set = schemas();
    let mut order = new_order(&set);
    decode_json(&set, &mut order, br#"{"lines":[{"sku":"A"},{"sku":"B"}]}"#).unwrap();

    let props = protobridge::core::reflect::for_message(&set, &order).unwrap();
    let lines = props.get_property("lines").unwrap().as_array_of_container().unwrap();
    assert_eq!(lines.len(&order), 2);

    let second = lines.get(&order, 1).unwrap();
    let sku = second
        .as_object()
        .unwrap()
        .properties()
        .unwrap()
        .get_property("sku")
        .unwrap()
        .as_scalar()
        .unwrap()
        .get(&order)
        .unwrap();
    assert_eq!(sku, Some(ScalarValue::String("B".into())));
}

#[test]
fn decode_errors_carry_the_path() {
    let set = schemas();
    let mut order = new_order(&set);

    let err = decode_json(&set, &mut order, br#"{"lines":[{"sku":1}]}"#).unwrap_err();
    assert_eq!(err.path().as_deref(), Some("lines[0].sku"));
    assert_eq!(
        err.leaf(),
        &CodecError::UnexpectedToken {
            expected: "string",
            found: "number",
        }
    );
}
