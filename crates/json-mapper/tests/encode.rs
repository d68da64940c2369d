//! Integration tests for `JsonEncoder`.

use std::sync::Arc;

use indexmap::IndexMap;
use json_mapper::reflect::{
    Attribute, ClassInfo, FieldInfo, FieldValue, MetadataTable, ObjectRef, PropertyMetadata,
};
use json_mapper::{EncoderOptions, JsonEncoder, MapperError, DEFAULT_MAX_DEPTH};
use serde_json::json;

fn typed(name: &str, declaration: &str) -> FieldInfo {
    FieldInfo::new(name).declared(declaration).unwrap()
}

fn instance(class: ClassInfo) -> ObjectRef {
    ObjectRef::instantiate(Arc::new(class))
}

fn encode(value: &FieldValue) -> String {
    JsonEncoder::default()
        .encode(value)
        .unwrap_or_else(|e| panic!("encode failed: {}", e))
}

fn encode_with_depth(value: &FieldValue, max_depth: usize) -> String {
    JsonEncoder::with_options(
        Arc::new(json_mapper::reflect::AttributeMetadata),
        EncoderOptions { max_depth },
    )
    .encode(value)
    .unwrap()
}

fn check_err(object: &ObjectRef) -> MapperError {
    JsonEncoder::default()
        .encode_object(object)
        .err()
        .unwrap_or_else(|| panic!("expected error encoding {:?}", object))
}

// ── Scalars and containers ──────────────────────────────────────────────────

#[test]
fn scalars_pass_through() {
    assert_eq!(encode(&FieldValue::Null), "null");
    assert_eq!(encode(&FieldValue::Bool(true)), "true");
    assert_eq!(encode(&FieldValue::Int(-3)), "-3");
    assert_eq!(encode(&FieldValue::Float(17.5)), "17.5");
    assert_eq!(encode(&FieldValue::from("a\"b")), r#""a\"b""#);
}

#[test]
fn non_finite_floats_become_null() {
    assert_eq!(encode(&FieldValue::Float(f64::NAN)), "null");
    assert_eq!(encode(&FieldValue::Float(f64::INFINITY)), "null");
}

#[test]
fn generic_maps_keep_insertion_order() {
    let mut map = IndexMap::new();
    map.insert("z".to_string(), FieldValue::Int(1));
    map.insert("a".to_string(), FieldValue::from(vec!["x", "y"]));
    assert_eq!(encode(&FieldValue::Map(map)), r#"{"z":1,"a":["x","y"]}"#);
}

#[test]
fn arrays_of_instances() {
    let class = ClassInfo::builder("Point")
        .field(typed("x", "int"))
        .field(typed("y", "int"))
        .build();
    let a = instance(class.clone());
    a.set("x", 1i64);
    a.set("y", 2i64);
    let b = instance(class);
    b.set("x", 3i64);
    b.set("y", 4i64);

    let list = FieldValue::from(vec![a, b]);
    assert_eq!(encode(&list), r#"[{"x":1,"y":2},{"x":3,"y":4}]"#);
}

// ── Objects ─────────────────────────────────────────────────────────────────

fn user_class() -> ClassInfo {
    ClassInfo::builder("User")
        .field(typed("id", "int"))
        .field(typed("email", "?string").attribute(Attribute::MappedPropertyName("e-mail".into())))
        .field(typed("password", "string").attribute(Attribute::Omit(true)))
        .field(FieldInfo::new("notes"))
        .field(typed("instances", "int").with_static())
        .field(typed("tags", "array"))
        .build()
}

#[test]
fn object_follows_declaration_order_and_metadata() {
    let user = instance(user_class());
    // Assignment order differs from declaration order on purpose.
    user.set("tags", FieldValue::from(vec!["a"]));
    user.set("password", "hunter2");
    user.set("email", FieldValue::Null);
    user.set("id", 7i64);
    user.set("instances", 99i64);

    assert_eq!(
        JsonEncoder::default().encode_object(&user).unwrap(),
        r#"{"id":7,"e-mail":null,"tags":["a"]}"#
    );
}

#[test]
fn uninitialized_optional_field_is_left_out() {
    let user = instance(user_class());
    user.set("id", 1i64);
    user.set("email", "a@b.c");
    user.set("tags", FieldValue::Array(Vec::new()));
    let value = JsonEncoder::default()
        .encode_to_value(&FieldValue::Object(user))
        .unwrap();
    assert_eq!(value, json!({"id": 1, "e-mail": "a@b.c", "tags": []}));
}

#[test]
fn uninitialized_required_field_fails() {
    let user = instance(user_class());
    user.set("id", 1i64);
    user.set("tags", FieldValue::Array(Vec::new()));
    assert_eq!(
        check_err(&user),
        MapperError::RequiredPropertyNotFound("e-mail".into())
    );
}

#[test]
fn explicitly_optional_typed_field_may_stay_uninitialized() {
    let class = ClassInfo::builder("Draft")
        .field(typed("title", "string").attribute(Attribute::Required(false)))
        .field(FieldInfo::new("body").attribute(Attribute::Required(true)))
        .build();
    let draft = instance(class);
    assert_eq!(check_err(&draft), MapperError::RequiredPropertyNotFound("body".into()));

    draft.set("body", "text");
    assert_eq!(
        JsonEncoder::default().encode_object(&draft).unwrap(),
        r#"{"body":"text"}"#
    );
}

#[test]
fn duplicate_json_names_fail() {
    let class = ClassInfo::builder("Dup")
        .field(FieldInfo::new("a"))
        .field(FieldInfo::new("b").attribute(Attribute::MappedPropertyName("a".into())))
        .build();
    let dup = instance(class);
    assert_eq!(check_err(&dup), MapperError::AmbiguousNameDefinition("a".into()));
}

#[test]
fn omitted_field_does_not_claim_its_name() {
    let class = ClassInfo::builder("Shadow")
        .field(FieldInfo::new("a").attribute(Attribute::Omit(true)))
        .field(FieldInfo::new("b").attribute(Attribute::MappedPropertyName("a".into())))
        .build();
    let shadow = instance(class);
    shadow.set("a", 1i64);
    shadow.set("b", 2i64);
    assert_eq!(JsonEncoder::default().encode_object(&shadow).unwrap(), r#"{"a":2}"#);
}

#[test]
fn nested_instances_are_flattened() {
    let address = ClassInfo::builder("Address")
        .field(typed("street", "string"))
        .build();
    let customer = ClassInfo::builder("Customer")
        .field(typed("name", "string"))
        .field(typed("address", "Address"))
        .field(FieldInfo::new("extra"))
        .build();

    let home = instance(address);
    home.set("street", "Main St");
    let ada = instance(customer);
    ada.set("name", "Ada");
    ada.set("address", home);
    ada.set("extra", FieldValue::from_json(&json!({"k": [1, 2]})));

    assert_eq!(
        JsonEncoder::default().encode_object(&ada).unwrap(),
        r#"{"name":"Ada","address":{"street":"Main St"},"extra":{"k":[1,2]}}"#
    );
}

#[test]
fn metadata_table_drives_encoding() {
    let mut table = MetadataTable::new();
    table.insert(
        "User",
        "id",
        PropertyMetadata {
            name: Some("user_id".into()),
            ..Default::default()
        },
    );
    table.insert(
        "User",
        "email",
        PropertyMetadata {
            omit: Some(true),
            ..Default::default()
        },
    );
    table.insert(
        "User",
        "tags",
        PropertyMetadata {
            required: Some(false),
            ..Default::default()
        },
    );

    // Attributes are not consulted when the table is the provider.
    let user = instance(user_class());
    user.set("id", 5i64);
    user.set("password", "pw");
    let encoder = JsonEncoder::new(Arc::new(table));
    assert_eq!(
        encoder.encode_object(&user).unwrap(),
        r#"{"user_id":5,"password":"pw"}"#
    );
}

// ── Depth guard ─────────────────────────────────────────────────────────────

fn node_class() -> ClassInfo {
    ClassInfo::builder("Node").field(typed("child", "?Node")).build()
}

fn collapsed_chain(levels: usize) -> String {
    format!("{}{{}}{}", r#"{"child":"#.repeat(levels), "}".repeat(levels))
}

#[test]
fn default_depth_is_512() {
    assert_eq!(EncoderOptions::default().max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(DEFAULT_MAX_DEPTH, 512);
    assert_eq!(JsonEncoder::default().options().max_depth, 512);
}

#[test]
fn self_reference_is_cut_at_max_depth() {
    let node = instance(node_class());
    node.set("child", node.clone());
    assert_eq!(encode(&FieldValue::Object(node.clone())), collapsed_chain(512));

    // Break the cycle so the instance is freed.
    node.set("child", FieldValue::Null);
}

#[test]
fn deep_graphs_encode_on_worker_threads() {
    let workers: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let node = instance(node_class());
                node.set("child", node.clone());
                let out = encode(&FieldValue::Object(node.clone()));
                node.set("child", FieldValue::Null);
                out
            })
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), collapsed_chain(512));
    }
}

#[test]
fn deep_chain_is_cut_at_max_depth() {
    let class = Arc::new(node_class());
    let mut head = ObjectRef::instantiate(Arc::clone(&class));
    head.set("child", FieldValue::Null);
    for _ in 1..600 {
        let parent = ObjectRef::instantiate(Arc::clone(&class));
        parent.set("child", head);
        head = parent;
    }
    assert_eq!(encode(&FieldValue::Object(head.clone())), collapsed_chain(512));

    // Unlink front to back; dropping the head would recurse through every node.
    let mut next = Some(head);
    while let Some(node) = next {
        next = node.get("child").and_then(|child| child.as_object().cloned());
        node.set("child", FieldValue::Null);
    }
}

#[test]
fn shallow_chain_is_not_truncated() {
    let class = Arc::new(node_class());
    let leaf = ObjectRef::instantiate(Arc::clone(&class));
    leaf.set("child", FieldValue::Null);
    let root = ObjectRef::instantiate(class);
    root.set("child", leaf);
    assert_eq!(
        encode_with_depth(&FieldValue::Object(root), 2),
        r#"{"child":{"child":null}}"#
    );
}

#[test]
fn containers_collapse_to_their_own_kind() {
    let nested = FieldValue::from_json(&json!([[1, [2]], {"a": {"b": 1}}]));
    assert_eq!(encode_with_depth(&nested, 2), r#"[[1,[]],{"a":{}}]"#);
    assert_eq!(encode_with_depth(&nested, 0), "[]");
    assert_eq!(encode_with_depth(&FieldValue::Int(1), 0), "1");
}

#[test]
fn options_load_from_config() {
    let opts: EncoderOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, EncoderOptions::default());

    let opts: EncoderOptions = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
    assert_eq!(opts.max_depth, 3);
}
