//! Snapshot serializer output assertions. Every test parses the streamed
//! bytes back through serde_json, so well-formedness is checked throughout.

use chrono::TimeZone;
use drift::digest::value::digest_str;
use drift::{
    BinarySource, FilterPolicy, MemoryNode, NodeBuilder, SnapshotRoot, TreeSerializer, Value,
};
use serde_json::Value as Json;
use std::io::Read;

fn snapshot(policy: &FilterPolicy, roots: &[SnapshotRoot<'_, MemoryNode>]) -> Json {
    let mut buf = Vec::new();
    TreeSerializer::new(policy)
        .serialize(roots, &mut buf)
        .unwrap();
    serde_json::from_slice(&buf).unwrap()
}

fn empty_policy() -> FilterPolicy {
    FilterPolicy::builder().build().unwrap()
}

#[test]
fn test_binary_property_renders_as_digest_never_raw_bytes() {
    let payload = b"raw image bytes".to_vec();
    let expected = digest_str("raw image bytes");
    let tree = NodeBuilder::new("asset", "nt:file")
        .prop("jcr:data", Value::binary(payload))
        .build_root();

    let policy = empty_policy();
    let json = snapshot(&policy, &[SnapshotRoot::found("/asset", &tree)]);

    assert_eq!(json["/asset"]["jcr:data"], Json::String(expected));
}

#[test]
fn test_native_scalars_emit_as_json_scalars() {
    let tree = NodeBuilder::new("n", "nt:unstructured")
        .prop("s", Value::String("hi".into()))
        .prop("b", Value::Boolean(true))
        .prop("l", Value::Long(-42))
        .prop("d", Value::Double(1.5))
        .build_root();

    let policy = empty_policy();
    let json = snapshot(&policy, &[SnapshotRoot::found("/n", &tree)]);
    let node = &json["/n"];

    assert_eq!(node["s"], "hi");
    assert_eq!(node["b"], true);
    assert_eq!(node["l"], -42);
    assert_eq!(node["d"], 1.5);
}

#[test]
fn test_typed_values_emit_type_and_val_objects() {
    let t = chrono::Utc.with_ymd_and_hms(2021, 3, 14, 9, 26, 53).unwrap();
    let tree = NodeBuilder::new("n", "nt:unstructured")
        .prop("when", Value::Timestamp(t))
        .prop("price", Value::Decimal("19.99".into()))
        .prop("ref", Value::Other {
            type_name: "Reference".into(),
            raw: "uuid-1234".into(),
        })
        .build_root();

    let policy = empty_policy();
    let json = snapshot(&policy, &[SnapshotRoot::found("/n", &tree)]);
    let node = &json["/n"];

    assert_eq!(node["when"]["type"], "Date");
    assert_eq!(node["when"]["val"], "2021-03-14T09:26:53+00:00");
    assert_eq!(node["price"]["type"], "Decimal");
    assert_eq!(node["price"]["val"], "19.99");
    assert_eq!(node["ref"]["type"], "Reference");
    assert_eq!(node["ref"]["val"], "uuid-1234");
}

#[test]
fn test_multi_values_are_sorted_unless_order_significant() {
    let tree = NodeBuilder::new("n", "nt:unstructured")
        .multi_prop(
            "tags",
            vec![Value::String("zebra".into()), Value::String("apple".into())],
        )
        .multi_prop(
            "steps",
            vec![Value::String("zebra".into()), Value::String("apple".into())],
        )
        .build_root();

    let policy = FilterPolicy::builder()
        .sorted_property("steps")
        .build()
        .unwrap();
    let json = snapshot(&policy, &[SnapshotRoot::found("/n", &tree)]);

    assert_eq!(json["/n"]["tags"], serde_json::json!(["apple", "zebra"]));
    assert_eq!(json["/n"]["steps"], serde_json::json!(["zebra", "apple"]));
}

#[test]
fn test_missing_root_emits_error_marker_and_siblings_survive() {
    let tree = NodeBuilder::new("here", "nt:unstructured")
        .prop("p", Value::String("v".into()))
        .build_root();

    let policy = empty_policy();
    let json = snapshot(
        &policy,
        &[
            SnapshotRoot::found("/here", &tree),
            SnapshotRoot::missing("/gone"),
        ],
    );

    assert_eq!(json["/here"]["p"], "v");
    assert_eq!(json["/gone"], "ERROR: /gone not found");
}

#[test]
fn test_serializer_recurses_past_aggregate_roots() {
    // Unlike the digest engine, included types do not stop descent: the
    // nested component appears as a nested object.
    let tree = NodeBuilder::new("outer", "app:Component")
        .prop("p", Value::String("v".into()))
        .child(NodeBuilder::new("inner", "app:Component").prop(
            "q",
            Value::String("w".into()),
        ))
        .build_root();

    let policy = FilterPolicy::builder()
        .include_type("app:Component")
        .build()
        .unwrap();
    let json = snapshot(&policy, &[SnapshotRoot::found("/outer", &tree)]);

    assert_eq!(json["/outer"]["p"], "v");
    assert_eq!(json["/outer"]["inner"]["q"], "w");
}

#[test]
fn test_subtree_exclusion_removes_branch_from_snapshot() {
    let tree = NodeBuilder::new("comp", "nt:unstructured")
        .child(NodeBuilder::new("rep:policy", "rep:ACL").prop(
            "grant",
            Value::String("all".into()),
        ))
        .child(NodeBuilder::new("kept", "nt:unstructured"))
        .build_root();

    let policy = FilterPolicy::builder()
        .exclude_subtree("rep:policy")
        .build()
        .unwrap();
    let json = snapshot(&policy, &[SnapshotRoot::found("/comp", &tree)]);

    assert!(json["/comp"].get("rep:policy").is_none());
    assert!(json["/comp"].get("kept").is_some());
}

#[test]
fn test_name_exclusion_hides_properties_but_not_children() {
    let tree = NodeBuilder::new("comp", "nt:unstructured")
        .child(
            NodeBuilder::new("hidden", "nt:unstructured")
                .prop("secret", Value::String("x".into()))
                .child(NodeBuilder::new("grandchild", "nt:unstructured").prop(
                    "visible",
                    Value::String("yes".into()),
                )),
        )
        .build_root();

    let policy = FilterPolicy::builder()
        .exclude_node_name("hidden")
        .build()
        .unwrap();
    let json = snapshot(&policy, &[SnapshotRoot::found("/comp", &tree)]);

    let hidden = &json["/comp"]["hidden"];
    assert!(hidden.get("secret").is_none());
    assert_eq!(hidden["grandchild"]["visible"], "yes");
}

#[test]
fn test_unordered_children_emit_sorted_by_name() {
    let tree = NodeBuilder::new("n", "nt:unstructured")
        .child(NodeBuilder::new("zebra", "nt:unstructured"))
        .child(NodeBuilder::new("apple", "nt:unstructured"))
        .build_root();

    let policy = empty_policy();
    let mut buf = Vec::new();
    TreeSerializer::new(&policy)
        .serialize(&[SnapshotRoot::found("/n", &tree)], &mut buf)
        .unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.find("apple").unwrap() < text.find("zebra").unwrap());
}

#[test]
fn test_orderable_children_emit_in_source_order() {
    let tree = NodeBuilder::new("n", "nt:unstructured")
        .orderable()
        .child(NodeBuilder::new("zebra", "nt:unstructured"))
        .child(NodeBuilder::new("apple", "nt:unstructured"))
        .build_root();

    let policy = empty_policy();
    let mut buf = Vec::new();
    TreeSerializer::new(&policy)
        .serialize(&[SnapshotRoot::found("/n", &tree)], &mut buf)
        .unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.find("zebra").unwrap() < text.find("apple").unwrap());
}

#[test]
fn test_excluded_properties_are_skipped() {
    let tree = NodeBuilder::new("n", "nt:unstructured")
        .prop("jcr:created", Value::String("2020".into()))
        .prop("kept", Value::String("v".into()))
        .build_root();

    let policy = FilterPolicy::builder()
        .exclude_property("jcr:created")
        .build()
        .unwrap();
    let json = snapshot(&policy, &[SnapshotRoot::found("/n", &tree)]);

    assert!(json["/n"].get("jcr:created").is_none());
    assert_eq!(json["/n"]["kept"], "v");
}

struct FailingBinary;

impl BinarySource for FailingBinary {
    fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "stream unavailable",
        ))
    }
}

#[test]
fn test_unreadable_value_is_skipped_without_aborting_snapshot() {
    // Same recovery as the digest engine: the broken property drops out,
    // everything else still serializes.
    let tree = NodeBuilder::new("comp", "nt:unstructured")
        .prop("data", Value::Binary(std::sync::Arc::new(FailingBinary)))
        .prop("kept", Value::String("v".into()))
        .child(NodeBuilder::new("child", "nt:unstructured").prop(
            "p",
            Value::String("w".into()),
        ))
        .build_root();

    let policy = empty_policy();
    let json = snapshot(&policy, &[SnapshotRoot::found("/comp", &tree)]);

    assert!(json["/comp"].get("data").is_none());
    assert_eq!(json["/comp"]["kept"], "v");
    assert_eq!(json["/comp"]["child"]["p"], "w");
}

#[test]
fn test_binary_multi_values_sort_by_digest() {
    let a = b"aaa".to_vec();
    let b = b"bbb".to_vec();
    let mut digests = vec![digest_str("aaa"), digest_str("bbb")];
    digests.sort();

    let tree = NodeBuilder::new("n", "nt:unstructured")
        .multi_prop(
            "blobs",
            vec![Value::binary(b), Value::binary(a)],
        )
        .build_root();

    let policy = empty_policy();
    let json = snapshot(&policy, &[SnapshotRoot::found("/n", &tree)]);

    assert_eq!(json["/n"]["blobs"], serde_json::json!(digests));
}
