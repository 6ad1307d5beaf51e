//! Tests for TreeBuilder and id/parent linking

use rstest::rstest;
use serde_json::{json, Value};

use rectree::util::testing::{default_records, generate_default_tree, record};
use rectree::{LinkOptions, Record, SerializeOptions, Tree, TreeBuilder, TreeError};

fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().map(record).collect(),
        _ => Vec::new(),
    }
}

fn uid_records() -> Vec<Record> {
    records(json!([
        {"uid": 1, "title": "Root"},
        {"uid": 2, "_parent": 1},
        {"uid": 3, "_parent": 1},
        {"uid": 4, "_parent": 3},
        {"uid": 5, "_parent": 4},
        {"uid": 6, "_parent": 5},
        {"uid": 7, "_parent": 2},
        {"uid": 8, "_parent": 7},
    ]))
}

// ============================================================
// add_linked (caller-side linking)
// ============================================================

#[test]
fn given_custom_keys_when_adding_linked_then_builds_hierarchy() {
    let options = LinkOptions::new("uid", "_parent");
    let mut tree = Tree::new();
    for item in uid_records() {
        tree.add_linked(item, &options);
    }

    let root = tree.root_node().expect("root");
    assert_eq!(root.get("uid"), Some(&json!(1)));

    let json = tree.to_json(&SerializeOptions::default());
    assert_eq!(json["children"][0]["uid"], json!(2));
    assert_eq!(json["children"][1]["uid"], json!(3));
    assert_eq!(json["children"][1]["children"][0]["uid"], json!(4));
    assert_eq!(json["children"][1]["children"][0]["children"][0]["uid"], json!(5));
    assert_eq!(
        json["children"][1]["children"][0]["children"][0]["children"][0]["uid"],
        json!(6)
    );
}

// ============================================================
// TreeBuilder
// ============================================================

#[test]
fn given_default_records_when_building_then_matches_add_fixture() {
    let built = TreeBuilder::default().build(default_records()).unwrap();
    let added = generate_default_tree();

    let options = SerializeOptions::default();
    assert_eq!(built.to_json(&options), added.to_json(&options));
}

#[test]
fn given_shuffled_records_when_building_then_siblings_keep_input_order() {
    let tree = TreeBuilder::default()
        .build(records(json!([
            {"id": 8, "parent": 7},
            {"id": 3, "parent": 1},
            {"id": 7, "parent": 1},
            {"id": 1},
            {"id": 2, "parent": 1},
        ])))
        .unwrap();

    let json = tree.to_json(&SerializeOptions::default());
    let ids: Vec<&Value> = json["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|child| &child["id"])
        .collect();
    assert_eq!(ids, vec![&json!(3), &json!(7), &json!(2)]);
    assert_eq!(json["children"][1]["children"][0]["id"], json!(8));
}

#[test]
fn given_custom_keys_when_building_then_uses_them() {
    let tree = TreeBuilder::new(LinkOptions::new("uid", "_parent"))
        .build(uid_records())
        .unwrap();
    assert_eq!(tree.len(), 8);
    assert_eq!(tree.depth(), 5);
}

#[rstest]
#[case::missing_id(json!([{"id": 1}, {"parent": 1}]), "MissingField")]
#[case::duplicate_id(json!([{"id": 1}, {"id": 2, "parent": 1}, {"id": 2, "parent": 1}]), "DuplicateId")]
#[case::no_root(json!([{"id": 1, "parent": 2}, {"id": 2, "parent": 1}]), "NoRoot")]
#[case::two_roots(json!([{"id": 1}, {"id": 2}]), "MultipleRoots")]
#[case::unknown_parent(json!([{"id": 1}, {"id": 2, "parent": 9}]), "Orphan")]
#[case::detached_cycle(json!([{"id": 1}, {"id": 2, "parent": 3}, {"id": 3, "parent": 2}]), "Orphan")]
fn given_invalid_records_when_building_then_errors(#[case] input: Value, #[case] expected: &str) {
    let err = TreeBuilder::default().build(records(input)).unwrap_err();
    let variant = match err {
        TreeError::MissingField { .. } => "MissingField",
        TreeError::DuplicateId(_) => "DuplicateId",
        TreeError::NoRoot => "NoRoot",
        TreeError::MultipleRoots(..) => "MultipleRoots",
        TreeError::Orphan { .. } => "Orphan",
        _ => "other",
    };
    assert_eq!(variant, expected, "{}", err);
}

#[test]
fn given_orphan_when_building_then_message_names_ids() {
    let err = TreeBuilder::default()
        .build(records(json!([{"id": 1}, {"id": 2, "parent": 9}])))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Record 2 is not reachable from the root (parent: 9)"
    );
}
