use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use syncstack_model::diff;
use syncstack_types::{PropertyMap, Value};

fn map(value: Value) -> PropertyMap {
    value.as_object().cloned().unwrap()
}

#[test]
fn documented_examples() {
    assert_eq!(diff(&map(json!({"a": 1, "b": 2})), &map(json!({"a": 1, "b": 3}))), map(json!({"b": 2})));
    assert_eq!(diff(&map(json!({"a": 1})), &map(json!({}))), map(json!({"a": 1})));
    assert_eq!(diff(&map(json!({})), &map(json!({"a": 1}))), map(json!({})));
}

#[test]
fn nested_values_compare_structurally() {
    let a = map(json!({"tags": ["x", "y"], "meta": {"k": 1}}));
    let b = map(json!({"tags": ["x", "y"], "meta": {"k": 2}}));
    assert_eq!(diff(&a, &b), map(json!({"meta": {"k": 1}})));
}

#[test]
fn null_differs_from_missing() {
    assert_eq!(diff(&map(json!({"a": null})), &map(json!({}))), map(json!({"a": null})));
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,4}".prop_map(Value::String),
    ]
}

fn map_strategy() -> impl Strategy<Value = PropertyMap> {
    prop::collection::btree_map("[a-e]", value_strategy(), 0..6)
        .prop_map(|m| m.into_iter().collect::<PropertyMap>())
}

proptest! {
    /// Only keys of the source ever appear in the delta.
    #[test]
    fn delta_keys_come_from_source(a in map_strategy(), b in map_strategy()) {
        let delta = diff(&a, &b);
        for key in delta.keys() {
            prop_assert!(a.contains_key(key));
            prop_assert_eq!(delta.get(key), a.get(key));
        }
    }

    /// A key is omitted exactly when both sides hold the same value.
    #[test]
    fn omitted_keys_are_equal(a in map_strategy(), b in map_strategy()) {
        let delta = diff(&a, &b);
        for (key, value) in &a {
            prop_assert_eq!(delta.contains_key(key), b.get(key) != Some(value));
        }
    }

    /// Diffing a map against itself is empty.
    #[test]
    fn self_diff_is_empty(a in map_strategy()) {
        prop_assert!(diff(&a, &a).is_empty());
    }
}
