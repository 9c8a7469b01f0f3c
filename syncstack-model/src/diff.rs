//! Source-relative property diff.

use syncstack_types::PropertyMap;

/// Returns every entry of `source` whose value differs from the same key in
/// `comparison`.
///
/// Only keys of `source` are considered: a key missing from `comparison`
/// counts as different, a key present only in `comparison` never appears in
/// the result. The answer is "what in `source` needs to be applied", not a
/// symmetric difference.
pub fn diff(source: &PropertyMap, comparison: &PropertyMap) -> PropertyMap {
    source
        .iter()
        .filter(|(key, value)| comparison.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> PropertyMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn changed_value_is_reported() {
        assert_eq!(diff(&map(json!({"a": 1, "b": 2})), &map(json!({"a": 1, "b": 3}))), map(json!({"b": 2})));
    }

    #[test]
    fn missing_in_comparison_is_reported() {
        assert_eq!(diff(&map(json!({"a": 1})), &map(json!({}))), map(json!({"a": 1})));
    }

    #[test]
    fn comparison_only_keys_are_ignored() {
        assert!(diff(&map(json!({})), &map(json!({"a": 1}))).is_empty());
    }

    #[test]
    fn type_mismatch_counts_as_change() {
        assert_eq!(diff(&map(json!({"id": "1"})), &map(json!({"id": 1}))), map(json!({"id": "1"})));
    }
}
