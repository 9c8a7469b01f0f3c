//! Dynamically typed property values.
//!
//! Record properties are a flat map from name to a tagged union of
//! string/number/bool/null (nested arrays and objects are carried through
//! untouched). The JSON value model already is that tagged union, so it is
//! reused directly rather than mirrored.

/// A single property value.
pub type Value = serde_json::Value;

/// A mapping from property name to value.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Returns the string form of a value.
///
/// Strings are returned verbatim, null becomes the empty string and every
/// other value uses its JSON rendering (`101`, `true`, `[1,2]`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether a value is absent, null, or a string of only whitespace.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_form() {
        assert_eq!(value_to_string(&json!("abc")), "abc");
        assert_eq!(value_to_string(&json!(101)), "101");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&Value::Null), "");
    }

    #[test]
    fn blankness() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&Value::Null)));
        assert!(is_blank(Some(&json!("  "))));
        assert!(!is_blank(Some(&json!("1"))));
        assert!(!is_blank(Some(&json!(0))));
    }
}
