//! Deterministic serialization of structured keys.

use serde_json::Value;
use std::fmt;

/// Turns a structured value into a comparable string.
///
/// Two structurally equal values (same keys and values, regardless of key
/// insertion order) must produce identical strings. Used both for table
/// keys and for binding group keys.
pub trait StableStringify: Send + Sync + fmt::Debug {
    fn stringify(&self, value: &Value) -> String;
}

/// Compact JSON with object keys sorted at every depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalJson;

impl StableStringify for CanonicalJson {
    fn stringify(&self, value: &Value) -> String {
        let mut out = String::new();
        write_canonical(value, &mut out);
        out
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            // serde_json's `preserve_order` feature makes `Map` keep insertion order
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    // Display of a JSON string value is its escaped, quoted form
    out.push_str(&Value::String(s.to_string()).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorts_object_keys() {
        let a = json!({"b": 1, "a": 2});
        assert_eq!(CanonicalJson.stringify(&a), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn test_sorts_keys_of_insertion_ordered_map() {
        let mut map = serde_json::Map::new();
        map.insert("zeta".to_string(), json!(1));
        map.insert("alpha".to_string(), json!({"y": 2, "x": 3}));
        assert_eq!(
            CanonicalJson.stringify(&Value::Object(map)),
            r#"{"alpha":{"x":3,"y":2},"zeta":1}"#
        );
    }

    #[test]
    fn test_nested_objects_sorted() {
        let value = json!({"z": [ {"y": 1, "x": null} ], "a": "s"});
        assert_eq!(
            CanonicalJson.stringify(&value),
            r#"{"a":"s","z":[{"x":null,"y":1}]}"#
        );
    }

    #[test]
    fn test_arrays_keep_order() {
        assert_eq!(CanonicalJson.stringify(&json!([3, 1, 2])), "[3,1,2]");
    }

    #[test]
    fn test_escapes_strings() {
        let value = json!({"k\"ey": "line\nbreak"});
        assert_eq!(CanonicalJson.stringify(&value), r#"{"k\"ey":"line\nbreak"}"#);
    }

    #[test]
    fn test_distinguishes_types() {
        assert_ne!(
            CanonicalJson.stringify(&json!([1])),
            CanonicalJson.stringify(&json!(["1"]))
        );
    }
}
