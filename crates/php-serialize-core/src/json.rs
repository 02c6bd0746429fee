//! JSON conversion for PHP values.
//!
//! This module converts between [`Value`] and `serde_json::Value`.
//! Enable the `serde` feature to use this module.

use std::borrow::Cow;

use serde_json::{json, Map, Number, Value as JsonValue};

use crate::tree::rebuild;
use crate::types::{Key, Label, Value};

/// Property name carrying an object's class in JSON form.
pub const CLASS_FIELD: &str = "__class__";

/// Convert a PHP value to a JSON value.
///
/// # Mapping Rules
///
/// | PHP Type | JSON Type |
/// |----------|-----------|
/// | `null` | `null` |
/// | `bool` | `boolean` |
/// | `int` / unsigned | `number` |
/// | `float` | `number` (`null` for NaN, `"Infinity"`/`"-Infinity"`) |
/// | `string` | `string` (lossy UTF-8 conversion) |
/// | sequence | `array` |
/// | map | `object` (integer keys become decimal strings) |
/// | `object` | `object` with `__class__` field |
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, to_json};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json = to_json(&php_value);
/// assert_eq!(json, serde_json::json!({"name": "Alice", "age": 30}));
/// ```
pub fn to_json(value: &Value) -> JsonValue {
    rebuild(value, split_value, |parent, key, child| match parent {
        JsonValue::Array(items) => items.push(child),
        JsonValue::Object(map) => {
            map.insert(key, child);
        }
        _ => {}
    })
}

/// A JSON node for `value` with no children yet, plus the children to
/// convert under their JSON keys.
fn split_value<'v, 'a>(value: &'v Value<'a>) -> (JsonValue, Vec<(String, &'v Value<'a>)>) {
    let leaf = match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => json!(*i),
        Value::UInt(u) => json!(*u),
        Value::Float(f) => {
            if f.is_nan() {
                JsonValue::Null
            } else if f.is_infinite() {
                if f.is_sign_positive() {
                    json!("Infinity")
                } else {
                    json!("-Infinity")
                }
            } else {
                json!(*f)
            }
        }
        Value::Str(s) => JsonValue::String(String::from_utf8_lossy(s).into_owned()),
        Value::Seq(items) => {
            return (
                JsonValue::Array(Vec::with_capacity(items.len())),
                items.iter().map(|v| (String::new(), v)).collect(),
            );
        }
        Value::Map(entries) => {
            let children = entries
                .iter()
                .map(|(k, v)| {
                    let key = match k {
                        Key::Str(s) => String::from_utf8_lossy(s).into_owned(),
                        Key::Int(i) => i.to_string(),
                    };
                    (key, v)
                })
                .collect();
            return (JsonValue::Object(Map::new()), children);
        }
        Value::Object {
            class_name,
            properties,
        } => {
            let mut map = Map::new();
            map.insert(
                CLASS_FIELD.to_string(),
                json!(String::from_utf8_lossy(class_name)),
            );
            let children = properties
                .iter()
                .map(|(name, v)| (String::from_utf8_lossy(name).into_owned(), v))
                .collect();
            return (JsonValue::Object(map), children);
        }
    };
    (leaf, Vec::new())
}

/// Convert a JSON value into a PHP value.
///
/// The inverse of [`to_json`] where one exists: a JSON object with a string
/// `__class__` field becomes an object, any other JSON object a map with
/// string keys.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{json::from_json, to_bytes};
///
/// let value = from_json(&serde_json::json!({"__class__": "User", "id": 7}));
/// assert_eq!(to_bytes(&value).unwrap(), br#"O:4:"User":1:{s:2:"id";i:7;}"#);
/// ```
pub fn from_json(json: &JsonValue) -> Value<'static> {
    rebuild(json, split_json, Value::attach)
}

fn split_json(json: &JsonValue) -> (Value<'static>, Vec<(Label<'static>, &JsonValue)>) {
    let leaf = match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => number_to_value(n),
        JsonValue::String(s) => Value::Str(Cow::Owned(s.clone().into_bytes())),
        JsonValue::Array(items) => {
            return (
                Value::Seq(Vec::with_capacity(items.len())),
                items.iter().map(|v| (Label::Index, v)).collect(),
            );
        }
        JsonValue::Object(map) => {
            return match map.get(CLASS_FIELD) {
                Some(JsonValue::String(class_name)) => (
                    Value::Object {
                        class_name: Cow::Owned(class_name.clone().into_bytes()),
                        properties: Vec::with_capacity(map.len() - 1),
                    },
                    map.iter()
                        .filter(|(k, _)| k.as_str() != CLASS_FIELD)
                        .map(|(k, v)| (Label::Property(Cow::Owned(k.clone().into_bytes())), v))
                        .collect(),
                ),
                _ => (
                    Value::Map(Vec::with_capacity(map.len())),
                    map.iter()
                        .map(|(k, v)| (Label::Key(Key::Str(Cow::Owned(k.clone().into_bytes()))), v))
                        .collect(),
                ),
            };
        }
    };
    (leaf, Vec::new())
}

fn number_to_value(n: &Number) -> Value<'static> {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::UInt(u)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Convert a PHP value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, json::to_json_string};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json_str = to_json_string(&php_value).unwrap();
/// // JSON key order is not guaranteed, so check contents
/// assert!(json_str.contains(r#""name":"Alice""#));
/// assert!(json_str.contains(r#""age":30"#));
/// ```
pub fn to_json_string(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string(&to_json(value))
}

/// Convert a PHP value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_json(value))
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;
    use crate::from_bytes;

    #[test]
    fn test_simple_types() {
        assert_eq!(to_json(&Value::Null), JsonValue::Null);
        assert_eq!(to_json(&Value::Bool(true)), JsonValue::Bool(true));
        assert_eq!(to_json(&Value::Int(42)), json!(42));
        assert_eq!(to_json(&Value::UInt(u64::MAX)), json!(u64::MAX));
        assert_eq!(to_json(&Value::Float(3.14)), json!(3.14));
        assert_eq!(to_json(&Value::Float(f64::NAN)), JsonValue::Null);
        assert_eq!(to_json(&Value::Float(f64::NEG_INFINITY)), json!("-Infinity"));
    }

    #[test]
    fn test_indexed_array() {
        let value = from_bytes(b"a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}").unwrap();
        assert_eq!(to_json(&value), json!(["foo", "bar"]));
    }

    #[test]
    fn test_associative_array() {
        let value = from_bytes(b"a:2:{s:4:\"name\";s:5:\"Alice\";s:3:\"age\";i:30;}").unwrap();
        assert_eq!(to_json(&value), json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn test_mixed_array() {
        // Non-sequential keys -> object
        let value = from_bytes(b"a:2:{i:0;s:3:\"foo\";i:5;s:3:\"bar\";}").unwrap();
        assert_eq!(to_json(&value), json!({"0": "foo", "5": "bar"}));
    }

    #[test]
    fn test_object() {
        let value = from_bytes(b"O:4:\"User\":1:{s:7:\"\x00*\x00name\";s:4:\"John\";}").unwrap();
        assert_eq!(to_json(&value), json!({"__class__": "User", "name": "John"}));
    }

    #[test]
    fn test_nested() {
        let data = b"a:1:{s:4:\"user\";a:2:{s:4:\"name\";s:5:\"Alice\";s:3:\"age\";i:30;}}";
        let value = from_bytes(data).unwrap();
        assert_eq!(to_json(&value), json!({"user": {"name": "Alice", "age": 30}}));
    }

    #[test]
    fn test_from_json() {
        let json = json!({
            "user": {"__class__": "User", "id": 1},
            "tags": ["a", "b"],
            "score": 1.5,
            "big": u64::MAX,
            "none": null
        });
        let value = from_json(&json);
        let user = value.get("user").unwrap();
        assert!(user.is_object());
        assert_eq!(user.get("id").and_then(Value::as_int), Some(1));
        assert!(user.get(CLASS_FIELD).is_none());
        assert_eq!(value.get("tags").and_then(Value::as_seq).map(<[_]>::len), Some(2));
        assert_eq!(value.get("score"), Some(&Value::Float(1.5)));
        assert_eq!(value.get("big"), Some(&Value::UInt(u64::MAX)));
        assert_eq!(to_json(&value), json);
    }

    #[test]
    fn test_deep_values() {
        let depth = 4095;
        let mut data = b"a:1:{i:0;".repeat(depth);
        data.extend_from_slice(b"N;");
        data.extend(std::iter::repeat(b'}').take(depth));
        let value = from_bytes(&data).unwrap();

        let json = to_json(&value);
        let mut levels = 0;
        let mut cursor = &json;
        while let JsonValue::Array(items) = cursor {
            cursor = &items[0];
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(cursor, &JsonValue::Null);

        let back = from_json(&json);
        assert_eq!(back, value);

        // serde_json drops its own values recursively; unwind it by hand.
        let mut json = json;
        while let JsonValue::Array(mut items) = json {
            json = items.pop().unwrap_or(JsonValue::Null);
        }
    }
}
