//! Option-based entry points.
//!
//! These wrap the encoder and parser for callers that prefer passing a list
//! of [`CodecOption`]s over building config structs, and add a validity
//! check plus panicking variants for abort-on-error call sites.

use crate::config::{CodecOption, EncoderConfig, ParserConfig};
use crate::encoder::{object_to_bytes_with_config, to_bytes_with_config};
use crate::error::Result;
use crate::parser::from_bytes_with_config;
use crate::types::Value;

/// Serialize `value` with the given options.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{encode, CodecOption, Value};
///
/// let value = Value::from(vec![Value::from("a"), Value::from(1)]);
/// let bytes = encode(&value, &[CodecOption::MaxDepth(8)]).unwrap();
/// assert_eq!(bytes, br#"a:2:{i:0;s:1:"a";i:1;i:1;}"#);
/// ```
pub fn encode(value: &Value<'_>, options: &[CodecOption]) -> Result<Vec<u8>> {
    to_bytes_with_config(value, EncoderConfig::from_options(options))
}

/// Serialize an object value with the given options.
pub fn encode_object(value: &Value<'_>, options: &[CodecOption]) -> Result<Vec<u8>> {
    object_to_bytes_with_config(value, EncoderConfig::from_options(options))
}

/// Unserialize `data` with the given options.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{decode, CodecOption};
///
/// let data = br#"O:4:"User":1:{s:2:"id";i:123;}"#;
/// assert!(decode(data, &[CodecOption::allowed_classes(["User"])]).is_ok());
/// assert!(decode(data, &[CodecOption::DisableObjects]).is_err());
/// ```
pub fn decode<'a>(data: &'a [u8], options: &[CodecOption]) -> Result<Value<'a>> {
    from_bytes_with_config(data, ParserConfig::from_options(options))
}

/// Whether `data` starts with one well-formed serialized value under default
/// settings. Bytes after that value are ignored.
pub fn is_valid(data: &[u8]) -> bool {
    decode(data, &[]).is_ok()
}

/// Serialize `value`, panicking on failure.
///
/// # Panics
///
/// Panics if the value cannot be encoded under `options`.
pub fn must_encode(value: &Value<'_>, options: &[CodecOption]) -> Vec<u8> {
    match encode(value, options) {
        Ok(bytes) => bytes,
        Err(e) => panic!("php serialize failed: {}", e),
    }
}

/// Unserialize `data`, panicking on failure.
///
/// # Panics
///
/// Panics if `data` does not decode under `options`.
pub fn must_decode<'a>(data: &'a [u8], options: &[CodecOption]) -> Value<'a> {
    match decode(data, options) {
        Ok(value) => value,
        Err(e) => panic!("php unserialize failed: {}", e),
    }
}

/// Byte length of a string as PHP's `strlen` reports it.
#[inline]
pub fn php_strlen(s: &str) -> usize {
    s.len()
}

/// Whether `bytes` are valid UTF-8.
#[inline]
pub fn is_utf8(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Malformation};
    use crate::types::Key;

    #[test]
    fn test_is_valid() {
        assert!(is_valid(b"N;"));
        assert!(is_valid(br#"a:1:{s:3:"key";s:5:"value";}"#));
        assert!(!is_valid(b"i:123"));
        assert!(!is_valid(b""));
        assert!(!is_valid(b"garbage"));
        assert!(is_valid(b"i:1;x"));
    }

    #[test]
    fn test_reject_trailing_option() {
        assert_eq!(decode(b"i:1;i:2;", &[]).unwrap(), Value::Int(1));
        assert!(matches!(
            decode(b"i:1;i:2;", &[CodecOption::RejectTrailing]).unwrap_err().kind,
            ErrorKind::Malformed(Malformation::TrailingData(4))
        ));
        assert!(encode(&Value::Null, &[CodecOption::RejectTrailing]).is_ok());
    }

    #[test]
    fn test_combined_options() {
        let value = Value::map([
            ("nested", Value::map([("deep", Value::map([("value", Value::from("test"))]))])),
            ("zebra", Value::Int(1)),
            ("apple", Value::Int(2)),
        ]);
        let options = [CodecOption::MaxDepth(10), CodecOption::StrictNumeric(true)];
        let bytes = encode(&value, &options).unwrap();
        assert_eq!(decode(&bytes, &[CodecOption::MaxDepth(10)]).unwrap(), value);
    }

    #[test]
    fn test_decode_depth_option() {
        let data = b"a:1:{i:0;a:1:{i:0;a:1:{i:0;i:1;}}}";
        assert_eq!(
            decode(data, &[CodecOption::MaxDepth(2)]).unwrap_err().kind,
            ErrorKind::DepthExceeded { max_depth: 2 }
        );
        assert!(decode(data, &[CodecOption::MaxDepth(5)]).is_ok());
        assert!(decode(data, &[CodecOption::MaxDepth(0)]).is_ok());
    }

    #[test]
    fn test_allowed_classes_options() {
        let data = br#"O:4:"User":1:{s:2:"id";i:123;}"#;

        let value = decode(data, &[CodecOption::allowed_classes(["User", "Admin"])]).unwrap();
        assert_eq!(value.get("id").and_then(Value::as_int), Some(123));

        for options in [
            vec![CodecOption::allowed_classes(["Admin"])],
            vec![CodecOption::AllowedClasses(vec![])],
            vec![CodecOption::DisableObjects],
        ] {
            assert!(matches!(
                decode(data, &options).unwrap_err().kind,
                ErrorKind::ClassNotAllowed(_)
            ));
        }
    }

    #[test]
    fn test_strict_numeric_option() {
        let value = Value::UInt(u64::MAX);
        assert_eq!(
            encode(&value, &[]).unwrap_err().kind,
            ErrorKind::IntegerOverflow(u64::MAX)
        );

        let bytes = encode(&value, &[CodecOption::StrictNumeric(false)]).unwrap();
        assert_eq!(decode(&bytes, &[]).unwrap(), value);
    }

    #[test]
    fn test_encode_object() {
        let object = Value::object(&b"User"[..], [(&b"name"[..], Value::from("John"))]);
        let bytes = encode_object(&object, &[]).unwrap();
        assert_eq!(decode(&bytes, &[]).unwrap(), object);

        assert_eq!(
            encode_object(&Value::from("x"), &[]).unwrap_err().kind,
            ErrorKind::UnsupportedType("string")
        );
    }

    #[test]
    fn test_must_variants() {
        let bytes = must_encode(&Value::Int(42), &[]);
        assert_eq!(bytes, b"i:42;");
        assert_eq!(must_decode(&bytes, &[]), Value::Int(42));
    }

    #[test]
    #[should_panic(expected = "php unserialize failed")]
    fn test_must_decode_panics() {
        must_decode(b"invalid", &[]);
    }

    #[test]
    #[should_panic(expected = "php serialize failed")]
    fn test_must_encode_panics() {
        must_encode(&Value::UInt(u64::MAX), &[]);
    }

    #[test]
    fn test_integer_keys_round_trip() {
        let value = Value::map([(Key::Int(1), Value::from("one")), (Key::Int(10), Value::from("ten"))]);
        let bytes = encode(&value, &[]).unwrap();
        assert_eq!(bytes, br#"a:2:{i:1;s:3:"one";i:10;s:3:"ten";}"#);
        assert_eq!(decode(&bytes, &[]).unwrap(), value);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(php_strlen("hello"), 5);
        assert_eq!(php_strlen("Hello 世界"), 12);
        assert_eq!(php_strlen("😀"), 4);
        assert!(is_utf8("世界".as_bytes()));
        assert!(!is_utf8(&[0xff, 0xfe, 0xfd]));
    }
}
