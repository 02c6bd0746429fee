//! PHP serialize encoder.
//!
//! Writes a [`Value`] into one growable output buffer. Nested containers
//! are walked with an explicit stack of child iterators, so encoding deep
//! values costs heap, not thread stack.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::iter::Enumerate;
use std::slice::Iter;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, warn};

use crate::config::EncoderConfig;
use crate::error::{ErrorKind, PhpSerializeError, Result};
use crate::types::{Key, Value};

/// A PHP serialize encoder writing into an owned buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    out: Vec<u8>,
    config: EncoderConfig,
}

/// Children of a container that still have to be written.
enum Pending<'v, 'a> {
    Seq(Enumerate<Iter<'v, Value<'a>>>),
    Map(Iter<'v, (Key<'a>, Value<'a>)>),
    Object(Iter<'v, (Cow<'a, [u8]>, Value<'a>)>),
}

impl<'v, 'a> Pending<'v, 'a> {
    /// Write the next child's key and return its value.
    fn next_child(&mut self, out: &mut Vec<u8>) -> Option<&'v Value<'a>> {
        match self {
            Pending::Seq(items) => items.next().map(|(index, value)| {
                write_tagged(out, b'i', index);
                value
            }),
            Pending::Map(entries) => entries.next().map(|(key, value)| {
                match key {
                    Key::Int(i) => write_tagged(out, b'i', i),
                    Key::Str(s) => write_string(out, s),
                }
                value
            }),
            Pending::Object(properties) => properties.next().map(|(name, value)| {
                write_string(out, name);
                value
            }),
        }
    }
}

impl Encoder {
    /// Create an encoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with custom configuration.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            // Pre-allocate a reasonable size.
            out: Vec::with_capacity(256),
            config,
        }
    }

    /// Append the encoding of `value` to the buffer.
    #[cfg_attr(feature = "tracing", instrument(skip(self, value), fields(value_type = value.type_name())))]
    pub fn encode(&mut self, value: &Value<'_>) -> Result<()> {
        let result = self.write_tree(value);

        #[cfg(feature = "tracing")]
        match &result {
            Ok(()) => debug!(len = self.out.len(), "Encode completed successfully"),
            Err(e) => warn!(error = %e, "Encode failed"),
        }

        result
    }

    /// Append the encoding of an object value; anything else is rejected.
    pub fn encode_object(&mut self, value: &Value<'_>) -> Result<()> {
        if !value.is_object() {
            return Err(PhpSerializeError::new(ErrorKind::UnsupportedType(value.type_name()))
                .with_context("expected an object"));
        }
        self.encode(value)
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Consume the encoder and return its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    fn write_tree(&mut self, root: &Value<'_>) -> Result<()> {
        let mut stack: Vec<Pending<'_, '_>> = Vec::new();
        let mut next = Some(root);

        loop {
            if let Some(value) = next.take() {
                self.check_depth(stack.len())?;
                if let Some(children) = self.write_value(value)? {
                    stack.push(children);
                }
            }

            let Some(top) = stack.last_mut() else {
                return Ok(());
            };
            match top.next_child(&mut self.out) {
                Some(child) => next = Some(child),
                None => {
                    stack.pop();
                    self.out.push(b'}');
                }
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        let max_depth = self.config.max_depth;
        if max_depth > 0 && depth >= max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth, max_depth, "Max depth exceeded");
            return Err(PhpSerializeError::new(ErrorKind::DepthExceeded { max_depth }));
        }
        Ok(())
    }

    /// Write a scalar fully, or a container's header and return its children.
    fn write_value<'v, 'a>(&mut self, value: &'v Value<'a>) -> Result<Option<Pending<'v, 'a>>> {
        let out = &mut self.out;
        match value {
            Value::Null => out.extend_from_slice(b"N;"),
            Value::Bool(b) => out.extend_from_slice(if *b { b"b:1;" } else { b"b:0;" }),
            Value::Int(i) => write_tagged(out, b'i', i),
            Value::UInt(u) => {
                if !self.config.strict {
                    write_tagged(out, b'u', u);
                } else if i64::try_from(*u).is_ok() {
                    write_tagged(out, b'i', u);
                } else {
                    #[cfg(feature = "tracing")]
                    warn!(value = *u, "Unsigned integer exceeds PHP int range");
                    return Err(PhpSerializeError::new(ErrorKind::IntegerOverflow(*u)));
                }
            }
            Value::Float(f) => write_float(out, *f),
            Value::Str(s) => write_string(out, s),
            Value::Seq(items) => {
                write_array_header(out, items.len());
                return Ok(Some(Pending::Seq(items.iter().enumerate())));
            }
            Value::Map(entries) => {
                write_array_header(out, entries.len());
                return Ok(Some(Pending::Map(entries.iter())));
            }
            Value::Object {
                class_name,
                properties,
            } => {
                out.extend_from_slice(b"O:");
                push_display(out, class_name.len());
                out.extend_from_slice(b":\"");
                out.extend_from_slice(class_name);
                out.extend_from_slice(b"\":");
                push_display(out, properties.len());
                out.extend_from_slice(b":{");
                return Ok(Some(Pending::Object(properties.iter())));
            }
        }
        Ok(None)
    }
}

fn push_display(out: &mut Vec<u8>, value: impl fmt::Display) {
    // Writing into a Vec<u8> cannot fail.
    let _ = write!(out, "{}", value);
}

/// `<tag>:<n>;`
fn write_tagged(out: &mut Vec<u8>, tag: u8, n: impl fmt::Display) {
    out.push(tag);
    out.push(b':');
    push_display(out, n);
    out.push(b';');
}

/// `s:<byte length>:"<bytes>";`
fn write_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(b"s:");
    push_display(out, bytes.len());
    out.extend_from_slice(b":\"");
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"\";");
}

fn write_array_header(out: &mut Vec<u8>, count: usize) {
    out.extend_from_slice(b"a:");
    push_display(out, count);
    out.extend_from_slice(b":{");
}

/// Finite floats use Rust's shortest round-trip form, which never switches
/// to exponent notation.
fn write_float(out: &mut Vec<u8>, f: f64) {
    if f.is_nan() {
        out.extend_from_slice(b"d:NAN;");
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            out.extend_from_slice(b"d:INF;");
        } else {
            out.extend_from_slice(b"d:-INF;");
        }
    } else {
        write_tagged(out, b'd', f);
    }
}

/// Serialize a value with default configuration.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{to_bytes, Value};
///
/// let bytes = to_bytes(&Value::from("héllo")).unwrap();
/// assert_eq!(bytes, "s:6:\"héllo\";".as_bytes());
/// ```
#[inline]
pub fn to_bytes(value: &Value<'_>) -> Result<Vec<u8>> {
    to_bytes_with_config(value, EncoderConfig::default())
}

/// Serialize a value with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{to_bytes_with_config, EncoderConfig, Value};
///
/// let config = EncoderConfig::default().with_strict(false);
/// let bytes = to_bytes_with_config(&Value::UInt(u64::MAX), config).unwrap();
/// assert_eq!(bytes, b"u:18446744073709551615;");
/// ```
pub fn to_bytes_with_config(value: &Value<'_>, config: EncoderConfig) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_config(config);
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// Serialize an object value; any other variant is `UnsupportedType`.
pub fn object_to_bytes_with_config(value: &Value<'_>, config: EncoderConfig) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_config(config);
    encoder.encode_object(value)?;
    Ok(encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::from_bytes;

    fn encode(value: &Value<'_>) -> String {
        String::from_utf8(to_bytes(value).unwrap()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encode(&Value::Null), "N;");
        assert_eq!(encode(&Value::Bool(true)), "b:1;");
        assert_eq!(encode(&Value::Bool(false)), "b:0;");
        assert_eq!(encode(&Value::Int(-42)), "i:-42;");
        assert_eq!(encode(&Value::Int(i64::MIN)), "i:-9223372036854775808;");
        assert_eq!(encode(&Value::from("hello")), "s:5:\"hello\";");
        assert_eq!(encode(&Value::from("")), "s:0:\"\";");
    }

    #[test]
    fn test_string_length_counts_bytes() {
        // Two characters, six UTF-8 bytes.
        assert_eq!(encode(&Value::from("한글")), "s:6:\"한글\";");
        assert_eq!(encode(&Value::from("😀")), "s:4:\"😀\";");
    }

    #[test]
    fn test_binary_string() {
        let bytes = to_bytes(&Value::from(vec![0u8, b'"', b';', 0xff])).unwrap();
        assert_eq!(bytes, b"s:4:\"\x00\";\xff\";");
    }

    #[test]
    fn test_floats() {
        assert_eq!(encode(&Value::Float(0.1)), "d:0.1;");
        assert_eq!(encode(&Value::Float(3.0)), "d:3;");
        assert_eq!(encode(&Value::Float(-2.5)), "d:-2.5;");
        assert_eq!(encode(&Value::Float(1e21)), "d:1000000000000000000000;");
        assert_eq!(encode(&Value::Float(1e-7)), "d:0.0000001;");
        assert_eq!(encode(&Value::Float(f64::NAN)), "d:NAN;");
        assert_eq!(encode(&Value::Float(f64::INFINITY)), "d:INF;");
        assert_eq!(encode(&Value::Float(f64::NEG_INFINITY)), "d:-INF;");
    }

    #[test]
    fn test_seq() {
        let value = Value::from(vec![Value::from("a"), Value::Int(2)]);
        assert_eq!(encode(&value), "a:2:{i:0;s:1:\"a\";i:1;i:2;}");
        assert_eq!(encode(&Value::Seq(vec![])), "a:0:{}");
    }

    #[test]
    fn test_map() {
        let value = Value::map([
            (Key::from("name"), Value::from("Alice")),
            (Key::Int(7), Value::Null),
        ]);
        assert_eq!(
            encode(&value),
            "a:2:{s:4:\"name\";s:5:\"Alice\";i:7;N;}"
        );
    }

    #[test]
    fn test_object() {
        let value = Value::object(&b"User"[..], [(&b"id"[..], Value::Int(123))]);
        assert_eq!(encode(&value), "O:4:\"User\":1:{s:2:\"id\";i:123;}");
    }

    #[test]
    fn test_nested() {
        let value = Value::map([(
            "user",
            Value::map([("tags", Value::from(vec![Value::from("x")]))]),
        )]);
        assert_eq!(
            encode(&value),
            "a:1:{s:4:\"user\";a:1:{s:4:\"tags\";a:1:{i:0;s:1:\"x\";}}}"
        );
    }

    #[test]
    fn test_encode_object_rejects_other_types() {
        let err = object_to_bytes_with_config(&Value::Int(1), EncoderConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType("integer"));

        let object = Value::object(&b"A"[..], Vec::<(&[u8], Value)>::new());
        assert_eq!(
            object_to_bytes_with_config(&object, EncoderConfig::default()).unwrap(),
            b"O:1:\"A\":0:{}"
        );
    }

    #[test]
    fn test_strict_overflow() {
        let err = to_bytes(&Value::UInt(u64::MAX)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IntegerOverflow(u64::MAX));

        assert_eq!(encode(&Value::UInt(5)), "i:5;");

        let lenient = EncoderConfig::default().with_strict(false);
        let bytes = to_bytes_with_config(&Value::UInt(u64::MAX), lenient.clone()).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), Value::UInt(u64::MAX));
        assert_eq!(to_bytes_with_config(&Value::UInt(5), lenient).unwrap(), b"u:5;");
    }

    #[test]
    fn test_max_depth() {
        let deep = Value::from(vec![Value::from(vec![Value::from(vec![Value::from(
            vec![Value::from("bottom")],
        )])])]);

        assert!(to_bytes_with_config(&deep, EncoderConfig::default().with_max_depth(5)).is_ok());

        let err = to_bytes_with_config(&deep, EncoderConfig::default().with_max_depth(2)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded { max_depth: 2 });

        // "bottom" sits at depth 4.
        assert!(to_bytes_with_config(&deep, EncoderConfig::default().with_max_depth(4)).is_err());
        assert!(to_bytes(&deep).is_ok());
    }

    #[test]
    fn test_encoder_appends() {
        let mut encoder = Encoder::new();
        encoder.encode(&Value::Int(1)).unwrap();
        encoder.encode(&Value::Null).unwrap();
        assert_eq!(encoder.as_bytes(), b"i:1;N;");
    }

    #[test]
    fn test_round_trip_scalars() {
        let values = [
            Value::Null,
            Value::Bool(true),
            Value::Int(i64::MAX),
            Value::Int(i64::MIN),
            Value::Float(0.0),
            Value::Float(-0.0),
            Value::Float(std::f64::consts::PI),
            Value::Float(f64::MAX),
            Value::Float(f64::MIN_POSITIVE),
            Value::Float(f64::NAN),
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
            Value::from(vec![0u8, 0xfe, 0xff, b'"']),
            Value::from("Émojis: 😀🎉"),
        ];
        for value in values {
            let bytes = to_bytes(&value).unwrap();
            assert_eq!(from_bytes(&bytes).unwrap(), value, "{}", value);
        }
    }

    #[test]
    fn test_round_trip_containers() {
        let value = Value::map([
            (Key::from("nested"), Value::map([("deep", Value::map([("value", Value::from("test"))]))])),
            (Key::from("list"), Value::from(vec![Value::Int(1), Value::Int(2)])),
            (Key::Int(5), Value::object(&b"User"[..], [(&b"id"[..], Value::Int(1))])),
            (Key::from(""), Value::from("empty key")),
        ]);
        let bytes = to_bytes(&value).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn test_empty_seq_decodes_as_map() {
        let bytes = to_bytes(&Value::Seq(vec![])).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), Value::Map(vec![]));
    }
}
