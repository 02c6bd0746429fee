//! Zero-copy PHP unserialize parser.
//!
//! Strings, keys and class names borrow directly from the input. Nested
//! arrays and objects are tracked on an explicit heap stack rather than
//! through recursion, so the depth limit bounds memory instead of racing
//! the thread's stack.
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for detailed parsing instrumentation:
//!
//! ```toml
//! php-serialize-core = { version = "0.1", features = ["tracing"] }
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::Hash;
use std::mem;

use bstr::BString;
use memchr::memrchr;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::config::ParserConfig;
use crate::cursor::Cursor;
use crate::error::{ErrorKind, Malformation, PhpSerializeError, Result};
use crate::types::{Key, Value};

/// A zero-copy PHP unserialize parser.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: ParserConfig,
}

/// One scanned token: either a finished value or the header of a container
/// whose body follows.
enum Token<'a> {
    Value(Value<'a>),
    Open(Frame<'a>),
}

/// An array or object whose body is being read.
enum Frame<'a> {
    Array {
        start: usize,
        remaining: usize,
        key: Option<Key<'a>>,
        entries: Vec<(Key<'a>, Value<'a>)>,
    },
    Object {
        start: usize,
        class_name: Cow<'a, [u8]>,
        remaining: usize,
        name: Option<Cow<'a, [u8]>>,
        properties: Vec<(Cow<'a, [u8]>, Value<'a>)>,
    },
}

impl<'a> Frame<'a> {
    fn start(&self) -> usize {
        match self {
            Frame::Array { start, .. } | Frame::Object { start, .. } => *start,
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Frame::Array { remaining, key, .. } => *remaining == 0 && key.is_none(),
            Frame::Object {
                remaining, name, ..
            } => *remaining == 0 && name.is_none(),
        }
    }

    /// Hand a finished child to this frame; children alternate between key
    /// and value.
    fn accept(&mut self, value: Value<'a>, position: usize) -> Result<()> {
        match self {
            Frame::Array {
                remaining,
                key,
                entries,
                ..
            } => match key.take() {
                None => *key = Some(array_key(value, position)?),
                Some(k) => {
                    entries.push((k, value));
                    *remaining -= 1;
                }
            },
            Frame::Object {
                remaining,
                name,
                properties,
                ..
            } => match name.take() {
                None => *name = Some(property_name(value, position)?),
                Some(n) => {
                    properties.push((n, value));
                    *remaining -= 1;
                }
            },
        }
        Ok(())
    }

    fn finish(self) -> Value<'a> {
        match self {
            Frame::Array { entries, .. } => {
                let sequential = !entries.is_empty()
                    && entries
                        .iter()
                        .zip(0i64..)
                        .all(|((k, _), i)| *k == Key::Int(i));
                if sequential {
                    Value::Seq(entries.into_iter().map(|(_, v)| v).collect())
                } else {
                    Value::Map(dedup_keys(entries))
                }
            }
            Frame::Object {
                class_name,
                properties,
                ..
            } => Value::Object {
                class_name,
                properties: dedup_keys(properties),
            },
        }
    }
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, ParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    pub fn with_config(data: &'a [u8], config: ParserConfig) -> Self {
        Self {
            cursor: Cursor::new(data),
            config,
        }
    }

    /// Current byte offset in the input.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Whether all input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Parse the input as exactly one PHP value.
    ///
    /// Bytes after the value are ignored unless `allow_trailing` is turned
    /// off, in which case they are an error.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(data_len = self.cursor.data().len())))]
    pub fn parse(&mut self) -> Result<Value<'a>> {
        #[cfg(feature = "tracing")]
        debug!(data_len = self.cursor.data().len(), "Starting PHP unserialize");

        let result = self.parse_next().and_then(|value| {
            if !self.config.allow_trailing && !self.cursor.is_at_end() {
                let pos = self.cursor.position();
                return Err(PhpSerializeError::malformed(
                    Malformation::TrailingData(self.cursor.remaining()),
                    pos,
                )
                .with_input_preview(self.cursor.data(), pos));
            }
            Ok(value)
        });

        #[cfg(feature = "tracing")]
        match &result {
            Ok(value) => debug!(value_type = value.type_name(), "Parse completed successfully"),
            Err(e) => warn!(error = %e, "Parse failed"),
        }

        result
    }

    /// Parse the next value and leave the cursor right after it.
    ///
    /// Use this to walk a stream of concatenated values. After an error the
    /// cursor position is wherever the fault was found; in particular a
    /// disallowed class aborts right after its name without reading the
    /// object body.
    pub fn parse_next(&mut self) -> Result<Value<'a>> {
        let max_depth = self.config.effective_max_depth();
        let mut stack: Vec<Frame<'a>> = Vec::new();

        loop {
            let depth = stack.len();
            if depth >= max_depth {
                #[cfg(feature = "tracing")]
                warn!(depth, max_depth, "Max depth exceeded");
                return Err(PhpSerializeError::at(
                    ErrorKind::DepthExceeded { max_depth },
                    self.cursor.position(),
                ));
            }

            let start = self.cursor.position();
            let mut completed = match self.parse_token()? {
                Token::Value(value) => Some((value, start)),
                Token::Open(frame) => {
                    stack.push(frame);
                    None
                }
            };

            loop {
                if let Some((value, at)) = completed.take() {
                    match stack.last_mut() {
                        None => return Ok(value),
                        Some(parent) => parent.accept(value, at)?,
                    }
                }
                if !stack.last().is_some_and(Frame::is_complete) {
                    break;
                }
                if let Some(frame) = stack.pop() {
                    self.cursor.expect_byte(b'}')?;
                    let at = frame.start();
                    completed = Some((frame.finish(), at));
                }
            }
        }
    }

    /// Scan one type tag and its payload or container header.
    fn parse_token(&mut self) -> Result<Token<'a>> {
        let start = self.cursor.position();
        let tag = self.cursor.read_byte()?;

        #[cfg(feature = "tracing")]
        trace!(type_tag = %char::from(tag), pos = start, "Parsing value");

        if !matches!(tag, b'N' | b'b' | b'i' | b'u' | b'd' | b's' | b'a' | b'O') {
            #[cfg(feature = "tracing")]
            warn!(type_tag = %char::from(tag), pos = start, "Unknown type tag");
            return Err(
                PhpSerializeError::malformed(Malformation::UnknownType(tag as char), start)
                    .with_input_preview(self.cursor.data(), start),
            );
        }

        if tag == b'N' {
            self.cursor.expect_byte(b';')?;
            return Ok(Token::Value(Value::Null));
        }
        self.cursor.expect_byte(b':')?;

        let token = match tag {
            b'b' => Token::Value(Value::Bool(self.cursor.read_until(b';')? == b"1")),
            b'i' => Token::Value(self.parse_int()?),
            b'u' => Token::Value(self.parse_uint()?),
            b'd' => Token::Value(self.parse_float()?),
            b's' => Token::Value(self.parse_string()?),
            b'a' => Token::Open(self.parse_array_header(start)?),
            _ => Token::Open(self.parse_object_header(start)?),
        };
        Ok(token)
    }

    /// Parse an integer payload: `<value>;`
    fn parse_int(&mut self) -> Result<Value<'a>> {
        let (text, start) = self.cursor.read_scalar_field(Malformation::InvalidInteger)?;
        text.parse()
            .map(Value::Int)
            .map_err(|_| self.invalid(Malformation::InvalidInteger(text.to_string()), start))
    }

    /// Parse an unsigned extension payload: `<value>;`
    fn parse_uint(&mut self) -> Result<Value<'a>> {
        let (text, start) = self.cursor.read_scalar_field(Malformation::InvalidInteger)?;
        let value: u64 = text
            .parse()
            .map_err(|_| self.invalid(Malformation::InvalidInteger(text.to_string()), start))?;
        Ok(i64::try_from(value).map_or(Value::UInt(value), Value::Int))
    }

    /// Parse a float payload: `<value>;`, including PHP's `NAN`/`INF`/`-INF`.
    fn parse_float(&mut self) -> Result<Value<'a>> {
        let (text, start) = self.cursor.read_scalar_field(Malformation::InvalidFloat)?;
        let value = match text {
            "NAN" => f64::NAN,
            "INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            _ => text
                .parse()
                .map_err(|_| self.invalid(Malformation::InvalidFloat(text.to_string()), start))?,
        };
        Ok(Value::Float(value))
    }

    /// Parse a string payload: `<len>:"<bytes>";`
    ///
    /// Exactly `len` bytes are taken; quotes or semicolons inside the payload
    /// are data.
    fn parse_string(&mut self) -> Result<Value<'a>> {
        let len = self.cursor.read_length(b':')?;
        self.cursor.expect_byte(b'"')?;
        let bytes = self.cursor.read_exact(len)?;
        self.cursor.expect_byte(b'"')?;
        self.cursor.expect_byte(b';')?;
        Ok(Value::Str(Cow::Borrowed(bytes)))
    }

    /// Parse an array header: `<count>:{`
    fn parse_array_header(&mut self, start: usize) -> Result<Frame<'a>> {
        let count = self.cursor.read_length(b':')?;
        self.cursor.expect_byte(b'{')?;
        Ok(Frame::Array {
            start,
            remaining: count,
            key: None,
            // Cap initial allocation; the count comes from untrusted input.
            entries: Vec::with_capacity(count.min(1024)),
        })
    }

    /// Parse an object header: `<namelen>:"<name>":<count>:{`
    fn parse_object_header(&mut self, start: usize) -> Result<Frame<'a>> {
        let name_len = self.cursor.read_length(b':')?;
        self.cursor.expect_byte(b'"')?;
        let name_start = self.cursor.position();
        let class_name = self.cursor.read_exact(name_len)?;

        if !self.config.allowed_classes.allows(class_name) {
            #[cfg(feature = "tracing")]
            warn!(class = %bstr::BStr::new(class_name), pos = name_start, "Class not allowed");
            return Err(PhpSerializeError::at(
                ErrorKind::ClassNotAllowed(BString::from(class_name)),
                name_start,
            ));
        }

        self.cursor.expect_byte(b'"')?;
        self.cursor.expect_byte(b':')?;
        let count = self.cursor.read_length(b':')?;
        self.cursor.expect_byte(b'{')?;

        Ok(Frame::Object {
            start,
            class_name: Cow::Borrowed(class_name),
            remaining: count,
            name: None,
            properties: Vec::with_capacity(count.min(1024)),
        })
    }

    #[cold]
    fn invalid(&self, malformation: Malformation, at: usize) -> PhpSerializeError {
        PhpSerializeError::malformed(malformation, at).with_input_preview(self.cursor.data(), at)
    }
}

/// Turn a decoded key token into an array key.
///
/// Integers and strings are taken as-is. Other scalars fall back to their
/// display form; containers are rejected.
fn array_key(mut value: Value<'_>, position: usize) -> Result<Key<'_>> {
    let type_name = value.type_name();
    match &mut value {
        Value::Int(i) => Ok(Key::Int(*i)),
        Value::Str(s) => Ok(Key::Str(mem::take(s))),
        Value::Seq(_) | Value::Map(_) | Value::Object { .. } => Err(PhpSerializeError::malformed(
            Malformation::InvalidKey(type_name),
            position,
        )),
        scalar => Ok(Key::Str(Cow::Owned(scalar.to_string().into_bytes()))),
    }
}

/// Turn a decoded property-name token into an exposed property name.
fn property_name(value: Value<'_>, position: usize) -> Result<Cow<'_, [u8]>> {
    Ok(match array_key(value, position)? {
        Key::Str(Cow::Borrowed(name)) => Cow::Borrowed(strip_visibility(name)),
        Key::Str(Cow::Owned(name)) => Cow::Owned(strip_visibility(&name).to_vec()),
        Key::Int(i) => Cow::Owned(i.to_string().into_bytes()),
    })
}

/// Strip PHP's private/protected marker from a property name.
///
/// Private names are serialized as `\0Class\0name` and protected ones as
/// `\0*\0name`; either way the exposed name follows the last NUL byte.
pub fn strip_visibility(name: &[u8]) -> &[u8] {
    match memrchr(0, name) {
        Some(nul) => &name[nul + 1..],
        None => name,
    }
}

/// Collapse duplicate keys, later values replacing earlier ones in place.
fn dedup_keys<K: Hash + Eq, V>(entries: Vec<(K, V)>) -> Vec<(K, V)> {
    // Index of each key's first occurrence.
    let first: Vec<usize> = {
        let mut seen = HashMap::with_capacity(entries.len());
        entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| *seen.entry(k).or_insert(i))
            .collect()
    };
    if first.iter().enumerate().all(|(i, &f)| i == f) {
        return entries;
    }

    let mut slots = vec![0; entries.len()];
    let mut unique: Vec<(K, V)> = Vec::with_capacity(entries.len());
    for (i, (k, v)) in entries.into_iter().enumerate() {
        if first[i] == i {
            slots[i] = unique.len();
            unique.push((k, v));
        } else {
            unique[slots[first[i]]].1 = v;
        }
    }
    unique
}

/// Parse PHP serialized data from bytes.
///
/// This is the primary API for decoding PHP serialized data.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::from_bytes;
///
/// let value = from_bytes(b"i:42;").unwrap();
/// assert_eq!(value.as_int(), Some(42));
/// ```
#[inline]
pub fn from_bytes(data: &[u8]) -> Result<Value<'_>> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), "from_bytes called");

    Parser::new(data).parse()
}

/// Parse PHP serialized data from bytes with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes_with_config, ParserConfig};
///
/// let config = ParserConfig::default()
///     .with_max_depth(64)
///     .with_allowed_classes(["User"]);
/// let value = from_bytes_with_config(b"i:42;", config).unwrap();
/// assert_eq!(value.as_int(), Some(42));
/// ```
#[inline]
pub fn from_bytes_with_config(data: &[u8], config: ParserConfig) -> Result<Value<'_>> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), ?config, "from_bytes_with_config called");

    Parser::with_config(data, config).parse()
}
