//! PHP value types.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::slice;

use bstr::ByteSlice;

use crate::error::{ErrorKind, PhpSerializeError, Result};
use crate::tree::rebuild;

/// A value exchanged across the codec boundary.
///
/// String payloads borrow from the decoded input when possible; use
/// [`Value::into_owned`] to detach a decoded value from its input.
///
/// Cloning, comparing, formatting and dropping walk nested values with a
/// heap stack, so any value the decoder accepts can be handled on a normal
/// thread stack.
#[derive(Default)]
pub enum Value<'a> {
    /// PHP null value.
    #[default]
    Null,

    /// PHP boolean value.
    Bool(bool),

    /// PHP integer value.
    Int(i64),

    /// Unsigned integer, written with the non-standard `u:` tag when strict
    /// mode is off.
    UInt(u64),

    /// PHP float/double value. May hold NaN or an infinity.
    Float(f64),

    /// PHP string value. A byte sequence, not necessarily UTF-8.
    Str(Cow<'a, [u8]>),

    /// An array whose keys are exactly `0..n-1` in order.
    Seq(Vec<Value<'a>>),

    /// Any other array, in insertion order.
    Map(Vec<(Key<'a>, Value<'a>)>),

    /// A generic PHP object.
    Object {
        /// The class name of the object.
        class_name: Cow<'a, [u8]>,
        /// Properties with visibility markers already stripped.
        properties: Vec<(Cow<'a, [u8]>, Value<'a>)>,
    },
}

/// A PHP array key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key<'a> {
    /// Integer key.
    Int(i64),
    /// Byte-string key.
    Str(Cow<'a, [u8]>),
}

impl<'a> Key<'a> {
    /// Convert to an owned key that doesn't borrow from the input.
    pub fn into_owned(self) -> Key<'static> {
        match self {
            Key::Int(i) => Key::Int(i),
            Key::Str(s) => Key::Str(Cow::Owned(s.into_owned())),
        }
    }

    /// Get the key as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    /// Get the key as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Key::Str(s) => Some(s.as_ref()),
            Key::Int(_) => None,
        }
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => write!(f, "\"{}\"", s.as_bstr()),
        }
    }
}

impl From<i64> for Key<'_> {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(s: &'a str) -> Self {
        Key::Str(Cow::Borrowed(s.as_bytes()))
    }
}

impl From<String> for Key<'_> {
    fn from(s: String) -> Self {
        Key::Str(Cow::Owned(s.into_bytes()))
    }
}

impl<'a> From<&'a [u8]> for Key<'a> {
    fn from(s: &'a [u8]) -> Self {
        Key::Str(Cow::Borrowed(s))
    }
}

impl<'a> Value<'a> {
    /// Build a string value from anything byte-like.
    pub fn string(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Value::Str(bytes.into())
    }

    /// Build an object from a class name and `(name, value)` properties.
    pub fn object<N, I, K>(class_name: N, properties: I) -> Self
    where
        N: Into<Cow<'a, [u8]>>,
        I: IntoIterator<Item = (K, Value<'a>)>,
        K: Into<Cow<'a, [u8]>>,
    {
        Value::Object {
            class_name: class_name.into(),
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Build a map from `(key, value)` pairs.
    pub fn map<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value<'a>)>,
        K: Into<Key<'a>>,
    {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Check if the value is an ordered sequence.
    #[inline]
    pub fn is_seq(&self) -> bool {
        matches!(self, Value::Seq(_))
    }

    /// Check if the value is a keyed map.
    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Check if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object { .. })
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a signed integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Get the value as a float.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Get the value as a UTF-8 string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => std::str::from_utf8(s.as_ref()).ok(),
            _ => None,
        }
    }

    /// Get the value as a sequence.
    #[inline]
    pub fn as_seq(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get the value as map entries.
    #[inline]
    pub fn as_map(&self) -> Option<&[(Key<'a>, Value<'a>)]> {
        match self {
            Value::Map(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Look up a string key in a map or a property in an object.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        let key = key.as_bytes();
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_bytes() == Some(key))
                .map(|(_, v)| v),
            Value::Object { properties, .. } => properties
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up an element by integer index in a sequence or integer key in a map.
    pub fn get_index(&self, index: i64) -> Option<&Value<'a>> {
        match self {
            Value::Seq(items) => usize::try_from(index).ok().and_then(|i| items.get(i)),
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_int() == Some(index))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &'static str) -> PhpSerializeError {
        PhpSerializeError::new(ErrorKind::TypeMismatch {
            expected,
            found: self.type_name(),
        })
    }

    /// Get the value as a boolean or fail.
    pub fn expect_bool(&self) -> Result<bool> {
        self.as_bool().ok_or_else(|| self.mismatch("boolean"))
    }

    /// Get the value as an integer or fail.
    pub fn expect_int(&self) -> Result<i64> {
        self.as_int().ok_or_else(|| self.mismatch("integer"))
    }

    /// Get the value as a float or fail. Integers widen.
    pub fn expect_float(&self) -> Result<f64> {
        self.as_float().ok_or_else(|| self.mismatch("float"))
    }

    /// Get the value as raw bytes or fail.
    pub fn expect_bytes(&self) -> Result<&[u8]> {
        self.as_bytes().ok_or_else(|| self.mismatch("string"))
    }

    /// Get the value as UTF-8 text or fail.
    pub fn expect_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.mismatch("UTF-8 string"))
    }

    /// Get the value as a sequence or fail.
    pub fn expect_seq(&self) -> Result<&[Value<'a>]> {
        self.as_seq().ok_or_else(|| self.mismatch("sequence"))
    }

    /// Get the value as map entries or fail.
    pub fn expect_map(&self) -> Result<&[(Key<'a>, Value<'a>)]> {
        self.as_map().ok_or_else(|| self.mismatch("map"))
    }

    /// Get the class name and properties of an object or fail.
    #[allow(clippy::type_complexity)]
    pub fn expect_object(&self) -> Result<(&[u8], &[(Cow<'a, [u8]>, Value<'a>)])> {
        match self {
            Value::Object {
                class_name,
                properties,
            } => Ok((class_name.as_ref(), properties.as_slice())),
            _ => Err(self.mismatch("object")),
        }
    }

    /// Convert to an owned value that doesn't borrow from the input.
    pub fn into_owned(self) -> Value<'static> {
        rebuild(self, |mut value| value.detach_owned(), Value::attach)
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object { .. } => "object",
        }
    }
}

/// Where a child sits inside its container.
pub(crate) enum Label<'a> {
    Index,
    Key(Key<'a>),
    Property(Cow<'a, [u8]>),
}

impl<'a> Value<'a> {
    #[inline]
    fn is_container(&self) -> bool {
        matches!(self, Value::Seq(_) | Value::Map(_) | Value::Object { .. })
    }

    /// Append a finished child under `label`. Labels that don't fit the
    /// container kind are never produced by the tree walkers.
    pub(crate) fn attach(&mut self, label: Label<'a>, child: Value<'a>) {
        match (self, label) {
            (Value::Seq(items), _) => items.push(child),
            (Value::Map(entries), Label::Key(key)) => entries.push((key, child)),
            (Value::Object { properties, .. }, Label::Property(name)) => {
                properties.push((name, child));
            }
            _ => {}
        }
    }

    /// Copy this node without its children and list the children to visit.
    fn split_clone<'v>(&'v self) -> (Value<'a>, Vec<(Label<'a>, &'v Value<'a>)>) {
        match self {
            Value::Null => (Value::Null, Vec::new()),
            Value::Bool(b) => (Value::Bool(*b), Vec::new()),
            Value::Int(i) => (Value::Int(*i), Vec::new()),
            Value::UInt(u) => (Value::UInt(*u), Vec::new()),
            Value::Float(f) => (Value::Float(*f), Vec::new()),
            Value::Str(s) => (Value::Str(s.clone()), Vec::new()),
            Value::Seq(items) => (
                Value::Seq(Vec::with_capacity(items.len())),
                items.iter().map(|v| (Label::Index, v)).collect(),
            ),
            Value::Map(entries) => (
                Value::Map(Vec::with_capacity(entries.len())),
                entries
                    .iter()
                    .map(|(k, v)| (Label::Key(k.clone()), v))
                    .collect(),
            ),
            Value::Object {
                class_name,
                properties,
            } => (
                Value::Object {
                    class_name: class_name.clone(),
                    properties: Vec::with_capacity(properties.len()),
                },
                properties
                    .iter()
                    .map(|(n, v)| (Label::Property(n.clone()), v))
                    .collect(),
            ),
        }
    }

    /// Move this node's children out and return an owned, childless copy.
    fn detach_owned(&mut self) -> (Value<'static>, Vec<(Label<'static>, Value<'a>)>) {
        match self {
            Value::Null => (Value::Null, Vec::new()),
            Value::Bool(b) => (Value::Bool(*b), Vec::new()),
            Value::Int(i) => (Value::Int(*i), Vec::new()),
            Value::UInt(u) => (Value::UInt(*u), Vec::new()),
            Value::Float(f) => (Value::Float(*f), Vec::new()),
            Value::Str(s) => (Value::Str(Cow::Owned(mem::take(s).into_owned())), Vec::new()),
            Value::Seq(items) => (
                Value::Seq(Vec::with_capacity(items.len())),
                items.drain(..).map(|v| (Label::Index, v)).collect(),
            ),
            Value::Map(entries) => (
                Value::Map(Vec::with_capacity(entries.len())),
                entries
                    .drain(..)
                    .map(|(k, v)| (Label::Key(k.into_owned()), v))
                    .collect(),
            ),
            Value::Object {
                class_name,
                properties,
            } => (
                Value::Object {
                    class_name: Cow::Owned(mem::take(class_name).into_owned()),
                    properties: Vec::with_capacity(properties.len()),
                },
                properties
                    .drain(..)
                    .map(|(n, v)| (Label::Property(Cow::Owned(n.into_owned())), v))
                    .collect(),
            ),
        }
    }

    fn has_nested_containers(&self) -> bool {
        match self {
            Value::Seq(items) => items.iter().any(Value::is_container),
            Value::Map(entries) => entries.iter().any(|(_, v)| v.is_container()),
            Value::Object { properties, .. } => properties.iter().any(|(_, v)| v.is_container()),
            _ => false,
        }
    }

    /// Move child containers into `pending`; scalar children drop here.
    fn take_nested(&mut self, pending: &mut Vec<Value<'a>>) {
        match self {
            Value::Seq(items) => pending.extend(items.drain(..).filter(Value::is_container)),
            Value::Map(entries) => pending.extend(
                entries
                    .drain(..)
                    .map(|(_, v)| v)
                    .filter(Value::is_container),
            ),
            Value::Object { properties, .. } => pending.extend(
                properties
                    .drain(..)
                    .map(|(_, v)| v)
                    .filter(Value::is_container),
            ),
            _ => {}
        }
    }
}

impl Clone for Value<'_> {
    fn clone(&self) -> Self {
        rebuild(self, Value::split_clone, Value::attach)
    }
}

impl Drop for Value<'_> {
    fn drop(&mut self) {
        if !self.has_nested_containers() {
            return;
        }
        let mut pending = Vec::new();
        self.take_nested(&mut pending);
        while let Some(mut value) = pending.pop() {
            value.take_nested(&mut pending);
        }
    }
}

fn float_eq(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

/// Pair up the values of two keyed collections for comparison.
///
/// Entries listed in the same key order pair positionally. Otherwise both
/// sides need unique keys and the same key set, and values pair by key.
fn pair_entries<'v, K: Eq + Hash, V>(
    a: &'v [(K, V)],
    b: &'v [(K, V)],
    pending: &mut Vec<(&'v V, &'v V)>,
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.iter().zip(b).all(|((ka, _), (kb, _))| ka == kb) {
        pending.extend(a.iter().zip(b).map(|((_, va), (_, vb))| (va, vb)));
        return true;
    }

    let by_key: HashMap<&K, &V> = b.iter().map(|(k, v)| (k, v)).collect();
    if by_key.len() != b.len() {
        return false;
    }
    let mut seen = HashSet::with_capacity(a.len());
    for (k, va) in a {
        if !seen.insert(k) {
            return false;
        }
        match by_key.get(k) {
            Some(vb) => pending.push((va, *vb)),
            None => return false,
        }
    }
    true
}

/// Maps and objects compare by key regardless of entry order; NaN equals
/// NaN.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            let equal = match (a, b) {
                (Value::Null, Value::Null) => true,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Int(a), Value::Int(b)) => a == b,
                (Value::UInt(a), Value::UInt(b)) => a == b,
                (Value::Float(a), Value::Float(b)) => float_eq(*a, *b),
                (Value::Str(a), Value::Str(b)) => a == b,
                (Value::Seq(a), Value::Seq(b)) => {
                    let same_len = a.len() == b.len();
                    if same_len {
                        pending.extend(a.iter().zip(b));
                    }
                    same_len
                }
                (Value::Map(a), Value::Map(b)) => pair_entries(a, b, &mut pending),
                (
                    Value::Object {
                        class_name: ca,
                        properties: pa,
                    },
                    Value::Object {
                        class_name: cb,
                        properties: pb,
                    },
                ) => ca == cb && pair_entries(pa, pb, &mut pending),
                _ => false,
            };
            if !equal {
                return false;
            }
        }
        true
    }
}

/// Children of an open container that still have to be printed.
enum Shown<'v, 'a> {
    Seq(slice::Iter<'v, Value<'a>>),
    Map(slice::Iter<'v, (Key<'a>, Value<'a>)>),
    Object(slice::Iter<'v, (Cow<'a, [u8]>, Value<'a>)>),
}

/// Label printed before a child.
enum Prefix<'v, 'a> {
    None,
    Key(&'v Key<'a>),
    Property(&'v [u8]),
}

struct Open<'v, 'a> {
    children: Shown<'v, 'a>,
    close: &'static str,
    first: bool,
}

impl<'a> Value<'a> {
    /// Print the tree in display (`debug == false`) or debug form.
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, debug: bool) -> fmt::Result {
        let mut stack: Vec<Open<'_, 'a>> = Vec::new();
        let mut next = Some(self);

        loop {
            if let Some(value) = next.take() {
                if let Some(open) = value.write_open(f, debug)? {
                    stack.push(open);
                }
            }

            let Some(top) = stack.last_mut() else {
                return Ok(());
            };
            let child = match &mut top.children {
                Shown::Seq(items) => items.next().map(|v| (Prefix::None, v)),
                Shown::Map(entries) => entries.next().map(|(k, v)| (Prefix::Key(k), v)),
                Shown::Object(properties) => properties
                    .next()
                    .map(|(n, v)| (Prefix::Property(n.as_ref()), v)),
            };
            match child {
                Some((prefix, value)) => {
                    if !top.first {
                        f.write_str(", ")?;
                    }
                    top.first = false;
                    match prefix {
                        Prefix::None => {}
                        Prefix::Key(k) if debug => write!(f, "{:?}: ", k)?,
                        Prefix::Key(k) => write!(f, "{} => ", k)?,
                        Prefix::Property(n) => write!(f, "{:?}: ", n.as_bstr())?,
                    }
                    next = Some(value);
                }
                None => {
                    f.write_str(top.close)?;
                    stack.pop();
                }
            }
        }
    }

    /// Write a scalar in full, or a container's opening text.
    fn write_open<'v>(
        &'v self,
        f: &mut fmt::Formatter<'_>,
        debug: bool,
    ) -> std::result::Result<Option<Open<'v, 'a>>, fmt::Error> {
        let (children, open, close) = match (self, debug) {
            (Value::Seq(items), false) => (Shown::Seq(items.iter()), "[", "]"),
            (Value::Seq(items), true) => (Shown::Seq(items.iter()), "Seq([", "])"),
            (Value::Map(entries), false) => (Shown::Map(entries.iter()), "[", "]"),
            (Value::Map(entries), true) => (Shown::Map(entries.iter()), "Map({", "})"),
            (
                Value::Object {
                    class_name,
                    properties,
                },
                true,
            ) => {
                write!(f, "Object {{ class_name: {:?}, properties: ", class_name.as_bstr())?;
                (Shown::Object(properties.iter()), "{", "} }")
            }
            (scalar, _) => {
                scalar.write_scalar(f, debug)?;
                return Ok(None);
            }
        };
        f.write_str(open)?;
        Ok(Some(Open {
            children,
            close,
            first: true,
        }))
    }

    fn write_scalar(&self, f: &mut fmt::Formatter<'_>, debug: bool) -> fmt::Result {
        match (self, debug) {
            (Value::Null, false) => write!(f, "null"),
            (Value::Null, true) => write!(f, "Null"),
            (Value::Bool(b), false) => write!(f, "{}", b),
            (Value::Bool(b), true) => write!(f, "Bool({})", b),
            (Value::Int(i), false) => write!(f, "{}", i),
            (Value::Int(i), true) => write!(f, "Int({})", i),
            (Value::UInt(u), false) => write!(f, "{}", u),
            (Value::UInt(u), true) => write!(f, "UInt({})", u),
            (Value::Float(fl), false) => write!(f, "{}", fl),
            (Value::Float(fl), true) => write!(f, "Float({:?})", fl),
            (Value::Str(s), false) => match std::str::from_utf8(s) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", s.len()),
            },
            (Value::Str(s), true) => write!(f, "Str({:?})", s.as_bstr()),
            (Value::Object { class_name, .. }, _) => write!(f, "{}{{...}}", class_name.as_bstr()),
            (Value::Seq(_) | Value::Map(_), _) => Ok(()),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, true)
    }
}

/// PHP-flavoured text: `null`, `true`, numbers, quoted UTF-8 strings,
/// `[a, b]` for sequences, `[k => v]` for maps and `Class{...}` for objects.
///
/// Array keys decoded from null, boolean, float or unsigned tokens take
/// this text form (`N;` in key position becomes the key `"null"`).
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, false)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value<'_> {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value<'_> {
            fn from(v: $t) -> Self {
                Value::UInt(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, u8, u16, u32);
from_unsigned!(u64, usize);

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f32> for Value<'_> {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value<'_> {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(Cow::Borrowed(s.as_bytes()))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s.into_bytes()))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(s: &'a [u8]) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(s: Vec<u8>) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(items: Vec<Value<'a>>) -> Self {
        Value::Seq(items)
    }
}

impl<'a, const N: usize> From<[Value<'a>; N]> for Value<'a> {
    fn from(items: [Value<'a>; N]) -> Self {
        Value::Seq(items.into())
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<'a, K: Into<Key<'a>>, V: Into<Value<'a>>> FromIterator<(K, V)> for Value<'a> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a, V: Into<Value<'a>>> From<BTreeMap<String, V>> for Value<'a> {
    fn from(map: BTreeMap<String, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a, V: Into<Value<'a>>> From<BTreeMap<&'a str, V>> for Value<'a> {
    fn from(map: BTreeMap<&'a str, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a, V: Into<Value<'a>>> From<BTreeMap<i64, V>> for Value<'a> {
    fn from(map: BTreeMap<i64, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a, V: Into<Value<'a>>, S> From<HashMap<String, V, S>> for Value<'a> {
    fn from(map: HashMap<String, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a, V: Into<Value<'a>>, S> From<HashMap<&'a str, V, S>> for Value<'a> {
    fn from(map: HashMap<&'a str, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a, V: Into<Value<'a>>, S> From<HashMap<i64, V, S>> for Value<'a> {
    fn from(map: HashMap<i64, V, S>) -> Self {
        map.into_iter().collect()
    }
}
