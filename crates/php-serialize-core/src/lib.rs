//! Bidirectional codec for PHP's `serialize()` format.
//!
//! This crate reads and writes the self-describing, length-prefixed text
//! encoding PHP uses for session blobs, cached config and legacy database
//! columns.
//!
//! # Features
//!
//! - **Zero-copy decoding** - Strings and class names borrow from the input
//! - **Binary-safe strings** - Lengths are byte counts; payloads may hold any byte
//! - **Security controls** - Bounded nesting depth and a class allowlist
//! - **Stack-safe** - Nested values are walked with a heap stack, not recursion
//! - **Detailed errors** - Byte offsets and input previews for malformed data
//!
//! # Quick Start
//!
//! ```rust
//! use php_serialize_core::{from_bytes, to_bytes, Value};
//!
//! let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
//! let value = from_bytes(data).unwrap();
//! assert_eq!(value.get("name").and_then(Value::as_str), Some("Alice"));
//!
//! let bytes = to_bytes(&value).unwrap();
//! assert_eq!(bytes, data);
//! ```
//!
//! # Untrusted Input
//!
//! ```rust
//! use php_serialize_core::{from_bytes_with_config, ErrorKind, ParserConfig};
//!
//! let config = ParserConfig::default()
//!     .with_max_depth(32)
//!     .with_allowed_classes(["User"]);
//! let err = from_bytes_with_config(br#"O:5:"Admin":0:{}"#, config).unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::ClassNotAllowed(_)));
//! ```
//!
//! # Supported Types
//!
//! | PHP Type | Wire form | Rust Type |
//! |----------|-----------|-----------|
//! | `null` | `N;` | `Value::Null` |
//! | `bool` | `b:1;` | `Value::Bool(bool)` |
//! | `int` | `i:5;` | `Value::Int(i64)` |
//! | unsigned (extension) | `u:5;` | `Value::UInt(u64)` |
//! | `float` | `d:0.5;` | `Value::Float(f64)` |
//! | `string` | `s:2:"hi";` | `Value::Str(Cow<[u8]>)` |
//! | `array` (list) | `a:1:{i:0;…}` | `Value::Seq(Vec<Value>)` |
//! | `array` (other) | `a:1:{s:1:"k";…}` | `Value::Map(Vec<(Key, Value)>)` |
//! | `object` | `O:4:"User":…` | `Value::Object { class_name, properties }` |
//!
//! References, `Serializable` payloads (`C:`) and enums are not supported.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::inline_always)]

pub mod codec;
pub mod config;
pub mod cursor;
pub mod encoder;
pub mod error;
pub mod parser;
mod tree;
pub mod types;

#[cfg(feature = "serde")]
pub mod json;

pub use codec::{decode, encode, encode_object, is_utf8, is_valid, must_decode, must_encode, php_strlen};
pub use config::{ClassPolicy, CodecOption, EncoderConfig, ParserConfig, DEFAULT_DECODE_MAX_DEPTH};
pub use encoder::{object_to_bytes_with_config, to_bytes, to_bytes_with_config, Encoder};
pub use error::{ErrorKind, Malformation, PhpSerializeError, Result};
pub use parser::{from_bytes, from_bytes_with_config, strip_visibility, Parser};
pub use types::{Key, Value};

#[cfg(feature = "serde")]
pub use json::{from_json, to_json};
