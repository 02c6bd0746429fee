//! Error types for PHP serialization and deserialization.
//!
//! Every error carries enough context to localize the fault: decode errors
//! record the byte offset where they were detected, and malformed-token
//! errors also carry a short preview of the surrounding input.

use std::fmt;

use bstr::{BString, ByteSlice};
use thiserror::Error;

/// The main error type for the codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct PhpSerializeError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// The byte position in the input where the error occurred.
    ///
    /// Encode-time errors have no input position and leave this empty.
    pub position: Option<usize>,
    /// Optional context about what was being processed.
    pub context: Option<String>,
    /// Preview of input around error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for PhpSerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(position) = self.position {
            write!(f, " at position {}", position)?;
        }
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// Specific kinds of codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A structurally invalid token.
    #[error("malformed input: {0}")]
    Malformed(Malformation),

    /// The input ended while more bytes were expected.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// Nesting reached the configured depth bound.
    #[error("maximum nesting depth ({max_depth}) exceeded")]
    DepthExceeded {
        /// The limit that was hit.
        max_depth: usize,
    },

    /// An object's class is not on the allowlist.
    #[error("class \"{0}\" is not allowed")]
    ClassNotAllowed(BString),

    /// The value has no PHP wire representation in this position.
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    /// An unsigned integer does not fit PHP's signed 64-bit range.
    #[error("integer {0} exceeds PHP int range")]
    IntegerOverflow(u64),

    /// A typed accessor was used on a value of another type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually present.
        found: &'static str,
    },
}

/// Details of a [`ErrorKind::Malformed`] error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Malformation {
    /// Expected a specific delimiter but found something else.
    #[error("expected '{expected}', found '{found}'")]
    UnexpectedByte {
        /// The byte that was expected.
        expected: char,
        /// The byte that was found.
        found: char,
    },

    /// Unknown type tag.
    #[error("unknown type tag '{0}'")]
    UnknownType(char),

    /// Invalid integer value.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Invalid float value.
    #[error("invalid float: {0}")]
    InvalidFloat(String),

    /// Non-numeric length or count field.
    #[error("invalid length field: {0}")]
    InvalidLength(String),

    /// Negative length or count field.
    #[error("negative length: {0}")]
    NegativeLength(i64),

    /// An array key or property name of a type that cannot be a key.
    #[error("invalid key type: {0}")]
    InvalidKey(&'static str),

    /// Bytes left over after a complete top-level value.
    #[error("{0} trailing bytes after value")]
    TrailingData(usize),
}

impl PhpSerializeError {
    /// Create a new error with the given kind and no position.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
            context: None,
            input_preview: None,
        }
    }

    /// Create a new error with the given kind and input position.
    #[inline]
    pub fn at(kind: ErrorKind, position: usize) -> Self {
        Self {
            position: Some(position),
            ..Self::new(kind)
        }
    }

    /// Create a malformed-input error at the given position.
    #[inline]
    pub fn malformed(malformation: Malformation, position: usize) -> Self {
        Self::at(ErrorKind::Malformed(malformation), position)
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// Shows up to 20 bytes before and after the error position.
    #[cold]
    pub fn with_input_preview(mut self, data: &[u8], error_pos: usize) -> Self {
        let start = error_pos.saturating_sub(20).min(data.len());
        let end = (error_pos + 20).min(data.len());

        if start < end {
            let preview = data[start..end].to_str_lossy();

            let relative_pos = error_pos.saturating_sub(start);
            let mut result = String::with_capacity(preview.len() + relative_pos + 2);
            result.push_str(&preview);
            result.push('\n');
            result.push_str(&" ".repeat(relative_pos));
            result.push('^');

            self.input_preview = Some(result);
        }
        self
    }

    /// Whether this error is a malformed-input error.
    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, ErrorKind::Malformed(_))
    }
}

impl From<ErrorKind> for PhpSerializeError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type alias for the codec.
pub type Result<T> = std::result::Result<T, PhpSerializeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_position() {
        let err = PhpSerializeError::malformed(Malformation::UnknownType('X'), 3);
        assert_eq!(
            err.to_string(),
            "malformed input: unknown type tag 'X' at position 3"
        );
    }

    #[test]
    fn test_display_without_position() {
        let err = PhpSerializeError::new(ErrorKind::IntegerOverflow(u64::MAX));
        assert_eq!(
            err.to_string(),
            "integer 18446744073709551615 exceeds PHP int range"
        );
    }

    #[test]
    fn test_input_preview_marks_position() {
        let err = PhpSerializeError::at(ErrorKind::UnexpectedEnd, 2).with_input_preview(b"i:12", 2);
        assert_eq!(err.input_preview.as_deref(), Some("i:12\n  ^"));
    }

    #[test]
    fn test_class_not_allowed_message() {
        let err = PhpSerializeError::at(ErrorKind::ClassNotAllowed(BString::from("User")), 9);
        assert!(err.to_string().starts_with("class \"User\" is not allowed"));
    }
}
