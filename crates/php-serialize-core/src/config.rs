//! Encoder and parser configuration.
//!
//! Each direction has its own config record. They can be filled in directly,
//! built with the `with_*` methods, or assembled from a list of
//! [`CodecOption`]s applied in order, where later options override earlier
//! ones for the same field.

use std::collections::HashSet;

/// Default decode nesting limit, matching PHP's `max_depth` default.
pub const DEFAULT_DECODE_MAX_DEPTH: usize = 4096;

/// Encoder configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Maximum nesting depth. `0` means unlimited.
    pub max_depth: usize,
    /// Reject unsigned integers above `i64::MAX` instead of writing them
    /// with the `u:` extension tag.
    pub strict: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            strict: true,
        }
    }
}

impl EncoderConfig {
    /// Build a config from options applied in order.
    pub fn from_options(options: &[CodecOption]) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply_encode(&mut config);
        }
        config
    }

    /// Set the maximum nesting depth (`0` = unlimited).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set strict numeric mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Which object classes the parser may reconstruct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassPolicy {
    /// Any class name is accepted.
    #[default]
    AllowAll,
    /// Only the listed class names. An empty set rejects every object.
    Only(HashSet<Vec<u8>>),
}

impl ClassPolicy {
    /// A policy that rejects every object.
    pub fn none() -> Self {
        ClassPolicy::Only(HashSet::new())
    }

    /// A policy accepting exactly `classes`.
    pub fn only<I, C>(classes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        ClassPolicy::Only(classes.into_iter().map(Into::into).collect())
    }

    /// Whether `class_name` may be reconstructed.
    #[inline]
    pub fn allows(&self, class_name: &[u8]) -> bool {
        match self {
            ClassPolicy::AllowAll => true,
            ClassPolicy::Only(allowed) => allowed.contains(class_name),
        }
    }
}

/// Parser configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting depth for arrays and objects.
    ///
    /// `0` is read as [`DEFAULT_DECODE_MAX_DEPTH`]; decoding is never
    /// unbounded.
    pub max_depth: usize,
    /// Object classes that may be reconstructed.
    pub allowed_classes: ClassPolicy,
    /// Ignore bytes after the first complete value. When `false`, leftover
    /// bytes fail the decode.
    pub allow_trailing: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DECODE_MAX_DEPTH,
            allowed_classes: ClassPolicy::AllowAll,
            allow_trailing: true,
        }
    }
}

impl ParserConfig {
    /// Build a config from options applied in order.
    pub fn from_options(options: &[CodecOption]) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply_decode(&mut config);
        }
        config
    }

    /// The depth bound actually enforced.
    #[inline]
    pub fn effective_max_depth(&self) -> usize {
        if self.max_depth == 0 {
            DEFAULT_DECODE_MAX_DEPTH
        } else {
            self.max_depth
        }
    }

    /// Set the maximum nesting depth (`0` = default of 4096).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Restrict objects to the given class names.
    pub fn with_allowed_classes<I, C>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        self.allowed_classes = ClassPolicy::only(classes);
        self
    }

    /// Reject every object.
    pub fn without_objects(mut self) -> Self {
        self.allowed_classes = ClassPolicy::none();
        self
    }

    /// Whether bytes after the top-level value are ignored (`true`, the
    /// default) or rejected.
    pub fn with_allow_trailing(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }
}

/// A named option understood by [`crate::encode`] and [`crate::decode`].
///
/// Options that don't concern a direction are ignored by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecOption {
    /// Nesting limit. Encode: `0` = unlimited. Decode: `0` = 4096.
    MaxDepth(usize),
    /// Encode only: strict PHP numeric range.
    StrictNumeric(bool),
    /// Decode only: allow exactly these classes.
    AllowedClasses(Vec<Vec<u8>>),
    /// Decode only: reject every object.
    DisableObjects,
    /// Decode only: fail if bytes follow the top-level value.
    RejectTrailing,
}

impl CodecOption {
    /// Convenience constructor for [`CodecOption::AllowedClasses`].
    pub fn allowed_classes<I, C>(classes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        CodecOption::AllowedClasses(classes.into_iter().map(Into::into).collect())
    }

    /// Apply this option to an encoder config.
    pub fn apply_encode(&self, config: &mut EncoderConfig) {
        match self {
            CodecOption::MaxDepth(depth) => config.max_depth = *depth,
            CodecOption::StrictNumeric(strict) => config.strict = *strict,
            CodecOption::AllowedClasses(_)
            | CodecOption::DisableObjects
            | CodecOption::RejectTrailing => {}
        }
    }

    /// Apply this option to a parser config.
    pub fn apply_decode(&self, config: &mut ParserConfig) {
        match self {
            CodecOption::MaxDepth(0) => config.max_depth = DEFAULT_DECODE_MAX_DEPTH,
            CodecOption::MaxDepth(depth) => config.max_depth = *depth,
            CodecOption::StrictNumeric(_) => {}
            CodecOption::AllowedClasses(classes) => {
                config.allowed_classes = ClassPolicy::only(classes.iter().cloned());
            }
            CodecOption::DisableObjects => config.allowed_classes = ClassPolicy::none(),
            CodecOption::RejectTrailing => config.allow_trailing = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let enc = EncoderConfig::default();
        assert_eq!(enc.max_depth, 0);
        assert!(enc.strict);

        let dec = ParserConfig::default();
        assert_eq!(dec.max_depth, 4096);
        assert_eq!(dec.allowed_classes, ClassPolicy::AllowAll);
        assert!(dec.allow_trailing);
    }

    #[test]
    fn test_zero_decode_depth_means_default() {
        let config = ParserConfig::from_options(&[CodecOption::MaxDepth(0)]);
        assert_eq!(config.max_depth, DEFAULT_DECODE_MAX_DEPTH);

        let literal = ParserConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert_eq!(literal.effective_max_depth(), DEFAULT_DECODE_MAX_DEPTH);

        let enc = EncoderConfig::from_options(&[CodecOption::MaxDepth(0)]);
        assert_eq!(enc.max_depth, 0);
    }

    #[test]
    fn test_later_options_override() {
        let options = [
            CodecOption::MaxDepth(3),
            CodecOption::StrictNumeric(false),
            CodecOption::MaxDepth(9),
            CodecOption::allowed_classes(["User"]),
            CodecOption::DisableObjects,
        ];
        let enc = EncoderConfig::from_options(&options);
        assert_eq!(enc.max_depth, 9);
        assert!(!enc.strict);

        let dec = ParserConfig::from_options(&options);
        assert_eq!(dec.max_depth, 9);
        assert!(!dec.allowed_classes.allows(b"User"));
    }

    #[test]
    fn test_class_policy() {
        assert!(ClassPolicy::AllowAll.allows(b"Anything"));
        assert!(!ClassPolicy::none().allows(b"User"));

        let policy = ClassPolicy::only(["User", "Admin"]);
        assert!(policy.allows(b"User"));
        assert!(!policy.allows(b"Guest"));
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::default()
            .with_max_depth(16)
            .with_allowed_classes(["User"])
            .with_allow_trailing(false);
        assert_eq!(config.effective_max_depth(), 16);
        assert!(config.allowed_classes.allows(b"User"));
        assert!(!config.allow_trailing);

        assert!(!ParserConfig::default().without_objects().allowed_classes.allows(b"User"));
        assert_eq!(
            EncoderConfig::default().with_max_depth(2).with_strict(false),
            EncoderConfig {
                max_depth: 2,
                strict: false
            }
        );
    }
}
