//! Byte cursor over serialized input.
//!
//! All scanning used by the parser lives here: single-byte reads, delimiter
//! checks, `memchr`-accelerated field scans and exact-length payload reads.
//! Every failure reports the offset at which it was detected.

use memchr::memchr;

use crate::error::{ErrorKind, Malformation, PhpSerializeError, Result};

/// A read position over borrowed input bytes.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The whole input.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Peek at the current byte without consuming it.
    #[inline(always)]
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| PhpSerializeError::at(ErrorKind::UnexpectedEnd, self.pos))
    }

    /// Read and consume the current byte.
    #[inline(always)]
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Expect a specific byte, returning an error if it doesn't match.
    #[inline]
    pub fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let byte = self.read_byte()?;
        if byte != expected {
            return Err(self.unexpected_byte(expected, byte, self.pos - 1));
        }
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn unexpected_byte(&self, expected: u8, found: u8, at: usize) -> PhpSerializeError {
        PhpSerializeError::malformed(
            Malformation::UnexpectedByte {
                expected: expected as char,
                found: found as char,
            },
            at,
        )
        .with_input_preview(self.data, at)
    }

    /// Read bytes up to `delimiter` and consume the delimiter too.
    ///
    /// Running out of input before the delimiter is `UnexpectedEnd`.
    #[inline]
    pub fn read_until(&mut self, delimiter: u8) -> Result<&'a [u8]> {
        let start = self.pos;
        match memchr(delimiter, &self.data[start..]) {
            Some(offset) => {
                self.pos = start + offset + 1;
                Ok(&self.data[start..start + offset])
            }
            None => Err(PhpSerializeError::at(ErrorKind::UnexpectedEnd, self.data.len())
                .with_context(format!("'{}' not found after position {}", delimiter as char, start))),
        }
    }

    /// Read exactly `len` raw bytes.
    #[inline]
    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(PhpSerializeError::at(ErrorKind::UnexpectedEnd, self.data.len())
                .with_context(format!(
                    "need {} bytes at position {}, have {}",
                    len,
                    self.pos,
                    self.remaining()
                )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a decimal length or count field terminated by `delimiter`.
    ///
    /// The field is parsed as a signed number so that a negative length is
    /// reported as such rather than as garbage.
    pub fn read_length(&mut self, delimiter: u8) -> Result<usize> {
        let start = self.pos;
        let field = self.read_until(delimiter)?;
        let invalid = |data: &[u8]| {
            PhpSerializeError::malformed(
                Malformation::InvalidLength(String::from_utf8_lossy(field).into_owned()),
                start,
            )
            .with_input_preview(data, start)
        };
        let text = match std::str::from_utf8(field) {
            Ok(text) => text,
            Err(_) => return Err(invalid(self.data)),
        };
        let parsed: i64 = text.parse().map_err(|_| invalid(self.data))?;
        if parsed < 0 {
            return Err(PhpSerializeError::malformed(Malformation::NegativeLength(parsed), start));
        }
        usize::try_from(parsed).map_err(|_| {
            PhpSerializeError::malformed(Malformation::InvalidLength(text.to_string()), start)
        })
    }

    /// Read a field terminated by `;` as UTF-8 text.
    ///
    /// Non-UTF-8 bytes cannot form a number, so they are handed to
    /// `invalid` to build the caller's malformation.
    pub fn read_scalar_field(
        &mut self,
        invalid: impl FnOnce(String) -> Malformation,
    ) -> Result<(&'a str, usize)> {
        let start = self.pos;
        let field = self.read_until(b';')?;
        match std::str::from_utf8(field) {
            Ok(text) => Ok((text, start)),
            Err(_) => Err(PhpSerializeError::malformed(
                invalid(String::from_utf8_lossy(field).into_owned()),
                start,
            )),
        }
    }
}
