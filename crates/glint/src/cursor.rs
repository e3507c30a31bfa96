//! Cursor codec helpers.
//!
//! This module owns the opaque wire-token format used for page cursors.
//! A cursor encodes a big-endian item offset as a lowercase hex token and
//! carries no query semantics of its own.

use thiserror::Error as ThisError;

const MAX_TOKEN_BYTES: usize = std::mem::size_of::<u64>();

///
/// CursorError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CursorError {
    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token must have an even number of hex characters")]
    OddLength,

    #[error("invalid hex character at position {position}")]
    InvalidHex { position: usize },

    #[error("cursor token is wider than {MAX_TOKEN_BYTES} bytes: {len}")]
    TooWide { len: usize },
}

/// Encode an item offset as a lowercase hex token.
#[must_use]
pub fn encode_offset(offset: u64) -> String {
    let mut out = String::with_capacity(MAX_TOKEN_BYTES * 2);
    for byte in offset.to_be_bytes() {
        use std::fmt::Write as _;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Decode a lowercase/uppercase hex cursor token into an item offset.
///
/// The token may include surrounding whitespace, which is trimmed.
pub fn decode_offset(token: &str) -> Result<u64, CursorError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CursorError::Empty);
    }
    if !token.len().is_multiple_of(2) {
        return Err(CursorError::OddLength);
    }
    if token.len() > MAX_TOKEN_BYTES * 2 {
        return Err(CursorError::TooWide {
            len: token.len() / 2,
        });
    }

    let bytes = token.as_bytes();
    let mut offset = 0u64;
    for idx in (0..bytes.len()).step_by(2) {
        let hi = decode_hex_nibble(bytes[idx]).ok_or(CursorError::InvalidHex {
            position: idx + 1,
        })?;
        let lo = decode_hex_nibble(bytes[idx + 1]).ok_or(CursorError::InvalidHex {
            position: idx + 2,
        })?;
        offset = (offset << 8) | u64::from((hi << 4) | lo);
    }

    Ok(offset)
}

const fn decode_hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
