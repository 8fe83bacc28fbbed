//! Hex text codec for stored values.
//!
//! The state endpoint returns every stored value as lowercase hex text,
//! two characters per byte. Every fragment of the world state (tiles,
//! positions, inventory, gold, prices) goes through these helpers.

use crate::FormatError;

/// Decode exactly one byte from a 2-character hex string.
pub fn decode_byte(hex: &str) -> Result<u8, FormatError> {
    if hex.len() != 2 {
        return Err(FormatError::WrongWidth {
            expected: 2,
            actual: hex.len(),
        });
    }
    // from_str_radix alone would accept a sign prefix such as "+1".
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FormatError::InvalidHex(hex.to_string()));
    }
    u8::from_str_radix(hex, 16).map_err(|_| FormatError::InvalidHex(hex.to_string()))
}

/// Split hex text into 2-character byte pairs.
///
/// Only the length is checked here; each pair is validated when decoded.
pub fn split_byte_pairs(hex: &str) -> Result<Vec<&str>, FormatError> {
    if !hex.is_ascii() {
        return Err(FormatError::InvalidHex(hex.to_string()));
    }
    if hex.len() % 2 != 0 {
        return Err(FormatError::OddLength(hex.len()));
    }
    Ok((0..hex.len())
        .step_by(2)
        .map(|i| &hex[i..i + 2])
        .collect())
}

/// Encode raw bytes as lowercase hex, two characters per byte.
pub fn encode_bytes(raw: &[u8]) -> String {
    ::hex::encode(raw)
}

/// Decode hex text into raw bytes.
pub fn decode_bytes(hex: &str) -> Result<Vec<u8>, FormatError> {
    if hex.len() % 2 != 0 {
        return Err(FormatError::OddLength(hex.len()));
    }
    ::hex::decode(hex).map_err(|_| FormatError::InvalidHex(hex.to_string()))
}

/// Decode a big-endian unsigned integer of 1 to 8 bytes.
///
/// The kernel writes positions, gold and prices as `usize::to_be_bytes`,
/// so stored widths vary between deployments.
pub fn decode_uint(hex: &str) -> Result<u64, FormatError> {
    let bytes = decode_bytes(hex)?;
    if bytes.is_empty() {
        return Err(FormatError::WrongWidth {
            expected: 2,
            actual: 0,
        });
    }
    if bytes.len() > 8 {
        return Err(FormatError::Overflow(bytes.len()));
    }
    Ok(bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

/// Render a one-byte argument as exactly two lowercase hex digits.
///
/// The inbox parser is fixed-width: slot 3 must be `03`, never `3`.
pub fn pad2(value: u8) -> String {
    format!("{:02x}", value)
}
