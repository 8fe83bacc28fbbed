//! Error types for dungeon-sync.

use thiserror::Error;

/// Errors raised while decoding or validating state fragments and commands.
///
/// Always local: a `FormatError` affects one field of one tick and never
/// aborts the rest of the tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input is not valid hex text
    #[error("invalid hex: {0:?}")]
    InvalidHex(String),

    /// Hex text has an odd number of characters
    #[error("odd hex length: {0}")]
    OddLength(usize),

    /// Hex text does not have the expected width
    #[error("expected {expected} hex characters, got {actual}")]
    WrongWidth {
        /// Expected number of characters.
        expected: usize,
        /// Actual number of characters.
        actual: usize,
    },

    /// Integer does not fit in 64 bits
    #[error("integer too wide: {0} bytes")]
    Overflow(usize),

    /// Byte is not a known tile code
    #[error("unknown tile code: {0:#04x}")]
    UnknownTile(u8),

    /// Value outside its allowed range
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },

    /// Decoded map does not contain exactly 1024 tiles
    #[error("map has {0} tiles, expected 1024")]
    MapLength(usize),

    /// Account identifier cannot be used as a key-path segment
    #[error("invalid account identifier: {0:?}")]
    InvalidAccount(String),

    /// Command code starts with an unknown verb
    #[error("unknown verb: {0:?}")]
    UnknownVerb(String),

    /// Command code has the wrong arguments for its verb
    #[error("malformed command: {0:?}")]
    MalformedCommand(String),

    /// Payload has no account/command separator
    #[error("payload has no separator")]
    MissingSeparator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FormatError::UnknownTile(9);
        assert_eq!(err.to_string(), "unknown tile code: 0x09");

        let err = FormatError::MapLength(12);
        assert_eq!(err.to_string(), "map has 12 tiles, expected 1024");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormatError>();
    }
}
