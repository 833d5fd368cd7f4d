//! Error types for blotool-common.

use thiserror::Error;

/// Common error type for low-level binary and text operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes at offset {offset} but only {available} available")]
    UnexpectedEof {
        needed: usize,
        available: usize,
        offset: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// Bytes that do not form valid Shift-JIS text.
    #[error("invalid Shift-JIS byte sequence: {0:02x?}")]
    MalformedShiftJis(Vec<u8>),

    /// Text that cannot be represented in Shift-JIS.
    #[error("string not representable in Shift-JIS: {0:?}")]
    UnmappableShiftJis(String),

    /// String missing its null terminator.
    #[error("string at offset {0:#x} missing null terminator")]
    MissingNullTerminator(usize),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
