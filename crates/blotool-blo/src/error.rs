//! Error types for BLO parsing and writing.

use thiserror::Error;

/// Errors that can occur when working with BLO layout data.
#[derive(Debug, Error)]
pub enum Error {
    /// Low-level read/write or text conversion failure.
    #[error("{0}")]
    Common(#[from] blotool_common::Error),

    /// Structural damage: wrong tag, truncation, unbalanced brackets.
    /// Always fatal; a corrupt proprietary stream is never resynced.
    #[error("format error at offset {offset:#x}: {message}")]
    Format { offset: usize, message: String },

    /// A chunk tag the scene-graph reader does not know.
    #[error("unknown chunk tag {tag:?} at offset {offset:#x}")]
    UnknownChunk { tag: [u8; 4], offset: usize },

    /// A fixed-size record did not end where its declared size says.
    #[error("{record} record at offset {start:#x}: cursor landed at {actual:#x}, expected {expected:#x}")]
    RecordSizeMismatch {
        record: &'static str,
        start: usize,
        expected: usize,
        actual: usize,
    },

    /// An expected-constant field holds something else. Carries the raw
    /// bytes so forward-compatible tooling can report what it saw.
    #[error("unexpected value for {field}: expected {expected:02x?}, got {actual:02x?}")]
    UnexpectedValue {
        field: &'static str,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A name that is not present in the relevant table.
    #[error("{kind} not found: {name:?}")]
    ResourceNotFound { kind: &'static str, name: String },

    /// A stored index pointing outside its table.
    #[error("{table} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },

    /// The JSON mirror document does not have the expected shape.
    #[error("malformed JSON document: {0}")]
    Json(String),
}

impl Error {
    pub(crate) fn format(offset: usize, message: impl Into<String>) -> Self {
        Error::Format {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(field: &'static str, expected: &[u8], actual: &[u8]) -> Self {
        Error::UnexpectedValue {
            field,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    pub(crate) fn json(message: impl Into<String>) -> Self {
        Error::Json(message.into())
    }
}

/// Result type for BLO operations.
pub type Result<T> = std::result::Result<T, Error>;
