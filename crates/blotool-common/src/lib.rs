//! Common utilities for blotool.
//!
//! This crate provides the byte-level plumbing shared by the format
//! crates:
//!
//! - [`BinaryReader`] - positioned big-endian reads over byte slices
//! - [`BinaryWriter`] - buffer-backed writes with backpatching and padding
//! - [`encoding`] - Shift-JIS text conversion
//! - [`hash`] - the 16-bit string-table hash

mod error;
mod reader;
mod writer;

pub mod encoding;
pub mod hash;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::{BinaryWriter, PADDING_MESSAGE};

/// Re-export memchr for byte searching (null-terminator scans).
pub use memchr;
