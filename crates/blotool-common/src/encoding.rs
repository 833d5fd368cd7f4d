//! Shift-JIS text conversion.
//!
//! All names and textbox bodies in BLO files use the console's legacy
//! 8-bit-extended Japanese encoding. Conversion is strict in both
//! directions: malformed input bytes and unmappable characters are errors
//! rather than replacement characters, because a silently altered name
//! would break material and texture lookups.

use encoding_rs::SHIFT_JIS;

use crate::{Error, Result};

/// Decode Shift-JIS bytes into a string.
pub fn decode_shift_jis(bytes: &[u8]) -> Result<String> {
    let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
    if had_errors {
        return Err(Error::MalformedShiftJis(bytes.to_vec()));
    }
    Ok(text.into_owned())
}

/// Encode a string into Shift-JIS bytes.
pub fn encode_shift_jis(text: &str) -> Result<Vec<u8>> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        return Err(Error::UnmappableShiftJis(text.to_string()));
    }
    Ok(bytes.into_owned())
}
