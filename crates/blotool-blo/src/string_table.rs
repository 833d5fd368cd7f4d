//! The hashed, offset-indexed string table used for material names.
//!
//! Layout: `count:u16`, `0xFFFF:u16`, then `count` entries of
//! `(hash:u16, offset:u16)` with offsets relative to the table start,
//! then the null-terminated Shift-JIS string bytes. The hash is a lookup
//! hint only; offsets are authoritative, so decoding ignores the stored
//! hashes entirely and encoding recomputes them.

use blotool_common::{encoding, hash, memchr, BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// An ordered table of strings, addressed by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    pub strings: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a string table at the reader's cursor.
    pub fn parse(r: &mut BinaryReader<'_>) -> Result<Self> {
        let start = r.position();
        let count = r.read_u16()? as usize;
        r.advance(2); // 0xFFFF

        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let _hash = r.read_u16()?;
            offsets.push(r.read_u16()? as usize);
        }

        let mut table = Self::new();
        for offset in offsets {
            let at = start + offset;
            if at > r.len() {
                return Err(Error::Format {
                    offset: at,
                    message: format!("string offset {offset:#x} points past the buffer"),
                });
            }
            let tail = r.slice_at(at, r.len() - at)?;
            let len = memchr::memchr(0, tail)
                .ok_or(blotool_common::Error::MissingNullTerminator(at))?;
            table.strings.push(encoding::decode_shift_jis(&tail[..len])?);
        }
        Ok(table)
    }

    /// Encode the table at the writer's cursor, backpatching each entry's
    /// offset once its string bytes have been placed.
    pub fn write(&self, w: &mut BinaryWriter) -> Result<()> {
        let start = w.position();
        w.write_u16(self.strings.len() as u16);
        w.write_u16(0xFFFF);

        for s in &self.strings {
            w.write_u16(hash::hash_string(s));
            w.write_u16(0xABCD); // offset placeholder
        }

        for (i, s) in self.strings.iter().enumerate() {
            let offset = w.position() - start;
            w.write_bytes(&encoding::encode_shift_jis(s)?);
            w.write_u8(0);
            w.patch_u16(start + 4 + i * 4 + 2, offset as u16);
        }
        Ok(())
    }

    /// Index of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.strings.iter().position(|s| s == name)
    }

    pub fn get(&self, index: usize) -> Result<&str> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(Error::IndexOutOfRange {
                table: "string table",
                index,
                len: self.strings.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(table: &StringTable) -> StringTable {
        let mut w = BinaryWriter::new();
        table.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        StringTable::parse(&mut BinaryReader::new(&bytes)).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let table = StringTable {
            strings: vec!["mat_a".into(), "".into(), "mat_b".into()],
        };
        assert_eq!(round_trip(&table), table);
    }

    #[test]
    fn test_header_and_hash_bytes() {
        let table = StringTable {
            strings: vec!["a".into()],
        };
        let mut w = BinaryWriter::new();
        table.write(&mut w).unwrap();
        let bytes = w.into_bytes();

        assert_eq!(&bytes[0..4], &[0x00, 0x01, 0xFF, 0xFF]);
        // hash("a") == 97
        assert_eq!(&bytes[4..6], &[0x00, 0x61]);
        // offset points right past the entry array
        assert_eq!(&bytes[6..8], &[0x00, 0x08]);
        assert_eq!(&bytes[8..10], b"a\x00");
    }

    #[test]
    fn test_stored_hash_not_trusted() {
        let table = StringTable {
            strings: vec!["material".into()],
        };
        let mut w = BinaryWriter::new();
        table.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();
        // Corrupt the hash; decode must not care.
        bytes[4] ^= 0xFF;
        let parsed = StringTable::parse(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_out_of_bounds_offset_is_error() {
        // count=1, 0xFFFF, hash, offset way past the end of the buffer.
        let bytes = [0x00, 0x01, 0xFF, 0xFF, 0x00, 0x61, 0x01, 0x00];
        assert!(StringTable::parse(&mut BinaryReader::new(&bytes)).is_err());
    }

    #[test]
    fn test_missing_terminator_is_error() {
        let table = StringTable {
            strings: vec!["abc".into()],
        };
        let mut w = BinaryWriter::new();
        table.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = b'x';
        assert!(StringTable::parse(&mut BinaryReader::new(&bytes)).is_err());
    }
}
