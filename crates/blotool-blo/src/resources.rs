//! Resource reference lists (`TEX1` textures, `FNT1` fonts).
//!
//! A reference list names external resources in order; materials and
//! textboxes refer to them by index. The wire form shares the string
//! table's offset scheme but each record is length-prefixed instead of
//! null-terminated: `(0x02:u8, len:u8, name bytes)`. The writer
//! deduplicates identical names so repeated references share one stored
//! record.

use blotool_common::{encoding, BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// Which resource list a chunk holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Textures,
    Fonts,
}

impl ResourceKind {
    pub const fn tag(self) -> [u8; 4] {
        match self {
            ResourceKind::Textures => *b"TEX1",
            ResourceKind::Fonts => *b"FNT1",
        }
    }
}

/// An ordered list of resource names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceList {
    pub kind: ResourceKind,
    pub references: Vec<String>,
}

impl ResourceList {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            references: Vec::new(),
        }
    }

    /// Resolve an index to a name.
    pub fn name(&self, index: usize) -> Result<&str> {
        self.references
            .get(index)
            .map(String::as_str)
            .ok_or(Error::IndexOutOfRange {
                table: "resource list",
                index,
                len: self.references.len(),
            })
    }

    /// Resolve a name to its index, registering it if absent.
    pub fn index_or_register(&mut self, name: &str) -> u16 {
        match self.references.iter().position(|r| r == name) {
            Some(i) => i as u16,
            None => {
                self.references.push(name.to_string());
                (self.references.len() - 1) as u16
            }
        }
    }

    /// Decode a reference list at the reader's cursor.
    pub fn parse(r: &mut BinaryReader<'_>, kind: ResourceKind) -> Result<Self> {
        let start = r.position();
        r.expect_magic(&kind.tag())?;
        let size = r.read_u32()? as usize;
        let count = r.read_u16()? as usize;

        let marker = r.read_u16()?;
        if marker != 0xFFFF {
            return Err(Error::unexpected(
                "resource list marker",
                &0xFFFFu16.to_be_bytes(),
                &marker.to_be_bytes(),
            ));
        }
        let header_size = r.read_u32()?;
        if header_size != 0x10 {
            return Err(Error::unexpected(
                "resource list header size",
                &0x10u32.to_be_bytes(),
                &header_size.to_be_bytes(),
            ));
        }

        let inner = r.position();
        let inner_count = r.read_u16()? as usize;
        if inner_count != count {
            return Err(Error::format(
                inner,
                format!("resource count mismatch: header {count}, inner {inner_count}"),
            ));
        }

        let mut list = Self::new(kind);
        for i in 0..count {
            let offset = r.read_u16_at(inner + 2 + i * 2)? as usize;
            let record = inner + offset;
            let tag_byte = r.read_u8_at(record)?;
            if tag_byte != 0x02 {
                return Err(Error::unexpected(
                    "resource record tag",
                    &[0x02],
                    &[tag_byte],
                ));
            }
            let len = r.read_u8_at(record + 1)? as usize;
            let bytes = r.slice_at(record + 2, len)?;
            list.references.push(encoding::decode_shift_jis(bytes)?);
        }

        r.seek(start + size);
        Ok(list)
    }

    /// Encode the list, deduplicating identical names and backpatching
    /// the section size once padding is in place.
    pub fn write(&self, w: &mut BinaryWriter) -> Result<()> {
        let start = w.position();
        w.write_tag(self.kind.tag());
        w.write_u32(0); // section size, patched below
        w.write_u16(self.references.len() as u16);
        w.write_u16(0xFFFF);
        w.write_u32(0x10);

        let inner = w.position();
        w.write_u16(self.references.len() as u16);
        for _ in &self.references {
            w.write_u16(0xABCD); // offset placeholder
        }

        // (name, inner-relative offset) pairs for already-written records
        let mut stored: Vec<(&str, u16)> = Vec::new();
        let mut offsets = Vec::with_capacity(self.references.len());
        for name in &self.references {
            let offset = match stored.iter().find(|(n, _)| *n == name) {
                Some((_, off)) => *off,
                None => {
                    let off = (w.position() - inner) as u16;
                    w.write_u8(0x02);
                    let bytes = encoding::encode_shift_jis(name)?;
                    w.write_u8(bytes.len() as u8);
                    w.write_bytes(&bytes);
                    stored.push((name, off));
                    off
                }
            };
            offsets.push(offset);
        }
        w.pad_to(0x20);

        let end = w.position();
        for (i, offset) in offsets.iter().enumerate() {
            w.patch_u16(inner + 2 + i * 2, *offset);
        }
        w.patch_u32(start + 4, (end - start) as u32);
        w.seek(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(list: &ResourceList) -> ResourceList {
        let mut w = BinaryWriter::new();
        list.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len() % 0x20, 0);
        ResourceList::parse(&mut BinaryReader::new(&bytes), list.kind).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let list = ResourceList {
            kind: ResourceKind::Textures,
            references: vec!["icon.bti".into(), "bg.bti".into()],
        };
        assert_eq!(round_trip(&list), list);
    }

    #[test]
    fn test_duplicate_names_share_one_record() {
        let list = ResourceList {
            kind: ResourceKind::Textures,
            references: vec!["same.bti".into(), "same.bti".into()],
        };
        let mut w = BinaryWriter::new();
        list.write(&mut w).unwrap();
        let bytes = w.into_bytes();

        // Both offset entries point at the same record.
        let inner = 0x10;
        let off0 = u16::from_be_bytes([bytes[inner + 2], bytes[inner + 3]]);
        let off1 = u16::from_be_bytes([bytes[inner + 4], bytes[inner + 5]]);
        assert_eq!(off0, off1);

        // And decoding still yields two references.
        let parsed = round_trip(&list);
        assert_eq!(parsed.references.len(), 2);
    }

    #[test]
    fn test_bad_record_tag_rejected() {
        let list = ResourceList {
            kind: ResourceKind::Fonts,
            references: vec!["font.bfn".into()],
        };
        let mut w = BinaryWriter::new();
        list.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();
        // First record byte lives right after the inner offset array.
        let record = 0x10 + 2 + 2;
        assert_eq!(bytes[record], 0x02);
        bytes[record] = 0x03;
        let err = ResourceList::parse(&mut BinaryReader::new(&bytes), ResourceKind::Fonts);
        assert!(matches!(err, Err(Error::UnexpectedValue { .. })));
    }

    #[test]
    fn test_index_or_register() {
        let mut list = ResourceList::new(ResourceKind::Textures);
        assert_eq!(list.index_or_register("a.bti"), 0);
        assert_eq!(list.index_or_register("b.bti"), 1);
        assert_eq!(list.index_or_register("a.bti"), 0);
        assert_eq!(list.name(1).unwrap(), "b.bti");
        assert!(list.name(2).is_err());
    }
}
