//! The pane element family: `PAN2`, `WIN2`, `PIC2`, `TBX2`.
//!
//! A plain pane is a fixed 0x48-byte record. The three specializations
//! embed a complete pane record (with its own tag and size) right after
//! their outer tag+size, then append their own payload. All of them are
//! fixed-size except the textbox, whose trailing Shift-JIS text makes
//! the chunk variable-length with a backpatched size.
//!
//! Material references are stored as indices on disk but resolved to
//! names here, so elements stay valid while the material table is
//! edited. Resolution back to indices happens at write time and fails
//! hard on unknown names.

use blotool_common::{encoding, BinaryReader, BinaryWriter};

use crate::mat1::{Color, Mat1};
use crate::{Error, Result};

pub const PANE_SIZE: usize = 0x48;
pub const WINDOW_SIZE: usize = 0x90;
pub const PICTURE_SIZE: usize = 0x80;
/// Fixed part of a textbox; the text and padding follow.
pub const TEXTBOX_BASE_SIZE: usize = 0x70;

/// Which corner or edge of the box the offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft = 0,
    TopCenter = 1,
    TopRight = 2,
    CenterLeft = 3,
    Center = 4,
    CenterRight = 5,
    BottomLeft = 6,
    BottomCenter = 7,
    BottomRight = 8,
}

impl Anchor {
    pub fn from_raw(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Anchor::TopLeft,
            1 => Anchor::TopCenter,
            2 => Anchor::TopRight,
            3 => Anchor::CenterLeft,
            4 => Anchor::Center,
            5 => Anchor::CenterRight,
            6 => Anchor::BottomLeft,
            7 => Anchor::BottomCenter,
            8 => Anchor::BottomRight,
            _ => {
                return Err(Error::unexpected(
                    "pane anchor",
                    &[0, 8],
                    &[value],
                ))
            }
        })
    }

    pub fn raw(self) -> u8 {
        self as u8
    }
}

/// Read a reserved filler: either the canonical ASCII text or all zeros.
fn read_reserved(r: &mut BinaryReader<'_>, canonical: &'static [u8]) -> Result<()> {
    let bytes = r.read_bytes(canonical.len())?;
    if bytes == canonical || bytes.iter().all(|&b| b == 0) {
        Ok(())
    } else {
        Err(Error::unexpected("reserved filler", canonical, bytes))
    }
}

/// Read a fixed-width ASCII name field.
fn read_fixed_name(r: &mut BinaryReader<'_>, len: usize) -> Result<String> {
    let start = r.position();
    let bytes = r.read_bytes(len)?;
    if !bytes.is_ascii() {
        return Err(Error::format(start, "pane name is not ASCII".to_string()));
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Write a name into a fixed-width field, space-padding short names.
fn write_fixed_name(w: &mut BinaryWriter, name: &str, len: usize) -> Result<()> {
    if !name.is_ascii() || name.len() > len {
        return Err(Error::format(
            w.position(),
            format!("pane name {name:?} does not fit {len} ASCII bytes"),
        ));
    }
    w.write_bytes(name.as_bytes());
    for _ in name.len()..len {
        w.write_u8(b' ');
    }
    Ok(())
}

/// The base UI element: a positioned, scalable, rotatable box.
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    /// `PAN2` or the lowercase `pan2` variant some files carry.
    pub tag: [u8; 4],
    pub unk1: u16,
    pub enabled: u8,
    pub anchor: Anchor,
    pub name: String,
    pub secondary_name: String,
    pub size_x: f32,
    pub size_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub unk4: f32,
}

impl Default for Pane {
    fn default() -> Self {
        Self::new()
    }
}

impl Pane {
    /// Defaults for a freshly created element: a 10x10 box at the origin.
    pub fn new() -> Self {
        Self {
            tag: *b"PAN2",
            unk1: 0,
            enabled: 1,
            anchor: Anchor::TopLeft,
            name: "New_Pane".to_string(),
            secondary_name: "        ".to_string(),
            size_x: 10.0,
            size_y: 10.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            unk4: 0.0,
        }
    }

    /// Displacement from the offset point to the box's top-left corner.
    pub fn anchor_offset(&self) -> (f32, f32) {
        let (w, h) = (self.size_x, self.size_y);
        match self.anchor {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopCenter => (-w / 2.0, 0.0),
            Anchor::TopRight => (-w, 0.0),
            Anchor::CenterLeft => (0.0, -h / 2.0),
            Anchor::Center => (-w / 2.0, -h / 2.0),
            Anchor::CenterRight => (-w, -h / 2.0),
            Anchor::BottomLeft => (0.0, -h),
            Anchor::BottomCenter => (-w / 2.0, -h),
            Anchor::BottomRight => (-w, -h),
        }
    }

    /// Parse a 0x48-byte pane record at the cursor.
    pub fn parse(r: &mut BinaryReader<'_>) -> Result<Self> {
        let start = r.position();
        let tag = r.read_tag()?;
        if &tag != b"PAN2" && &tag != b"pan2" {
            return Err(Error::UnknownChunk { tag, offset: start });
        }
        let size = r.read_u32()? as usize;
        if size != PANE_SIZE {
            return Err(Error::unexpected(
                "pane record size",
                &(PANE_SIZE as u32).to_be_bytes(),
                &(size as u32).to_be_bytes(),
            ));
        }
        let marker = r.read_u16()?;
        if marker != 0x40 {
            return Err(Error::unexpected(
                "pane record marker",
                &0x40u16.to_be_bytes(),
                &marker.to_be_bytes(),
            ));
        }

        let unk1 = r.read_u16()?;
        let enabled = r.read_u8()?;
        let anchor = Anchor::from_raw(r.read_u8()?)?;
        read_reserved(r, b"RE")?;
        let name = read_fixed_name(r, 8)?;
        let secondary_name = read_fixed_name(r, 8)?;

        let size_x = r.read_f32()?;
        let size_y = r.read_f32()?;
        let scale_x = r.read_f32()?;
        let scale_y = r.read_f32()?;
        for _ in 0..2 {
            let zero = r.read_f32()?;
            if zero != 0.0 {
                return Err(Error::unexpected(
                    "pane zero float",
                    &0.0f32.to_be_bytes(),
                    &zero.to_be_bytes(),
                ));
            }
        }
        let rotation = r.read_f32()?;
        let offset_x = r.read_f32()?;
        let offset_y = r.read_f32()?;
        let unk4 = r.read_f32()?;

        debug_assert_eq!(r.position(), start + PANE_SIZE);
        Ok(Self {
            tag,
            unk1,
            enabled,
            anchor,
            name,
            secondary_name,
            size_x,
            size_y,
            scale_x,
            scale_y,
            rotation,
            offset_x,
            offset_y,
            unk4,
        })
    }

    /// Emit the 0x48-byte pane record.
    pub fn write(&self, w: &mut BinaryWriter) -> Result<()> {
        let start = w.position();
        w.write_tag(self.tag);
        w.write_u32(PANE_SIZE as u32);
        w.write_u16(0x40);
        w.write_u16(self.unk1);
        w.write_u8(self.enabled);
        w.write_u8(self.anchor.raw());
        w.write_bytes(b"RE");
        write_fixed_name(w, &self.name, 8)?;
        write_fixed_name(w, &self.secondary_name, 8)?;

        w.write_f32(self.size_x);
        w.write_f32(self.size_y);
        w.write_f32(self.scale_x);
        w.write_f32(self.scale_y);
        w.write_f32(0.0);
        w.write_f32(0.0);
        w.write_f32(self.rotation);
        w.write_f32(self.offset_x);
        w.write_f32(self.offset_y);
        w.write_f32(self.unk4);

        let end = w.position();
        if end != start + PANE_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "PAN2",
                start,
                expected: start + PANE_SIZE,
                actual: end,
            });
        }
        Ok(())
    }
}

/// One window corner: a material plus two opaque scalars.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowCorner {
    pub material: String,
    pub unk2: u16,
    pub unk3: u32,
}

/// A bordered window built from four corner materials and a fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub pane: Pane,
    pub content_size: u16,
    pub padding: [u8; 8],
    pub corners: [WindowCorner; 4],
    pub unkbyte1: u8,
    pub unkbyte2: u8,
    pub unk3: u16,
    pub unk4: u16,
    pub unk5: u16,
    pub unk6: u16,
    pub unk7: u16,
    pub material: String,
}

impl Window {
    /// Parse a 0x90-byte window chunk at the cursor.
    pub fn parse(r: &mut BinaryReader<'_>, mat1: &Mat1) -> Result<Self> {
        let start = r.position();
        r.expect_magic(b"WIN2")?;
        let size = r.read_u32()? as usize;
        if size != WINDOW_SIZE {
            return Err(Error::unexpected(
                "window chunk size",
                &(WINDOW_SIZE as u32).to_be_bytes(),
                &(size as u32).to_be_bytes(),
            ));
        }
        let pane = Pane::parse(r)?;

        let content_size = r.read_u16()?;
        read_reserved(r, b"RESERV")?;
        let mut padding = [0u8; 8];
        padding.copy_from_slice(r.read_bytes(8)?);

        let mut corners: [WindowCorner; 4] = Default::default();
        for corner in &mut corners {
            let index = r.read_u16()? as usize;
            corner.material = mat1.material_name(index)?.to_string();
        }

        let unkbyte1 = r.read_u8()?;
        let unkbyte2 = r.read_u8()?;
        let unk3 = r.read_u16()?;
        let unk4 = r.read_u16()?;
        let unk5 = r.read_u16()?;
        let unk6 = r.read_u16()?;
        let unk7 = r.read_u16()?;
        let index = r.read_u16()? as usize;
        let material = mat1.material_name(index)?.to_string();
        read_reserved(r, b"RE")?;

        for corner in &mut corners {
            corner.unk2 = r.read_u16()?;
        }
        for corner in &mut corners {
            corner.unk3 = r.read_u32()?;
        }

        let end = r.position();
        if end != start + WINDOW_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "WIN2",
                start,
                expected: start + WINDOW_SIZE,
                actual: end,
            });
        }
        Ok(Self {
            pane,
            content_size,
            padding,
            corners,
            unkbyte1,
            unkbyte2,
            unk3,
            unk4,
            unk5,
            unk6,
            unk7,
            material,
        })
    }

    pub fn write(&self, w: &mut BinaryWriter, mat1: &Mat1) -> Result<()> {
        let start = w.position();
        w.write_tag(*b"WIN2");
        w.write_u32(WINDOW_SIZE as u32);
        self.pane.write(w)?;

        w.write_u16(self.content_size);
        w.write_bytes(b"RESERV");
        w.write_bytes(&self.padding);
        for corner in &self.corners {
            w.write_u16(mat1.material_index(&corner.material)?);
        }

        w.write_u8(self.unkbyte1);
        w.write_u8(self.unkbyte2);
        w.write_u16(self.unk3);
        w.write_u16(self.unk4);
        w.write_u16(self.unk5);
        w.write_u16(self.unk6);
        w.write_u16(self.unk7);
        w.write_u16(mat1.material_index(&self.material)?);
        w.write_bytes(b"RE");

        for corner in &self.corners {
            w.write_u16(corner.unk2);
        }
        for corner in &self.corners {
            w.write_u32(corner.unk3);
        }

        let end = w.position();
        if end != start + WINDOW_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "WIN2",
                start,
                expected: start + WINDOW_SIZE,
                actual: end,
            });
        }
        Ok(())
    }
}

/// One gradient descriptor of a picture element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gradient {
    pub unk1: u16,
    pub unk2: u16,
    pub unknowns: [u16; 4],
    pub col1: Color,
    pub col2: Color,
}

/// A textured quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub pane: Pane,
    pub content_size: u16,
    pub unk_index: u16,
    pub material: String,
    pub color1: Gradient,
    pub color2: Gradient,
}

impl Picture {
    /// Parse a 0x80-byte picture chunk at the cursor.
    pub fn parse(r: &mut BinaryReader<'_>, mat1: &Mat1) -> Result<Self> {
        let start = r.position();
        r.expect_magic(b"PIC2")?;
        let _size = r.read_u32()?;
        let pane = Pane::parse(r)?;

        let content_size = r.read_u16()?;
        let unk_index = r.read_u16()?;
        let index = r.read_u16()? as usize;
        let material = mat1.material_name(index)?.to_string();
        read_reserved(r, b"RE")?;

        let mut color1 = Gradient::default();
        let mut color2 = Gradient::default();
        color1.unk1 = r.read_u16()?;
        color1.unk2 = r.read_u16()?;
        color2.unk1 = r.read_u16()?;
        color2.unk2 = r.read_u16()?;
        for slot in &mut color1.unknowns {
            *slot = r.read_u16()?;
        }
        for slot in &mut color2.unknowns {
            *slot = r.read_u16()?;
        }
        color1.col1 = Color::parse(r)?;
        color1.col2 = Color::parse(r)?;
        color2.col1 = Color::parse(r)?;
        color2.col2 = Color::parse(r)?;

        let end = r.position();
        if end != start + PICTURE_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "PIC2",
                start,
                expected: start + PICTURE_SIZE,
                actual: end,
            });
        }
        Ok(Self {
            pane,
            content_size,
            unk_index,
            material,
            color1,
            color2,
        })
    }

    pub fn write(&self, w: &mut BinaryWriter, mat1: &Mat1) -> Result<()> {
        let start = w.position();
        w.write_tag(*b"PIC2");
        w.write_u32(PICTURE_SIZE as u32);
        self.pane.write(w)?;

        w.write_u16(self.content_size);
        w.write_u16(self.unk_index);
        w.write_u16(mat1.material_index(&self.material)?);
        w.write_bytes(b"RE");

        w.write_u16(self.color1.unk1);
        w.write_u16(self.color1.unk2);
        w.write_u16(self.color2.unk1);
        w.write_u16(self.color2.unk2);
        for value in &self.color1.unknowns {
            w.write_u16(*value);
        }
        for value in &self.color2.unknowns {
            w.write_u16(*value);
        }
        w.write_bytes(&self.color1.col1.to_bytes());
        w.write_bytes(&self.color1.col2.to_bytes());
        w.write_bytes(&self.color2.col1.to_bytes());
        w.write_bytes(&self.color2.col2.to_bytes());

        let end = w.position();
        if end != start + PICTURE_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "PIC2",
                start,
                expected: start + PICTURE_SIZE,
                actual: end,
            });
        }
        Ok(())
    }
}

/// A text element. Needs a material carrying a font.
#[derive(Debug, Clone, PartialEq)]
pub struct Textbox {
    pub pane: Pane,
    pub content_size: u16,
    pub unk1: u16,
    pub material: String,
    pub signed_unk3: i16,
    pub signed_unk4: i16,
    pub unk5: u16,
    pub unk6: u16,
    pub unk7: u8,
    pub unk8: u8,
    pub color_top: Color,
    pub color_bottom: Color,
    pub unk11: u8,
    pub text_cutoff: u16,
    pub text: String,
}

impl Textbox {
    /// Parse a textbox chunk at the cursor. The chunk is variable-length;
    /// the declared size covers the trailing text and its padding.
    pub fn parse(r: &mut BinaryReader<'_>, mat1: &Mat1) -> Result<Self> {
        let start = r.position();
        r.expect_magic(b"TBX2")?;
        let size = r.read_u32()? as usize;
        let pane = Pane::parse(r)?;

        let content_size = r.read_u16()?;
        let unk1 = r.read_u16()?;
        let index = r.read_u16()? as usize;
        let material = mat1.material_name(index)?.to_string();
        let signed_unk3 = r.read_i16()?;
        let signed_unk4 = r.read_i16()?;
        let unk5 = r.read_u16()?;
        let unk6 = r.read_u16()?;
        let unk7 = r.read_u8()?;
        let unk8 = r.read_u8()?;
        let color_top = Color::parse(r)?;
        let color_bottom = Color::parse(r)?;
        let unk11 = r.read_u8()?;
        read_reserved(r, b"RES")?;
        let text_cutoff = r.read_u16()?;
        let text_len = r.read_u16()? as usize;

        let fixed_end = r.position();
        if fixed_end != start + TEXTBOX_BASE_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "TBX2",
                start,
                expected: start + TEXTBOX_BASE_SIZE,
                actual: fixed_end,
            });
        }
        let text = encoding::decode_shift_jis(r.read_bytes(text_len)?)?;

        r.seek(start + size);
        Ok(Self {
            pane,
            content_size,
            unk1,
            material,
            signed_unk3,
            signed_unk4,
            unk5,
            unk6,
            unk7,
            unk8,
            color_top,
            color_bottom,
            unk11,
            text_cutoff,
            text,
        })
    }

    /// Emit the chunk; the size field is backpatched once the text and
    /// its 8-byte-alignment padding are in place.
    pub fn write(&self, w: &mut BinaryWriter, mat1: &Mat1) -> Result<()> {
        let start = w.position();
        w.write_tag(*b"TBX2");
        w.write_u32(TEXTBOX_BASE_SIZE as u32); // patched below
        self.pane.write(w)?;

        w.write_u16(self.content_size);
        w.write_u16(self.unk1);
        w.write_u16(mat1.material_index(&self.material)?);
        w.write_i16(self.signed_unk3);
        w.write_i16(self.signed_unk4);
        w.write_u16(self.unk5);
        w.write_u16(self.unk6);
        w.write_u8(self.unk7);
        w.write_u8(self.unk8);
        w.write_bytes(&self.color_top.to_bytes());
        w.write_bytes(&self.color_bottom.to_bytes());
        w.write_u8(self.unk11);
        w.write_bytes(b"RES");
        w.write_u16(self.text_cutoff);

        let text = encoding::encode_shift_jis(&self.text)?;
        w.write_u16(text.len() as u16);
        let fixed_end = w.position();
        if fixed_end != start + TEXTBOX_BASE_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "TBX2",
                start,
                expected: start + TEXTBOX_BASE_SIZE,
                actual: fixed_end,
            });
        }
        w.write_bytes(&text);
        w.pad_to(8);

        let end = w.position();
        w.patch_u32(start + 4, (end - start) as u32);
        w.seek(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat1::Material;

    fn mat1_with(names: &[&str]) -> Mat1 {
        Mat1 {
            materials: names
                .iter()
                .map(|n| Material {
                    name: n.to_string(),
                    ..Material::default()
                })
                .collect(),
        }
    }

    fn sample_pane(name: &str) -> Pane {
        Pane {
            name: format!("{name:<8}"),
            anchor: Anchor::Center,
            size_x: 64.0,
            size_y: 32.0,
            offset_x: 10.0,
            offset_y: -4.0,
            rotation: 90.0,
            ..Pane::new()
        }
    }

    #[test]
    fn test_pane_round_trip() {
        let pane = sample_pane("btn_ok");
        let mut w = BinaryWriter::new();
        pane.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), PANE_SIZE);
        let parsed = Pane::parse(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(parsed, pane);
    }

    #[test]
    fn test_lowercase_tag_preserved() {
        let pane = Pane {
            tag: *b"pan2",
            ..sample_pane("lower")
        };
        let mut w = BinaryWriter::new();
        pane.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], b"pan2");
        let parsed = Pane::parse(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(parsed.tag, *b"pan2");
    }

    #[test]
    fn test_zeroed_reserved_accepted() {
        let pane = sample_pane("zeroed");
        let mut w = BinaryWriter::new();
        pane.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();
        bytes[0xE] = 0;
        bytes[0xF] = 0;
        assert!(Pane::parse(&mut BinaryReader::new(&bytes)).is_ok());
        // Anything else is rejected.
        bytes[0xE] = b'X';
        assert!(matches!(
            Pane::parse(&mut BinaryReader::new(&bytes)),
            Err(Error::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_out_of_range_anchor_rejected() {
        let pane = sample_pane("anchored");
        let mut w = BinaryWriter::new();
        pane.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();
        bytes[0xD] = 9;
        assert!(matches!(
            Pane::parse(&mut BinaryReader::new(&bytes)),
            Err(Error::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_nonzero_reserved_float_rejected() {
        let pane = sample_pane("floats");
        let mut w = BinaryWriter::new();
        pane.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();
        // First reserved float slot sits after size/scale.
        bytes[0x30..0x34].copy_from_slice(&1.0f32.to_be_bytes());
        assert!(matches!(
            Pane::parse(&mut BinaryReader::new(&bytes)),
            Err(Error::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_anchor_offsets() {
        let mut pane = sample_pane("anchors");
        pane.size_x = 100.0;
        pane.size_y = 50.0;
        pane.anchor = Anchor::TopLeft;
        assert_eq!(pane.anchor_offset(), (0.0, 0.0));
        pane.anchor = Anchor::Center;
        assert_eq!(pane.anchor_offset(), (-50.0, -25.0));
        pane.anchor = Anchor::BottomRight;
        assert_eq!(pane.anchor_offset(), (-100.0, -50.0));
    }

    #[test]
    fn test_window_round_trip() {
        let mat1 = mat1_with(&["frame", "fill"]);
        let window = Window {
            pane: sample_pane("win_root"),
            content_size: 4,
            padding: [0xFF; 8],
            corners: [
                WindowCorner {
                    material: "frame".into(),
                    unk2: 1,
                    unk3: 2,
                },
                WindowCorner {
                    material: "frame".into(),
                    unk2: 3,
                    unk3: 4,
                },
                WindowCorner {
                    material: "fill".into(),
                    unk2: 5,
                    unk3: 6,
                },
                WindowCorner {
                    material: "fill".into(),
                    unk2: 7,
                    unk3: 8,
                },
            ],
            unkbyte1: 1,
            unkbyte2: 2,
            unk3: 3,
            unk4: 4,
            unk5: 5,
            unk6: 6,
            unk7: 7,
            material: "fill".into(),
        };
        let mut w = BinaryWriter::new();
        window.write(&mut w, &mat1).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), WINDOW_SIZE);
        let parsed = Window::parse(&mut BinaryReader::new(&bytes), &mat1).unwrap();
        assert_eq!(parsed, window);
    }

    #[test]
    fn test_window_default_material_is_not_a_corner() {
        // The fill material must survive even when every corner names a
        // different material.
        let mat1 = mat1_with(&["corner", "fill"]);
        let window = Window {
            pane: sample_pane("win"),
            content_size: 0,
            padding: [0xFF; 8],
            corners: std::array::from_fn(|_| WindowCorner {
                material: "corner".into(),
                unk2: 0,
                unk3: 0,
            }),
            unkbyte1: 0,
            unkbyte2: 0,
            unk3: 0,
            unk4: 0,
            unk5: 0,
            unk6: 0,
            unk7: 0,
            material: "fill".into(),
        };
        let mut w = BinaryWriter::new();
        window.write(&mut w, &mat1).unwrap();
        let parsed = Window::parse(&mut BinaryReader::new(&w.into_bytes()), &mat1).unwrap();
        assert_eq!(parsed.material, "fill");
    }

    #[test]
    fn test_picture_round_trip() {
        let mat1 = mat1_with(&["pic_mat"]);
        let picture = Picture {
            pane: sample_pane("pic"),
            content_size: 2,
            unk_index: 1,
            material: "pic_mat".into(),
            color1: Gradient {
                unk1: 1,
                unk2: 2,
                unknowns: [3, 4, 5, 6],
                col1: Color::new(255, 0, 0, 255),
                col2: Color::new(0, 255, 0, 255),
            },
            color2: Gradient::default(),
        };
        let mut w = BinaryWriter::new();
        picture.write(&mut w, &mat1).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), PICTURE_SIZE);
        let parsed = Picture::parse(&mut BinaryReader::new(&bytes), &mat1).unwrap();
        assert_eq!(parsed, picture);
    }

    #[test]
    fn test_textbox_round_trip_with_japanese_text() {
        let mat1 = mat1_with(&["font_mat"]);
        let textbox = Textbox {
            pane: sample_pane("label"),
            content_size: 0,
            unk1: 0,
            material: "font_mat".into(),
            signed_unk3: -1,
            signed_unk4: 2,
            unk5: 3,
            unk6: 4,
            unk7: 5,
            unk8: 6,
            color_top: Color::new(255, 255, 255, 255),
            color_bottom: Color::new(0, 0, 0, 255),
            unk11: 7,
            text_cutoff: 12,
            text: "スタート".to_string(),
        };
        let mut w = BinaryWriter::new();
        textbox.write(&mut w, &mat1).unwrap();
        let bytes = w.into_bytes();

        // Variable-length chunk: size field covers text plus padding.
        let size = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert_eq!(size, bytes.len());
        assert_eq!(size % 8, 0);
        assert!(size > TEXTBOX_BASE_SIZE);

        let parsed = Textbox::parse(&mut BinaryReader::new(&bytes), &mat1).unwrap();
        assert_eq!(parsed, textbox);
    }

    #[test]
    fn test_textbox_empty_text() {
        let mat1 = mat1_with(&["font_mat"]);
        let textbox = Textbox {
            pane: sample_pane("empty"),
            content_size: 0,
            unk1: 0,
            material: "font_mat".into(),
            signed_unk3: 0,
            signed_unk4: 0,
            unk5: 0,
            unk6: 0,
            unk7: 0,
            unk8: 0,
            color_top: Color::default(),
            color_bottom: Color::default(),
            unk11: 0,
            text_cutoff: 0,
            text: String::new(),
        };
        let mut w = BinaryWriter::new();
        textbox.write(&mut w, &mat1).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), TEXTBOX_BASE_SIZE);
        let parsed = Textbox::parse(&mut BinaryReader::new(&bytes), &mat1).unwrap();
        assert_eq!(parsed, textbox);
    }

    #[test]
    fn test_unknown_material_name_is_hard_error() {
        let mat1 = mat1_with(&["known"]);
        let picture = Picture {
            pane: sample_pane("pic"),
            content_size: 0,
            unk_index: 0,
            material: "missing".into(),
            color1: Gradient::default(),
            color2: Gradient::default(),
        };
        let mut w = BinaryWriter::new();
        assert!(matches!(
            picture.write(&mut w, &mat1),
            Err(Error::ResourceNotFound { .. })
        ));
    }
}
