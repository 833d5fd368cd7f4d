//! The MAT1 material table chunk.
//!
//! MAT1 is a set of deduplicated parallel sub-arrays referenced by
//! fixed-size material records through small integer indices, plus an
//! index-remap table and a name string table. Decoding resolves the
//! remap table and every sub-array index immediately, producing an
//! index-free list of [`Material`]s in logical order. Encoding rebuilds
//! every sub-array from scratch by value-interning, so round-tripped
//! chunks are semantically, not byte, identical.

mod datatypes;
mod material;
mod pools;

pub use datatypes::{
    AlphaCompare, Blend, Blob, ChannelControl, Color, CullMode, FontNumber, IndirectInitData,
    TevColor, TevKColor, TevOrder, TevStage, TevSwapMode, TevSwapModeTable, TexCoordInfo,
    TexMatrix,
};
pub use material::{Material, MATERIAL_RECORD_SIZE};
pub use pools::{DataPools, Pool};

use blotool_common::{BinaryReader, BinaryWriter};

use crate::string_table::StringTable;
use crate::{Error, Result};

/// Number of offset fields in the MAT1 header.
const SECTION_COUNT: usize = 23;

/// Absolute offsets of the MAT1 sub-sections, in header order.
#[derive(Debug, Clone)]
pub(crate) struct SectionOffsets {
    pub material_init_data: usize,
    pub remap_table: usize,
    pub material_names: usize,
    /// `None` when the heuristic decides the section is absent.
    pub indirect: Option<usize>,
    pub gx_cull_mode: usize,
    pub material_colors: usize,
    pub color_channel_counts: usize,
    pub color_channels: usize,
    pub tex_gen_counts: usize,
    pub tex_coords: usize,
    pub tex_matrices: usize,
    pub texture_indices: usize,
    pub fonts: usize,
    pub tev_orders: usize,
    pub tev_colors: usize,
    pub tev_k_colors: usize,
    pub tev_stage_counts: usize,
    pub tev_stages: usize,
    pub tev_swap_modes: usize,
    pub tev_swap_mode_tables: usize,
    pub alpha_compares: usize,
    pub blends: usize,
    pub dithers: usize,
}

impl SectionOffsets {
    /// Read the 23 section-relative offset fields at the cursor and
    /// absolutize them against the chunk start.
    fn parse(r: &mut BinaryReader<'_>, start: usize) -> Result<Self> {
        let mut raw = [0usize; SECTION_COUNT];
        for slot in raw.iter_mut() {
            *slot = start + r.read_u32()? as usize;
        }

        // The format has no explicit "no indirect section" flag. The
        // reference tooling treats a zero offset, or an offset
        // implausibly close to MaterialNames, as absence. Preserved
        // as-is for compatibility; this is a known approximation.
        let indirect = raw[3];
        let names = raw[2];
        let indirect = if indirect == start || (indirect as isize - names as isize) < 5 {
            None
        } else {
            Some(indirect)
        };

        Ok(Self {
            material_init_data: raw[0],
            remap_table: raw[1],
            material_names: raw[2],
            indirect,
            gx_cull_mode: raw[4],
            material_colors: raw[5],
            color_channel_counts: raw[6],
            color_channels: raw[7],
            tex_gen_counts: raw[8],
            tex_coords: raw[9],
            tex_matrices: raw[10],
            texture_indices: raw[11],
            fonts: raw[12],
            tev_orders: raw[13],
            tev_colors: raw[14],
            tev_k_colors: raw[15],
            tev_stage_counts: raw[16],
            tev_stages: raw[17],
            tev_swap_modes: raw[18],
            tev_swap_mode_tables: raw[19],
            alpha_compares: raw[20],
            blends: raw[21],
            dithers: raw[22],
        })
    }
}

/// The material table: an ordered list of fully-resolved materials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mat1 {
    pub materials: Vec<Material>,
}

impl Mat1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the material named `name`; unknown names are a hard error
    /// (the format stores material references as indices, so there is no
    /// way to emit a dangling name).
    pub fn material_index(&self, name: &str) -> Result<u16> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|i| i as u16)
            .ok_or_else(|| Error::ResourceNotFound {
                kind: "material",
                name: name.to_string(),
            })
    }

    pub fn material_name(&self, index: usize) -> Result<&str> {
        self.materials
            .get(index)
            .map(|m| m.name.as_str())
            .ok_or(Error::IndexOutOfRange {
                table: "material table",
                index,
                len: self.materials.len(),
            })
    }

    /// Decode a MAT1 chunk at the reader's cursor.
    pub fn parse(r: &mut BinaryReader<'_>) -> Result<Self> {
        let start = r.position();
        r.expect_magic(b"MAT1")?;
        let size = r.read_u32()? as usize;
        let count = r.read_u16()? as usize;
        r.advance(2); // padding

        let offsets = SectionOffsets::parse(r, start)?;

        r.seek(offsets.material_names);
        let names = StringTable::parse(r)?;

        let mut mat1 = Self::new();
        for i in 0..count {
            // Logical order -> physical record slot.
            let slot = r.read_u16_at(offsets.remap_table + i * 2)? as usize;
            let record = offsets.material_init_data + slot * MATERIAL_RECORD_SIZE;
            let mut material = Material::parse(r, record, &offsets)?;
            material.name = names.get(i)?.to_string();
            if let Some(indirect_start) = offsets.indirect {
                material.indirect = Some(Blob::parse_at(r, indirect_start, i)?);
            }
            mat1.materials.push(material);
        }

        r.seek(start + size);
        Ok(mat1)
    }

    /// Encode the chunk: records first (interning into fresh pools),
    /// then the remap table, names, and the pooled sub-arrays, then
    /// backpatch the 23 header offsets and the section size.
    pub fn write(&self, w: &mut BinaryWriter) -> Result<()> {
        let start = w.position();
        w.write_tag(*b"MAT1");
        w.write_u32(0); // section size, patched below
        w.write_u16(self.materials.len() as u16);
        w.write_u16(0xFFFF);

        let header = w.position();
        for _ in 0..SECTION_COUNT {
            w.write_u32(0);
        }
        let mut rel = [0u32; SECTION_COUNT];

        let mut pools = DataPools::seeded();

        rel[0] = (w.position() - start) as u32;
        for material in &self.materials {
            material.write_record(w, &mut pools)?;
        }
        let has_indirect = self.materials.iter().any(|m| m.indirect.is_some());

        // Canonical trailing entries the console's own files carry even
        // when no record references them.
        pools
            .color_channels
            .push(ChannelControl::new([0x00, 0x01, 0xFF, 0xFF]));
        pools
            .tex_coords
            .push(TexCoordInfo::new([0x01, 0x04, 0x3C, 0xFF]));

        rel[1] = (w.position() - start) as u32;
        for i in 0..self.materials.len() {
            w.write_i16(i as i16);
        }
        w.pad_to(4);

        rel[2] = (w.position() - start) as u32;
        let names = StringTable {
            strings: self.materials.iter().map(|m| m.name.clone()).collect(),
        };
        names.write(w)?;
        w.pad_to(4);

        if has_indirect {
            rel[3] = (w.position() - start) as u32;
            for material in &self.materials {
                match &material.indirect {
                    Some(blob) => w.write_bytes(blob.as_bytes()),
                    None => w.write_bytes(&[0u8; IndirectInitData::SIZE]),
                }
            }
        }

        let section = |w: &mut BinaryWriter, empty: bool| -> u32 {
            if empty {
                0
            } else {
                (w.position() - start) as u32
            }
        };

        rel[4] = section(w, pools.cull_modes.is_empty());
        for mode in pools.cull_modes.entries() {
            w.write_u32(mode.raw());
        }
        w.pad_to(4);

        rel[5] = section(w, pools.material_colors.is_empty());
        for color in pools.material_colors.entries() {
            w.write_bytes(&color.to_bytes());
        }
        w.pad_to(4);

        rel[6] = section(w, pools.color_channel_counts.is_empty());
        for value in pools.color_channel_counts.entries() {
            w.write_u8(*value);
        }
        w.pad_to(4);

        rel[7] = section(w, pools.color_channels.is_empty());
        for blob in pools.color_channels.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[8] = section(w, pools.tex_gen_counts.is_empty());
        for value in pools.tex_gen_counts.entries() {
            w.write_u8(*value);
        }
        w.pad_to(4);

        rel[9] = section(w, pools.tex_coords.is_empty());
        for blob in pools.tex_coords.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[10] = section(w, pools.tex_matrices.is_empty());
        for blob in pools.tex_matrices.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[11] = section(w, pools.texture_indices.is_empty());
        for index in pools.texture_indices.entries() {
            w.write_u16(*index);
        }
        w.pad_to(4);

        rel[12] = section(w, pools.fonts.is_empty());
        for blob in pools.fonts.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[13] = section(w, pools.tev_orders.is_empty());
        for blob in pools.tev_orders.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[14] = section(w, pools.tev_colors.is_empty());
        for blob in pools.tev_colors.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[15] = section(w, pools.tev_k_colors.is_empty());
        for blob in pools.tev_k_colors.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[16] = section(w, pools.tev_stage_counts.is_empty());
        for value in pools.tev_stage_counts.entries() {
            w.write_u8(*value);
        }
        w.pad_to(4);

        rel[17] = section(w, pools.tev_stages.is_empty());
        for blob in pools.tev_stages.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[18] = section(w, pools.tev_swap_modes.is_empty());
        for blob in pools.tev_swap_modes.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[19] = section(w, pools.tev_swap_mode_tables.is_empty());
        for blob in pools.tev_swap_mode_tables.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[20] = section(w, pools.alpha_compares.is_empty());
        for blob in pools.alpha_compares.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[21] = section(w, pools.blends.is_empty());
        for blob in pools.blends.entries() {
            w.write_bytes(blob.as_bytes());
        }
        w.pad_to(4);

        rel[22] = section(w, pools.dithers.is_empty());
        for value in pools.dithers.entries() {
            w.write_u8(*value);
        }
        w.pad_to(4);

        w.pad_to(0x20);
        let end = w.position();

        for (i, offset) in rel.iter().enumerate() {
            w.patch_u32(header + i * 4, *offset);
        }
        w.patch_u32(start + 4, (end - start) as u32);
        w.seek(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_material(name: &str) -> Material {
        let mut mat = Material {
            name: name.to_string(),
            flag: 1,
            cull_mode: CullMode::Back,
            color_channel_count: 1,
            tex_gen_count: 1,
            tev_stage_count: 1,
            dither: 0,
            ..Material::default()
        };
        mat.mat_colors[0] = Some(Color::new(255, 255, 255, 255));
        mat.color_channels[0] = Some(ChannelControl::new([0x00, 0x01, 0xFF, 0xFF]));
        mat.tex_coord_generators[0] = Some(TexCoordInfo::new([0x01, 0x04, 0x3C, 0xFF]));
        mat.textures[0] = Some(0);
        mat.tev_stages[0] = Some(TevStage::new([0xC0; 0x14]));
        mat.alpha_compare = AlphaCompare::new([0x07, 0x00, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x00]);
        mat.blend = Blend::new([0x01, 0x04, 0x05, 0x00]);
        mat
    }

    fn round_trip(mat1: &Mat1) -> Mat1 {
        let mut w = BinaryWriter::new();
        mat1.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len() % 0x20, 0);
        Mat1::parse(&mut BinaryReader::new(&bytes)).unwrap()
    }

    #[test]
    fn test_empty_table_round_trip() {
        let mat1 = Mat1::new();
        assert_eq!(round_trip(&mat1), mat1);
    }

    #[test]
    fn test_single_material_round_trip() {
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a")],
        };
        assert_eq!(round_trip(&mat1), mat1);
    }

    #[test]
    fn test_model_equality_is_fixed_point() {
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a"), sample_material("mat_b")],
        };
        let once = round_trip(&mat1);
        let twice = round_trip(&once);
        assert_eq!(once, mat1);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_identical_substructures_share_pool_entries() {
        // Two materials with byte-identical tev stages and the same
        // texture index must intern to single pooled entries.
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a"), sample_material("mat_b")],
        };
        let mut pools = DataPools::seeded();
        let mut w = BinaryWriter::new();
        for m in &mat1.materials {
            m.write_record(&mut w, &mut pools).unwrap();
        }
        assert_eq!(pools.tev_stages.len(), 1);
        assert_eq!(pools.texture_indices.len(), 1);
        assert_eq!(pools.alpha_compares.len(), 1);
    }

    #[test]
    fn test_interning_idempotent_under_reordering() {
        let a = sample_material("mat_a");
        let mut b = sample_material("mat_b");
        b.tev_stages[0] = Some(TevStage::new([0xAA; 0x14]));

        let mut w = BinaryWriter::new();
        let mut forward = DataPools::seeded();
        a.write_record(&mut w, &mut forward).unwrap();
        b.write_record(&mut w, &mut forward).unwrap();

        let mut reverse = DataPools::seeded();
        b.write_record(&mut w, &mut reverse).unwrap();
        a.write_record(&mut w, &mut reverse).unwrap();

        assert_eq!(forward.tev_stages.len(), reverse.tev_stages.len());
        assert_eq!(forward.blends.len(), reverse.blends.len());
    }

    #[test]
    fn test_indirect_round_trip() {
        let mut mat = sample_material("mat_ind");
        mat.indirect = Some(IndirectInitData::new([0x5A; 0x128]));
        let mat1 = Mat1 {
            materials: vec![mat],
        };
        let parsed = round_trip(&mat1);
        assert_eq!(parsed.materials[0].indirect, mat1.materials[0].indirect);
    }

    #[test]
    fn test_absent_indirect_heuristic_zero_offset() {
        // Without indirect data the writer records offset 0, which the
        // reader must treat as absence.
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a")],
        };
        let parsed = round_trip(&mat1);
        assert_eq!(parsed.materials[0].indirect, None);
    }

    #[test]
    fn test_absent_indirect_heuristic_small_gap() {
        // An offset fewer than 5 bytes past MaterialNames also reads as
        // absent; matches the reference tooling's approximation.
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a")],
        };
        let mut w = BinaryWriter::new();
        mat1.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();

        // Header offset slot 3 is IndirectInitData, slot 2 MaterialNames.
        let names_off = u32::from_be_bytes(bytes[12 + 8..12 + 12].try_into().unwrap());
        let fake = (names_off + 4).to_be_bytes();
        bytes[12 + 12..12 + 16].copy_from_slice(&fake);

        let parsed = Mat1::parse(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(parsed.materials[0].indirect, None);
    }

    #[test]
    fn test_material_lookup() {
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a"), sample_material("mat_b")],
        };
        assert_eq!(mat1.material_index("mat_b").unwrap(), 1);
        assert_eq!(mat1.material_name(0).unwrap(), "mat_a");
        assert!(matches!(
            mat1.material_index("missing"),
            Err(Error::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_record_padding_validated() {
        let mat1 = Mat1 {
            materials: vec![sample_material("mat_a")],
        };
        let mut w = BinaryWriter::new();
        mat1.write(&mut w).unwrap();
        let mut bytes = w.into_bytes();

        // First record starts right after header + offset table.
        let record = 12 + 23 * 4;
        assert_eq!(bytes[record + 0x7], 0);
        bytes[record + 0x7] = 1;
        assert!(matches!(
            Mat1::parse(&mut BinaryReader::new(&bytes)),
            Err(Error::UnexpectedValue { .. })
        ));
    }
}
