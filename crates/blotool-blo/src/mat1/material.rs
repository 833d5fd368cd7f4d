//! The fixed-size material record and its index resolution.
//!
//! On disk a material is a 0xE8-byte record whose fields are 1- or
//! 2-byte indices into the MAT1 chunk's shared per-category arrays.
//! Decoding dereferences every index immediately, so the in-memory
//! [`Material`] carries values, never raw indices (`-1` becomes `None`).
//! Index bookkeeping reappears only at write time, when the shared
//! arrays are rebuilt from scratch by value-interning.

use blotool_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

use super::datatypes::*;
use super::pools::DataPools;
use super::SectionOffsets;

/// The on-disk size of one material record.
pub const MATERIAL_RECORD_SIZE: usize = 0xE8;

/// One material, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub flag: i8,
    pub cull_mode: CullMode,
    pub color_channel_count: u8,
    pub tex_gen_count: u8,
    pub tev_stage_count: u8,
    pub dither: u8,
    pub unk: i8,
    pub mat_colors: [Option<Color>; 2],
    pub color_channels: [Option<ChannelControl>; 4],
    pub tex_coord_generators: [Option<TexCoordInfo>; 8],
    pub tex_matrices: [Option<TexMatrix>; 8],
    /// Indices into the file's TEX1 reference list, not pool indices.
    pub textures: [Option<u16>; 8],
    pub font: Option<FontNumber>,
    pub tev_k_colors: [Option<TevKColor>; 4],
    pub tev_k_color_selects: [i8; 16],
    pub tev_k_alpha_selects: [i8; 16],
    pub tev_orders: [Option<TevOrder>; 16],
    pub tev_colors: [Option<TevColor>; 4],
    pub tev_stages: [Option<TevStage>; 16],
    pub tev_swap_modes: [Option<TevSwapMode>; 16],
    pub tev_swap_mode_tables: [Option<TevSwapModeTable>; 4],
    pub alpha_compare: AlphaCompare,
    pub blend: Blend,
    pub indirect: Option<IndirectInitData>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            flag: 0,
            cull_mode: CullMode::Back,
            color_channel_count: 0,
            tex_gen_count: 0,
            tev_stage_count: 0,
            dither: 0,
            unk: 0,
            mat_colors: [None; 2],
            color_channels: [None; 4],
            tex_coord_generators: [None; 8],
            tex_matrices: [None; 8],
            textures: [None; 8],
            font: None,
            tev_k_colors: [None; 4],
            tev_k_color_selects: [0; 16],
            tev_k_alpha_selects: [0; 16],
            tev_orders: [None; 16],
            tev_colors: [None; 4],
            tev_stages: [None; 16],
            tev_swap_modes: [None; 16],
            tev_swap_mode_tables: [None; 4],
            alpha_compare: AlphaCompare::default(),
            blend: Blend::default(),
            indirect: None,
        }
    }
}

/// Read `count` 2-byte indices starting at `offset`.
fn read_i16_indices(r: &BinaryReader<'_>, offset: usize, count: usize) -> Result<Vec<i16>> {
    (0..count)
        .map(|i| r.read_i16_at(offset + i * 2).map_err(Error::from))
        .collect()
}

/// Read `count` 1-byte values starting at `offset`.
fn read_i8_values(r: &BinaryReader<'_>, offset: usize, count: usize) -> Result<Vec<i8>> {
    (0..count)
        .map(|i| r.read_i8_at(offset + i).map_err(Error::from))
        .collect()
}

/// Turn a stored index into a usize, rejecting -1 for required fields.
fn required_index(index: i16, field: &'static str) -> Result<usize> {
    usize::try_from(index).map_err(|_| Error::Format {
        offset: 0,
        message: format!("required material field {field} has index {index}"),
    })
}

/// Dereference an optional index through a shared array.
fn resolve<T, F>(index: i16, mut fetch: F) -> Result<Option<T>>
where
    F: FnMut(usize) -> Result<T>,
{
    if index < 0 {
        Ok(None)
    } else {
        fetch(index as usize).map(Some)
    }
}

impl Material {
    /// Parse the record at `record_start`, dereferencing all indices
    /// through the shared arrays located by `offsets`.
    pub(super) fn parse(
        r: &BinaryReader<'_>,
        record_start: usize,
        offsets: &SectionOffsets,
    ) -> Result<Self> {
        let mut mat = Material::default();

        mat.flag = r.read_i8_at(record_start)?;

        let cull_index = required_index(r.read_i8_at(record_start + 0x1)? as i16, "cull mode")?;
        mat.cull_mode = CullMode::parse_at(r, offsets.gx_cull_mode, cull_index)?;

        let ccc_index =
            required_index(r.read_i8_at(record_start + 0x2)? as i16, "color channel count")?;
        mat.color_channel_count = r.read_u8_at(offsets.color_channel_counts + ccc_index)?;

        let tgc_index = required_index(r.read_i8_at(record_start + 0x3)? as i16, "tex gen count")?;
        mat.tex_gen_count = r.read_u8_at(offsets.tex_gen_counts + tgc_index)?;

        let tsc_index =
            required_index(r.read_i8_at(record_start + 0x4)? as i16, "tev stage count")?;
        mat.tev_stage_count = r.read_u8_at(offsets.tev_stage_counts + tsc_index)?;

        let dither_index = required_index(r.read_i8_at(record_start + 0x5)? as i16, "dither")?;
        mat.dither = r.read_u8_at(offsets.dithers + dither_index)?;

        mat.unk = r.read_i8_at(record_start + 0x6)?;

        let pad = r.read_u8_at(record_start + 0x7)?;
        if pad != 0 {
            return Err(Error::unexpected("material record padding", &[0], &[pad]));
        }

        for (slot, index) in mat
            .mat_colors
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x8, 2)?)
        {
            *slot = resolve(index, |i| Color::parse_at(r, offsets.material_colors, i))?;
        }

        for (slot, index) in mat
            .color_channels
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0xC, 4)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.color_channels, i))?;
        }

        for (slot, index) in mat
            .tex_coord_generators
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x14, 8)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tex_coords, i))?;
        }

        for (slot, index) in mat
            .tex_matrices
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x24, 8)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tex_matrices, i))?;
        }

        // 0x34-0x37 is padding.

        for (slot, index) in mat
            .textures
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x38, 8)?)
        {
            *slot = resolve(index, |i| {
                r.read_u16_at(offsets.texture_indices + i * 2)
                    .map_err(Error::from)
            })?;
        }

        let font_index = r.read_i16_at(record_start + 0x48)?;
        mat.font = resolve(font_index, |i| Blob::parse_at(r, offsets.fonts, i))?;

        for (slot, index) in mat
            .tev_k_colors
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x4A, 4)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tev_k_colors, i))?;
        }

        mat.tev_k_color_selects
            .copy_from_slice(&read_i8_values(r, record_start + 0x52, 16)?);
        mat.tev_k_alpha_selects
            .copy_from_slice(&read_i8_values(r, record_start + 0x62, 16)?);

        for (slot, index) in mat
            .tev_orders
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x72, 16)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tev_orders, i))?;
        }

        for (slot, index) in mat
            .tev_colors
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x92, 4)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tev_colors, i))?;
        }

        for (slot, index) in mat
            .tev_stages
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0x9A, 16)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tev_stages, i))?;
        }

        for (slot, index) in mat
            .tev_swap_modes
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0xBA, 16)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tev_swap_modes, i))?;
        }

        for (slot, index) in mat
            .tev_swap_mode_tables
            .iter_mut()
            .zip(read_i16_indices(r, record_start + 0xDA, 4)?)
        {
            *slot = resolve(index, |i| Blob::parse_at(r, offsets.tev_swap_mode_tables, i))?;
        }

        let alpha_index = required_index(r.read_i16_at(record_start + 0xE2)?, "alpha compare")?;
        mat.alpha_compare = Blob::parse_at(r, offsets.alpha_compares, alpha_index)?;

        let blend_index = required_index(r.read_i16_at(record_start + 0xE4)?, "blend")?;
        mat.blend = Blob::parse_at(r, offsets.blends, blend_index)?;

        let tail = r.read_i16_at(record_start + 0xE6)?;
        if tail != 0 {
            return Err(Error::unexpected(
                "material record tail padding",
                &[0, 0],
                &tail.to_be_bytes(),
            ));
        }

        Ok(mat)
    }

    /// Emit the 0xE8 record, interning every sub-value into `pools`.
    pub(super) fn write_record(&self, w: &mut BinaryWriter, pools: &mut DataPools) -> Result<()> {
        let start = w.position();

        w.write_i8(self.flag);
        w.write_i8(pools.cull_modes.get_or_add(&self.cull_mode) as i8);
        w.write_i8(pools.color_channel_counts.get_or_add(&self.color_channel_count) as i8);
        w.write_i8(pools.tex_gen_counts.get_or_add(&self.tex_gen_count) as i8);
        w.write_i8(pools.tev_stage_counts.get_or_add(&self.tev_stage_count) as i8);
        w.write_i8(pools.dithers.get_or_add(&self.dither) as i8);
        w.write_i8(self.unk);
        w.write_u8(0x00);

        for color in &self.mat_colors {
            w.write_i16(pools.material_colors.index_or_add(color.as_ref()));
        }
        for channel in &self.color_channels {
            w.write_i16(pools.color_channels.index_or_add(channel.as_ref()));
        }
        for texcoord in &self.tex_coord_generators {
            w.write_i16(pools.tex_coords.index_or_add(texcoord.as_ref()));
        }
        for matrix in &self.tex_matrices {
            w.write_i16(pools.tex_matrices.index_or_add(matrix.as_ref()));
        }

        w.write_bytes(&[0xFF; 4]); // 0x34-0x37 padding

        for texture in &self.textures {
            w.write_i16(pools.texture_indices.index_or_add(texture.as_ref()));
        }
        w.write_i16(pools.fonts.index_or_add(self.font.as_ref()));

        for kcolor in &self.tev_k_colors {
            w.write_i16(pools.tev_k_colors.index_or_add(kcolor.as_ref()));
        }
        for sel in &self.tev_k_color_selects {
            w.write_i8(*sel);
        }
        for sel in &self.tev_k_alpha_selects {
            w.write_i8(*sel);
        }
        for order in &self.tev_orders {
            w.write_i16(pools.tev_orders.index_or_add(order.as_ref()));
        }
        for color in &self.tev_colors {
            w.write_i16(pools.tev_colors.index_or_add(color.as_ref()));
        }
        for stage in &self.tev_stages {
            w.write_i16(pools.tev_stages.index_or_add(stage.as_ref()));
        }
        for mode in &self.tev_swap_modes {
            w.write_i16(pools.tev_swap_modes.index_or_add(mode.as_ref()));
        }
        for table in &self.tev_swap_mode_tables {
            w.write_i16(pools.tev_swap_mode_tables.index_or_add(table.as_ref()));
        }

        w.write_i16(pools.alpha_compares.get_or_add(&self.alpha_compare));
        w.write_i16(pools.blends.get_or_add(&self.blend));
        w.write_u16(0x0000);

        let written = w.position() - start;
        if written != MATERIAL_RECORD_SIZE {
            return Err(Error::RecordSizeMismatch {
                record: "MaterialInitData",
                start,
                expected: start + MATERIAL_RECORD_SIZE,
                actual: start + written,
            });
        }
        Ok(())
    }
}
