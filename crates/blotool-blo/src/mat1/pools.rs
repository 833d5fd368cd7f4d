//! Value-interning pools for MAT1 encoding.
//!
//! Each shared-array category gets one pool. Interning is by value
//! equality: two materials with identical sub-structures end up pointing
//! at one pooled entry, which the console format relies on to bound
//! table sizes. Pools exist only for the duration of one encode; decode
//! never needs them because indices are resolved to values immediately.

use super::datatypes::*;

/// An ordered pool mapping values to stable indices.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    entries: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: PartialEq + Clone> Pool<T> {
    /// Return the index of `value`, appending it if not yet present.
    pub fn get_or_add(&mut self, value: &T) -> i16 {
        match self.entries.iter().position(|e| e == value) {
            Some(i) => i as i16,
            None => {
                self.entries.push(value.clone());
                (self.entries.len() - 1) as i16
            }
        }
    }

    /// Like [`Pool::get_or_add`], with `None` encoding as index -1.
    pub fn index_or_add(&mut self, value: Option<&T>) -> i16 {
        match value {
            Some(v) => self.get_or_add(v),
            None => -1,
        }
    }

    /// Append without deduplication (pre-seeded and canonical entries).
    pub fn push(&mut self, value: T) {
        self.entries.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

/// One pool per shared-array category of the MAT1 chunk.
#[derive(Debug, Clone, Default)]
pub struct DataPools {
    pub cull_modes: Pool<CullMode>,
    pub material_colors: Pool<Color>,
    pub color_channel_counts: Pool<u8>,
    pub color_channels: Pool<ChannelControl>,
    pub tex_gen_counts: Pool<u8>,
    pub tex_coords: Pool<TexCoordInfo>,
    pub tex_matrices: Pool<TexMatrix>,
    pub texture_indices: Pool<u16>,
    pub fonts: Pool<FontNumber>,
    pub tev_orders: Pool<TevOrder>,
    pub tev_colors: Pool<TevColor>,
    pub tev_k_colors: Pool<TevKColor>,
    pub tev_stage_counts: Pool<u8>,
    pub tev_stages: Pool<TevStage>,
    pub tev_swap_modes: Pool<TevSwapMode>,
    pub tev_swap_mode_tables: Pool<TevSwapModeTable>,
    pub alpha_compares: Pool<AlphaCompare>,
    pub blends: Pool<Blend>,
    pub dithers: Pool<u8>,
}

impl DataPools {
    /// Pools as the format expects them before any material is written:
    /// the cull-mode array is pre-seeded with Back, Front, None.
    pub fn seeded() -> Self {
        let mut pools = Self::default();
        pools.cull_modes.push(CullMode::Back);
        pools.cull_modes.push(CullMode::Front);
        pools.cull_modes.push(CullMode::None);
        pools
    }
}
