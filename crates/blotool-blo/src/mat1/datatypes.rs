//! Material sub-structure types.
//!
//! MAT1 records reference their sub-structures through small indices into
//! shared per-category arrays. A few of those categories are fully
//! modeled (colors, cull mode, the count bytes); the rest are GPU
//! configuration blocks whose internal bit layout this codec does not
//! interpret. Those are carried as fixed-size byte blobs: only their
//! length and equality (for write-time deduplication) are contractual,
//! and they surface to editors as hex strings.

use serde_json::Value;

use blotool_common::BinaryReader;

use crate::{Error, Result};

/// An RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Read a color at the cursor.
    pub fn parse(r: &mut BinaryReader<'_>) -> Result<Self> {
        let bytes = r.read_bytes(4)?;
        Ok(Self::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    /// Read the `index`-th color of a shared array starting at `start`.
    pub fn parse_at(r: &BinaryReader<'_>, start: usize, index: usize) -> Result<Self> {
        let bytes = r.slice_at(start + index * 4, 4)?;
        Ok(Self::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// JSON form: `[r, g, b, a]`.
    pub fn to_json(self) -> Value {
        Value::from(vec![self.r, self.g, self.b, self.a])
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let arr = value
            .as_array()
            .filter(|a| a.len() == 4)
            .ok_or_else(|| Error::json(format!("color must be a 4-element array, got {value}")))?;
        let mut bytes = [0u8; 4];
        for (slot, item) in bytes.iter_mut().zip(arr) {
            *slot = item
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| Error::json(format!("color component out of range: {item}")))?;
        }
        Ok(Self::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }
}

/// GX cull mode, stored as a u32 in its shared array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    None = 0,
    Front = 1,
    Back = 2,
    All = 3,
}

impl CullMode {
    pub fn from_raw(value: u32) -> Result<Self> {
        match value {
            0 => Ok(CullMode::None),
            1 => Ok(CullMode::Front),
            2 => Ok(CullMode::Back),
            3 => Ok(CullMode::All),
            _ => Err(Error::unexpected(
                "cull mode",
                &[0, 1, 2, 3],
                &value.to_be_bytes(),
            )),
        }
    }

    /// Read the `index`-th entry of the GXCullMode shared array.
    pub fn parse_at(r: &BinaryReader<'_>, start: usize, index: usize) -> Result<Self> {
        let bytes = r.slice_at(start + index * 4, 4)?;
        Self::from_raw(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// JSON form mirrors the original tooling: `"CullMode.BACK"` etc.
    pub fn to_json(self) -> Value {
        let name = match self {
            CullMode::None => "CullMode.NONE",
            CullMode::Front => "CullMode.FRONT",
            CullMode::Back => "CullMode.BACK",
            CullMode::All => "CullMode.ALL",
        };
        Value::from(name)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        match value.as_str() {
            Some("CullMode.NONE") => Ok(CullMode::None),
            Some("CullMode.FRONT") => Ok(CullMode::Front),
            Some("CullMode.BACK") => Ok(CullMode::Back),
            Some("CullMode.ALL") => Ok(CullMode::All),
            _ => Err(Error::json(format!("not a cull mode: {value}"))),
        }
    }
}

/// An opaque fixed-size sub-structure, compared and deduplicated by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob<const N: usize>(pub [u8; N]);

impl<const N: usize> Default for Blob<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Blob<N> {
    /// The on-disk size of this blob type.
    pub const SIZE: usize = N;

    /// Wrap raw bytes. Aliases like [`Blend`] name a `Blob<N>` rather
    /// than a distinct tuple struct, so construction goes through here.
    pub const fn new(data: [u8; N]) -> Self {
        Self(data)
    }

    /// Read the `index`-th entry of a shared array starting at `start`.
    pub fn parse_at(r: &BinaryReader<'_>, start: usize, index: usize) -> Result<Self> {
        let bytes = r.slice_at(start + index * N, N)?;
        let mut data = [0u8; N];
        data.copy_from_slice(bytes);
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// JSON form: lowercase hex string.
    pub fn to_json(&self) -> Value {
        Value::from(hex::encode(self.0))
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let text = value
            .as_str()
            .ok_or_else(|| Error::json(format!("expected hex string, got {value}")))?;
        let bytes = hex::decode(text).map_err(|e| Error::json(format!("bad hex string: {e}")))?;
        let data: [u8; N] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| Error::json(format!("blob must be {N} bytes, got {}", b.len())))?;
        Ok(Self(data))
    }
}

pub type ChannelControl = Blob<4>;
pub type TexCoordInfo = Blob<4>;
pub type TexMatrix = Blob<0x24>;
pub type FontNumber = Blob<2>;
pub type TevOrder = Blob<4>;
pub type TevColor = Blob<8>; // signed 10-bit color
pub type TevKColor = Blob<4>;
pub type TevStage = Blob<0x14>;
pub type TevSwapMode = Blob<4>;
pub type TevSwapModeTable = Blob<4>;
pub type AlphaCompare = Blob<8>;
pub type Blend = Blob<4>;
pub type IndirectInitData = Blob<0x128>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_json_round_trip() {
        let color = Color::new(255, 128, 0, 255);
        let json = color.to_json();
        assert_eq!(Color::from_json(&json).unwrap(), color);
    }

    #[test]
    fn test_color_json_rejects_wide_values() {
        assert!(Color::from_json(&serde_json::json!([0, 0, 0, 256])).is_err());
        assert!(Color::from_json(&serde_json::json!([0, 0, 0])).is_err());
    }

    #[test]
    fn test_cull_mode_raw() {
        assert_eq!(CullMode::from_raw(2).unwrap(), CullMode::Back);
        assert!(CullMode::from_raw(7).is_err());
    }

    #[test]
    fn test_cull_mode_json_names() {
        for mode in [CullMode::None, CullMode::Front, CullMode::Back, CullMode::All] {
            assert_eq!(CullMode::from_json(&mode.to_json()).unwrap(), mode);
        }
    }

    #[test]
    fn test_blob_parse_at_indexes_by_size() {
        let data: Vec<u8> = (0..40).collect();
        let r = BinaryReader::new(&data);
        let second: TevStage = Blob::parse_at(&r, 0, 1).unwrap();
        assert_eq!(second.as_bytes()[0], 0x14);
    }

    #[test]
    fn test_blob_json_round_trip() {
        let blend = Blend::new([0x00, 0x01, 0xFF, 0xFF]);
        let json = blend.to_json();
        assert_eq!(json.as_str().unwrap(), "0001ffff");
        assert_eq!(Blend::from_json(&json).unwrap(), blend);
    }

    #[test]
    fn test_blob_json_length_checked() {
        assert!(Blend::from_json(&Value::from("0001")).is_err());
    }
}
