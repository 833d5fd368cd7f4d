//! Binary reader for parsing BLO byte streams.
//!
//! This module provides [`BinaryReader`], a cursor-like type over a byte
//! slice. All multi-byte reads are big-endian, matching the GameCube's
//! native byte order. BLO sections address each other by absolute byte
//! offsets, so the reader also exposes random-access `*_at` variants that
//! do not disturb the cursor.

use crate::{Error, Result};

/// A positioned big-endian reader over a byte slice.
///
/// # Example
///
/// ```
/// use blotool_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u16().unwrap(), 0x0102);
/// assert_eq!(reader.read_u16().unwrap(), 0x0304);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
                offset: self.position,
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Peek at the next 4-byte chunk tag without consuming it.
    ///
    /// The scene-graph reader branches on the upcoming tag before deciding
    /// which parser to invoke.
    #[inline]
    pub fn peek_tag(&self) -> Result<[u8; 4]> {
        let bytes = self.peek_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a 4-byte chunk tag.
    #[inline]
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let tag = self.peek_tag()?;
        self.position += 4;
        Ok(tag)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a big-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.read_bytes(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a big-endian IEEE-754 f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a byte at an absolute offset without moving the cursor.
    #[inline]
    pub fn read_u8_at(&self, offset: usize) -> Result<u8> {
        self.slice_at(offset, 1).map(|b| b[0])
    }

    /// Read a signed byte at an absolute offset without moving the cursor.
    #[inline]
    pub fn read_i8_at(&self, offset: usize) -> Result<i8> {
        self.read_u8_at(offset).map(|b| b as i8)
    }

    /// Read a big-endian u16 at an absolute offset without moving the cursor.
    #[inline]
    pub fn read_u16_at(&self, offset: usize) -> Result<u16> {
        let bytes = self.slice_at(offset, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian i16 at an absolute offset without moving the cursor.
    #[inline]
    pub fn read_i16_at(&self, offset: usize) -> Result<i16> {
        self.read_u16_at(offset).map(|v| v as i16)
    }

    /// Borrow `count` bytes at an absolute offset without moving the cursor.
    #[inline]
    pub fn slice_at(&self, offset: usize, count: usize) -> Result<&'a [u8]> {
        if offset.saturating_add(count) > self.data.len() {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.data.len().saturating_sub(offset),
                offset,
            });
        }
        Ok(&self.data[offset..offset + count])
    }

    /// Expect specific magic bytes at the cursor.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}
