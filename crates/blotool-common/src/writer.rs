//! Binary writer for producing BLO byte streams.
//!
//! Writing BLO data needs a two-pass discipline: section sizes and offset
//! tables are only known after the variable-length payload has been
//! emitted, so earlier fields are written as placeholders and rewritten
//! once the real values are known. [`BinaryWriter`] therefore keeps a
//! cursor over a growable buffer and supports absolute-offset patching.
//!
//! Alignment padding does not use zero bytes. The format fills padded
//! regions with a repeating ASCII phrase, and the console's tooling
//! expects it, so [`BinaryWriter::pad_to`] reproduces it.

/// Filler pattern emitted into padded regions, repeated as needed.
pub const PADDING_MESSAGE: &[u8] = b"This is padding data to align";

/// A positioned big-endian writer over a growable byte buffer.
///
/// The cursor may be moved back over already-written bytes to patch
/// placeholders; writing past the end grows the buffer.
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
    position: usize,
}

impl BinaryWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current cursor position.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Seek the cursor to an absolute position within the written bytes.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Consume the writer and return the finished buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Borrow the bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Write raw bytes at the cursor, overwriting or growing as needed.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }

    /// Write a 4-byte chunk tag.
    pub fn write_tag(&mut self, tag: [u8; 4]) {
        self.write_bytes(&tag);
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    /// Write a signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&[value as u8]);
    }

    /// Write a big-endian u16.
    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Write a big-endian i16.
    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Write a big-endian u32.
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Write a big-endian IEEE-754 f32.
    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Overwrite a big-endian u16 at an absolute offset, keeping the cursor.
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        let saved = self.position;
        self.position = offset;
        self.write_u16(value);
        self.position = saved;
    }

    /// Overwrite a big-endian u32 at an absolute offset, keeping the cursor.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        let saved = self.position;
        self.position = offset;
        self.write_u32(value);
        self.position = saved;
    }

    /// Overwrite a big-endian i16 at an absolute offset, keeping the cursor.
    pub fn patch_i16(&mut self, offset: usize, value: i16) {
        self.patch_u16(offset, value as u16);
    }

    /// Advance the cursor to the next multiple of `alignment` (a power of
    /// two), emitting bytes from the filler phrase. The cursor must sit at
    /// the end of the buffer; padding mid-buffer would desync the two.
    pub fn pad_to(&mut self, alignment: usize) {
        debug_assert!(alignment.is_power_of_two());
        debug_assert_eq!(self.position, self.data.len());
        let target = (self.position + alignment - 1) & !(alignment - 1);
        for i in 0..target - self.position {
            self.data.push(PADDING_MESSAGE[i % PADDING_MESSAGE.len()]);
        }
        self.position = target;
    }
}
