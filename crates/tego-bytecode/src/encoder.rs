//! Big-endian encoding and decoding
//!
//! Class files store every multi-byte quantity big-endian and strings in the
//! JVM's "modified UTF-8": NUL is written as two bytes and supplementary
//! characters as surrogate pairs.

use thiserror::Error;

/// Errors that can occur while decoding class-file bytes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Unexpected end of input
    #[error("Unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),

    /// Invalid modified UTF-8 string
    #[error("Invalid modified UTF-8 string at offset {0}")]
    InvalidUtf8(usize),

    /// Unknown constant pool tag
    #[error("Invalid constant pool tag {tag} at offset {offset}")]
    InvalidTag {
        /// The tag byte
        tag: u8,
        /// Offset of the tag
        offset: usize,
    },

    /// Input does not start with `0xCAFEBABE`
    #[error("Invalid magic number {0:#010x}")]
    InvalidMagic(u32),

    /// Invalid opcode
    #[error("Invalid opcode {opcode:#x} at offset {offset}")]
    InvalidOpcode {
        /// The opcode byte
        opcode: u8,
        /// Offset within the code
        offset: usize,
    },
}

/// Writer for big-endian class-file data
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new writer with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Get the bytes written so far
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get the current offset
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    // ===== Basic Emission =====

    /// Emit a raw byte
    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Emit a signed byte
    pub fn emit_i8(&mut self, value: i8) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 16-bit unsigned integer
    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 16-bit signed integer
    pub fn emit_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 32-bit unsigned integer
    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 32-bit signed integer
    pub fn emit_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 64-bit signed integer
    pub fn emit_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 32-bit float
    pub fn emit_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 64-bit float
    pub fn emit_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit raw bytes
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Emit a u16 length followed by the modified UTF-8 encoding of `value`
    ///
    /// The caller is responsible for keeping the encoding under 65536 bytes.
    pub fn emit_utf8(&mut self, value: &str) {
        let encoded = encode_modified_utf8(value);
        self.emit_u16(encoded.len() as u16);
        self.buffer.extend_from_slice(&encoded);
    }

    // ===== Patching =====

    /// Reserve two bytes to be patched later, returning their offset
    pub fn reserve_u16(&mut self) -> usize {
        let offset = self.offset();
        self.emit_u16(0);
        offset
    }

    /// Reserve four bytes to be patched later, returning their offset
    pub fn reserve_u32(&mut self) -> usize {
        let offset = self.offset();
        self.emit_u32(0);
        offset
    }

    /// Overwrite two bytes at `offset`
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        self.buffer[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Overwrite two bytes at `offset` with a signed value
    pub fn patch_i16(&mut self, offset: usize, value: i16) {
        self.buffer[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Overwrite four bytes at `offset`
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }
}

/// Reader for big-endian class-file data
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get the current read position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if there are more bytes to read
    pub fn has_more(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Get the number of remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Seek to a specific position
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.position + N;
        let slice = self
            .buffer
            .get(self.position..end)
            .ok_or(DecodeError::UnexpectedEnd(self.position))?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        self.position = end;
        Ok(bytes)
    }

    /// Read a byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    /// Read a signed byte
    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_be_bytes(self.take()?))
    }

    /// Read a 16-bit unsigned integer
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.take()?))
    }

    /// Read a 16-bit signed integer
    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.take()?))
    }

    /// Read a 32-bit unsigned integer
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    /// Read a 32-bit signed integer
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.take()?))
    }

    /// Read a 64-bit signed integer
    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.take()?))
    }

    /// Read a 32-bit float
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_be_bytes(self.take()?))
    }

    /// Read a 64-bit float
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_be_bytes(self.take()?))
    }

    /// Read a fixed number of bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let buffer: &'a [u8] = self.buffer;
        let end = self.position + count;
        let bytes = buffer
            .get(self.position..end)
            .ok_or(DecodeError::UnexpectedEnd(self.position))?;
        self.position = end;
        Ok(bytes)
    }

    /// Read a u16-length-prefixed modified UTF-8 string
    pub fn read_utf8(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u16()? as usize;
        let start = self.position;
        let bytes = self.read_bytes(len)?;
        decode_modified_utf8(bytes).ok_or(DecodeError::InvalidUtf8(start))
    }
}

/// Encode a string as modified UTF-8
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

/// Decode modified UTF-8, returning `None` on malformed input
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let unit = if b & 0x80 == 0 && b != 0 {
            i += 1;
            b as u16
        } else if b & 0xe0 == 0xc0 {
            let b2 = *bytes.get(i + 1)?;
            if b2 & 0xc0 != 0x80 {
                return None;
            }
            i += 2;
            ((b as u16 & 0x1f) << 6) | (b2 as u16 & 0x3f)
        } else if b & 0xf0 == 0xe0 {
            let b2 = *bytes.get(i + 1)?;
            let b3 = *bytes.get(i + 2)?;
            if b2 & 0xc0 != 0x80 || b3 & 0xc0 != 0x80 {
                return None;
            }
            i += 3;
            ((b as u16 & 0x0f) << 12) | ((b2 as u16 & 0x3f) << 6) | (b3 as u16 & 0x3f)
        } else {
            return None;
        };
        units.push(unit);
    }
    String::from_utf16(&units).ok()
}
