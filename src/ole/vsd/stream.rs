//! Positioned reader over one Visio sub-stream.
//!
//! Every pointer in the drawing stream locates a sub-stream that may be
//! LZ-compressed. [`InternalStream`] owns the (decompressed) bytes and exposes
//! cursor-style little-endian reads on top of [`crate::common::binary`].

use crate::common::binary::{
    BinaryError, BinaryResult, read_f64_le, read_i32_le, read_u8, read_u16_le, read_u32_le,
};

const RING_SIZE: usize = 4096;
const RING_MASK: usize = RING_SIZE - 1;
/// Distance between the encoder's ring start and ours
const RING_ADJUST: usize = 18;

/// Cursor over a decoded sub-stream.
#[derive(Debug, Clone, Default)]
pub struct InternalStream {
    data: Vec<u8>,
    pos: usize,
}

impl InternalStream {
    /// Wrap raw bytes, decompressing them first when `compressed` is set.
    pub fn new(raw: &[u8], compressed: bool) -> Self {
        let data = if compressed {
            decompress(raw)
        } else {
            raw.to_vec()
        };
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn tell(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute position. Seeking past the end is an error.
    pub fn seek(&mut self, pos: usize) -> BinaryResult<()> {
        if pos > self.data.len() {
            return Err(BinaryError::InsufficientData {
                expected: pos,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance the cursor by `count` bytes.
    pub fn skip(&mut self, count: usize) -> BinaryResult<()> {
        let target = self.pos.checked_add(count).ok_or(BinaryError::InsufficientData {
            expected: usize::MAX,
            available: self.data.len(),
        })?;
        self.seek(target)
    }

    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        let value = read_u8(&self.data, self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        let value = read_u16_le(&self.data, self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        let value = read_u32_le(&self.data, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> BinaryResult<i32> {
        let value = read_i32_le(&self.data, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub fn read_f64(&mut self) -> BinaryResult<f64> {
        let value = read_f64_le(&self.data, self.pos)?;
        self.pos += 8;
        Ok(value)
    }

    /// Read a cell value: a one-byte cell type tag followed by a double.
    pub fn read_cell(&mut self) -> BinaryResult<f64> {
        self.skip(1)?;
        self.read_f64()
    }

    /// Read four bytes as an `r g b a` color.
    pub fn read_color(&mut self) -> BinaryResult<crate::common::Color> {
        let bytes = self.read_bytes(4)?;
        Ok(crate::common::Color::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> BinaryResult<&[u8]> {
        let end = self.pos.checked_add(count).filter(|&end| end <= self.data.len()).ok_or(
            BinaryError::InsufficientData {
                expected: self.pos.saturating_add(count),
                available: self.data.len(),
            },
        )?;
        let start = self.pos;
        self.pos = end;
        Ok(&self.data[start..end])
    }

    /// Borrow everything from the cursor up to `end` (clamped to the stream).
    pub fn read_to(&mut self, end: usize) -> &[u8] {
        let end = end.clamp(self.pos, self.data.len());
        let start = self.pos;
        self.pos = end;
        &self.data[start..end]
    }

    /// Raw bytes of the whole sub-stream.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Expand an LZ-compressed Visio sub-stream.
///
/// Each flag byte governs up to eight tokens. A set bit marks a literal byte,
/// a clear bit a two-byte back reference into a 4096-byte ring buffer.
pub fn decompress(input: &[u8]) -> Vec<u8> {
    let mut ring = [0u8; RING_SIZE];
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut pos = 0usize;
    let mut offset = 0usize;

    while offset < input.len() {
        let flag = input[offset];
        offset += 1;

        for bit in 0..8 {
            if offset >= input.len() {
                break;
            }
            if flag & (1 << bit) != 0 {
                let byte = input[offset];
                offset += 1;
                ring[pos & RING_MASK] = byte;
                output.push(byte);
                pos += 1;
            } else {
                if offset + 2 > input.len() {
                    return output;
                }
                let low = input[offset] as usize;
                let high = input[offset + 1] as usize;
                offset += 2;

                let length = (high & 0x0F) + 3;
                let raw_pointer = ((high & 0xF0) << 4) | low;
                let pointer = if raw_pointer > RING_SIZE - RING_ADJUST {
                    raw_pointer - (RING_SIZE - RING_ADJUST)
                } else {
                    raw_pointer + RING_ADJUST
                };

                for j in 0..length {
                    let byte = ring[(pointer + j) & RING_MASK];
                    ring[(pos + j) & RING_MASK] = byte;
                    output.push(byte);
                }
                pos += length;
            }
        }
    }

    output
}
