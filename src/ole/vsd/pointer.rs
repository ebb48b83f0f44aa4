//! Pointer directory of the drawing stream.
//!
//! A pointer locates one sub-stream (trailer, pages, stencils, styles, ...)
//! inside the `VisioDocument` stream. Sub-streams whose format says so carry
//! a nested pointer list, which is how pages and stencils are indexed.

use super::consts::{COMPRESSED_SHIFT, POINTER_SIZE, chunk};
use super::stream::InternalStream;
use crate::common::binary::{BinaryError, BinaryResult};
use std::collections::BTreeMap;
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// On-disk pointer layout (18 bytes, little-endian).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawPointer {
    ptr_type: U32<LE>,
    reserved: U32<LE>,
    offset: U32<LE>,
    length: U32<LE>,
    format: U16<LE>,
}

/// One directory entry locating a sub-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pointer {
    /// Stream type (only the low 16 bits are meaningful)
    pub ptr_type: u32,
    /// Absolute offset of the sub-stream in the drawing stream
    pub offset: u32,
    /// Length of the sub-stream in bytes
    pub length: u32,
    /// Storage format flags
    pub format: u16,
}

/// How a sub-stream's payload is laid out, derived from the format nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A single record whose chunk type is the pointer type
    Blob,
    /// A record followed by a nested pointer list
    BlobWithPointers,
    /// A sequence of chunk headers and bodies
    Chunks,
    /// Nothing this decoder knows how to walk
    Opaque,
}

impl Pointer {
    pub fn is_compressed(&self) -> bool {
        self.format & 2 == 2
    }

    /// Pointer-info shift used inside this pointer's sub-stream.
    pub fn shift(&self) -> usize {
        if self.is_compressed() {
            COMPRESSED_SHIFT
        } else {
            0
        }
    }

    pub fn payload_kind(&self) -> PayloadKind {
        match self.format >> 4 {
            0x0 | 0x4 => PayloadKind::Blob,
            0x5 if self.ptr_type == chunk::COLORS => PayloadKind::Blob,
            0x5 => PayloadKind::BlobWithPointers,
            0x8 | 0xc | 0xd => PayloadKind::Chunks,
            _ => PayloadKind::Opaque,
        }
    }

    /// Byte range of the sub-stream, or `None` if it leaves `[0, extent)`.
    pub fn range_within(&self, extent: usize) -> Option<std::ops::Range<usize>> {
        let start = self.offset as usize;
        let end = start.checked_add(self.length as usize)?;
        (end <= extent).then_some(start..end)
    }
}

/// Read one pointer at the stream cursor.
pub fn read_pointer(stream: &mut InternalStream) -> BinaryResult<Pointer> {
    let bytes = stream.read_bytes(POINTER_SIZE)?;
    let raw = RawPointer::read_from_bytes(bytes)
        .map_err(|_| BinaryError::ParseError("Failed to read pointer".to_string()))?;
    Ok(Pointer {
        ptr_type: raw.ptr_type.get() & 0xffff,
        offset: raw.offset.get(),
        length: raw.length.get(),
        format: raw.format.get(),
    })
}

/// Size information preceding a pointer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerInfo {
    /// Number of explicit order entries following the pointers
    pub list_size: u32,
    /// Number of pointers in the list
    pub pointer_count: u32,
}

/// Locate the pointer list of a sub-stream and read its size information.
///
/// On success the cursor sits on the first pointer.
pub fn read_pointer_info(stream: &mut InternalStream, shift: usize) -> BinaryResult<PointerInfo> {
    stream.seek(shift)?;
    let offset = stream.read_u32()? as usize;
    let info_pos = (offset + shift)
        .checked_sub(4)
        .ok_or_else(|| BinaryError::ParseError("Pointer list offset underflow".to_string()))?;
    stream.seek(info_pos)?;
    let list_size = stream.read_u32()?;
    let pointer_count = stream.read_i32()?.max(0) as u32;
    stream.skip(4)?;
    Ok(PointerInfo {
        list_size,
        pointer_count,
    })
}

/// A decoded pointer list with its explicit visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerList {
    /// Regular pointers keyed by their index in the list
    pub pointers: BTreeMap<u32, Pointer>,
    /// Font-face pointers, which are always visited first
    pub font_faces: BTreeMap<u32, Pointer>,
    /// Explicit visiting order of pointer indices
    pub order: Vec<u32>,
}

impl PointerList {
    /// Read the pointer list of a sub-stream.
    pub fn read(stream: &mut InternalStream, shift: usize) -> BinaryResult<Self> {
        let info = read_pointer_info(stream, shift)?;
        // Each pointer needs 18 bytes; reject counts the stream cannot hold
        if (info.pointer_count as usize).saturating_mul(POINTER_SIZE) > stream.remaining() {
            return Err(BinaryError::InsufficientData {
                expected: stream.tell() + info.pointer_count as usize * POINTER_SIZE,
                available: stream.len(),
            });
        }

        let mut list = PointerList::default();
        for index in 0..info.pointer_count {
            let pointer = read_pointer(stream)?;
            match pointer.ptr_type {
                0 => {},
                chunk::FONTFACES => {
                    list.font_faces.insert(index, pointer);
                },
                _ => {
                    list.pointers.insert(index, pointer);
                },
            }
        }

        if info.list_size > 1 {
            for _ in 0..info.list_size {
                list.order.push(stream.read_u32()?);
            }
        }
        Ok(list)
    }

    /// Pointers in visiting order: font faces, then the explicit order,
    /// then whatever the order did not mention, by index.
    pub fn visit_order(&self) -> Vec<(u32, Pointer)> {
        let mut remaining = self.pointers.clone();
        let mut visits: Vec<(u32, Pointer)> =
            self.font_faces.iter().map(|(&idx, &ptr)| (idx, ptr)).collect();

        for idx in &self.order {
            if let Some(ptr) = remaining.remove(idx) {
                visits.push((*idx, ptr));
            }
        }
        visits.extend(remaining);
        visits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer_bytes(ptr_type: u32, offset: u32, length: u32, format: u16) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(POINTER_SIZE);
        bytes.extend_from_slice(&ptr_type.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes.extend_from_slice(&format.to_le_bytes());
        bytes
    }

    #[test]
    fn test_read_pointer_masks_type() {
        let mut stream = InternalStream::new(&pointer_bytes(0x0001_0015, 0x100, 0x20, 0xd0), false);
        let ptr = read_pointer(&mut stream).unwrap();
        assert_eq!(ptr.ptr_type, chunk::PAGE);
        assert_eq!(ptr.offset, 0x100);
        assert_eq!(ptr.length, 0x20);
        assert_eq!(ptr.payload_kind(), PayloadKind::Chunks);
        assert!(!ptr.is_compressed());
    }

    #[test]
    fn test_truncated_pointer_fails() {
        let bytes = pointer_bytes(0x15, 0, 0, 0);
        let mut stream = InternalStream::new(&bytes[..10], false);
        assert!(read_pointer(&mut stream).is_err());
    }

    #[test]
    fn test_payload_kinds() {
        let ptr = |ptr_type, format| Pointer { ptr_type, format, ..Pointer::default() };
        assert_eq!(ptr(chunk::PAGES, 0x54).payload_kind(), PayloadKind::BlobWithPointers);
        assert_eq!(ptr(chunk::COLORS, 0x54).payload_kind(), PayloadKind::Blob);
        assert_eq!(ptr(chunk::PAGE, 0x40).payload_kind(), PayloadKind::Blob);
        assert_eq!(ptr(chunk::PAGE, 0xf0).payload_kind(), PayloadKind::Opaque);
        assert_eq!(ptr(chunk::PAGE, 0x52).shift(), COMPRESSED_SHIFT);
    }

    #[test]
    fn test_range_within_extent() {
        let ptr = Pointer { offset: 10, length: 20, ..Pointer::default() };
        assert_eq!(ptr.range_within(30), Some(10..30));
        assert_eq!(ptr.range_within(29), None);
        let huge = Pointer { offset: u32::MAX, length: u32::MAX, ..Pointer::default() };
        assert_eq!(huge.range_within(usize::MAX), None);
    }

    #[test]
    fn test_pointer_list_visit_order() {
        // info block sits at offset - 4 = 4
        let mut data = Vec::new();
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes()); // list size
        data.extend_from_slice(&4i32.to_le_bytes()); // pointer count
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved
        data.extend(pointer_bytes(0x15, 1, 1, 0)); // index 0
        data.extend(pointer_bytes(0xd8, 2, 1, 0)); // index 1, font faces
        data.extend(pointer_bytes(0x1a, 3, 1, 0)); // index 2
        data.extend(pointer_bytes(0, 0, 0, 0)); // index 3, skipped
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());

        let mut stream = InternalStream::new(&data, false);
        let list = PointerList::read(&mut stream, 0).unwrap();
        assert_eq!(list.order, vec![2, 7]);
        let order: Vec<u32> = list.visit_order().into_iter().map(|(idx, _)| idx).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_pointer_list_rejects_oversized_count() {
        let mut data = Vec::new();
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&1000i32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        let mut stream = InternalStream::new(&data, false);
        assert!(PointerList::read(&mut stream, 0).is_err());
    }
}
