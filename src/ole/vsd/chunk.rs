//! Chunk headers.
//!
//! A chunk list is a run of records, each introduced by a 19-byte header and
//! optionally followed by a trailer whose length is implied by the header
//! fields rather than stored.

use super::consts::{
    CHUNK_HEADER_SIZE, LIST_TRAILER_CHUNKS, NO_TRAILER_CHUNKS, SEPARATOR_TRAILER_CHUNKS,
};
use super::error::{VsdError, VsdResult};
use super::stream::InternalStream;

/// Header of one chunk record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkHeader {
    pub chunk_type: u32,
    pub id: u32,
    pub list: u32,
    pub data_length: u32,
    /// Nesting level relative to the enclosing stream
    pub level: u16,
    pub unknown: u8,
    /// Derived trailer length following the body
    pub trailer: u32,
}

impl ChunkHeader {
    /// Decode the fixed header fields and derive the trailer length.
    pub fn parse(stream: &mut InternalStream) -> VsdResult<Self> {
        let chunk_type = stream.read_u32()?;
        let id = stream.read_u32()?;
        let list = stream.read_u32()?;
        let data_length = stream.read_u32()?;
        let level = stream.read_u16()?;
        let unknown = stream.read_u8()?;

        let mut header = ChunkHeader {
            chunk_type,
            id,
            list,
            data_length,
            level,
            unknown,
            trailer: 0,
        };
        header.trailer = header.trailer_length();
        Ok(header)
    }

    fn trailer_length(&self) -> u32 {
        let ty = self.chunk_type;
        if NO_TRAILER_CHUNKS.contains(&ty) {
            return 0;
        }

        let mut trailer = 0;
        if self.list != 0 || LIST_TRAILER_CHUNKS.contains(&ty) {
            trailer += 8;
        }
        if self.list != 0
            || (self.level == 2 && self.unknown == 0x55)
            || (self.level == 2 && ty == 0x92 && self.unknown != 0x54)
            || (self.level == 3 && self.unknown != 0x50 && self.unknown != 0x54)
        {
            trailer += 4;
        }
        if SEPARATOR_TRAILER_CHUNKS.contains(&ty) && trailer != 12 && trailer != 4 {
            trailer += 4;
        }
        trailer
    }

    /// Position just past this chunk's body and trailer, given the body start.
    pub fn end_position(&self, body_start: usize) -> usize {
        body_start
            .saturating_add(self.data_length as usize)
            .saturating_add(self.trailer as usize)
    }
}

/// Advance to and decode the next chunk header.
///
/// Leading zero padding is skipped. Returns `Ok(None)` when the block ends
/// before another header starts, and an error when the header is truncated
/// or its body plus trailer runs past the end of the stream.
pub fn get_chunk_header(stream: &mut InternalStream) -> VsdResult<Option<ChunkHeader>> {
    while !stream.is_end() {
        let pos = stream.tell();
        if stream.as_bytes()[pos] != 0 {
            break;
        }
        stream.skip(1)?;
    }
    if stream.is_end() {
        return Ok(None);
    }
    if stream.remaining() < CHUNK_HEADER_SIZE {
        return Err(VsdError::ExtentOverflow {
            offset: stream.tell(),
            length: CHUNK_HEADER_SIZE,
            extent: stream.len(),
        });
    }

    let header = ChunkHeader::parse(stream)?;
    let body_start = stream.tell();
    if header.end_position(body_start) > stream.len() {
        return Err(VsdError::ExtentOverflow {
            offset: body_start,
            length: header.data_length as usize + header.trailer as usize,
            extent: stream.len(),
        });
    }
    log::trace!(
        "chunk type=0x{:x} id={} level={} length={} trailer={}",
        header.chunk_type,
        header.id,
        header.level,
        header.data_length,
        header.trailer
    );
    Ok(Some(header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::vsd::consts::chunk;

    fn header_bytes(chunk_type: u32, list: u32, data_length: u32, level: u16, unknown: u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&chunk_type.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&list.to_le_bytes());
        bytes.extend_from_slice(&data_length.to_le_bytes());
        bytes.extend_from_slice(&level.to_le_bytes());
        bytes.push(unknown);
        bytes
    }

    fn trailer_of(chunk_type: u32, list: u32, level: u16, unknown: u8) -> u32 {
        let mut stream = InternalStream::new(&header_bytes(chunk_type, list, 0, level, unknown), false);
        ChunkHeader::parse(&mut stream).unwrap().trailer
    }

    #[test]
    fn test_trailer_rules() {
        // plain record at level 2
        assert_eq!(trailer_of(chunk::LINE_TO, 0, 2, 0x50), 0);
        // list flag adds both list trailer and separator
        assert_eq!(trailer_of(chunk::MOVE_TO, 1, 2, 0x50), 12);
        // list types carry 8 bytes, separator types another 4
        assert_eq!(trailer_of(chunk::NAME_LIST, 0, 2, 0x50), 8);
        assert_eq!(trailer_of(chunk::CHAR_LIST, 0, 2, 0x50), 12);
        // level 3 records without the 0x50/0x54 marker
        assert_eq!(trailer_of(chunk::MOVE_TO, 0, 3, 0x00), 4);
        assert_eq!(trailer_of(chunk::MOVE_TO, 0, 3, 0x54), 0);
        // page props at level 2 unless marked 0x54
        assert_eq!(trailer_of(chunk::PAGE_PROPS, 0, 2, 0x00), 4);
        assert_eq!(trailer_of(chunk::PAGE_PROPS, 0, 1, 0x00), 4);
        // never-trailer types win over everything
        assert_eq!(trailer_of(chunk::SHAPE_DATA, 1, 3, 0x00), 0);
        assert_eq!(trailer_of(chunk::NAMEIDX, 0, 2, 0x55), 0);
    }

    #[test]
    fn test_skips_padding_and_ends_cleanly() {
        let mut data = vec![0, 0, 0];
        data.extend(header_bytes(chunk::LINE_TO, 0, 2, 2, 0x50));
        data.extend_from_slice(&[0xaa, 0xbb]);
        data.extend_from_slice(&[0, 0]);

        let mut stream = InternalStream::new(&data, false);
        let header = get_chunk_header(&mut stream).unwrap().unwrap();
        assert_eq!(header.chunk_type, chunk::LINE_TO);
        assert_eq!(stream.tell(), 3 + CHUNK_HEADER_SIZE);
        stream.seek(header.end_position(stream.tell())).unwrap();
        assert!(get_chunk_header(&mut stream).unwrap().is_none());
    }

    #[test]
    fn test_truncated_header_is_error() {
        let data = header_bytes(chunk::LINE_TO, 0, 0, 2, 0);
        let mut stream = InternalStream::new(&data[..12], false);
        assert!(matches!(get_chunk_header(&mut stream), Err(VsdError::ExtentOverflow { .. })));
    }

    #[test]
    fn test_trailer_past_end_is_error() {
        // page props at level 2 carry a 4-byte trailer the stream does not hold
        let mut data = header_bytes(chunk::PAGE_PROPS, 0, 2, 2, 0);
        data.extend_from_slice(&[0xaa, 0xbb]);
        let mut stream = InternalStream::new(&data, false);
        assert!(matches!(
            get_chunk_header(&mut stream),
            Err(VsdError::ExtentOverflow { offset: 19, length: 6, extent: 21 })
        ));

        data.extend_from_slice(&[0; 4]);
        let mut stream = InternalStream::new(&data, false);
        let header = get_chunk_header(&mut stream).unwrap().unwrap();
        assert_eq!(header.trailer, 4);
        assert_eq!(header.end_position(stream.tell()), data.len());
    }

    #[test]
    fn test_body_past_end_is_error() {
        let data = header_bytes(chunk::LINE_TO, 0, 100, 2, 0);
        let mut stream = InternalStream::new(&data, false);
        assert!(matches!(get_chunk_header(&mut stream), Err(VsdError::ExtentOverflow { length: 100, .. })));
    }
}
