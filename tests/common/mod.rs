//! Builders for synthetic Visio compound files.
//!
//! Real drawings are large and carry content we cannot ship with the tests,
//! so these helpers assemble the smallest containers the decoder accepts:
//! a version 3 compound file with one stream, and a drawing stream made of
//! pointer lists and chunk runs laid out back to back.

#![allow(dead_code)]

use longan::ole::consts::{
    DIRENTRY_SIZE, ENDOFCHAIN, FATSECT, FREESECT, HEADER_DIFAT_ENTRIES, HEADER_SIZE, MAGIC,
    MINIMAL_OLEFILE_SIZE, NOSTREAM, STGTY_ROOT, STGTY_STREAM,
};
use longan::vsd::chunk::ChunkHeader;
use longan::vsd::consts::{
    MINUS_ONE, TEXT_FIELD_CODE, TRAILER_POINTER_OFFSET, VERSION_OFFSET, VISIO_SIGNATURE, chunk,
};
use longan::vsd::stream::InternalStream;

const SECTOR_SIZE: usize = 512;

/// Pointer format of an uncompressed record followed by a pointer list.
pub const FORMAT_LIST: u16 = 0x50;
/// Pointer format of an uncompressed chunk run.
pub const FORMAT_CHUNKS: u16 = 0xd0;

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn directory_entry(name: &str, entry_type: u8, child: u32, start: u32, size: u64) -> [u8; DIRENTRY_SIZE] {
    let mut entry = [0u8; DIRENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        put_u16(&mut entry, i * 2, *unit);
    }
    put_u16(&mut entry, 64, ((units.len() + 1) * 2) as u16);
    entry[66] = entry_type;
    put_u32(&mut entry, 68, NOSTREAM);
    put_u32(&mut entry, 72, NOSTREAM);
    put_u32(&mut entry, 76, child);
    put_u32(&mut entry, 116, start);
    entry[120..128].copy_from_slice(&size.to_le_bytes());
    entry
}

/// A compound file holding a single stream named `name`.
///
/// Sector 0 is the FAT, sector 1 the directory and the stream starts at
/// sector 2. The mini stream cutoff is zero so every stream lives in the FAT.
pub fn ole_file(name: &str, data: &[u8]) -> Vec<u8> {
    let data_sectors = data.len().div_ceil(SECTOR_SIZE).max(1);
    assert!(data_sectors + 2 <= SECTOR_SIZE / 4, "stream too large for one FAT sector");

    let mut header = vec![0u8; HEADER_SIZE];
    header[0..8].copy_from_slice(MAGIC);
    put_u16(&mut header, 0x18, 0x3E);
    put_u16(&mut header, 0x1A, 3);
    put_u16(&mut header, 0x1C, 0xFFFE);
    put_u16(&mut header, 0x1E, 9);
    put_u16(&mut header, 0x20, 6);
    put_u32(&mut header, 0x2C, 1);
    put_u32(&mut header, 0x30, 1);
    put_u32(&mut header, 0x38, 0);
    put_u32(&mut header, 0x3C, ENDOFCHAIN);
    put_u32(&mut header, 0x40, 0);
    put_u32(&mut header, 0x44, ENDOFCHAIN);
    put_u32(&mut header, 0x48, 0);
    put_u32(&mut header, 0x4C, 0);
    for i in 1..HEADER_DIFAT_ENTRIES {
        put_u32(&mut header, 0x4C + i * 4, FREESECT);
    }

    let mut fat = vec![0u8; SECTOR_SIZE];
    for i in 0..SECTOR_SIZE / 4 {
        put_u32(&mut fat, i * 4, FREESECT);
    }
    put_u32(&mut fat, 0, FATSECT);
    put_u32(&mut fat, 4, ENDOFCHAIN);
    for i in 0..data_sectors {
        let sector = 2 + i;
        let next = if i + 1 == data_sectors {
            ENDOFCHAIN
        } else {
            (sector + 1) as u32
        };
        put_u32(&mut fat, sector * 4, next);
    }

    let mut directory = vec![0u8; SECTOR_SIZE];
    directory[0..DIRENTRY_SIZE].copy_from_slice(&directory_entry("Root Entry", STGTY_ROOT, 1, ENDOFCHAIN, 0));
    directory[DIRENTRY_SIZE..2 * DIRENTRY_SIZE].copy_from_slice(&directory_entry(
        name,
        STGTY_STREAM,
        NOSTREAM,
        2,
        data.len() as u64,
    ));
    for sid in 2..SECTOR_SIZE / DIRENTRY_SIZE {
        let base = sid * DIRENTRY_SIZE;
        put_u32(&mut directory, base + 68, NOSTREAM);
        put_u32(&mut directory, base + 72, NOSTREAM);
        put_u32(&mut directory, base + 76, NOSTREAM);
    }

    let mut file = header;
    file.extend(fat);
    file.extend(directory);
    file.extend_from_slice(data);
    file.resize((2 + data_sectors + 1) * SECTOR_SIZE, 0);
    assert!(file.len() >= MINIMAL_OLEFILE_SIZE);
    file
}

/// Location of a sub-stream inside the drawing stream.
#[derive(Debug, Clone, Copy)]
pub struct Ptr {
    pub ptr_type: u32,
    pub offset: u32,
    pub length: u32,
    pub format: u16,
}

impl Ptr {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(18);
        bytes.extend_from_slice(&self.ptr_type.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&self.offset.to_le_bytes());
        bytes.extend_from_slice(&self.length.to_le_bytes());
        bytes.extend_from_slice(&self.format.to_le_bytes());
        bytes
    }
}

/// Payload of a list stream: a leading record followed by a pointer list.
///
/// The first word is the offset of the list header, so the record sits
/// between it and the list.
pub fn pointer_list(record: &[u8], children: &[Ptr]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&((4 + record.len() + 4) as u32).to_le_bytes());
    bytes.extend_from_slice(record);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&(children.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    for child in children {
        bytes.extend(child.to_bytes());
    }
    bytes
}

/// Drawing stream assembled bottom-up: children first, trailer last.
pub struct DrawingBuilder {
    data: Vec<u8>,
    version: u8,
}

impl DrawingBuilder {
    pub fn new() -> Self {
        Self::with_version(11)
    }

    pub fn with_version(version: u8) -> Self {
        let mut data = VISIO_SIGNATURE.to_vec();
        data.resize(TRAILER_POINTER_OFFSET + 18, 0);
        Self { data, version }
    }

    pub fn add(&mut self, ptr_type: u32, format: u16, payload: &[u8]) -> Ptr {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(payload);
        Ptr {
            ptr_type,
            offset,
            length: payload.len() as u32,
            format,
        }
    }

    pub fn add_list(&mut self, ptr_type: u32, record: &[u8], children: &[Ptr]) -> Ptr {
        self.add(ptr_type, FORMAT_LIST, &pointer_list(record, children))
    }

    pub fn add_chunks(&mut self, ptr_type: u32, chunks: Chunks) -> Ptr {
        self.add(ptr_type, FORMAT_CHUNKS, &chunks.into_bytes())
    }

    pub fn finish(mut self, trailer: Ptr) -> Vec<u8> {
        self.data[VERSION_OFFSET] = self.version;
        let pointer = trailer.to_bytes();
        self.data[TRAILER_POINTER_OFFSET..TRAILER_POINTER_OFFSET + pointer.len()].copy_from_slice(&pointer);
        self.data
    }

    /// Finish with a trailer listing `children`.
    pub fn finish_with(mut self, children: &[Ptr]) -> Vec<u8> {
        let trailer = self.add_list(chunk::TRAILER_STREAM, &[], children);
        self.finish(trailer)
    }
}

/// A run of chunks, each written with the trailer its header implies.
#[derive(Default)]
pub struct Chunks {
    bytes: Vec<u8>,
}

impl Chunks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk(mut self, chunk_type: u32, id: u32, level: u16, body: &[u8]) -> Self {
        let mut header = Vec::with_capacity(19);
        header.extend_from_slice(&chunk_type.to_le_bytes());
        header.extend_from_slice(&id.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes());
        header.extend_from_slice(&(body.len() as u32).to_le_bytes());
        header.extend_from_slice(&level.to_le_bytes());
        header.push(0x50);

        let mut stream = InternalStream::new(&header, false);
        let trailer = ChunkHeader::parse(&mut stream).unwrap().trailer;
        self.bytes.extend(header);
        self.bytes.extend_from_slice(body);
        self.bytes.resize(self.bytes.len() + trailer as usize, 0);
        self
    }

    /// Append raw bytes, e.g. a header whose body is cut short.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// Record bodies

pub fn cell(value: f64) -> Vec<u8> {
    let mut bytes = vec![0u8];
    bytes.extend_from_slice(&value.to_le_bytes());
    bytes
}

pub fn point(x: f64, y: f64) -> Vec<u8> {
    let mut bytes = cell(x);
    bytes.extend(cell(y));
    bytes
}

pub fn shape_record(parent: u32, master_page: u32, master_shape: u32, line: u32, fill: u32, text: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; 10];
    for value in [parent, master_page, master_shape, fill, line] {
        bytes.extend_from_slice(&value.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 4]);
    }
    bytes.extend_from_slice(&text.to_le_bytes());
    bytes
}

pub fn plain_shape() -> Vec<u8> {
    shape_record(0, MINUS_ONE, MINUS_ONE, MINUS_ONE, MINUS_ONE, MINUS_ONE)
}

pub fn xform(pin_x: f64, pin_y: f64, width: f64, height: f64) -> Vec<u8> {
    let mut bytes = Vec::new();
    for value in [pin_x, pin_y, width, height, width / 2.0, height / 2.0, 0.0] {
        bytes.extend(cell(value));
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

pub fn line_body(width: f64, colour: [u8; 4], pattern: u8) -> Vec<u8> {
    let mut bytes = cell(width);
    bytes.push(0);
    bytes.extend_from_slice(&colour);
    bytes.push(pattern);
    bytes.extend_from_slice(&[0u8; 10]);
    bytes.extend_from_slice(&0.0f64.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(&[0, 0, 0]);
    bytes
}

pub fn style_sheet(line: u32, fill: u32, text: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; 10];
    for value in [line, fill, text] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Leading record of a page list stream: the background page id sits eight
/// bytes into the stream.
pub fn page_record(background: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; 4];
    bytes.extend_from_slice(&background.to_le_bytes());
    bytes
}

pub fn text_body(text: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; 8];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// Empty child-order record of a list chunk.
pub fn empty_order() -> Vec<u8> {
    vec![0u8; 8]
}

/// Child-order record of a list chunk visiting `ids` in the given order.
pub fn list_order(ids: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&((ids.len() * 4) as u32).to_le_bytes());
    for id in ids {
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    bytes
}

/// Character run: `style_bits` is the bold/italic/underline/smallcaps byte.
pub fn char_ix(char_count: u32, style_bits: u8, size: f64) -> Vec<u8> {
    let mut bytes = char_count.to_le_bytes().to_vec();
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.push(0);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&[style_bits, 0, 0]);
    bytes.extend_from_slice(&[0u8; 4]);
    bytes.extend_from_slice(&size.to_le_bytes());
    bytes.push(0);
    bytes
}

pub fn para_ix(char_count: u32, align: u8) -> Vec<u8> {
    let mut bytes = char_count.to_le_bytes().to_vec();
    for value in [0.0, 0.0, 0.0, -1.2, 0.0, 0.0] {
        bytes.extend(cell(value));
    }
    bytes.push(align);
    bytes.extend_from_slice(&[0u8; 26]);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}

/// Field showing the name with id `name_id`.
pub fn text_field(name_id: i32) -> Vec<u8> {
    let mut bytes = vec![0u8; 7];
    bytes.push(TEXT_FIELD_CODE);
    bytes.extend_from_slice(&name_id.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 6]);
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    bytes
}

pub fn numeric_field(value: f64, format: u16) -> Vec<u8> {
    let mut bytes = vec![0u8; 7];
    bytes.push(0x20);
    bytes.extend_from_slice(&value.to_le_bytes());
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    bytes.extend_from_slice(&format.to_le_bytes());
    bytes
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Chunk run of a two-segment shape: move to `(x0, 0)`, line to `(x1, 0)`.
pub fn segment_shape(record: &[u8], x0: f64, x1: f64) -> Chunks {
    Chunks::new()
        .chunk(chunk::SHAPE_SHAPE, 0, 0, record)
        .chunk(chunk::XFORM_DATA, 0, 1, &xform(1.0, 1.0, 2.0, 2.0))
        .chunk(chunk::GEOM_LIST, 0, 1, &empty_order())
        .chunk(chunk::GEOMETRY, 0, 2, &[0])
        .chunk(chunk::MOVE_TO, 1, 2, &point(x0, 0.0))
        .chunk(chunk::LINE_TO, 2, 2, &point(x1, 0.0))
}
