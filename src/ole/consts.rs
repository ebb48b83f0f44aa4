//! Layout constants of the compound file format.

/// Signature at offset 0 of every compound file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Header plus one FAT sector and one directory sector at 512 bytes each
pub const MINIMAL_OLEFILE_SIZE: usize = 1536;

pub const HEADER_SIZE: usize = 512;
pub const DIRENTRY_SIZE: usize = 128;

/// FAT sector ids held by the header before DIFAT sectors take over
pub const HEADER_DIFAT_ENTRIES: usize = 109;

// Special sector ids
/// Marks a sector that holds part of the FAT
pub const FATSECT: u32 = 0xFFFF_FFFD;
/// Terminates a sector chain
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFF_FFFF;

/// Missing sibling or child in the directory tree
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

// Directory entry types
pub const STGTY_STORAGE: u8 = 1;
pub const STGTY_STREAM: u8 = 2;
pub const STGTY_ROOT: u8 = 5;
