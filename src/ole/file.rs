//! OLE2 compound file reader.
//!
//! A compound file is a small FAT file system: fixed-size sectors chained
//! through a file allocation table, a directory of named streams arranged as
//! red-black trees, and a mini stream holding the sectors of small streams.
//! Visio only needs read access to a single stream, so this reader loads the
//! allocation tables and the directory up front and reads streams on demand.

use super::consts::*;
use crate::common::binary::{BinaryError, read_u32_le};
use std::collections::HashSet;
use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Compound file header (512 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
#[allow(dead_code)]
struct RawHeader {
    magic: [u8; 8],
    clsid: [u8; 16],
    minor_version: U16<LE>,
    dll_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    transaction_signature: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Directory entry as stored on disk (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
#[allow(dead_code)]
struct RawDirectoryEntry {
    /// UTF-16LE name, NUL padded
    name: [u8; 64],
    /// Name length in bytes, terminator included
    name_len: U16<LE>,
    entry_type: u8,
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// Error types for OLE container parsing
#[derive(Error, Debug)]
pub enum OleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid data: {0}")]
    InvalidData(#[from] BinaryError),
    #[error("Not an OLE file")]
    NotOleFile,
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),
    #[error("Stream not found")]
    StreamNotFound,
}

/// A stream or storage of the compound file.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Index in the directory
    pub sid: u32,
    pub name: String,
    /// One of the `STGTY_*` constants
    pub entry_type: u8,
    pub sid_left: u32,
    pub sid_right: u32,
    pub sid_child: u32,
    pub start_sector: u32,
    /// Stream length in bytes
    pub size: u64,
    /// Whether the stream's sectors live in the mini stream
    pub is_minifat: bool,
}

impl DirectoryEntry {
    pub fn is_stream(&self) -> bool {
        self.entry_type == STGTY_STREAM
    }

    pub fn is_storage(&self) -> bool {
        matches!(self.entry_type, STGTY_STORAGE | STGTY_ROOT)
    }
}

/// Sector ids of the chain starting at `start`.
///
/// A chain can visit each table slot at most once, so a chain longer than
/// the table is a loop.
fn follow_chain(table: &[u32], start: u32, what: &str) -> Result<Vec<u32>, OleError> {
    let mut sectors = Vec::new();
    let mut sector = start;
    while sector != ENDOFCHAIN {
        let next = *table.get(sector as usize).ok_or_else(|| {
            OleError::CorruptedFile(format!("{} sector {} outside the allocation table", what, sector))
        })?;
        if sectors.len() >= table.len() {
            return Err(OleError::CorruptedFile(format!("{} chain loops back on itself", what)));
        }
        sectors.push(sector);
        sector = next;
    }
    Ok(sectors)
}

/// Read-only view of an OLE2 compound file.
///
/// Visio drawings (.vsd), stencils (.vss) and templates (.vst) keep their
/// drawing payload in the `VisioDocument` stream.
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    reader: R,
    file_size: u64,
    sector_size: usize,
    mini_sector_size: usize,
    /// Streams shorter than this live in the mini stream
    mini_stream_cutoff: u32,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    /// Reachable directory entries by sid; slot 0 is the root
    entries: Vec<Option<DirectoryEntry>>,
    /// Contents of the root entry's stream, loaded on first use
    ministream: Option<Vec<u8>>,
}

impl<R: Read + Seek> OleFile<R> {
    /// Validate the header and load the allocation tables and directory.
    pub fn open(mut reader: R) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < MINIMAL_OLEFILE_SIZE as u64 {
            return Err(OleError::NotOleFile);
        }
        reader.seek(SeekFrom::Start(0))?;

        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes)?;
        let header = RawHeader::read_from_bytes(&bytes[..])
            .map_err(|_| OleError::InvalidFormat("Failed to parse header".to_string()))?;

        if &header.magic != MAGIC {
            return Err(OleError::NotOleFile);
        }
        if header.byte_order.get() != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }
        let sector_shift = header.sector_shift.get();
        let mini_sector_shift = header.mini_sector_shift.get();
        if !(7..=16).contains(&sector_shift) || mini_sector_shift > sector_shift {
            return Err(OleError::InvalidFormat("Invalid sector shift".to_string()));
        }
        let sector_size = 1usize << sector_shift;
        match (header.dll_version.get(), sector_size) {
            (3, 512) | (4, 4096) => {},
            (3, _) | (4, _) => return Err(OleError::InvalidFormat("Sector size mismatch".to_string())),
            (version, _) => log::debug!("compound file with unusual major version {}", version),
        }

        let mut ole = OleFile {
            reader,
            file_size,
            sector_size,
            mini_sector_size: 1usize << mini_sector_shift,
            mini_stream_cutoff: header.mini_stream_cutoff.get(),
            fat: Vec::new(),
            minifat: Vec::new(),
            entries: Vec::new(),
            ministream: None,
        };

        ole.load_fat(&header)?;
        ole.load_directory(header.first_dir_sector.get())?;
        if header.num_minifat_sectors.get() > 0 {
            let minifat = ole.read_chain(header.first_minifat_sector.get())?;
            ole.minifat = ole.table_entries(&minifat)?;
        }
        log::trace!(
            "compound file: {} bytes, {}-byte sectors, {} directory entries",
            ole.file_size,
            ole.sector_size,
            ole.entries.iter().flatten().count()
        );
        Ok(ole)
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Gather the FAT from the sector ids in the header and DIFAT sectors.
    fn load_fat(&mut self, header: &RawHeader) -> Result<(), OleError> {
        let mut fat_sectors: Vec<u32> = header
            .difat
            .iter()
            .map(|id| id.get())
            .take_while(|&id| id != FREESECT && id != ENDOFCHAIN)
            .collect();

        // The last slot of a DIFAT sector links to the next one
        let ids_per_difat = self.sector_size / 4 - 1;
        let mut difat_sector = header.first_difat_sector.get();
        let mut seen = HashSet::new();
        for _ in 0..header.num_difat_sectors.get() {
            if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                break;
            }
            if !seen.insert(difat_sector) {
                return Err(OleError::CorruptedFile("DIFAT chain loops back on itself".to_string()));
            }
            let sector = self.read_sector(difat_sector)?;
            for i in 0..ids_per_difat {
                let id = read_u32_le(&sector, i * 4)?;
                if id == FREESECT || id == ENDOFCHAIN {
                    break;
                }
                fat_sectors.push(id);
            }
            difat_sector = read_u32_le(&sector, ids_per_difat * 4)?;
        }

        self.fat = Vec::with_capacity(fat_sectors.len() * self.sector_size / 4);
        for id in fat_sectors {
            let sector = self.read_sector(id)?;
            let entries = self.table_entries(&sector)?;
            self.fat.extend(entries);
        }
        Ok(())
    }

    fn table_entries(&self, bytes: &[u8]) -> Result<Vec<u32>, OleError> {
        bytes
            .chunks_exact(4)
            .map(|entry| read_u32_le(entry, 0).map_err(OleError::from))
            .collect()
    }

    /// Decode every directory entry reachable from the root.
    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let directory = self.read_chain(first_dir_sector)?;
        let count = directory.len() / DIRENTRY_SIZE;
        if count == 0 {
            return Err(OleError::CorruptedFile("Empty directory".to_string()));
        }
        self.entries = vec![None; count];

        let mut pending = vec![0u32];
        while let Some(sid) = pending.pop() {
            if sid == NOSTREAM {
                continue;
            }
            let index = sid as usize;
            if index >= count {
                return Err(OleError::CorruptedFile(format!("Directory entry {} out of range", sid)));
            }
            // A malformed tree may point back at an entry already decoded
            if self.entries[index].is_some() {
                continue;
            }
            let offset = index * DIRENTRY_SIZE;
            let entry = self.parse_directory_entry(&directory[offset..offset + DIRENTRY_SIZE], sid)?;
            pending.extend([entry.sid_left, entry.sid_right, entry.sid_child]);
            self.entries[index] = Some(entry);
        }
        Ok(())
    }

    fn parse_directory_entry(&self, bytes: &[u8], sid: u32) -> Result<DirectoryEntry, OleError> {
        let raw = RawDirectoryEntry::read_from_bytes(bytes)
            .map_err(|_| OleError::InvalidFormat("Failed to parse directory entry".to_string()))?;

        let name_len = (raw.name_len.get() as usize).saturating_sub(2).min(raw.name.len());
        let name = crate::common::binary::decode_utf16le(&raw.name[..name_len]);

        // Version 3 files only define the low 32 bits of the size
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        Ok(DirectoryEntry {
            sid,
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            start_sector: raw.start_sector.get(),
            size,
            is_minifat: raw.entry_type == STGTY_STREAM && size < u64::from(self.mini_stream_cutoff),
        })
    }

    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>, OleError> {
        // Sector 0 starts right after the header, which occupies one sector slot
        let position = (u64::from(sector_id) + 1) * self.sector_size as u64;
        if position >= self.file_size {
            return Err(OleError::CorruptedFile(format!(
                "Sector {} lies beyond end of file",
                sector_id
            )));
        }
        // A cut-off final sector reads as zeros past the end of file
        let available = (self.file_size - position).min(self.sector_size as u64) as usize;
        if available < self.sector_size {
            log::debug!(
                "sector {} short by {} bytes, zero-padded",
                sector_id,
                self.sector_size - available
            );
        }
        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; self.sector_size];
        self.reader.read_exact(&mut buffer[..available])?;
        Ok(buffer)
    }

    /// Concatenate the sectors of a FAT chain.
    fn read_chain(&mut self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        let sectors = follow_chain(&self.fat, start_sector, "FAT")?;
        let mut data = Vec::with_capacity(sectors.len() * self.sector_size);
        for sector in sectors {
            data.extend(self.read_sector(sector)?);
        }
        Ok(data)
    }

    /// Concatenate the sectors of a MiniFAT chain.
    fn read_mini_chain(&mut self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        if self.ministream.is_none() {
            let root_start = self
                .root()
                .map(|root| root.start_sector)
                .ok_or_else(|| OleError::CorruptedFile("No root entry".to_string()))?;
            self.ministream = Some(self.read_chain(root_start)?);
        }
        let sectors = follow_chain(&self.minifat, start_sector, "MiniFAT")?;
        let ministream = self.ministream.as_deref().unwrap_or_default();

        let mut data = Vec::with_capacity(sectors.len() * self.mini_sector_size);
        for sector in sectors {
            let start = sector as usize * self.mini_sector_size;
            let bytes = ministream
                .get(start..start + self.mini_sector_size)
                .ok_or_else(|| OleError::CorruptedFile("Mini sector out of bounds".to_string()))?;
            data.extend_from_slice(bytes);
        }
        Ok(data)
    }

    fn root(&self) -> Option<&DirectoryEntry> {
        self.entries.first().and_then(Option::as_ref)
    }

    fn entry(&self, sid: u32) -> Option<&DirectoryEntry> {
        self.entries.get(sid as usize).and_then(Option::as_ref)
    }

    /// Paths of every stream, storages first to last.
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        if let Some(root) = self.root() {
            let mut visited = HashSet::new();
            self.collect_streams(root.sid_child, &[], &mut visited, &mut streams);
        }
        streams
    }

    fn collect_streams(
        &self,
        sid: u32,
        path: &[String],
        visited: &mut HashSet<u32>,
        streams: &mut Vec<Vec<String>>,
    ) {
        let Some(entry) = self.entry(sid) else {
            return;
        };
        if !visited.insert(sid) {
            return;
        }

        self.collect_streams(entry.sid_left, path, visited, streams);
        let mut current = path.to_vec();
        current.push(entry.name.clone());
        if entry.is_stream() {
            streams.push(current);
        } else if entry.is_storage() {
            self.collect_streams(entry.sid_child, &current, visited, streams);
        }
        self.collect_streams(entry.sid_right, path, visited, streams);
    }

    /// Read a whole stream by its storage path, e.g. `&["VisioDocument"]`.
    pub fn open_stream(&mut self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self.find_entry(path)?.clone();
        if !entry.is_stream() {
            return Err(OleError::InvalidFormat(format!("{} is not a stream", entry.name)));
        }

        let mut data = if entry.is_minifat {
            self.read_mini_chain(entry.start_sector)?
        } else {
            self.read_chain(entry.start_sector)?
        };
        data.truncate(entry.size as usize);
        Ok(data)
    }

    /// Whether `path` names a stream or storage. Names compare ASCII case-insensitively.
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }

    fn find_entry(&self, path: &[&str]) -> Result<&DirectoryEntry, OleError> {
        let mut current = self.root().ok_or(OleError::StreamNotFound)?;
        for name in path {
            current = self
                .find_sibling(current.sid_child, name)
                .ok_or(OleError::StreamNotFound)?;
        }
        Ok(current)
    }

    /// Search the sibling tree rooted at `sid` for `name`.
    fn find_sibling(&self, sid: u32, name: &str) -> Option<&DirectoryEntry> {
        let mut pending = vec![sid];
        let mut visited = HashSet::new();
        while let Some(sid) = pending.pop() {
            if !visited.insert(sid) {
                continue;
            }
            let Some(entry) = self.entry(sid) else {
                continue;
            };
            if entry.name.eq_ignore_ascii_case(name) {
                return Some(entry);
            }
            pending.extend([entry.sid_left, entry.sid_right]);
        }
        None
    }
}

/// Check whether `data` starts like a compound file.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && data.starts_with(MAGIC)
}
