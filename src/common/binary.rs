//! Binary data parsing utilities shared across the decoder.
//!
//! Bounds-checked little-endian reads over byte slices, plus decoders for the
//! UTF-16LE and Windows-1252 strings Visio stores names and text in.

use encoding_rs::{UTF_16LE, WINDOWS_1252};
use thiserror::Error;
use zerocopy::{F64, FromBytes, I32, LE, U16, U32};

/// Binary parsing error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data: expected {expected}, got {available}")]
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn check_len(data: &[u8], offset: usize, size: usize) -> BinaryResult<()> {
    let end = offset.checked_add(size).ok_or(BinaryError::InsufficientData {
        expected: usize::MAX,
        available: data.len(),
    })?;
    if end > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: end,
            available: data.len(),
        });
    }
    Ok(())
}

/// Read a single byte at the given offset.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> BinaryResult<u8> {
    check_len(data, offset, 1)?;
    Ok(data[offset])
}

/// Read any fixed-size zerocopy value at `offset`.
///
/// The little-endian wrappers (`U16<LE>`, `F64<LE>` and friends) make this the
/// single place where byte order is applied.
#[inline]
pub fn read_le<T: FromBytes>(data: &[u8], offset: usize) -> BinaryResult<T> {
    let size = size_of::<T>();
    check_len(data, offset, size)?;
    T::read_from_bytes(&data[offset..offset + size])
        .map_err(|_| BinaryError::ParseError(format!("{size}-byte value at {offset:#x}")))
}

macro_rules! le_reader {
    ($(#[$doc:meta])* $name:ident, $wire:ty => $native:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(data: &[u8], offset: usize) -> BinaryResult<$native> {
            read_le::<$wire>(data, offset).map(|v| v.get())
        }
    };
}

le_reader!(
    /// Little-endian u16 at `offset`.
    ///
    /// ```
    /// use longan::common::binary::read_u16_le;
    /// assert_eq!(read_u16_le(&[0x34, 0x12, 0x78, 0x56], 2).ok(), Some(0x5678));
    /// ```
    read_u16_le, U16<LE> => u16
);
le_reader!(
    /// Little-endian u32 at `offset`.
    read_u32_le, U32<LE> => u32
);
le_reader!(
    /// Little-endian i32 at `offset`; Visio uses `-1` as its "none" id.
    read_i32_le, I32<LE> => i32
);
le_reader!(
    /// Little-endian IEEE 754 double at `offset`.
    read_f64_le, F64<LE> => f64
);

/// Decode UTF-16LE bytes, stopping at the first NUL code unit.
///
/// # Examples
///
/// ```
/// use longan::common::binary::decode_utf16le;
/// let data = [0x48, 0x00, 0x69, 0x00, 0x00, 0x00, 0x21, 0x00];
/// assert_eq!(decode_utf16le(&data), "Hi");
/// ```
pub fn decode_utf16le(data: &[u8]) -> String {
    let end = data
        .chunks_exact(2)
        .position(|unit| unit[0] == 0 && unit[1] == 0)
        .map_or(data.len() & !1, |units| units * 2);
    let (text, _) = UTF_16LE.decode_without_bom_handling(&data[..end]);
    text.into_owned()
}

/// Decode Windows-1252 bytes, stopping at the first NUL byte.
///
/// # Examples
///
/// ```
/// use longan::common::binary::decode_windows1252;
/// assert_eq!(decode_windows1252(b"caf\xe9\0junk"), "café");
/// ```
pub fn decode_windows1252(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(&data[..end]);
    text.into_owned()
}
