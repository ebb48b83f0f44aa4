//! Error types for Visio drawing decoding

use crate::common::binary::BinaryError;
use crate::ole::OleError;
use thiserror::Error;

/// Result type alias for Visio decoding
pub type VsdResult<T> = Result<T, VsdError>;

/// Errors that abort the decoding of a drawing or one of its sub-streams
#[derive(Error, Debug)]
pub enum VsdError {
    /// Container-level failure
    #[error("OLE error: {0}")]
    Ole(#[from] OleError),
    /// A read ran past the end of a sub-stream
    #[error("Truncated data: {0}")]
    Truncated(#[from] BinaryError),
    /// The drawing stream is missing or carries a foreign signature
    #[error("Not a Visio drawing: {0}")]
    NotVisioDocument(String),
    /// File-format version this decoder does not read
    #[error("Unsupported Visio version: {0}")]
    UnsupportedVersion(u8),
    /// The trailer pointer does not locate a trailer stream
    #[error("Unsupported top-level pointer type 0x{0:x}")]
    UnsupportedPointer(u32),
    /// An offset/length pair points outside its enclosing stream
    #[error("Range {offset}+{length} exceeds stream of {extent} bytes")]
    ExtentOverflow {
        /// Start of the range
        offset: usize,
        /// Length of the range
        length: usize,
        /// Size of the enclosing stream
        extent: usize,
    },
    /// Nested pointer lists deeper than the configured bound
    #[error("Pointer lists nested deeper than {0} levels")]
    RecursionLimit(usize),
}
