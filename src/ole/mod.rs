/// Constants for OLE file format
pub mod consts;

/// Main OLE file parsing implementation
mod file;

/// Visio 2003 binary drawing (.vsd) decoder
///
/// The drawing payload of a Visio compound file lives in its
/// `VisioDocument` stream. This module walks that stream and replays the
/// decoded shapes through a collector.
pub mod vsd;

// Re-export public types for convenient access
pub use file::{DirectoryEntry, OleError, OleFile, is_ole_file};
