//! Longan - A Rust library for decoding Microsoft Visio binary drawings
//!
//! This library reads the OLE2 (Object Linking and Embedding) container used
//! by Visio 2003 drawings, stencils and templates (.vsd, .vss, .vst) and
//! decodes the drawing stream into a renderer-agnostic event stream.
//!
//! # Features
//!
//! - **OLE2 Parser**: Read streams of compound files
//! - **Drawing decoder**: Pointer-list navigation, LZ decompression and
//!   chunk walking over the `VisioDocument` stream
//! - **Shape model**: Geometry, text runs, fields and foreign data with
//!   master-shape inheritance
//! - **Style cascade**: Line, fill, text block, character and paragraph
//!   styles resolved through style sheet master chains
//!
//! # Example - Decoding a drawing
//!
//! ```no_run
//! use longan::ole::vsd::{Collector, VisioDocument};
//!
//! struct Outline;
//!
//! impl Collector for Outline {
//!     fn start_page(&mut self, page_id: u32) {
//!         println!("page {}", page_id);
//!     }
//!     fn collect_move_to(&mut self, _id: u32, _level: u32, x: f64, y: f64) {
//!         println!("  move to {}, {}", x, y);
//!     }
//!     fn collect_line_to(&mut self, _id: u32, _level: u32, x: f64, y: f64) {
//!         println!("  line to {}, {}", x, y);
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = VisioDocument::open("drawing.vsd")?;
//! doc.parse(&mut Outline)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level OLE access
//!
//! ```no_run
//! use std::fs::File;
//! use longan::ole::OleFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open an OLE file
//! let file = File::open("drawing.vsd")?;
//! let mut ole = OleFile::open(file)?;
//!
//! // List all streams
//! let streams = ole.list_streams();
//! for stream in streams {
//!     println!("Stream: {:?}", stream);
//! }
//!
//! // Open the drawing stream
//! let data = ole.open_stream(&["VisioDocument"])?;
//! println!("Stream size: {} bytes", data.len());
//! # Ok(())
//! # }
//! ```

/// Shared binary readers, error types and style values
pub mod common;

/// OLE2 (Object Linking and Embedding) file format parser
///
/// This module provides functionality to parse OLE2 structured storage files
/// and contains the `vsd` submodule for Visio binary drawings.
pub mod ole;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use ole::vsd;
pub use ole::vsd::{Collector, VisioDocument};
