//! Visio 2003 binary drawing (.vsd, .vss, .vst) support.
//!
//! This module decodes the `VisioDocument` stream of a Visio compound file
//! into a stream of [`Collector`] calls. Nothing is rendered here: sinks such
//! as SVG writers or dumpers sit behind the collector.
//!
//! # Architecture
//!
//! - `stream`, `pointer`, `chunk`: navigation over the nested pointer lists
//!   and chunk runs of the drawing stream
//! - `parser`: the stream walker, the chunk readers and the level-driven
//!   shape assembly
//! - `list`: the patchable ordered list shared by geometry sections, text
//!   runs, fields and group child lists
//! - `styles`, `layers`, `stencils`: style sheet cascade, layer attributes
//!   and master shapes used to resolve each shape on output
//!
//! # Example
//!
//! ```rust,no_run
//! use longan::ole::vsd::{self, Collector, XForm};
//! use std::fs::File;
//!
//! struct Placements(Vec<XForm>);
//!
//! impl Collector for Placements {
//!     fn collect_xform_data(&mut self, _level: u32, xform: &XForm) {
//!         self.0.push(*xform);
//!     }
//! }
//!
//! let file = File::open("drawing.vsd")?;
//! let mut placements = Placements(Vec::new());
//! if vsd::parse(file, &mut placements) {
//!     println!("{} shapes placed", placements.0.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Container navigation
pub mod chunk;
pub mod consts;
pub mod error;
pub mod pointer;
pub mod stream;

// Shape model
pub mod fields;
pub mod geometry;
pub mod layers;
pub mod list;
pub mod shape;
pub mod stencils;
pub mod styles;
pub mod text;

// Decoding
pub mod collector;
pub mod config;
pub mod package;
pub mod parser;

// Re-export main types for convenience
pub use collector::{Collector, PageProps};
pub use config::ParserOptions;
pub use error::{VsdError, VsdResult};
pub use fields::FieldFormat;
pub use geometry::{NurbsData, PolylineData};
pub use layers::Layer;
pub use package::{
    VisioDocument, is_supported, parse, parse_stencils, parse_stencils_with_options,
    parse_with_options,
};
pub use parser::{ParseMode, VsdParser};
pub use shape::{ForeignDataType, XForm};
pub use styles::{CharStyle, FillStyle, LineStyle, ParaStyle, TextBlockStyle};
pub use text::{Text, TextEncoding};
