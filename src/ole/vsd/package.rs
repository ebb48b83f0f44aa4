//! Package implementation for Visio 2003 binary drawings (.vsd, .vss, .vst).

use super::collector::Collector;
use super::config::ParserOptions;
use super::consts::{VERSION_11, VERSION_OFFSET, VISIO_DOCUMENT_STREAM, VISIO_SIGNATURE};
use super::error::{VsdError, VsdResult};
use super::parser::VsdParser;
use crate::common::error::{Error, Result};
use crate::ole::{OleError, OleFile};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// A Visio binary drawing.
///
/// Holds the `VisioDocument` stream of a compound file after its header has
/// been checked. Decoding happens on demand and can be repeated with
/// different collectors.
///
/// # Examples
///
/// ```rust,no_run
/// use longan::ole::vsd::{Collector, VisioDocument};
///
/// struct ShapeCounter(usize);
///
/// impl Collector for ShapeCounter {
///     fn collect_shape(&mut self, _id: u32, _level: u32, _parent: u32, _master_page: u32,
///                      _master_shape: u32, _line: u32, _fill: u32, _text: u32) {
///         self.0 += 1;
///     }
/// }
///
/// let doc = VisioDocument::open("drawing.vsd")?;
/// let mut counter = ShapeCounter(0);
/// doc.parse(&mut counter)?;
/// println!("{} shapes", counter.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct VisioDocument {
    data: Vec<u8>,
    version: u8,
}

impl VisioDocument {
    /// Open a drawing from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> VsdResult<Self> {
        let file = File::open(path).map_err(OleError::from)?;
        Self::from_reader(file)
    }

    /// Read a drawing from any compound-file reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> VsdResult<Self> {
        let mut ole = OleFile::open(reader)?;
        Self::from_ole_file(&mut ole)
    }

    /// Read the drawing stream of an already-opened compound file.
    pub fn from_ole_file<R: Read + Seek>(ole: &mut OleFile<R>) -> VsdResult<Self> {
        if !ole.exists(&[VISIO_DOCUMENT_STREAM]) {
            return Err(VsdError::NotVisioDocument(format!(
                "{} stream not found",
                VISIO_DOCUMENT_STREAM
            )));
        }
        let data = ole.open_stream(&[VISIO_DOCUMENT_STREAM])?;
        Self::from_bytes(data)
    }

    /// Wrap the raw bytes of a `VisioDocument` stream.
    ///
    /// Only the 2003 binary format (version 11) is accepted.
    pub fn from_bytes(data: Vec<u8>) -> VsdResult<Self> {
        if !data.starts_with(VISIO_SIGNATURE) {
            return Err(VsdError::NotVisioDocument("missing drawing signature".to_string()));
        }
        let version = *data
            .get(VERSION_OFFSET)
            .ok_or_else(|| VsdError::NotVisioDocument("header truncated".to_string()))?;
        if version != VERSION_11 {
            return Err(VsdError::UnsupportedVersion(version));
        }
        Ok(Self { data, version })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Raw bytes of the drawing stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Replay the drawing pages through `collector`.
    pub fn parse(&self, collector: &mut dyn Collector) -> VsdResult<()> {
        self.parse_with_options(collector, ParserOptions::default())
    }

    pub fn parse_with_options(&self, collector: &mut dyn Collector, options: ParserOptions) -> VsdResult<()> {
        VsdParser::new(&self.data, options).parse(collector)
    }

    /// Replay the master shapes through `collector`, one page per stencil.
    pub fn parse_stencils(&self, collector: &mut dyn Collector) -> VsdResult<()> {
        self.parse_stencils_with_options(collector, ParserOptions::default())
    }

    pub fn parse_stencils_with_options(
        &self,
        collector: &mut dyn Collector,
        options: ParserOptions,
    ) -> VsdResult<()> {
        VsdParser::new(&self.data, options).parse_stencils(collector)
    }
}

/// Whether `reader` holds a Visio drawing this crate can decode.
pub fn is_supported<R: Read + Seek>(reader: R) -> bool {
    match VisioDocument::from_reader(reader).map_err(Error::from) {
        Ok(_) => true,
        Err(err) => {
            log::debug!("not a supported Visio drawing: {}", err);
            false
        },
    }
}

/// Decode the drawing pages of `reader` into `collector`.
///
/// Returns `false` if the input is not a supported drawing or any part of
/// it could not be decoded. What the collector received up to that point is
/// not guaranteed to be consistent.
pub fn parse<R: Read + Seek>(reader: R, collector: &mut dyn Collector) -> bool {
    parse_with_options(reader, collector, ParserOptions::default())
}

pub fn parse_with_options<R: Read + Seek>(
    reader: R,
    collector: &mut dyn Collector,
    options: ParserOptions,
) -> bool {
    let result = decode(reader, |doc| doc.parse_with_options(collector, options));
    report(result, "drawing")
}

/// Decode the master shapes of `reader` into `collector`.
pub fn parse_stencils<R: Read + Seek>(reader: R, collector: &mut dyn Collector) -> bool {
    parse_stencils_with_options(reader, collector, ParserOptions::default())
}

pub fn parse_stencils_with_options<R: Read + Seek>(
    reader: R,
    collector: &mut dyn Collector,
    options: ParserOptions,
) -> bool {
    let result = decode(reader, |doc| doc.parse_stencils_with_options(collector, options));
    report(result, "stencils")
}

/// Open `reader` and run one decode over it.
fn decode<R, F>(reader: R, run: F) -> Result<()>
where
    R: Read + Seek,
    F: FnOnce(&VisioDocument) -> VsdResult<()>,
{
    let doc = VisioDocument::from_reader(reader)?;
    run(&doc)?;
    Ok(())
}

fn report(result: Result<()>, what: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("failed to decode Visio {}: {}", what, err);
            false
        },
    }
}
