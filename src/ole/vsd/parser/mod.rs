//! Walker over the drawing stream.
//!
//! The document stream is a tree of pointer lists whose leaves are either
//! single records (blobs) or runs of chunks. [`VsdParser`] follows the tree,
//! hands every record to its reader and assembles shapes from the records in
//! between two shape boundaries.
//!
//! Decoding takes two passes over the same tree. The first pass collects
//! style sheets and master shapes; the second replays the drawing through the
//! caller's [`Collector`], resolving each shape against what the first pass
//! gathered.

mod level;
pub mod readers;

pub use level::{LevelAction, LevelState};

use super::chunk::{ChunkHeader, get_chunk_header};
use super::collector::{Collector, PageProps};
use super::config::ParserOptions;
use super::consts::{MINUS_ONE, TRAILER_POINTER_OFFSET, chunk};
use super::error::{VsdError, VsdResult};
use super::fields::NameTable;
use super::geometry::{
    ArcToPatch, EllipsePatch, EllipticalArcToPatch, GeometryList, InfiniteLinePatch, LineToPatch,
    MoveToPatch, NurbsToPatch, PolylineToPatch, SplineKnotPatch, SplineStartPatch,
};
use super::layers::{Layer, LayerList};
use super::pointer::{PayloadKind, Pointer, PointerList, read_pointer};
use super::shape::{Shape, shapes_order};
use super::stencils::{Stencil, Stencils};
use super::stream::InternalStream;
use super::styles::{
    CharStyle, FillStyle, LineStyle, OptionalCharStyle, OptionalFillStyle, OptionalLineStyle,
    OptionalParaStyle, OptionalStyle, OptionalTextBlockStyle, ParaStyle, Styles, StylesCollector,
    TextBlockStyle,
};
use super::text::{Text, TextEncoding, TextRunPatch};
use crate::common::binary::BinaryResult;
use readers::ShapeDataRecord;
use std::collections::HashSet;

/// What a decode emits as pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Drawing pages, with master shapes resolved from the stencils
    Document,
    /// Every stencil page as a page of master shapes
    Stencils,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Styles,
    Content,
}

/// Decoder state for one drawing stream.
///
/// A parser is single-use: build one per decode.
pub struct VsdParser<'a> {
    document: &'a [u8],
    options: ParserOptions,
    mode: ParseMode,
    pass: Pass,
    styles: Styles,
    stencils: Stencils,
    names: NameTable,
    /// Layers of the page being walked
    layers: LayerList,
    shape: Shape,
    /// Set by a shape record; page sheets open a scope without starting a shape
    shape_started: bool,
    level: LevelState,
    in_styles: bool,
    stencil_started: bool,
    current_stencil: Option<Stencil>,
    current_shape_id: u32,
    current_geometry: Option<u32>,
    geometry_count: u32,
    is_background_page: bool,
    visited: HashSet<u32>,
    depth: usize,
}

/// Fill `value` from a chunk body, keeping whatever a truncated body did not reach.
fn read_into<T>(
    body: &[u8],
    chunk_type: u32,
    value: &mut T,
    read: impl FnOnce(&mut InternalStream, &mut T) -> BinaryResult<()>,
) {
    let mut stream = InternalStream::new(body, false);
    if let Err(err) = read(&mut stream, value) {
        log::debug!("chunk 0x{:x} body truncated: {}", chunk_type, err);
    }
}

fn read_partial<T: Default>(
    body: &[u8],
    chunk_type: u32,
    read: impl FnOnce(&mut InternalStream, &mut T) -> BinaryResult<()>,
) -> T {
    let mut value = T::default();
    read_into(body, chunk_type, &mut value, read);
    value
}

/// Decode a chunk body that is useless unless complete.
fn read_complete<T>(
    body: &[u8],
    chunk_type: u32,
    read: impl FnOnce(&mut InternalStream) -> BinaryResult<T>,
) -> Option<T> {
    let mut stream = InternalStream::new(body, false);
    match read(&mut stream) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("chunk 0x{:x} skipped: {}", chunk_type, err);
            None
        },
    }
}

impl<'a> VsdParser<'a> {
    /// Create a parser over the bytes of a `VisioDocument` stream.
    pub fn new(document: &'a [u8], options: ParserOptions) -> Self {
        Self {
            document,
            options,
            mode: ParseMode::Document,
            pass: Pass::Styles,
            styles: Styles::new(options.max_style_depth),
            stencils: Stencils::new(),
            names: NameTable::new(),
            layers: LayerList::new(),
            shape: Shape::new(),
            shape_started: false,
            level: LevelState::default(),
            in_styles: false,
            stencil_started: false,
            current_stencil: None,
            current_shape_id: MINUS_ONE,
            current_geometry: None,
            geometry_count: 0,
            is_background_page: false,
            visited: HashSet::new(),
            depth: 0,
        }
    }

    /// Decode the drawing pages.
    pub fn parse(&mut self, collector: &mut dyn Collector) -> VsdResult<()> {
        self.parse_main(ParseMode::Document, collector)
    }

    /// Decode the master shapes, one page per stencil.
    pub fn parse_stencils(&mut self, collector: &mut dyn Collector) -> VsdResult<()> {
        self.parse_main(ParseMode::Stencils, collector)
    }

    /// Style tables gathered by the first pass.
    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Master shapes gathered by the first pass.
    pub fn stencils(&self) -> &Stencils {
        &self.stencils
    }

    fn parse_main(&mut self, mode: ParseMode, collector: &mut dyn Collector) -> VsdResult<()> {
        self.mode = mode;
        let trailer = self.trailer_pointer()?;

        let mut styles_collector = StylesCollector::new(self.options.max_style_depth);
        self.pass = Pass::Styles;
        self.stencils = Stencils::new();
        self.run_pass(&trailer, &mut styles_collector)?;
        self.styles = styles_collector.into_styles();

        self.pass = Pass::Content;
        self.run_pass(&trailer, collector)
    }

    fn trailer_pointer(&self) -> VsdResult<Pointer> {
        let mut stream = InternalStream::new(self.document, false);
        stream.seek(TRAILER_POINTER_OFFSET)?;
        let pointer = read_pointer(&mut stream)?;
        if pointer.ptr_type != chunk::TRAILER_STREAM {
            return Err(VsdError::UnsupportedPointer(pointer.ptr_type));
        }
        Ok(pointer)
    }

    fn run_pass(&mut self, trailer: &Pointer, collector: &mut dyn Collector) -> VsdResult<()> {
        self.reset_pass_state();
        let mut stream = self.sub_stream(trailer)?;
        log::debug!(
            "{:?} pass over trailer of {} bytes",
            self.pass,
            stream.len()
        );
        self.handle_streams(&mut stream, trailer.shift(), 0, collector)?;
        self.finish_scope(collector);
        Ok(())
    }

    fn reset_pass_state(&mut self) {
        self.layers.clear();
        self.shape.clear();
        self.shape_started = false;
        self.level = LevelState::default();
        self.in_styles = false;
        self.stencil_started = false;
        self.current_stencil = None;
        self.current_shape_id = MINUS_ONE;
        self.current_geometry = None;
        self.geometry_count = 0;
        self.is_background_page = false;
        self.visited.clear();
        self.depth = 0;
    }

    fn sub_stream(&self, pointer: &Pointer) -> VsdResult<InternalStream> {
        let range = pointer
            .range_within(self.document.len())
            .ok_or(VsdError::ExtentOverflow {
                offset: pointer.offset as usize,
                length: pointer.length as usize,
                extent: self.document.len(),
            })?;
        Ok(InternalStream::new(
            &self.document[range],
            pointer.is_compressed(),
        ))
    }

    fn skips_pages(&self) -> bool {
        self.mode == ParseMode::Stencils || self.pass == Pass::Styles
    }

    /// Document mode registers masters in the styles pass; stencil mode
    /// emits them in the content pass.
    fn skips_stencils(&self) -> bool {
        match self.mode {
            ParseMode::Document => self.pass == Pass::Content,
            ParseMode::Stencils => self.pass == Pass::Styles,
        }
    }

    // Level bookkeeping

    fn apply_level_action(&mut self, action: LevelAction, collector: &mut dyn Collector) {
        if let LevelAction::FlushShape { level } = action {
            self.flush_shape(level, collector);
        }
    }

    fn handle_level_change(&mut self, level: u32, collector: &mut dyn Collector) {
        let (state, action) = self.level.change_level(level);
        self.level = state;
        self.apply_level_action(action, collector);
    }

    fn open_shape_scope(&mut self, level: u32, collector: &mut dyn Collector) {
        let (state, action) = self.level.open_shape(level);
        self.level = state;
        self.apply_level_action(action, collector);
    }

    fn finish_scope(&mut self, collector: &mut dyn Collector) {
        let (state, action) = self.level.finish();
        self.level = state;
        self.apply_level_action(action, collector);
    }

    // Stream navigation

    fn handle_streams(
        &mut self,
        stream: &mut InternalStream,
        shift: usize,
        level: u32,
        collector: &mut dyn Collector,
    ) -> VsdResult<()> {
        if self.depth >= self.options.max_stream_depth {
            return Err(VsdError::RecursionLimit(self.options.max_stream_depth));
        }
        let list = PointerList::read(stream, shift)?;

        self.depth += 1;
        let mut result = Ok(());
        for (index, pointer) in list.visit_order() {
            result = self.handle_stream(&pointer, index, level + 1, collector);
            if result.is_err() {
                break;
            }
        }
        self.depth -= 1;
        result
    }

    fn handle_stream(
        &mut self,
        pointer: &Pointer,
        index: u32,
        level: u32,
        collector: &mut dyn Collector,
    ) -> VsdResult<()> {
        let mut stream = self.sub_stream(pointer)?;
        self.handle_level_change(level, collector);

        match pointer.ptr_type {
            chunk::STYLES => self.in_styles = true,
            chunk::PAGES if self.skips_pages() => return Ok(()),
            chunk::PAGE => {
                if self.skips_pages() {
                    return Ok(());
                }
                self.is_background_page = pointer.format & 1 == 0;
                self.layers.clear();
                collector.start_page(index);
            },
            chunk::STENCILS => {
                if self.skips_stencils() {
                    return Ok(());
                }
                if self.mode == ParseMode::Document {
                    self.stencil_started = true;
                }
            },
            chunk::STENCIL_PAGE => match self.mode {
                ParseMode::Stencils => {
                    self.stencil_started = false;
                    self.layers.clear();
                    collector.start_page(index);
                },
                ParseMode::Document => self.current_stencil = Some(Stencil::new()),
            },
            chunk::SHAPE_GROUP | chunk::SHAPE_SHAPE | chunk::SHAPE_FOREIGN => {
                self.current_shape_id = index;
            },
            _ => {},
        }

        match pointer.payload_kind() {
            PayloadKind::Blob => self.handle_blob(&mut stream, pointer, index, level + 1, collector),
            PayloadKind::BlobWithPointers => {
                self.handle_blob(&mut stream, pointer, index, level + 1, collector);
                if self.visited.insert(pointer.offset) {
                    self.handle_streams(&mut stream, pointer.shift(), level + 1, collector)?;
                } else {
                    log::debug!("pointer list at 0x{:x} already walked", pointer.offset);
                }
            },
            PayloadKind::Chunks => self.handle_chunks(&mut stream, level, collector)?,
            PayloadKind::Opaque => {
                log::debug!(
                    "skipping stream 0x{:x} with format 0x{:x}",
                    pointer.ptr_type,
                    pointer.format
                );
            },
        }

        match pointer.ptr_type {
            chunk::STYLES => {
                self.finish_scope(collector);
                self.in_styles = false;
            },
            chunk::PAGES => collector.end_pages(),
            chunk::PAGE => {
                self.finish_scope(collector);
                collector.end_page();
            },
            chunk::STENCILS => match self.mode {
                ParseMode::Stencils => collector.end_pages(),
                ParseMode::Document => self.stencil_started = false,
            },
            chunk::STENCIL_PAGE => {
                self.finish_scope(collector);
                match self.mode {
                    ParseMode::Stencils => collector.end_page(),
                    ParseMode::Document => {
                        if let Some(stencil) = self.current_stencil.take() {
                            self.stencils.add_stencil(index, stencil);
                        }
                    },
                }
            },
            chunk::SHAPE_GROUP | chunk::SHAPE_SHAPE | chunk::SHAPE_FOREIGN => {
                self.current_shape_id = MINUS_ONE;
            },
            _ => {},
        }
        Ok(())
    }

    /// Treat a whole sub-stream as one record typed by its pointer.
    fn handle_blob(
        &mut self,
        stream: &mut InternalStream,
        pointer: &Pointer,
        index: u32,
        level: u32,
        collector: &mut dyn Collector,
    ) {
        let start = pointer.shift().min(stream.len());
        let body = &stream.as_bytes()[start..];
        let header = ChunkHeader {
            chunk_type: pointer.ptr_type,
            id: index,
            data_length: body.len() as u32,
            ..ChunkHeader::default()
        };
        self.handle_level_change(level, collector);
        self.handle_chunk(&header, level, body, collector);
    }

    fn handle_chunks(
        &mut self,
        stream: &mut InternalStream,
        level: u32,
        collector: &mut dyn Collector,
    ) -> VsdResult<()> {
        while let Some(header) = get_chunk_header(stream)? {
            let body_start = stream.tell();
            let end = header.end_position(body_start);
            let chunk_level = level + u32::from(header.level);

            self.handle_level_change(chunk_level, collector);
            let body = &stream.as_bytes()[body_start..body_start + header.data_length as usize];
            self.handle_chunk(&header, chunk_level, body, collector);

            if end >= stream.len() {
                break;
            }
            stream.seek(end)?;
        }
        Ok(())
    }

    // Record dispatch

    fn current_geometry_list(&mut self) -> &mut GeometryList {
        let index = match self.current_geometry {
            Some(index) => index,
            None => self.open_geometry_list(),
        };
        self.shape.geometries.entry(index).or_default()
    }

    fn open_geometry_list(&mut self) -> u32 {
        let index = self.geometry_count;
        self.geometry_count += 1;
        self.current_geometry = Some(index);
        index
    }

    fn handle_chunk(
        &mut self,
        header: &ChunkHeader,
        level: u32,
        body: &[u8],
        collector: &mut dyn Collector,
    ) {
        let id = header.id;
        let ty = header.chunk_type;
        match ty {
            chunk::SHAPE_GROUP | chunk::SHAPE_SHAPE | chunk::SHAPE_FOREIGN => {
                self.read_shape(header, level, body, collector)
            },
            chunk::PAGE_SHEET => {
                self.open_shape_scope(level, collector);
                collector.collect_page_sheet(id, level);
            },
            chunk::XFORM_DATA => {
                read_into(body, ty, &mut self.shape.xform, readers::read_xform);
            },
            chunk::TEXT_XFORM => {
                let mut xform = self.shape.txt_xform.unwrap_or_default();
                read_into(body, ty, &mut xform, readers::read_xform);
                self.shape.txt_xform = Some(xform);
            },
            chunk::SHAPE_LIST => {
                if let Some(order) = read_complete(body, ty, readers::read_list_order) {
                    self.shape.shape_list.set_order(order);
                }
            },
            chunk::SHAPE_ID => {
                if let Some(shape_id) = read_complete(body, ty, |s| s.read_u32()) {
                    self.shape.shape_list.add(id, level, shape_id);
                }
            },
            chunk::LINE => {
                let style: OptionalLineStyle = read_partial(body, ty, readers::read_line);
                if self.in_styles {
                    collector.collect_line_style(level, &style);
                } else {
                    self.shape.line_style.override_with(&style);
                }
            },
            chunk::FILL_AND_SHADOW => {
                let style: OptionalFillStyle = read_partial(body, ty, readers::read_fill_and_shadow);
                if self.in_styles {
                    match (style.shadow_offset_x, style.shadow_offset_y) {
                        (Some(x), Some(y)) => collector.collect_fill_style_with_offset(level, &style, x, y),
                        _ => collector.collect_fill_style(level, &style),
                    }
                } else {
                    self.shape.fill_style.override_with(&style);
                }
            },
            chunk::TEXT_BLOCK => {
                let style: OptionalTextBlockStyle = read_partial(body, ty, readers::read_text_block);
                if self.in_styles {
                    collector.collect_text_block_style(level, &style);
                } else {
                    self.shape.text_block_style.override_with(&style);
                }
            },
            chunk::CHAR_IX => {
                let run: TextRunPatch<OptionalCharStyle> = read_partial(body, ty, readers::read_char_ix);
                if self.in_styles {
                    collector.collect_char_ix_style(id, level, run.char_count.unwrap_or(0), &run.style);
                } else {
                    self.shape.char_list.add(id, level, run);
                }
            },
            chunk::PARA_IX => {
                let run: TextRunPatch<OptionalParaStyle> = read_partial(body, ty, readers::read_para_ix);
                if self.in_styles {
                    collector.collect_para_ix_style(id, level, run.char_count.unwrap_or(0), &run.style);
                } else {
                    self.shape.para_list.add(id, level, run);
                }
            },
            chunk::CHAR_LIST | chunk::PARA_LIST if self.in_styles => {},
            chunk::CHAR_LIST => {
                if let Some(order) = read_complete(body, ty, readers::read_list_order) {
                    self.shape.char_list.set_order(order);
                }
            },
            chunk::PARA_LIST => {
                if let Some(order) = read_complete(body, ty, readers::read_list_order) {
                    self.shape.para_list.set_order(order);
                }
            },
            chunk::TEXT => {
                if let Some(bytes) = read_complete(body, ty, readers::read_text) {
                    self.shape.text = Text::new(bytes, TextEncoding::Utf16Le);
                }
            },
            chunk::FIELD_LIST => {
                self.shape.fields.set_header(id, level);
                if let Some(order) = read_complete(body, ty, readers::read_list_order) {
                    self.shape.fields.set_order(order);
                }
            },
            chunk::TEXT_FIELD => {
                if let Some(patch) = read_complete(body, ty, readers::read_text_field) {
                    self.shape.fields.add(id, level, patch);
                }
            },
            chunk::GEOM_LIST => {
                let index = self.open_geometry_list();
                let list = self.shape.geometries.entry(index).or_default();
                match read_complete(body, ty, readers::read_list_order) {
                    Some(order) if !order.is_empty() => list.set_order(order),
                    _ => {},
                }
            },
            chunk::GEOMETRY => {
                if let Some(patch) = read_complete(body, ty, readers::read_geometry) {
                    self.current_geometry_list().add(id, level, patch.into());
                }
            },
            chunk::MOVE_TO => {
                let row: MoveToPatch = read_partial(body, ty, readers::read_move_to);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::LINE_TO => {
                let row: LineToPatch = read_partial(body, ty, readers::read_line_to);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::ARC_TO => {
                let row: ArcToPatch = read_partial(body, ty, readers::read_arc_to);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::INFINITE_LINE => {
                let row: InfiniteLinePatch = read_partial(body, ty, readers::read_infinite_line);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::ELLIPSE => {
                let row: EllipsePatch = read_partial(body, ty, readers::read_ellipse);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::ELLIPTICAL_ARC_TO => {
                let row: EllipticalArcToPatch = read_partial(body, ty, readers::read_elliptical_arc_to);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::SPLINE_START => {
                let row: SplineStartPatch = read_partial(body, ty, readers::read_spline_start);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::SPLINE_KNOT => {
                let row: SplineKnotPatch = read_partial(body, ty, readers::read_spline_knot);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::POLYLINE_TO => {
                let row: PolylineToPatch = read_partial(body, ty, readers::read_polyline_to);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::NURBS_TO => {
                let row: NurbsToPatch = read_partial(body, ty, readers::read_nurbs_to);
                self.current_geometry_list().add(id, level, row.into());
            },
            chunk::SHAPE_DATA => match read_complete(body, ty, readers::read_shape_data) {
                Some(Some(ShapeDataRecord::Polyline(data))) => {
                    self.shape.shape_data.polylines.insert(id, data);
                },
                Some(Some(ShapeDataRecord::Nurbs(data))) => {
                    self.shape.shape_data.nurbs.insert(id, data);
                },
                _ => {},
            },
            chunk::FOREIGN_DATA_TYPE => {
                let foreign = self.shape.foreign.get_or_insert_with(Default::default);
                read_into(body, ty, &mut foreign.kind, readers::read_foreign_data_type);
            },
            chunk::FOREIGN_DATA => {
                let foreign = self.shape.foreign.get_or_insert_with(Default::default);
                foreign.data_id = id;
                foreign.data = body.to_vec();
            },
            chunk::OLE_LIST => collector.collect_ole_list(id, level),
            chunk::OLE_DATA => {
                let foreign = self.shape.foreign.get_or_insert_with(Default::default);
                foreign.data.extend_from_slice(body);
                collector.collect_ole_data(id, level, body);
            },
            chunk::PAGE => {
                let background = read_complete(body, ty, readers::read_page).unwrap_or(MINUS_ONE);
                collector.collect_page(id, level, background, self.is_background_page);
            },
            chunk::PAGE_PROPS => {
                let props: PageProps = read_partial(body, ty, readers::read_page_props);
                match self.current_stencil.as_mut() {
                    Some(stencil) if self.stencil_started => {
                        stencil.shadow_offset_x = props.shadow_offset_x;
                        stencil.shadow_offset_y = props.shadow_offset_y;
                    },
                    _ => collector.collect_page_props(id, level, &props),
                }
            },
            chunk::STYLE_SHEET => {
                if let Some((line, fill, text)) = read_complete(body, ty, readers::read_style_sheet) {
                    collector.collect_style_sheet(id, level, line, fill, text);
                }
            },
            chunk::LAYER_LIST => {},
            chunk::LAYER => {
                let layer: Layer = read_partial(body, ty, readers::read_layer);
                self.layers.add_layer(id, layer);
                collector.collect_layer(id, level, &layer);
            },
            chunk::LAYER_MEMBERSHIP => {
                if let Some(ids) = read_complete(body, ty, readers::read_layer_membership) {
                    self.shape.layer_membership = ids;
                }
            },
            chunk::NAME_LIST | chunk::NAME_LIST2 => collector.collect_name_list(id, level),
            chunk::NAME => {
                let name = Text::new(body.to_vec(), TextEncoding::Utf16Le);
                collector.collect_name(id, level, &name);
                self.names.insert(id, name);
            },
            chunk::NAME2 => {
                let name = Text::new(body.to_vec(), TextEncoding::Utf16Le);
                collector.collect_name(id, level, &name);
            },
            _ => {
                log::debug!("unhandled chunk 0x{:x} id={} level={}", ty, id, level);
                collector.collect_unhandled_chunk(id, level);
            },
        }
    }

    fn read_shape(&mut self, header: &ChunkHeader, level: u32, body: &[u8], collector: &mut dyn Collector) {
        self.open_shape_scope(level, collector);
        self.shape.clear();
        self.current_geometry = None;
        self.geometry_count = 0;

        let record: readers::ShapeRecord = read_partial(body, header.chunk_type, readers::read_shape);
        let shape = &mut self.shape;
        // Blob shapes carry their pointer index as header id already
        shape.shape_id = if header.id != MINUS_ONE {
            header.id
        } else {
            self.current_shape_id
        };
        shape.parent = record.parent;
        shape.master_page = record.master_page;
        shape.master_shape = record.master_shape;
        shape.line_style_id = record.line_style;
        shape.fill_style_id = record.fill_style;
        shape.text_style_id = record.text_style;

        match self
            .stencils
            .get_stencil_shape(record.master_page, record.master_shape)
        {
            Some(master) => shape.inherit_from(master),
            None if record.master_page != MINUS_ONE => {
                log::debug!(
                    "shape {} names missing master {}/{}",
                    shape.shape_id,
                    record.master_page,
                    record.master_shape
                );
            },
            None => {},
        }
        self.shape_started = true;
    }

    // Shape output

    fn flush_shape(&mut self, level: u32, collector: &mut dyn Collector) {
        if self.shape_started {
            if self.stencil_started {
                if let Some(stencil) = self.current_stencil.as_mut() {
                    let shape = std::mem::take(&mut self.shape);
                    stencil.add_stencil_shape(shape.shape_id, shape);
                }
            } else if self.pass == Pass::Content {
                self.emit_shape(level, collector);
            }
        }
        self.shape.clear();
        self.shape_started = false;
        self.current_geometry = None;
        self.geometry_count = 0;
    }

    fn emit_shape(&self, level: u32, collector: &mut dyn Collector) {
        let shape = &self.shape;
        let styles = &self.styles;
        let attribute_level = level + 2;

        collector.collect_shape(
            shape.shape_id,
            level,
            shape.parent,
            shape.master_page,
            shape.master_shape,
            shape.line_style_id,
            shape.fill_style_id,
            shape.text_style_id,
        );

        let order = shapes_order(&shape.shape_list);
        if !order.is_empty() {
            collector.collect_shapes_order(0, attribute_level, &order);
        }
        collector.collect_xform_data(attribute_level, &shape.xform);
        if let Some(txt_xform) = &shape.txt_xform {
            collector.collect_txt_xform(attribute_level, txt_xform);
        }

        let mut line = styles.optional_line_style(shape.line_style_id);
        line.override_with(&shape.line_style);
        let mut line = LineStyle::resolved_from(&line);
        if let Some(colour) = self.layers.get_colour(&shape.layer_membership) {
            line.colour = colour;
        }
        collector.collect_line(attribute_level, &line);

        let mut optional_fill = styles.optional_fill_style(shape.fill_style_id);
        optional_fill.override_with(&shape.fill_style);
        let fill = FillStyle::resolved_from(&optional_fill);
        let has_own_offset = optional_fill.shadow_offset_x.is_some() || optional_fill.shadow_offset_y.is_some();
        match self.stencils.get_stencil(shape.master_page) {
            Some(stencil) if !has_own_offset => collector.collect_fill_and_shadow_with_offset(
                attribute_level,
                &fill,
                stencil.shadow_offset_x,
                stencil.shadow_offset_y,
            ),
            _ => collector.collect_fill_and_shadow(attribute_level, &fill),
        }

        let mut text_block = styles.optional_text_block_style(shape.text_style_id);
        text_block.override_with(&shape.text_block_style);
        collector.collect_text_block(attribute_level, &TextBlockStyle::resolved_from(&text_block));

        if let Some(foreign) = &shape.foreign {
            collector.collect_foreign_data_type(attribute_level, &foreign.kind);
            collector.collect_foreign_data(attribute_level, &foreign.data);
        }

        shape.fields.handle(&self.names, collector);
        if !shape.text.is_empty() {
            collector.collect_text(attribute_level, &shape.text);
        }

        let default_char: CharStyle = styles.char_style(shape.text_style_id);
        collector.collect_default_char_style(&default_char);
        for (id, entry) in shape.char_list.iter() {
            let mut style = default_char;
            style.apply(&entry.element.style);
            collector.collect_char_ix(id, entry.level, entry.element.char_count, &style);
        }

        let default_para: ParaStyle = styles.para_style(shape.text_style_id);
        collector.collect_default_para_style(&default_para);
        for (id, entry) in shape.para_list.iter() {
            let mut style = default_para;
            style.apply(&entry.element.style);
            collector.collect_para_ix(id, entry.level, entry.element.char_count, &style);
        }

        if !shape.layer_membership.is_empty() {
            collector.collect_layer_membership(attribute_level, &shape.layer_membership);
            collector.collect_layer_attributes(
                attribute_level,
                self.layers.get_visible(&shape.layer_membership),
                self.layers.get_printable(&shape.layer_membership),
            );
        }

        for geometry in shape.geometries.values() {
            geometry.handle(&shape.shape_data, collector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(ptr_type: u32, offset: u32, length: u32, format: u16) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&ptr_type.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes.extend_from_slice(&format.to_le_bytes());
        bytes
    }

    fn document_with_trailer(trailer: Vec<u8>) -> Vec<u8> {
        let mut document = vec![0u8; 0x24];
        let trailer_offset = 0x24 + 18;
        document.extend(pointer(
            chunk::TRAILER_STREAM,
            trailer_offset,
            trailer.len() as u32,
            0,
        ));
        document.extend(trailer);
        document
    }

    #[derive(Default)]
    struct Events(Vec<String>);

    impl Collector for Events {
        fn start_page(&mut self, page_id: u32) {
            self.0.push(format!("page {page_id}"));
        }
        fn end_page(&mut self) {
            self.0.push("end-page".to_string());
        }
    }

    #[test]
    fn test_rejects_foreign_trailer_pointer() {
        let mut document = vec![0u8; 0x24];
        document.extend(pointer(chunk::PAGE, 0, 0, 0));
        let mut parser = VsdParser::new(&document, ParserOptions::default());
        let mut events = Events::default();
        assert!(matches!(
            parser.parse(&mut events),
            Err(VsdError::UnsupportedPointer(ty)) if ty == chunk::PAGE
        ));
    }

    #[test]
    fn test_trailer_out_of_range() {
        let mut document = vec![0u8; 0x24];
        document.extend(pointer(chunk::TRAILER_STREAM, 0x30, 0x1000, 0));
        let mut parser = VsdParser::new(&document, ParserOptions::default());
        assert!(matches!(
            parser.parse(&mut Events::default()),
            Err(VsdError::ExtentOverflow { .. })
        ));
    }

    #[test]
    fn test_empty_pointer_list() {
        // offset field 4 puts the info block right after it
        let mut trailer = Vec::new();
        trailer.extend_from_slice(&8u32.to_le_bytes());
        trailer.extend_from_slice(&0u32.to_le_bytes());
        trailer.extend_from_slice(&0u32.to_le_bytes());
        trailer.extend_from_slice(&0u32.to_le_bytes());
        let document = document_with_trailer(trailer);
        let mut parser = VsdParser::new(&document, ParserOptions::default());
        let mut events = Events::default();
        parser.parse(&mut events).unwrap();
        assert!(events.0.is_empty());
    }

    #[test]
    fn test_each_mode_walks_stencils_once() {
        let document = document_with_trailer(Vec::new());
        let mut parser = VsdParser::new(&document, ParserOptions::default());
        let mut walks = Vec::new();
        for mode in [ParseMode::Document, ParseMode::Stencils] {
            parser.mode = mode;
            for pass in [Pass::Styles, Pass::Content] {
                parser.pass = pass;
                if !parser.skips_stencils() {
                    walks.push((mode, pass));
                }
            }
        }
        assert_eq!(
            walks,
            vec![(ParseMode::Document, Pass::Styles), (ParseMode::Stencils, Pass::Content)]
        );
    }

    #[test]
    fn test_self_referencing_list_hits_depth_bound() {
        // trailer holds one blob-with-pointers entry pointing back at itself
        let trailer_offset = 0x24 + 18;
        let mut trailer = Vec::new();
        trailer.extend_from_slice(&8u32.to_le_bytes());
        trailer.extend_from_slice(&0u32.to_le_bytes());
        trailer.extend_from_slice(&1u32.to_le_bytes());
        trailer.extend_from_slice(&0u32.to_le_bytes());
        let length = (trailer.len() + 18) as u32;
        trailer.extend(pointer(0x17, trailer_offset, length, 0x50));
        let document = document_with_trailer(trailer);

        let mut parser = VsdParser::new(&document, ParserOptions::default());
        // the visited set stops the loop before the depth bound
        assert!(parser.parse(&mut Events::default()).is_ok());

        let mut parser = VsdParser::new(&document, ParserOptions::new().with_max_stream_depth(1));
        assert!(matches!(
            parser.parse(&mut Events::default()),
            Err(VsdError::RecursionLimit(1))
        ));
    }
}
