//! Chunk body readers.
//!
//! Each reader decodes one chunk body from a stream positioned at its first
//! byte. Readers that fill a record in place leave every field they did not
//! reach untouched, so a truncated body yields a partially populated record.

use crate::common::binary::{BinaryError, BinaryResult, decode_utf16le};
use crate::ole::vsd::collector::PageProps;
use crate::ole::vsd::consts::{
    LAYER_NO_COLOUR, MINUS_ONE, SHAPE_DATA_NURBS, SHAPE_DATA_POLYLINE, TEXT_FIELD_CODE,
};
use crate::ole::vsd::fields::{FieldFormat, FieldPatch};
use crate::ole::vsd::geometry::{
    ArcToPatch, EllipsePatch, EllipticalArcToPatch, GeometryFlags, GeometryHeaderPatch,
    InfiniteLinePatch, LineToPatch, MoveToPatch, NurbsData, NurbsToPatch, PolylineData,
    PolylineToPatch, SplineKnotPatch, SplineStartPatch,
};
use crate::ole::vsd::layers::{Layer, LayerMembership, parse_membership};
use crate::ole::vsd::shape::{ForeignDataType, XForm};
use crate::ole::vsd::stream::InternalStream;
use crate::ole::vsd::styles::{
    OptionalCharStyle, OptionalFillStyle, OptionalLineStyle, OptionalParaStyle,
    OptionalTextBlockStyle,
};
use crate::ole::vsd::text::{
    FontCaseBits, FontPositionBits, FontStrikeBits, FontStyleBits, TextRunPatch,
};

/// References carried by a shape record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRecord {
    pub parent: u32,
    pub master_page: u32,
    pub master_shape: u32,
    pub fill_style: u32,
    pub line_style: u32,
    pub text_style: u32,
}

impl Default for ShapeRecord {
    fn default() -> Self {
        Self {
            parent: 0,
            master_page: MINUS_ONE,
            master_shape: MINUS_ONE,
            fill_style: MINUS_ONE,
            line_style: MINUS_ONE,
            text_style: MINUS_ONE,
        }
    }
}

pub fn read_shape(s: &mut InternalStream, record: &mut ShapeRecord) -> BinaryResult<()> {
    s.skip(10)?;
    record.parent = s.read_u32()?;
    s.skip(4)?;
    record.master_page = s.read_u32()?;
    s.skip(4)?;
    record.master_shape = s.read_u32()?;
    s.skip(4)?;
    record.fill_style = s.read_u32()?;
    s.skip(4)?;
    record.line_style = s.read_u32()?;
    s.skip(4)?;
    record.text_style = s.read_u32()?;
    Ok(())
}

pub fn read_xform(s: &mut InternalStream, xform: &mut XForm) -> BinaryResult<()> {
    xform.pin_x = s.read_cell()?;
    xform.pin_y = s.read_cell()?;
    xform.width = s.read_cell()?;
    xform.height = s.read_cell()?;
    xform.pin_loc_x = s.read_cell()?;
    xform.pin_loc_y = s.read_cell()?;
    xform.angle = s.read_cell()?;
    xform.flip_x = s.read_u8()? != 0;
    xform.flip_y = s.read_u8()? != 0;
    Ok(())
}

pub fn read_line(s: &mut InternalStream, line: &mut OptionalLineStyle) -> BinaryResult<()> {
    line.width = Some(s.read_cell()?);
    s.skip(1)?;
    line.colour = Some(s.read_color()?);
    line.pattern = Some(s.read_u8()?);
    s.skip(10)?;
    line.rounding = Some(s.read_f64()?);
    s.skip(8)?;
    line.start_marker = Some(s.read_u8()?);
    line.end_marker = Some(s.read_u8()?);
    line.cap = Some(s.read_u8()?);
    Ok(())
}

pub fn read_fill_and_shadow(s: &mut InternalStream, fill: &mut OptionalFillStyle) -> BinaryResult<()> {
    s.skip(1)?;
    fill.fg_colour = Some(s.read_color()?);
    s.skip(1)?;
    fill.bg_colour = Some(s.read_color()?);
    fill.pattern = Some(s.read_u8()?);
    s.skip(1)?;
    fill.shadow_fg_colour = Some(s.read_color()?);
    s.skip(1)?;
    fill.shadow_bg_colour = Some(s.read_color()?);
    fill.shadow_pattern = Some(s.read_u8()?);
    s.skip(2)?;
    fill.shadow_offset_x = Some(s.read_cell()?);
    fill.shadow_offset_y = Some(-s.read_cell()?);
    Ok(())
}

pub fn read_text_block(s: &mut InternalStream, block: &mut OptionalTextBlockStyle) -> BinaryResult<()> {
    block.left_margin = Some(s.read_cell()?);
    block.right_margin = Some(s.read_cell()?);
    block.top_margin = Some(s.read_cell()?);
    block.bottom_margin = Some(s.read_cell()?);
    block.vertical_align = Some(s.read_u8()?);
    block.bg_filled = Some(s.read_u8()? != 0);
    block.bg_colour = Some(s.read_color()?);
    block.default_tab_stop = Some(s.read_cell()?);
    s.skip(12)?;
    block.text_direction = Some(s.read_u8()?);
    Ok(())
}

pub fn read_char_ix(
    s: &mut InternalStream,
    run: &mut TextRunPatch<OptionalCharStyle>,
) -> BinaryResult<()> {
    run.char_count = Some(s.read_u32()?);
    let style = &mut run.style;
    style.font_id = Some(s.read_u16()?);
    s.skip(1)?;
    style.colour = Some(s.read_color()?);

    let bits = FontStyleBits::from_bits_truncate(s.read_u8()?);
    style.bold = Some(bits.contains(FontStyleBits::BOLD));
    style.italic = Some(bits.contains(FontStyleBits::ITALIC));
    style.underline = Some(bits.contains(FontStyleBits::UNDERLINE));
    style.smallcaps = Some(bits.contains(FontStyleBits::SMALLCAPS));

    let bits = FontCaseBits::from_bits_truncate(s.read_u8()?);
    style.allcaps = Some(bits.contains(FontCaseBits::ALLCAPS));
    style.initcaps = Some(bits.contains(FontCaseBits::INITCAPS));

    let bits = FontPositionBits::from_bits_truncate(s.read_u8()?);
    style.superscript = Some(bits.contains(FontPositionBits::SUPERSCRIPT));
    style.subscript = Some(bits.contains(FontPositionBits::SUBSCRIPT));

    s.skip(4)?;
    style.size = Some(s.read_f64()?);

    let bits = FontStrikeBits::from_bits_truncate(s.read_u8()?);
    style.double_underline = Some(bits.contains(FontStrikeBits::DOUBLE_UNDERLINE));
    style.strikeout = Some(bits.contains(FontStrikeBits::STRIKEOUT));
    style.double_strikeout = Some(bits.contains(FontStrikeBits::DOUBLE_STRIKEOUT));
    Ok(())
}

pub fn read_para_ix(
    s: &mut InternalStream,
    run: &mut TextRunPatch<OptionalParaStyle>,
) -> BinaryResult<()> {
    run.char_count = Some(s.read_u32()?);
    let style = &mut run.style;
    style.indent_first = Some(s.read_cell()?);
    style.indent_left = Some(s.read_cell()?);
    style.indent_right = Some(s.read_cell()?);
    style.spacing_line = Some(s.read_cell()?);
    style.spacing_before = Some(s.read_cell()?);
    style.spacing_after = Some(s.read_cell()?);
    style.align = Some(s.read_u8()?);
    s.skip(26)?;
    style.flags = Some(s.read_u32()?);
    Ok(())
}

/// Child order of a list chunk (geometry, shape, field, char and para lists).
pub fn read_list_order(s: &mut InternalStream) -> BinaryResult<Vec<u32>> {
    let sub_header_length = s.read_u32()? as usize;
    let children_length = s.read_u32()? as usize;
    s.skip(sub_header_length)?;
    let count = children_length / 4;
    if count > s.remaining() / 4 {
        return Err(BinaryError::InsufficientData {
            expected: s.tell() + children_length,
            available: s.len(),
        });
    }
    (0..count).map(|_| s.read_u32()).collect()
}

pub fn read_geometry(s: &mut InternalStream) -> BinaryResult<GeometryHeaderPatch> {
    let flags = GeometryFlags::from_bits_truncate(s.read_u8()?);
    Ok(GeometryHeaderPatch::from_flags(flags))
}

pub fn read_move_to(s: &mut InternalStream, row: &mut MoveToPatch) -> BinaryResult<()> {
    row.x = Some(s.read_cell()?);
    row.y = Some(s.read_cell()?);
    Ok(())
}

pub fn read_line_to(s: &mut InternalStream, row: &mut LineToPatch) -> BinaryResult<()> {
    row.x = Some(s.read_cell()?);
    row.y = Some(s.read_cell()?);
    Ok(())
}

pub fn read_arc_to(s: &mut InternalStream, row: &mut ArcToPatch) -> BinaryResult<()> {
    row.x2 = Some(s.read_cell()?);
    row.y2 = Some(s.read_cell()?);
    row.bow = Some(s.read_cell()?);
    Ok(())
}

pub fn read_infinite_line(s: &mut InternalStream, row: &mut InfiniteLinePatch) -> BinaryResult<()> {
    row.x1 = Some(s.read_cell()?);
    row.y1 = Some(s.read_cell()?);
    row.x2 = Some(s.read_cell()?);
    row.y2 = Some(s.read_cell()?);
    Ok(())
}

pub fn read_ellipse(s: &mut InternalStream, row: &mut EllipsePatch) -> BinaryResult<()> {
    row.cx = Some(s.read_cell()?);
    row.cy = Some(s.read_cell()?);
    row.xleft = Some(s.read_cell()?);
    row.yleft = Some(s.read_cell()?);
    row.xtop = Some(s.read_cell()?);
    row.ytop = Some(s.read_cell()?);
    Ok(())
}

pub fn read_elliptical_arc_to(s: &mut InternalStream, row: &mut EllipticalArcToPatch) -> BinaryResult<()> {
    row.x3 = Some(s.read_cell()?);
    row.y3 = Some(s.read_cell()?);
    row.x2 = Some(s.read_cell()?);
    row.y2 = Some(s.read_cell()?);
    row.angle = Some(s.read_cell()?);
    row.ecc = Some(s.read_cell()?);
    Ok(())
}

pub fn read_spline_start(s: &mut InternalStream, row: &mut SplineStartPatch) -> BinaryResult<()> {
    row.x = Some(s.read_cell()?);
    row.y = Some(s.read_cell()?);
    row.second_knot = Some(s.read_cell()?);
    row.first_knot = Some(s.read_cell()?);
    row.last_knot = Some(s.read_cell()?);
    row.degree = Some(s.read_u32()?);
    Ok(())
}

pub fn read_spline_knot(s: &mut InternalStream, row: &mut SplineKnotPatch) -> BinaryResult<()> {
    row.x = Some(s.read_cell()?);
    row.y = Some(s.read_cell()?);
    row.knot = Some(s.read_cell()?);
    Ok(())
}

pub fn read_polyline_to(s: &mut InternalStream, row: &mut PolylineToPatch) -> BinaryResult<()> {
    row.x = Some(s.read_cell()?);
    row.y = Some(s.read_cell()?);
    row.data_id = Some(s.read_u32()?);
    Ok(())
}

pub fn read_nurbs_to(s: &mut InternalStream, row: &mut NurbsToPatch) -> BinaryResult<()> {
    row.x2 = Some(s.read_cell()?);
    row.y2 = Some(s.read_cell()?);
    row.knot = Some(s.read_cell()?);
    row.knot_prev = Some(s.read_cell()?);
    row.weight = Some(s.read_cell()?);
    row.weight_prev = Some(s.read_cell()?);
    row.data_id = Some(s.read_u32()?);
    Ok(())
}

/// Payload of a shape-data chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDataRecord {
    Polyline(PolylineData),
    Nurbs(NurbsData),
}

fn check_points(s: &InternalStream, count: usize, point_size: usize) -> BinaryResult<()> {
    if count > s.remaining() / point_size {
        return Err(BinaryError::InsufficientData {
            expected: s.tell().saturating_add(count.saturating_mul(point_size)),
            available: s.len(),
        });
    }
    Ok(())
}

/// Read a polyline or NURBS payload. Unknown payload kinds yield `None`.
pub fn read_shape_data(s: &mut InternalStream) -> BinaryResult<Option<ShapeDataRecord>> {
    let data_type = s.read_u8()?;
    s.skip(15)?;
    match data_type {
        SHAPE_DATA_POLYLINE => {
            let x_type = s.read_u8()?;
            let y_type = s.read_u8()?;
            let count = s.read_u32()? as usize;
            check_points(s, count, 16)?;
            let mut points = Vec::with_capacity(count);
            for _ in 0..count {
                let x = s.read_f64()?;
                let y = s.read_f64()?;
                points.push((x, y));
            }
            Ok(Some(ShapeDataRecord::Polyline(PolylineData {
                x_type,
                y_type,
                points,
            })))
        },
        SHAPE_DATA_NURBS => {
            let last_knot = s.read_f64()?;
            let degree = s.read_u16()? as u32;
            let x_type = s.read_u8()?;
            let y_type = s.read_u8()?;
            let count = s.read_u32()? as usize;
            check_points(s, count, 32)?;
            let mut data = NurbsData {
                last_knot,
                degree,
                x_type,
                y_type,
                knots: Vec::with_capacity(count),
                weights: Vec::with_capacity(count),
                points: Vec::with_capacity(count),
            };
            for _ in 0..count {
                data.knots.push(s.read_f64()?);
                let x = s.read_f64()?;
                let y = s.read_f64()?;
                data.points.push((x, y));
                data.weights.push(s.read_f64()?);
            }
            Ok(Some(ShapeDataRecord::Nurbs(data)))
        },
        _ => Ok(None),
    }
}

pub fn read_text_field(s: &mut InternalStream) -> BinaryResult<FieldPatch> {
    s.skip(7)?;
    let code = s.read_u8()?;
    if code == TEXT_FIELD_CODE {
        let name_id = s.read_i32()?;
        s.skip(6)?;
        let format_string_id = s.read_i32()?;
        Ok(FieldPatch::Text {
            name_id: Some(name_id),
            format_string_id: Some(format_string_id),
        })
    } else {
        let value = s.read_f64()?;
        s.skip(2)?;
        let format_string_id = s.read_i32()?;
        let format = FieldFormat::from_code(s.read_u16()?);
        Ok(FieldPatch::Numeric {
            value: Some(value),
            format: Some(format),
            format_string_id: Some(format_string_id),
        })
    }
}

pub fn read_foreign_data_type(s: &mut InternalStream, kind: &mut ForeignDataType) -> BinaryResult<()> {
    s.skip(0x24)?;
    kind.offset_x = s.read_cell()?;
    kind.offset_y = s.read_cell()?;
    kind.width = s.read_cell()?;
    kind.height = s.read_cell()?;
    kind.foreign_type = s.read_u16()?;
    kind.map_mode = s.read_u16()?;
    s.skip(9)?;
    kind.format = s.read_u16()?;
    Ok(())
}

/// Background page id of a page record.
pub fn read_page(s: &mut InternalStream) -> BinaryResult<u32> {
    s.skip(8)?;
    s.read_u32()
}

pub fn read_page_props(s: &mut InternalStream, props: &mut PageProps) -> BinaryResult<()> {
    props.width = s.read_cell()?;
    props.height = s.read_cell()?;
    props.shadow_offset_x = s.read_cell()?;
    props.shadow_offset_y = -s.read_cell()?;
    props.page_scale = s.read_cell()?;
    props.drawing_scale = s.read_cell()?;
    Ok(())
}

/// Line, fill and text master ids of a style sheet.
pub fn read_style_sheet(s: &mut InternalStream) -> BinaryResult<(u32, u32, u32)> {
    s.skip(10)?;
    let line = s.read_u32()?;
    let fill = s.read_u32()?;
    let text = s.read_u32()?;
    Ok((line, fill, text))
}

pub fn read_layer(s: &mut InternalStream, layer: &mut Layer) -> BinaryResult<()> {
    s.skip(8)?;
    let colour_index = s.read_u8()?;
    let colour = s.read_color()?;
    layer.colour = (colour_index != LAYER_NO_COLOUR).then_some(colour);
    s.skip(1)?;
    layer.visible = s.read_u8()? != 0;
    s.skip(1)?;
    layer.printable = s.read_u8()? != 0;
    Ok(())
}

pub fn read_layer_membership(s: &mut InternalStream) -> BinaryResult<LayerMembership> {
    s.skip(1)?;
    let end = s.len();
    let text = decode_utf16le(s.read_to(end));
    Ok(parse_membership(&text))
}

/// Raw UTF-16LE text of a text chunk.
pub fn read_text(s: &mut InternalStream) -> BinaryResult<Vec<u8>> {
    s.skip(8)?;
    let end = s.len();
    Ok(s.read_to(end).to_vec())
}
