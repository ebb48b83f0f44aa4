//! Event sink driven by the decoder.
//!
//! The decoder never hands out its shape records. It replays everything it
//! assembles as a stream of calls on a [`Collector`]; renderers and dumpers
//! implement the calls they care about and ignore the rest. Every method has
//! an empty default body.

#![allow(unused_variables, clippy::too_many_arguments)]

use super::fields::FieldFormat;
use super::geometry::{NurbsData, PolylineData};
use super::layers::Layer;
use super::shape::{ForeignDataType, XForm};
use super::styles::{
    CharStyle, FillStyle, LineStyle, OptionalCharStyle, OptionalFillStyle, OptionalLineStyle,
    OptionalParaStyle, OptionalTextBlockStyle, ParaStyle, TextBlockStyle,
};
use super::text::Text;

/// Page dimensions and scales
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageProps {
    pub width: f64,
    pub height: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    pub page_scale: f64,
    pub drawing_scale: f64,
}

impl Default for PageProps {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            page_scale: 1.0,
            drawing_scale: 1.0,
        }
    }
}

/// Receiver of decoded drawing content.
pub trait Collector {
    // Shapes

    fn collect_shape(
        &mut self,
        id: u32,
        level: u32,
        parent: u32,
        master_page: u32,
        master_shape: u32,
        line_style: u32,
        fill_style: u32,
        text_style: u32,
    ) {
    }
    fn collect_xform_data(&mut self, level: u32, xform: &XForm) {}
    fn collect_txt_xform(&mut self, level: u32, xform: &XForm) {}
    fn collect_shapes_order(&mut self, id: u32, level: u32, shape_ids: &[u32]) {}
    fn collect_layer_membership(&mut self, level: u32, layer_ids: &[u32]) {}
    /// Visibility and printability resolved from the shape's layers
    fn collect_layer_attributes(&mut self, level: u32, visible: bool, printable: bool) {}

    // Geometry

    fn collect_geometry(&mut self, id: u32, level: u32, no_fill: bool, no_line: bool, no_show: bool) {}
    fn collect_move_to(&mut self, id: u32, level: u32, x: f64, y: f64) {}
    fn collect_line_to(&mut self, id: u32, level: u32, x: f64, y: f64) {}
    fn collect_arc_to(&mut self, id: u32, level: u32, x2: f64, y2: f64, bow: f64) {}
    fn collect_elliptical_arc_to(
        &mut self,
        id: u32,
        level: u32,
        x3: f64,
        y3: f64,
        x2: f64,
        y2: f64,
        angle: f64,
        ecc: f64,
    ) {
    }
    fn collect_ellipse(
        &mut self,
        id: u32,
        level: u32,
        cx: f64,
        cy: f64,
        xleft: f64,
        yleft: f64,
        xtop: f64,
        ytop: f64,
    ) {
    }
    fn collect_infinite_line(&mut self, id: u32, level: u32, x1: f64, y1: f64, x2: f64, y2: f64) {}
    fn collect_spline_start(
        &mut self,
        id: u32,
        level: u32,
        x: f64,
        y: f64,
        second_knot: f64,
        first_knot: f64,
        last_knot: f64,
        degree: u32,
    ) {
    }
    fn collect_spline_knot(&mut self, id: u32, level: u32, x: f64, y: f64, knot: f64) {}
    fn collect_spline_end(&mut self) {}
    fn collect_polyline_to(&mut self, id: u32, level: u32, x: f64, y: f64, data: Option<&PolylineData>) {}
    fn collect_nurbs_to(
        &mut self,
        id: u32,
        level: u32,
        x2: f64,
        y2: f64,
        knot: f64,
        knot_prev: f64,
        weight: f64,
        weight_prev: f64,
        data: Option<&NurbsData>,
    ) {
    }
    fn collect_rel_move_to(&mut self, id: u32, level: u32, x: f64, y: f64) {}
    fn collect_rel_line_to(&mut self, id: u32, level: u32, x: f64, y: f64) {}
    fn collect_rel_cub_bez_to(
        &mut self,
        id: u32,
        level: u32,
        x: f64,
        y: f64,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) {
    }
    fn collect_rel_quad_bez_to(&mut self, id: u32, level: u32, x: f64, y: f64, a: f64, b: f64) {}
    fn collect_rel_elliptical_arc_to(
        &mut self,
        id: u32,
        level: u32,
        x: f64,
        y: f64,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) {
    }

    // Resolved shape attributes

    fn collect_line(&mut self, level: u32, line: &LineStyle) {}
    fn collect_fill_and_shadow(&mut self, level: u32, fill: &FillStyle) {}
    /// Fill whose shadow offsets come from the enclosing master page
    fn collect_fill_and_shadow_with_offset(
        &mut self,
        level: u32,
        fill: &FillStyle,
        shadow_offset_x: f64,
        shadow_offset_y: f64,
    ) {
    }
    fn collect_text_block(&mut self, level: u32, text_block: &TextBlockStyle) {}
    fn collect_default_char_style(&mut self, style: &CharStyle) {}
    fn collect_char_ix(&mut self, id: u32, level: u32, char_count: u32, style: &CharStyle) {}
    fn collect_default_para_style(&mut self, style: &ParaStyle) {}
    fn collect_para_ix(&mut self, id: u32, level: u32, char_count: u32, style: &ParaStyle) {}
    fn collect_text(&mut self, level: u32, text: &Text) {}

    // Embedded objects

    fn collect_foreign_data_type(&mut self, level: u32, data_type: &ForeignDataType) {}
    fn collect_foreign_data(&mut self, level: u32, data: &[u8]) {}
    fn collect_ole_list(&mut self, id: u32, level: u32) {}
    fn collect_ole_data(&mut self, id: u32, level: u32, data: &[u8]) {}

    // Pages

    fn start_page(&mut self, page_id: u32) {}
    fn end_page(&mut self) {}
    fn end_pages(&mut self) {}
    fn collect_page(&mut self, id: u32, level: u32, background_page_id: u32, is_background: bool) {}
    fn collect_page_props(&mut self, id: u32, level: u32, props: &PageProps) {}
    fn collect_page_sheet(&mut self, id: u32, level: u32) {}
    fn collect_layer(&mut self, id: u32, level: u32, layer: &Layer) {}

    // Style sheets

    fn collect_style_sheet(&mut self, id: u32, level: u32, line_master: u32, fill_master: u32, text_master: u32) {}
    fn collect_line_style(&mut self, level: u32, style: &OptionalLineStyle) {}
    fn collect_fill_style(&mut self, level: u32, style: &OptionalFillStyle) {}
    /// Fill style whose shadow offsets were given explicitly
    fn collect_fill_style_with_offset(
        &mut self,
        level: u32,
        style: &OptionalFillStyle,
        shadow_offset_x: f64,
        shadow_offset_y: f64,
    ) {
    }
    fn collect_text_block_style(&mut self, level: u32, style: &OptionalTextBlockStyle) {}
    fn collect_char_ix_style(&mut self, id: u32, level: u32, char_count: u32, style: &OptionalCharStyle) {}
    fn collect_para_ix_style(&mut self, id: u32, level: u32, char_count: u32, style: &OptionalParaStyle) {}

    // Fields and names

    fn collect_field_list(&mut self, id: u32, level: u32) {}
    /// `text` is the name the field refers to, if the name table has it
    fn collect_text_field(
        &mut self,
        id: u32,
        level: u32,
        name_id: i32,
        format_string_id: i32,
        text: Option<&str>,
    ) {
    }
    fn collect_numeric_field(
        &mut self,
        id: u32,
        level: u32,
        format: FieldFormat,
        value: f64,
        format_string_id: i32,
    ) {
    }
    fn collect_name_list(&mut self, id: u32, level: u32) {}
    fn collect_name(&mut self, id: u32, level: u32, name: &Text) {}

    /// Chunk types the decoder does not interpret
    fn collect_unhandled_chunk(&mut self, id: u32, level: u32) {}
}
