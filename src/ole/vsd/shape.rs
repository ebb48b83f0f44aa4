//! The shape record assembled from a run of chunks.

use super::consts::MINUS_ONE;
use super::fields::FieldList;
use super::geometry::{GeometryList, ShapeData};
use super::layers::LayerMembership;
use super::list::{PatchList, Patchable};
use super::styles::{OptionalFillStyle, OptionalLineStyle, OptionalStyle, OptionalTextBlockStyle};
use super::text::{CharList, ParaList, Text};
use std::collections::BTreeMap;

/// Placement of a shape or of its text block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XForm {
    pub pin_x: f64,
    pub pin_y: f64,
    pub width: f64,
    pub height: f64,
    pub pin_loc_x: f64,
    pub pin_loc_y: f64,
    /// Rotation in radians
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Type information of an embedded bitmap, metafile or OLE object.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForeignDataType {
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
    pub foreign_type: u16,
    pub map_mode: u16,
    pub format: u16,
}

/// Embedded object of a foreign shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignData {
    pub kind: ForeignDataType,
    pub data_id: u32,
    pub data: Vec<u8>,
}

/// Entry of a group's child order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeId(pub u32);

impl Patchable for ShapeId {
    type Patch = u32;

    fn from_patch(patch: u32) -> Self {
        ShapeId(patch)
    }

    fn merge(&mut self, patch: u32) -> Result<(), u32> {
        self.0 = patch;
        Ok(())
    }
}

/// Child shape ids of a group, in drawing order.
pub type ShapeIdList = PatchList<ShapeId>;

/// Child ids in visiting order.
pub fn shapes_order(list: &ShapeIdList) -> Vec<u32> {
    list.iter().map(|(_, entry)| entry.element.0).collect()
}

/// A shape being assembled, or stored as a master.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub shape_id: u32,
    pub parent: u32,
    pub master_page: u32,
    pub master_shape: u32,
    pub line_style_id: u32,
    pub fill_style_id: u32,
    pub text_style_id: u32,
    pub line_style: OptionalLineStyle,
    pub fill_style: OptionalFillStyle,
    pub text_block_style: OptionalTextBlockStyle,
    /// Geometry sections keyed by their ordinal within the shape
    pub geometries: BTreeMap<u32, GeometryList>,
    pub shape_data: ShapeData,
    pub fields: FieldList,
    pub char_list: CharList,
    pub para_list: ParaList,
    pub text: Text,
    pub foreign: Option<ForeignData>,
    pub xform: XForm,
    pub txt_xform: Option<XForm>,
    pub layer_membership: LayerMembership,
    pub shape_list: ShapeIdList,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            shape_id: MINUS_ONE,
            parent: 0,
            master_page: MINUS_ONE,
            master_shape: MINUS_ONE,
            line_style_id: MINUS_ONE,
            fill_style_id: MINUS_ONE,
            text_style_id: MINUS_ONE,
            line_style: OptionalLineStyle::default(),
            fill_style: OptionalFillStyle::default(),
            text_block_style: OptionalTextBlockStyle::default(),
            geometries: BTreeMap::new(),
            shape_data: ShapeData::default(),
            fields: FieldList::default(),
            char_list: CharList::default(),
            para_list: ParaList::default(),
            text: Text::default(),
            foreign: None,
            xform: XForm::default(),
            txt_xform: None,
            layer_membership: LayerMembership::new(),
            shape_list: ShapeIdList::default(),
        }
    }
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Seed this shape with the content of its master.
    ///
    /// Everything the master carries is copied; records read afterwards
    /// patch over it. Style ids the shape leaves unset fall back to the
    /// master's.
    pub fn inherit_from(&mut self, master: &Shape) {
        self.geometries = master.geometries.clone();
        self.shape_data.inherit(&master.shape_data);
        self.fields = master.fields.clone();
        self.char_list = master.char_list.clone();
        self.para_list = master.para_list.clone();
        self.text = master.text.clone();
        self.foreign = master.foreign.clone();
        self.xform = master.xform;
        self.txt_xform = master.txt_xform;

        let mut line_style = master.line_style;
        line_style.override_with(&self.line_style);
        self.line_style = line_style;
        let mut fill_style = master.fill_style;
        fill_style.override_with(&self.fill_style);
        self.fill_style = fill_style;
        let mut text_block_style = master.text_block_style;
        text_block_style.override_with(&self.text_block_style);
        self.text_block_style = text_block_style;

        if self.line_style_id == MINUS_ONE {
            self.line_style_id = master.line_style_id;
        }
        if self.fill_style_id == MINUS_ONE {
            self.fill_style_id = master.fill_style_id;
        }
        if self.text_style_id == MINUS_ONE {
            self.text_style_id = master.text_style_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::vsd::geometry::{GeometryElement, LineToPatch, MoveToPatch};

    #[test]
    fn test_new_shape_has_no_references() {
        let shape = Shape::new();
        assert_eq!(shape.shape_id, MINUS_ONE);
        assert_eq!(shape.master_page, MINUS_ONE);
        assert_eq!(shape.parent, 0);
        assert!(shape.geometries.is_empty());
    }

    #[test]
    fn test_inherit_then_patch_geometry() {
        let mut master = Shape::new();
        master.line_style_id = 4;
        master.line_style.width = Some(0.5);
        let geometry = master.geometries.entry(0).or_default();
        geometry.add(1, 2, MoveToPatch { x: Some(1.0), y: Some(1.0) }.into());
        geometry.add(2, 2, LineToPatch { x: Some(5.0), y: Some(1.0) }.into());

        let mut shape = Shape::new();
        shape.line_style.pattern = Some(2);
        shape.inherit_from(&master);
        shape
            .geometries
            .entry(0)
            .or_default()
            .add(2, 2, LineToPatch { x: None, y: Some(3.0) }.into());

        assert_eq!(shape.line_style_id, 4);
        assert_eq!(shape.line_style.width, Some(0.5));
        assert_eq!(shape.line_style.pattern, Some(2));
        let section = &shape.geometries[&0];
        assert_eq!(section.get(2), Some(&GeometryElement::LineTo { x: 5.0, y: 3.0 }));
        assert_eq!(section.get(1), Some(&GeometryElement::MoveTo { x: 1.0, y: 1.0 }));
        // master untouched
        assert_eq!(
            master.geometries[&0].get(2),
            Some(&GeometryElement::LineTo { x: 5.0, y: 1.0 })
        );
    }

    #[test]
    fn test_shapes_order() {
        let mut list = ShapeIdList::new();
        list.add(0, 1, 10);
        list.add(1, 1, 11);
        list.add(2, 1, 12);
        assert_eq!(shapes_order(&list), vec![10, 11, 12]);
        list.set_order(vec![2, 0]);
        assert_eq!(shapes_order(&list), vec![12, 10]);
    }
}
