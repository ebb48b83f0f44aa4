//! Registry of master shapes.
//!
//! Each master page of the document becomes a [`Stencil`]. Shapes on regular
//! pages name a master by page index and shape id and inherit from it.

use super::consts::MINUS_ONE;
use super::shape::Shape;
use std::collections::BTreeMap;

/// Master shapes of one master page.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    shapes: BTreeMap<u32, Shape>,
    first_shape_id: u32,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
}

impl Default for Stencil {
    fn default() -> Self {
        Self {
            shapes: BTreeMap::new(),
            first_shape_id: MINUS_ONE,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
        }
    }
}

impl Stencil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a master shape; the first one stored becomes the fallback.
    pub fn add_stencil_shape(&mut self, id: u32, shape: Shape) {
        self.set_first_shape(id);
        self.shapes.insert(id, shape);
    }

    /// Record the fallback shape id. Only the first call has an effect.
    pub fn set_first_shape(&mut self, id: u32) {
        if self.first_shape_id == MINUS_ONE {
            self.first_shape_id = id;
        }
    }

    pub fn first_shape_id(&self) -> u32 {
        self.first_shape_id
    }

    /// Look up a shape, substituting the first shape for `MINUS_ONE`.
    pub fn get_stencil_shape(&self, id: u32) -> Option<&Shape> {
        let id = if id == MINUS_ONE {
            self.first_shape_id
        } else {
            id
        };
        self.shapes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> impl Iterator<Item = (&u32, &Shape)> {
        self.shapes.iter()
    }
}

/// All master pages of a document, keyed by page index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stencils {
    stencils: BTreeMap<u32, Stencil>,
}

impl Stencils {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stencil(&mut self, index: u32, stencil: Stencil) {
        self.stencils.insert(index, stencil);
    }

    pub fn get_stencil(&self, index: u32) -> Option<&Stencil> {
        self.stencils.get(&index)
    }

    /// Resolve a master reference. `MINUS_ONE` as page means no master.
    pub fn get_stencil_shape(&self, page_id: u32, shape_id: u32) -> Option<&Shape> {
        if page_id == MINUS_ONE {
            return None;
        }
        self.stencils.get(&page_id)?.get_stencil_shape(shape_id)
    }

    pub fn count(&self) -> usize {
        self.stencils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stencils.is_empty()
    }
}
