//! Page layers and the attributes they impose on member shapes.

use crate::common::Color;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// A page layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Colour forced on member shapes, if the layer overrides it
    pub colour: Option<Color>,
    pub visible: bool,
    pub printable: bool,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            colour: None,
            visible: true,
            printable: true,
        }
    }
}

/// Layers of one page, keyed by layer id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerList {
    layers: BTreeMap<u32, Layer>,
}

impl LayerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, id: u32, layer: Layer) {
        self.layers.insert(id, layer);
    }

    pub fn get(&self, id: u32) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// A shape is visible unless every layer it belongs to is hidden.
    pub fn get_visible(&self, membership: &[u32]) -> bool {
        self.any_or_unconstrained(membership, |layer| layer.visible)
    }

    /// A shape prints unless every layer it belongs to is non-printing.
    pub fn get_printable(&self, membership: &[u32]) -> bool {
        self.any_or_unconstrained(membership, |layer| layer.printable)
    }

    fn any_or_unconstrained<F>(&self, membership: &[u32], flag: F) -> bool
    where
        F: Fn(&Layer) -> bool,
    {
        if membership.is_empty() {
            return true;
        }
        membership
            .iter()
            .any(|id| self.layers.get(id).is_none_or(&flag))
    }

    /// Colour the member layers force on a shape.
    ///
    /// Layers only override a shape's colour when every one of them is known,
    /// overrides colour, and agrees on the same value.
    pub fn get_colour(&self, membership: &[u32]) -> Option<Color> {
        let mut colour: Option<Color> = None;
        for id in membership {
            let layer_colour = self.layers.get(id)?.colour?;
            match colour {
                None => colour = Some(layer_colour),
                Some(existing) if existing != layer_colour => return None,
                Some(_) => {},
            }
        }
        colour
    }
}

/// Layer ids a shape belongs to. Shapes rarely sit on more than a few layers.
pub type LayerMembership = SmallVec<[u32; 4]>;

/// Parse a `;`-separated layer membership list.
pub fn parse_membership(text: &str) -> LayerMembership {
    text.split(';')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}
