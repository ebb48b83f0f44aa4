//! Keyed element lists with partial-update merge semantics.
//!
//! Geometry sections, character and paragraph runs, and field lists are all
//! stored as a map from element id to a tagged element plus an optional
//! explicit order. Re-adding an id of the same kind patches the fields the
//! new record carries; re-adding it with another kind replaces the entry.

use std::collections::BTreeMap;

/// An element that can be built from, or patched by, a partial record.
pub trait Patchable: Sized {
    /// A record where every field is optional.
    type Patch;

    /// Build a fresh element, filling absent fields with the kind's defaults.
    fn from_patch(patch: Self::Patch) -> Self;

    /// Overwrite the fields present in `patch`.
    ///
    /// Returns the patch unchanged when it describes a different kind of
    /// element, in which case the caller replaces the entry.
    fn merge(&mut self, patch: Self::Patch) -> Result<(), Self::Patch>;
}

/// A stored element and the nesting level it was first added at.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub level: u32,
    pub element: T,
}

/// Ordered map of patchable elements.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchList<T> {
    elements: BTreeMap<u32, Entry<T>>,
    order: Vec<u32>,
}

impl<T> Default for PatchList<T> {
    fn default() -> Self {
        Self {
            elements: BTreeMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Patchable> PatchList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or patch the element at `id`.
    pub fn add(&mut self, id: u32, level: u32, patch: T::Patch) {
        match self.elements.get_mut(&id) {
            Some(entry) => {
                if let Err(patch) = entry.element.merge(patch) {
                    *entry = Entry {
                        level,
                        element: T::from_patch(patch),
                    };
                }
            },
            None => {
                self.elements.insert(
                    id,
                    Entry {
                        level,
                        element: T::from_patch(patch),
                    },
                );
            },
        }
    }
}

impl<T> PatchList<T> {
    pub fn get(&self, id: u32) -> Option<&T> {
        self.elements.get(&id).map(|entry| &entry.element)
    }

    pub fn get_level(&self, id: u32) -> Option<u32> {
        self.elements.get(&id).map(|entry| entry.level)
    }

    /// Replace the explicit visiting order.
    pub fn set_order(&mut self, order: Vec<u32>) {
        self.order = order;
    }

    pub fn order(&self) -> &[u32] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
    }

    /// Elements in visiting order.
    ///
    /// With an explicit order only the ordered ids that exist are visited;
    /// otherwise every element is visited by ascending id.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (u32, &Entry<T>)> + '_> {
        if self.order.is_empty() {
            Box::new(self.elements.iter().map(|(&id, entry)| (id, entry)))
        } else {
            Box::new(
                self.order
                    .iter()
                    .filter_map(|id| self.elements.get(id).map(|entry| (*id, entry))),
            )
        }
    }

    /// Visit every element in order.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(u32, &Entry<T>),
    {
        for (id, entry) in self.iter() {
            visitor(id, entry);
        }
    }
}
