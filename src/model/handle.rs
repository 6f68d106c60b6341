//! Generational element handles.
//!
//! The host owns elements; this crate only ever holds their handles. An index
//! may be recycled by the host once an element is removed, but every reuse
//! bumps the generation, so a handle to a removed element never compares equal
//! to the element that later occupies the same slot.

use std::fmt;

/// Handle to a host element (a tracked target or a scroll root).
///
/// Raw fields are never exported - handles come from the host's arena via
/// [`ElementId::new`], which hosts call when they allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    /// Build a handle from an arena slot index and its current generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Slot index as a `usize`, for table lookups.
    pub(crate) fn slot(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_with_same_index_but_different_generation_differ() {
        let old = ElementId::new(3, 0);
        let recycled = ElementId::new(3, 1);
        assert_ne!(old, recycled);
        assert_eq!(old.index(), recycled.index());
    }

    #[test]
    fn display_shows_index_and_generation() {
        assert_eq!(ElementId::new(7, 2).to_string(), "#7v2");
    }
}
