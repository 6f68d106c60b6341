//! HeightIndex - O(log n) stacked offsets via a Fenwick tree
//!
//! The headless surface stacks a root's children vertically. Resizing one child
//! shifts every later sibling, so offsets are kept as prefix sums rather than
//! stored per child.
//!
//! Heights are in layout units (1/64 px) so fractional intrinsic sizes stack
//! exactly.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `offset_of` / `prefix_sum`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: O(log n) amortized (rebuild on growth)
//! - `remove`: O(n)

/// Layout units per CSS pixel.
pub const UNITS_PER_PX: f64 = 64.0;

/// Convert pixels to layout units, rounding to the nearest unit.
pub fn to_units(px: f64) -> isize {
    if px.is_finite() {
        (px * UNITS_PER_PX).round() as isize
    } else {
        0
    }
}

/// Convert layout units back to pixels.
pub fn to_px(units: isize) -> f64 {
    units as f64 / UNITS_PER_PX
}

/// Fenwick tree over child heights with a raw copy for O(1) reads.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick storage (0-indexed API over the crate's 1-indexed layout).
    tree: Vec<isize>,
    /// Raw heights, one per child.
    heights: Vec<isize>,
}

impl HeightIndex {
    /// Creates an empty index with room for `capacity` children.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sightline::host::height_index::HeightIndex;
    /// let index = HeightIndex::new(16);
    /// assert!(index.is_empty());
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            heights: Vec::with_capacity(capacity),
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Whether the index has no children.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height of child `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn height(&self, index: usize) -> isize {
        self.heights[index]
    }

    /// Appends a child.
    ///
    /// Fenwick nodes past the old capacity would miss earlier contributions,
    /// so growth rebuilds the tree from the raw heights.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sightline::host::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(1);
    /// for h in [10, 20, 30] {
    ///     index.push(h);
    /// }
    /// assert_eq!(index.total(), 60);
    /// assert_eq!(index.offset_of(2), 30);
    /// ```
    pub fn push(&mut self, height: isize) {
        let idx = self.heights.len();
        self.heights.push(height);
        if idx >= self.tree.len() {
            self.rebuild();
        } else {
            fenwick::array::update(&mut self.tree, idx, height);
        }
    }

    /// Replaces the height of child `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, height: isize) {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let delta = height - self.heights[index];
        if delta != 0 {
            self.heights[index] = height;
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Removes child `index`, shifting later children up.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) {
        self.heights.remove(index);
        self.rebuild();
    }

    /// Sum of heights of children `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> isize {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );
        fenwick::array::prefix_sum(&self.tree, index)
    }

    /// Top offset of child `index` (sum of the heights before it).
    pub fn offset_of(&self, index: usize) -> isize {
        if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    /// Total stacked height.
    pub fn total(&self) -> isize {
        if self.is_empty() {
            0
        } else {
            self.prefix_sum(self.len() - 1)
        }
    }

    /// First child whose bottom edge lies below `offset`.
    ///
    /// Returns `None` if `offset >= total()` or the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sightline::host::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(4);
    /// index.push(10); // [0..10)
    /// index.push(20); // [10..30)
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(30), None);
    /// ```
    pub fn lower_bound(&self, offset: isize) -> Option<usize> {
        let mut left = 0;
        let mut right = self.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > offset {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len()).then_some(left)
    }

    fn rebuild(&mut self) {
        let capacity = self.tree.len().max(1).max(self.heights.len());
        let capacity = capacity.next_power_of_two();
        self.tree.clear();
        self.tree.resize(capacity, 0);
        for (i, &h) in self.heights.iter().enumerate() {
            if h != 0 {
                fenwick::array::update(&mut self.tree, i, h);
            }
        }
    }
}
