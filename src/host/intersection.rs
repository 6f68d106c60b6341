//! Rectangle intersection as a visibility tracker computes it.

use crate::model::RootMargin;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width (never negative).
    pub width: f64,
    /// Height (never negative).
    pub height: f64,
}

impl Rect {
    /// Create a rectangle, clamping negative extents to zero.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Grow (or, for negative margins, shrink) the rectangle by a root margin.
    ///
    /// Percentages resolve against this rectangle's own width or height.
    pub fn expand(&self, margin: &RootMargin) -> Rect {
        let top = margin.top.resolve(self.height);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        let right = margin.right.resolve(self.width);
        Rect::new(
            self.left - left,
            self.top - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

/// Outcome of intersecting a target with its root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Whether the rectangles overlap or touch.
    pub is_intersecting: bool,
    /// Visible fraction of the target in `[0, 1]`.
    pub ratio: f64,
}

/// Intersect `target` with an (already margin-adjusted) `root`.
///
/// Edge-adjacent rectangles count as intersecting with a ratio of zero. A
/// zero-area target that intersects has a ratio of one.
pub fn intersect(target: &Rect, root: &Rect) -> Intersection {
    let left = target.left.max(root.left);
    let right = target.right().min(root.right());
    let top = target.top.max(root.top);
    let bottom = target.bottom().min(root.bottom());

    let is_intersecting = right >= left && bottom >= top;
    if !is_intersecting {
        return Intersection {
            is_intersecting,
            ratio: 0.0,
        };
    }

    let target_area = target.area();
    let ratio = if target_area > 0.0 {
        ((right - left) * (bottom - top) / target_area).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Intersection {
        is_intersecting,
        ratio,
    }
}
