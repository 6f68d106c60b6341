//! Visibility records and the events subscribers receive.

use super::handle::ElementId;

/// One raw crossing record as delivered by a native tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationRecord {
    /// Element whose visibility changed.
    pub target: ElementId,
    /// Whether any part of the target intersects the (margin-adjusted) root.
    pub is_intersecting: bool,
    /// Visible fraction of the target. Hosts may hand over unclamped values.
    pub ratio: f64,
}

/// Normalized per-target event handed to a subscriber callback.
///
/// Delivered once per threshold crossing, never per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEvent {
    /// Element whose visibility changed.
    pub target: ElementId,
    /// Whether any part of the target intersects the root.
    pub is_intersecting: bool,
    /// Visible fraction of the target in `[0, 1]`.
    pub ratio: f64,
}

impl From<ObservationRecord> for VisibilityEvent {
    fn from(record: ObservationRecord) -> Self {
        let ratio = if record.ratio.is_nan() {
            0.0
        } else {
            record.ratio.clamp(0.0, 1.0)
        };
        Self {
            target: record.target,
            is_intersecting: record.is_intersecting,
            ratio,
        }
    }
}
