//! Host collaborator contract.
//!
//! The visibility core depends on exactly three things from whatever renders
//! the elements:
//!
//! 1. a way to track element visibility crossings against a root under a
//!    margin and threshold policy, delivered in batches ([`Surface::create_tracker`]);
//! 2. a way to read a committed element's rendered box size ([`Surface::measure`]);
//! 3. a commit cycle whose completion application code can observe
//!    synchronously (the caller invokes the post-commit phase itself, see
//!    [`DeferredContentCell::after_commit`](crate::cell::DeferredContentCell::after_commit)).
//!
//! [`headless`] provides a complete in-memory implementation.

pub mod headless;
pub mod height_index;
pub mod intersection;

pub use headless::HeadlessSurface;

use crate::model::{BoxSize, ElementId, ObservationPolicy};
use crate::observer::BatchSink;

/// A rendering surface able to host visibility trackers and report box sizes.
pub trait Surface {
    /// Create one native visibility tracker bound to `root`.
    ///
    /// Every batch of crossing records the tracker produces must be handed to
    /// `sink`. Returns `None` when `root` has no backing surface, in which case
    /// the caller degrades to an inert multiplexer.
    fn create_tracker(
        &self,
        root: ElementId,
        policy: &ObservationPolicy,
        sink: BatchSink,
    ) -> Option<Box<dyn NativeTracker>>;

    /// Rendered size of a committed element.
    ///
    /// `None` when the element is unknown to the surface.
    fn measure(&self, element: ElementId) -> Option<BoxSize>;
}

/// One native visibility-tracking instance.
///
/// Expensive to create; the multiplexer owns exactly one per root.
pub trait NativeTracker {
    /// Start tracking `target`.
    ///
    /// Observing a target that is already tracked restarts its reporting: the
    /// next delivery carries a fresh record for it.
    fn observe(&mut self, target: ElementId);

    /// Stop tracking `target`. A no-op for targets that are not tracked.
    fn unobserve(&mut self, target: ElementId);

    /// Stop tracking everything and release the tracker.
    fn disconnect(&mut self);
}
