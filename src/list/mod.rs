//! Deferred list driver.
//!
//! [`DeferredList`] ties one [`MultiplexerScope`] to one scrollable root on a
//! [`HeadlessSurface`] and runs the two-phase frame for its cells:
//!
//! 1. render every cell and push its box style into the host;
//! 2. host commit (layout);
//! 3. `after_commit` on every cell (synchronous measurement);
//! 4. deliver observations; cells whose visibility changed need another frame.

use crate::cell::{CellFrame, CellMode, DeferredContentCell};
use crate::host::HeadlessSurface;
use crate::model::{BoxSize, ElementId, Length, ObservationPolicy, ScopeError};
use crate::observer::MultiplexerScope;
use tracing::{debug, info, warn};

/// Upper bound on frames [`DeferredList::settle`] runs.
pub const MAX_SETTLE_FRAMES: usize = 16;

/// Content that can report the size it renders at.
pub trait CellContent {
    /// Intrinsic size when laid out in `available_width` pixels.
    fn intrinsic_size(&self, available_width: f64) -> BoxSize;
}

impl CellContent for BoxSize {
    fn intrinsic_size(&self, _available_width: f64) -> BoxSize {
        *self
    }
}

/// A vertical list of deferred cells inside one multiplexer scope.
pub struct DeferredList<C> {
    surface: HeadlessSurface,
    root: ElementId,
    scope: MultiplexerScope,
    min_height: Length,
    cells: Vec<DeferredContentCell<C>>,
    /// Items added before the scope was ready.
    pending: Vec<C>,
}

impl<C: CellContent> DeferredList<C> {
    /// Create a list with its own root on `surface`. Nothing renders until
    /// [`mount`](Self::mount).
    pub fn new(
        surface: HeadlessSurface,
        viewport: BoxSize,
        policy: ObservationPolicy,
        min_height: Length,
    ) -> Self {
        let root = surface.create_root(viewport);
        Self {
            surface,
            root,
            scope: MultiplexerScope::new(policy),
            min_height,
            cells: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Build the multiplexer and mount every queued item.
    ///
    /// # Errors
    ///
    /// [`ScopeError::AlreadyMounted`] when called twice.
    pub fn mount(&mut self) -> Result<(), ScopeError> {
        self.scope.mount(&self.surface, self.root)?;
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for content in pending {
            self.mount_cell(content);
        }
        info!(root = %self.root, cells = count, "list mounted");
        Ok(())
    }

    /// Append an item. Queued until the scope is ready.
    pub fn push(&mut self, content: C) {
        if self.scope.is_ready() {
            self.mount_cell(content);
        } else {
            self.pending.push(content);
        }
    }

    fn mount_cell(&mut self, content: C) {
        let min_height = self.min_height;
        let Some(mut cell) = self
            .scope
            .render_children(|handle| DeferredContentCell::new(Some(handle), min_height, content))
        else {
            return;
        };
        match self.surface.create_element(self.root) {
            Some(element) => cell.mount(element),
            None => warn!(root = %self.root, "list root is gone; cell left unmounted"),
        }
        self.cells.push(cell);
    }

    /// Remove the item at `index`, returning its content.
    pub fn remove(&mut self, index: usize) -> Option<C> {
        if index >= self.cells.len() {
            return None;
        }
        let mut cell = self.cells.remove(index);
        if let Some(element) = cell.element() {
            cell.unmount();
            self.surface.remove_element(element);
        }
        Some(cell.into_content())
    }

    /// Run one frame. Returns whether another frame is needed.
    pub fn frame(&mut self) -> bool {
        let width = self.viewport().width;
        for cell in &mut self.cells {
            let (element, style, intrinsic) = match cell.render() {
                CellFrame::Placeholder { element, style } => (element, style, None),
                CellFrame::Content {
                    element,
                    style,
                    content,
                } => (element, style, Some(content.intrinsic_size(width))),
            };
            if let Some(element) = element {
                self.surface.apply_style(element, style, intrinsic);
            }
        }

        self.surface.commit();

        let mut pinned = 0;
        for cell in &mut self.cells {
            if cell.after_commit(&self.surface).is_some() {
                pinned += 1;
            }
        }

        let delivered = self.surface.deliver_observations();
        let dirty = self.cells.iter().filter(|c| c.needs_render()).count();
        debug!(root = %self.root, pinned, delivered, dirty, "frame");
        dirty > 0
    }

    /// Run frames until nothing changes, up to [`MAX_SETTLE_FRAMES`].
    ///
    /// Returns the number of frames run.
    pub fn settle(&mut self) -> usize {
        for frames in 1..=MAX_SETTLE_FRAMES {
            if !self.frame() {
                return frames;
            }
        }
        warn!(root = %self.root, "list did not settle");
        MAX_SETTLE_FRAMES
    }

    /// Scroll the list by `delta` pixels.
    pub fn scroll_by(&mut self, delta: f64) {
        self.surface.scroll_by(self.root, delta);
    }

    /// Scroll the list to an absolute offset.
    pub fn scroll_to(&mut self, offset: f64) {
        self.surface.scroll_to(self.root, offset);
    }

    /// Resize the list's viewport.
    pub fn resize(&mut self, viewport: BoxSize) {
        self.surface.set_viewport(self.root, viewport);
    }

    /// Terminate the scope and detach every cell.
    pub fn unmount(&mut self) {
        for cell in &mut self.cells {
            if let Some(element) = cell.element() {
                cell.unmount();
                self.surface.remove_element(element);
            }
        }
        self.scope.unmount();
    }
}

impl<C> DeferredList<C> {
    /// Cells in stacking order.
    pub fn cells(&self) -> &[DeferredContentCell<C>] {
        &self.cells
    }

    /// Number of mounted cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is mounted.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells currently rendering content.
    pub fn content_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.mode() == CellMode::Content)
            .count()
    }

    /// Root element of the list.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Host the list renders into.
    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    /// The list's scope.
    pub fn scope(&self) -> &MultiplexerScope {
        &self.scope
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> f64 {
        self.surface.scroll_offset(self.root)
    }

    /// Total committed height.
    pub fn scroll_height(&self) -> f64 {
        self.surface.scroll_height(self.root)
    }

    /// Viewport size.
    pub fn viewport(&self) -> BoxSize {
        self.surface.viewport(self.root).unwrap_or(BoxSize::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;

    fn list(heights: &[f64]) -> DeferredList<BoxSize> {
        let mut list = DeferredList::new(
            HeadlessSurface::new(),
            BoxSize::new(400.0, 600.0),
            ObservationPolicy::new("0px", [0.0]).unwrap(),
            Length::Px(100.0),
        );
        for h in heights {
            list.push(BoxSize::new(400.0, *h));
        }
        list
    }

    #[test]
    fn items_wait_for_scope() {
        let mut list = list(&[300.0, 300.0]);
        assert!(list.is_empty());

        list.mount().unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn first_frames_render_cells_near_viewport() {
        let mut list = list(&[300.0; 20]);
        list.mount().unwrap();

        list.settle();

        // Placeholders are 100px; content grows the first cards to 300px.
        assert!(list.content_count() >= 2);
        assert!(list.content_count() < 20);
        assert_eq!(list.cells()[0].dimensions().height(), Dimension::Px(300));
    }

    #[test]
    fn scrolled_away_cells_keep_their_height() {
        let mut list = list(&[300.0; 20]);
        list.mount().unwrap();
        list.settle();
        let height = |list: &DeferredList<BoxSize>| {
            list.cells()[0]
                .element()
                .and_then(|e| list.surface().element_rect(e))
                .map(|rect| rect.height)
        };
        let before = height(&list);

        list.scroll_by(3_000.0);
        list.settle();

        assert_eq!(list.cells()[0].mode(), CellMode::Placeholder);
        assert_eq!(before, Some(300.0));
        assert_eq!(height(&list), before);
    }

    #[test]
    fn settle_stops_when_quiescent() {
        let mut list = list(&[300.0; 3]);
        list.mount().unwrap();
        list.settle();

        assert_eq!(list.settle(), 1);
    }

    #[test]
    fn remove_unregisters_cell() {
        let mut list = list(&[300.0, 300.0]);
        list.mount().unwrap();
        list.settle();

        let removed = list.remove(0);

        assert_eq!(removed, Some(BoxSize::new(400.0, 300.0)));
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.scope().multiplexer().map(|m| m.registered_count()),
            Some(1)
        );
    }

    #[test]
    fn unmount_detaches_everything() {
        let mut list = list(&[300.0, 300.0]);
        list.mount().unwrap();
        list.settle();

        list.unmount();

        assert!(list.scope().is_terminated());
        assert_eq!(list.surface().live_trackers(), 0);
        assert!(list.cells().iter().all(|c| c.element().is_none()));
    }
}
