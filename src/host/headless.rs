//! In-memory rendering surface.
//!
//! [`HeadlessSurface`] is a complete [`Surface`]: it owns an element arena,
//! lays out each root's children as a vertical stack, scrolls roots, and runs
//! visibility trackers against the laid-out geometry. It drives the tests,
//! the benchmarks and the terminal demo.
//!
//! The surface is a cheap `Clone` over shared state. Trackers hold it weakly.
//!
//! # Frame protocol
//!
//! Nothing moves until [`commit`](HeadlessSurface::commit) resolves styles
//! into sizes, and no tracker reports until
//! [`deliver_observations`](HeadlessSurface::deliver_observations) runs.
//! Batches are handed to sinks after the surface borrow is released, so
//! callbacks may create, restyle or observe elements.

use super::height_index::{to_px, to_units, HeightIndex};
use super::intersection::{intersect, Rect};
use super::{NativeTracker, Surface};
use crate::model::{BoxSize, BoxStyle, Dimension, ElementId, ObservationPolicy, ObservationRecord};
use crate::observer::BatchSink;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Reporting state of one observed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reported {
    /// Observed (or re-observed) but not reported yet.
    Never,
    /// Last reported threshold step (`None` = not intersecting).
    Step(Option<usize>),
}

struct TrackerState {
    root: ElementId,
    policy: ObservationPolicy,
    sink: BatchSink,
    /// Observed targets in observation order; `None` marks an unobserved gap.
    targets: Vec<Option<(ElementId, Reported)>>,
    /// Target → position in `targets`.
    index: HashMap<ElementId, usize>,
}

impl TrackerState {
    fn new(root: ElementId, policy: ObservationPolicy, sink: BatchSink) -> Self {
        Self {
            root,
            policy,
            sink,
            targets: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn observe(&mut self, target: ElementId) {
        if let Some(&position) = self.index.get(&target) {
            self.targets[position] = Some((target, Reported::Never));
            return;
        }
        self.index.insert(target, self.targets.len());
        self.targets.push(Some((target, Reported::Never)));
    }

    fn unobserve(&mut self, target: ElementId) {
        let Some(position) = self.index.remove(&target) else {
            return;
        };
        self.targets[position] = None;
        if self.index.len() * 2 < self.targets.len() {
            self.compact();
        }
    }

    /// Drop gaps left by `unobserve`, keeping observation order.
    fn compact(&mut self) {
        self.targets.retain(Option::is_some);
        for (position, entry) in self.targets.iter().enumerate() {
            if let Some((target, _)) = entry {
                self.index.insert(*target, position);
            }
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

#[derive(Default)]
struct TrackerSlot {
    generation: u32,
    state: Option<TrackerState>,
}

enum NodeKind {
    Root {
        viewport: BoxSize,
        scroll: f64,
        children: Vec<ElementId>,
        /// Child → position in `children`.
        positions: HashMap<ElementId, usize>,
        heights: HeightIndex,
    },
    Child {
        root: ElementId,
    },
}

struct Node {
    kind: NodeKind,
    style: BoxStyle,
    intrinsic: Option<BoxSize>,
    hidden: bool,
    /// Resolved at the last commit.
    size: BoxSize,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Default)]
struct Inner {
    has_surface: bool,
    slots: Vec<Slot>,
    free: Vec<u32>,
    trackers: Vec<TrackerSlot>,
    free_trackers: Vec<usize>,
}

impl Inner {
    fn node(&self, id: ElementId) -> Option<&Node> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    fn allocate(&mut self, node: Node) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return ElementId::new(index, slot.generation);
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        ElementId::new(index, 0)
    }

    fn release(&mut self, id: ElementId) -> Option<Node> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        Some(node)
    }

    fn is_root(&self, id: ElementId) -> bool {
        matches!(
            self.node(id),
            Some(Node {
                kind: NodeKind::Root { .. },
                ..
            })
        )
    }

    /// Position of `child` within its root's stack.
    fn position(&self, child: ElementId) -> Option<(ElementId, usize)> {
        let NodeKind::Child { root } = self.node(child)?.kind else {
            return None;
        };
        let NodeKind::Root { positions, .. } = &self.node(root)?.kind else {
            return None;
        };
        Some((root, *positions.get(&child)?))
    }

    fn tracker_mut(&mut self, id: usize, generation: u32) -> Option<&mut TrackerState> {
        self.trackers
            .get_mut(id)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.state.as_mut())
    }

    fn add_tracker(&mut self, state: TrackerState) -> (usize, u32) {
        if let Some(id) = self.free_trackers.pop() {
            let slot = &mut self.trackers[id];
            slot.state = Some(state);
            return (id, slot.generation);
        }
        self.trackers.push(TrackerSlot {
            generation: 0,
            state: Some(state),
        });
        (self.trackers.len() - 1, 0)
    }

    /// Drop a tracker's state and free its slot for reuse.
    fn remove_tracker(&mut self, id: usize, generation: u32) -> bool {
        let Some(slot) = self
            .trackers
            .get_mut(id)
            .filter(|slot| slot.generation == generation && slot.state.is_some())
        else {
            return false;
        };
        slot.state = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_trackers.push(id);
        true
    }

    /// Viewport-relative rectangle of a committed child.
    fn child_rect(&self, child: ElementId) -> Option<Rect> {
        let node = self.node(child)?;
        let (root, position) = self.position(child)?;
        let NodeKind::Root {
            scroll, heights, ..
        } = &self.node(root)?.kind
        else {
            return None;
        };
        let top = to_px(heights.offset_of(position)) - scroll;
        Some(Rect::new(0.0, top, node.size.width, node.size.height))
    }

    fn viewport(&self, root: ElementId) -> Option<BoxSize> {
        match self.node(root)?.kind {
            NodeKind::Root { viewport, .. } => Some(viewport),
            NodeKind::Child { .. } => None,
        }
    }

    fn resolve(node: &Node, viewport: BoxSize) -> BoxSize {
        if node.hidden {
            return BoxSize::ZERO;
        }
        let width = match node.style.width {
            Dimension::Px(px) => f64::from(px),
            Dimension::Auto => node.intrinsic.map_or(viewport.width, |size| size.width),
        };
        let mut height = match node.style.height {
            Dimension::Px(px) => f64::from(px),
            Dimension::Auto => node.intrinsic.map_or(0.0, |size| size.height),
        };
        if let Some(min) = node.style.min_height {
            height = height.max(min.resolve(viewport.height));
        }
        BoxSize::new(width.max(0.0), height.max(0.0))
    }

    fn commit(&mut self) {
        let roots: Vec<ElementId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot.node.as_ref()?.kind {
                NodeKind::Root { .. } => Some(ElementId::new(index as u32, slot.generation)),
                NodeKind::Child { .. } => None,
            })
            .collect();

        for root in roots {
            let Some(viewport) = self.viewport(root) else {
                continue;
            };
            let children = match self.node(root).map(|n| &n.kind) {
                Some(NodeKind::Root { children, .. }) => children.clone(),
                _ => continue,
            };

            let mut resolved = Vec::with_capacity(children.len());
            for child in &children {
                if let Some(node) = self.node_mut(*child) {
                    node.size = Self::resolve(node, viewport);
                    resolved.push(node.size.height);
                }
            }

            if let Some(Node {
                kind: NodeKind::Root { heights, scroll, .. },
                ..
            }) = self.node_mut(root)
            {
                for (position, height) in resolved.into_iter().enumerate() {
                    heights.set(position, to_units(height));
                }
                *scroll = clamp_scroll(*scroll, to_px(heights.total()), viewport.height);
            }
        }
    }

    /// Compute pending records for every tracker, updating reported steps.
    fn collect_batches(&mut self) -> Vec<(BatchSink, Vec<ObservationRecord>)> {
        let mut batches = Vec::new();
        for index in 0..self.trackers.len() {
            let Some(tracker) = self.trackers[index].state.as_ref() else {
                continue;
            };
            let root = tracker.root;
            let Some(viewport) = self.viewport(root) else {
                continue;
            };
            let area = Rect::new(0.0, 0.0, viewport.width, viewport.height)
                .expand(tracker.policy.root_margin());

            let mut records = Vec::new();
            let mut steps = Vec::with_capacity(tracker.targets.len());
            for (target, reported) in tracker.targets.iter().flatten() {
                let hit = match self.node(*target) {
                    Some(node) if !node.hidden => self
                        .child_rect(*target)
                        .filter(|_| self.position(*target).is_some_and(|(r, _)| r == root))
                        .map(|rect| intersect(&rect, &area)),
                    _ => None,
                };
                let (is_intersecting, ratio) =
                    hit.map_or((false, 0.0), |hit| (hit.is_intersecting, hit.ratio));
                let step = tracker.policy.thresholds().step_index(is_intersecting, ratio);
                if *reported != Reported::Step(step) {
                    records.push(ObservationRecord {
                        target: *target,
                        is_intersecting,
                        ratio,
                    });
                }
                steps.push(Reported::Step(step));
            }

            if let Some(tracker) = self.trackers[index].state.as_mut() {
                for ((_, reported), step) in tracker.targets.iter_mut().flatten().zip(steps) {
                    *reported = step;
                }
                if !records.is_empty() {
                    batches.push((tracker.sink.clone(), records));
                }
            }
        }
        batches
    }
}

fn clamp_scroll(offset: f64, content_height: f64, viewport_height: f64) -> f64 {
    let max = (content_height - viewport_height).max(0.0);
    if offset.is_finite() {
        offset.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Shared in-memory rendering surface.
#[derive(Clone)]
pub struct HeadlessSurface {
    inner: Rc<RefCell<Inner>>,
}

impl HeadlessSurface {
    /// A surface that can back trackers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                has_surface: true,
                ..Inner::default()
            })),
        }
    }

    /// A surface for non-interactive rendering: elements exist and lay out,
    /// but no tracker can ever be created.
    pub fn without_surface() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::default())),
        }
    }

    /// Create a scrollable root container with the given viewport.
    pub fn create_root(&self, viewport: BoxSize) -> ElementId {
        let root = self.inner.borrow_mut().allocate(Node {
            kind: NodeKind::Root {
                viewport,
                scroll: 0.0,
                children: Vec::new(),
                positions: HashMap::new(),
                heights: HeightIndex::new(16),
            },
            style: BoxStyle::AUTO,
            intrinsic: Some(viewport),
            hidden: false,
            size: viewport,
        });
        debug!(%root, width = viewport.width, height = viewport.height, "created root");
        root
    }

    /// Append a child box to `root`'s stack. `None` if `root` is not a root.
    pub fn create_element(&self, root: ElementId) -> Option<ElementId> {
        let mut inner = self.inner.borrow_mut();
        if !inner.is_root(root) {
            return None;
        }
        let element = inner.allocate(Node {
            kind: NodeKind::Child { root },
            style: BoxStyle::AUTO,
            intrinsic: None,
            hidden: false,
            size: BoxSize::ZERO,
        });
        if let Some(Node {
            kind:
                NodeKind::Root {
                    children,
                    positions,
                    heights,
                    ..
                },
            ..
        }) = inner.node_mut(root)
        {
            positions.insert(element, children.len());
            children.push(element);
            heights.push(0);
        }
        trace!(%element, %root, "created element");
        Some(element)
    }

    /// Remove an element (a root takes its children with it).
    ///
    /// Stale ids are ignored; returns whether anything was removed.
    pub fn remove_element(&self, element: ElementId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let position = inner.position(element);
        let Some(node) = inner.release(element) else {
            return false;
        };

        match node.kind {
            NodeKind::Root { children, .. } => {
                for child in children {
                    inner.release(child);
                }
            }
            NodeKind::Child { .. } => {
                if let Some((root, position)) = position {
                    if let Some(Node {
                        kind:
                            NodeKind::Root {
                                children,
                                positions,
                                heights,
                                ..
                            },
                        ..
                    }) = inner.node_mut(root)
                    {
                        children.remove(position);
                        heights.remove(position);
                        positions.remove(&element);
                        for (shifted, child) in children.iter().enumerate().skip(position) {
                            positions.insert(*child, shifted);
                        }
                    }
                }
            }
        }
        trace!(%element, "removed element");
        true
    }

    /// Set a box's style and its content's intrinsic size (`None` = empty box).
    ///
    /// Takes effect at the next [`commit`](Self::commit).
    pub fn apply_style(&self, element: ElementId, style: BoxStyle, intrinsic: Option<BoxSize>) {
        if let Some(node) = self.inner.borrow_mut().node_mut(element) {
            node.style = style;
            node.intrinsic = intrinsic;
        }
    }

    /// Suppress (or restore) display of an element.
    pub fn set_hidden(&self, element: ElementId, hidden: bool) {
        if let Some(node) = self.inner.borrow_mut().node_mut(element) {
            node.hidden = hidden;
        }
    }

    /// Resize a root's viewport.
    pub fn set_viewport(&self, root: ElementId, size: BoxSize) {
        if let Some(Node {
            kind: NodeKind::Root { viewport, .. },
            ..
        }) = self.inner.borrow_mut().node_mut(root)
        {
            *viewport = size;
        }
    }

    /// Resolve styles into sizes and restack every root.
    pub fn commit(&self) {
        self.inner.borrow_mut().commit();
    }

    /// Run every tracker against the committed layout and deliver batches.
    ///
    /// Returns the number of records delivered.
    pub fn deliver_observations(&self) -> usize {
        let batches = self.inner.borrow_mut().collect_batches();
        let mut delivered = 0;
        for (sink, records) in batches {
            delivered += records.len();
            sink.deliver(&records);
        }
        delivered
    }

    /// Scroll a root to an absolute offset (clamped to its content).
    pub fn scroll_to(&self, root: ElementId, offset: f64) {
        if let Some(Node {
            kind: NodeKind::Root {
                scroll,
                heights,
                viewport,
                ..
            },
            ..
        }) = self.inner.borrow_mut().node_mut(root)
        {
            *scroll = clamp_scroll(offset, to_px(heights.total()), viewport.height);
        }
    }

    /// Scroll a root by a relative amount.
    pub fn scroll_by(&self, root: ElementId, delta: f64) {
        let current = self.scroll_offset(root);
        self.scroll_to(root, current + delta);
    }

    /// Current scroll offset of a root (0 for non-roots).
    pub fn scroll_offset(&self, root: ElementId) -> f64 {
        match self.inner.borrow().node(root).map(|n| &n.kind) {
            Some(NodeKind::Root { scroll, .. }) => *scroll,
            _ => 0.0,
        }
    }

    /// Total committed height of a root's stack.
    pub fn scroll_height(&self, root: ElementId) -> f64 {
        match self.inner.borrow().node(root).map(|n| &n.kind) {
            Some(NodeKind::Root { heights, .. }) => to_px(heights.total()),
            _ => 0.0,
        }
    }

    /// Viewport size of a root.
    pub fn viewport(&self, root: ElementId) -> Option<BoxSize> {
        self.inner.borrow().viewport(root)
    }

    /// Viewport-relative rectangle of a committed child.
    pub fn element_rect(&self, element: ElementId) -> Option<Rect> {
        self.inner.borrow().child_rect(element)
    }

    /// Children of a root, in stacking order.
    pub fn children(&self, root: ElementId) -> Vec<ElementId> {
        match self.inner.borrow().node(root).map(|n| &n.kind) {
            Some(NodeKind::Root { children, .. }) => children.clone(),
            _ => Vec::new(),
        }
    }

    /// First child at or below the root's scroll offset.
    pub fn first_visible(&self, root: ElementId) -> Option<ElementId> {
        let inner = self.inner.borrow();
        let Some(NodeKind::Root {
            children,
            heights,
            scroll,
            ..
        }) = inner.node(root).map(|n| &n.kind)
        else {
            return None;
        };
        heights
            .lower_bound(to_units(*scroll))
            .and_then(|position| children.get(position).copied())
    }

    /// Whether `element` is live.
    pub fn contains(&self, element: ElementId) -> bool {
        self.inner.borrow().node(element).is_some()
    }

    /// Number of trackers not yet disconnected.
    pub fn live_trackers(&self) -> usize {
        self.inner
            .borrow()
            .trackers
            .iter()
            .filter(|slot| slot.state.is_some())
            .count()
    }

    /// Slots allocated for trackers, live or free.
    pub fn tracker_capacity(&self) -> usize {
        self.inner.borrow().trackers.len()
    }

    /// Number of targets the trackers on `root` currently observe.
    pub fn observed_targets(&self, root: ElementId) -> usize {
        self.inner
            .borrow()
            .trackers
            .iter()
            .filter_map(|slot| slot.state.as_ref())
            .filter(|state| state.root == root)
            .map(TrackerState::len)
            .sum()
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HeadlessSurface")
            .field("has_surface", &inner.has_surface)
            .field("elements", &(inner.slots.len() - inner.free.len()))
            .field(
                "trackers",
                &inner.trackers.iter().filter(|slot| slot.state.is_some()).count(),
            )
            .finish()
    }
}

impl Surface for HeadlessSurface {
    fn create_tracker(
        &self,
        root: ElementId,
        policy: &ObservationPolicy,
        sink: BatchSink,
    ) -> Option<Box<dyn NativeTracker>> {
        let mut inner = self.inner.borrow_mut();
        if !inner.has_surface || !inner.is_root(root) {
            return None;
        }
        let (id, generation) = inner.add_tracker(TrackerState::new(root, policy.clone(), sink));
        debug!(%root, tracker = id, "created tracker");
        Some(Box::new(HeadlessTracker {
            inner: Rc::downgrade(&self.inner),
            id,
            generation,
        }))
    }

    fn measure(&self, element: ElementId) -> Option<BoxSize> {
        let inner = self.inner.borrow();
        let node = inner.node(element)?;
        Some(if node.hidden { BoxSize::ZERO } else { node.size })
    }
}

/// Tracker handle given to a multiplexer.
struct HeadlessTracker {
    inner: Weak<RefCell<Inner>>,
    id: usize,
    /// Slot generation at creation; a recycled slot belongs to someone else.
    generation: u32,
}

impl HeadlessTracker {
    fn with_state(&self, f: impl FnOnce(&mut TrackerState)) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(state) = inner.borrow_mut().tracker_mut(self.id, self.generation) {
                f(state);
            }
        }
    }
}

impl NativeTracker for HeadlessTracker {
    fn observe(&mut self, target: ElementId) {
        self.with_state(|state| state.observe(target));
    }

    fn unobserve(&mut self, target: ElementId) {
        self.with_state(|state| state.unobserve(target));
    }

    fn disconnect(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if inner.borrow_mut().remove_tracker(self.id, self.generation) {
            debug!(tracker = self.id, "tracker disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Length;
    use crate::observer::VisibilityMultiplexer;

    fn column(surface: &HeadlessSurface, heights: &[f64]) -> (ElementId, Vec<ElementId>) {
        let root = surface.create_root(BoxSize::new(400.0, 600.0));
        let children = heights
            .iter()
            .map(|h| {
                let child = surface.create_element(root).unwrap();
                surface.apply_style(child, BoxStyle::AUTO, Some(BoxSize::new(400.0, *h)));
                child
            })
            .collect();
        surface.commit();
        (root, children)
    }

    fn watch(
        surface: &HeadlessSurface,
        root: ElementId,
        policy: ObservationPolicy,
        targets: &[ElementId],
    ) -> (VisibilityMultiplexer, Rc<RefCell<Vec<(ElementId, bool)>>>) {
        let mux = VisibilityMultiplexer::new(surface, root, policy);
        let seen = Rc::new(RefCell::new(Vec::new()));
        for target in targets {
            let sink = Rc::clone(&seen);
            mux.register(*target, move |event| {
                sink.borrow_mut().push((event.target, event.is_intersecting))
            });
        }
        (mux, seen)
    }

    #[test]
    fn children_stack_vertically() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[100.0, 250.0, 50.0]);

        assert_eq!(surface.element_rect(children[1]).unwrap().top, 100.0);
        assert_eq!(surface.element_rect(children[2]).unwrap().top, 350.0);
        assert_eq!(surface.scroll_height(root), 400.0);
    }

    #[test]
    fn empty_auto_box_takes_root_width_and_min_height() {
        let surface = HeadlessSurface::new();
        let root = surface.create_root(BoxSize::new(400.0, 600.0));
        let child = surface.create_element(root).unwrap();
        let style = BoxStyle {
            min_height: Some(Length::Px(100.0)),
            ..BoxStyle::AUTO
        };
        surface.apply_style(child, style, None);
        surface.commit();

        assert_eq!(surface.measure(child), Some(BoxSize::new(400.0, 100.0)));
    }

    #[test]
    fn percent_min_height_resolves_against_viewport() {
        let surface = HeadlessSurface::new();
        let root = surface.create_root(BoxSize::new(400.0, 600.0));
        let child = surface.create_element(root).unwrap();
        let style = BoxStyle {
            min_height: Some(Length::Percent(10.0)),
            ..BoxStyle::AUTO
        };
        surface.apply_style(child, style, None);
        surface.commit();

        assert_eq!(surface.measure(child).map(|s| s.height), Some(60.0));
    }

    #[test]
    fn explicit_pixels_override_intrinsic() {
        let surface = HeadlessSurface::new();
        let root = surface.create_root(BoxSize::new(400.0, 600.0));
        let child = surface.create_element(root).unwrap();
        let style = BoxStyle {
            width: Dimension::Px(300),
            height: Dimension::Px(120),
            min_height: None,
        };
        surface.apply_style(child, style, Some(BoxSize::new(10.0, 10.0)));
        surface.commit();

        assert_eq!(surface.measure(child), Some(BoxSize::new(300.0, 120.0)));
    }

    #[test]
    fn hidden_element_measures_zero() {
        let surface = HeadlessSurface::new();
        let (_root, children) = column(&surface, &[100.0]);
        surface.set_hidden(children[0], true);

        assert_eq!(surface.measure(children[0]), Some(BoxSize::ZERO));
    }

    #[test]
    fn removed_ids_go_stale() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[100.0, 100.0]);

        assert!(surface.remove_element(children[0]));
        assert!(!surface.remove_element(children[0]));
        let recycled = surface.create_element(root).unwrap();

        assert_eq!(recycled.index(), children[0].index());
        assert_ne!(recycled, children[0]);
        assert_eq!(surface.measure(children[0]), None);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let surface = HeadlessSurface::new();
        let (root, _) = column(&surface, &[500.0, 500.0]);

        surface.scroll_to(root, 10_000.0);
        assert_eq!(surface.scroll_offset(root), 400.0);
        surface.scroll_by(root, -1_000.0);
        assert_eq!(surface.scroll_offset(root), 0.0);
    }

    #[test]
    fn first_visible_follows_scroll() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[300.0, 300.0, 300.0]);

        surface.scroll_to(root, 310.0);
        assert_eq!(surface.first_visible(root), Some(children[1]));
    }

    #[test]
    fn surfaceless_host_backs_no_tracker() {
        let surface = HeadlessSurface::without_surface();
        let root = surface.create_root(BoxSize::new(400.0, 600.0));
        let mux = VisibilityMultiplexer::new(&surface, root, ObservationPolicy::default());

        assert!(mux.is_inert());
    }

    #[test]
    fn first_observation_reports_every_target() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[300.0, 300.0, 300.0]);
        let (_mux, seen) = watch(&surface, root, ObservationPolicy::default(), &children);

        surface.deliver_observations();

        // 10px margin: the third card starts at 600 and touches the expanded root.
        assert_eq!(
            *seen.borrow(),
            vec![(children[0], true), (children[1], true), (children[2], true)]
        );
    }

    #[test]
    fn unchanged_geometry_delivers_nothing() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[300.0]);
        let (_mux, seen) = watch(&surface, root, ObservationPolicy::default(), &children);

        surface.deliver_observations();
        assert_eq!(surface.deliver_observations(), 0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn scrolling_past_reports_exit() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[300.0, 300.0, 300.0, 300.0]);
        let policy = ObservationPolicy::new("0px", [0.0]).unwrap();
        let (_mux, seen) = watch(&surface, root, policy, &children[..1]);
        surface.deliver_observations();

        surface.scroll_to(root, 600.0);
        surface.deliver_observations();

        assert_eq!(*seen.borrow(), vec![(children[0], true), (children[0], false)]);
    }

    #[test]
    fn reobserve_restarts_reporting() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[300.0]);
        let (mux, seen) = watch(&surface, root, ObservationPolicy::default(), &children);
        surface.deliver_observations();

        let sink = Rc::clone(&seen);
        mux.register(children[0], move |event| {
            sink.borrow_mut().push((event.target, event.is_intersecting))
        });
        surface.deliver_observations();

        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn dropped_multiplexer_disconnects_tracker() {
        let surface = HeadlessSurface::new();
        let (root, _) = column(&surface, &[300.0]);
        let mux = VisibilityMultiplexer::new(&surface, root, ObservationPolicy::default());
        assert_eq!(surface.live_trackers(), 1);

        drop(mux);
        assert_eq!(surface.live_trackers(), 0);
    }

    #[test]
    fn removing_a_child_restacks_later_siblings() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[100.0, 200.0, 300.0, 400.0]);

        surface.remove_element(children[1]);
        surface.commit();

        assert_eq!(surface.element_rect(children[2]).unwrap().top, 100.0);
        assert_eq!(surface.element_rect(children[3]).unwrap().top, 400.0);
        assert_eq!(surface.element_rect(children[1]), None);
        assert_eq!(surface.children(root), vec![children[0], children[2], children[3]]);
    }

    #[test]
    fn unobserve_keeps_remaining_targets_in_order() {
        let surface = HeadlessSurface::new();
        let heights = [50.0; 8];
        let (root, children) = column(&surface, &heights);
        let (mux, seen) = watch(&surface, root, ObservationPolicy::default(), &children);

        for child in children.iter().step_by(2) {
            mux.unregister(*child);
        }
        assert_eq!(surface.observed_targets(root), 4);
        surface.deliver_observations();

        let expected: Vec<(ElementId, bool)> = children
            .iter()
            .skip(1)
            .step_by(2)
            .map(|child| (*child, true))
            .collect();
        assert_eq!(*seen.borrow(), expected);
    }

    #[test]
    fn evicted_generation_is_no_longer_observed() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[100.0]);
        let (mux, _seen) = watch(&surface, root, ObservationPolicy::default(), &children);

        surface.remove_element(children[0]);
        let recycled = surface.create_element(root).unwrap();
        assert_eq!(recycled.index(), children[0].index());
        mux.register(recycled, |_| {});

        assert_eq!(surface.observed_targets(root), 1);
    }

    #[test]
    fn remounted_trackers_reuse_slots() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[100.0]);

        for _ in 0..5 {
            let (mux, seen) = watch(&surface, root, ObservationPolicy::default(), &children);
            surface.deliver_observations();
            assert_eq!(seen.borrow().len(), 1);
            drop(mux);
        }

        assert_eq!(surface.live_trackers(), 0);
        assert_eq!(surface.tracker_capacity(), 1);
    }

    #[test]
    fn long_stack_reports_each_target_once() {
        let surface = HeadlessSurface::new();
        let heights = vec![20.0; 5_000];
        let (root, children) = column(&surface, &heights);
        let policy = ObservationPolicy::new("0px", [0.0]).unwrap();
        let (_mux, seen) = watch(&surface, root, policy, &children);

        assert_eq!(surface.deliver_observations(), 5_000);
        // 600px viewport / 20px rows, plus the row touching the bottom edge.
        let visible = seen.borrow().iter().filter(|(_, visible)| *visible).count();
        assert_eq!(visible, 31);
        assert_eq!(surface.deliver_observations(), 0);
    }

    #[test]
    fn callbacks_may_reenter_the_surface() {
        let surface = HeadlessSurface::new();
        let (root, children) = column(&surface, &[300.0]);
        let mux = VisibilityMultiplexer::new(&surface, root, ObservationPolicy::default());
        let host = surface.clone();
        mux.register(children[0], move |event| {
            host.set_hidden(event.target, true);
            host.commit();
        });

        surface.deliver_observations();
        assert_eq!(surface.measure(children[0]), Some(BoxSize::ZERO));
    }
}
