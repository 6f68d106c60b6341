//! Placeholder-until-visible rendering with size pinning.
//!
//! A cell renders in two phases per frame:
//!
//! 1. [`render`](DeferredContentCell::render) picks the mode from the hook's
//!    visibility and yields a [`CellFrame`] for the host to commit;
//! 2. [`after_commit`](DeferredContentCell::after_commit) runs synchronously
//!    once the host has laid the frame out. On a PLACEHOLDER → CONTENT
//!    transition it measures the content box and pins the size, so the next
//!    placeholder occupies exactly the space the content did.
//!
//! The box element stays attached across the swap; only its style and
//! children change.

use crate::host::Surface;
use crate::model::{BoxSize, BoxStyle, CellDimensions, Dimension, ElementId, Length};
use crate::observer::{MultiplexerHandle, VisibilityHook};
use std::fmt;
use tracing::debug;

/// Which of the two renditions a cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellMode {
    /// Empty sized box (initial state).
    #[default]
    Placeholder,
    /// Real content in an unconstrained box.
    Content,
}

impl fmt::Display for CellMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellMode::Placeholder => write!(f, "placeholder"),
            CellMode::Content => write!(f, "content"),
        }
    }
}

/// What the host should commit for one cell this frame.
#[derive(Debug)]
pub enum CellFrame<'a, C> {
    /// Empty box sized from pinned dimensions or the minimum height.
    Placeholder {
        /// Box element (attachment point), if mounted.
        element: Option<ElementId>,
        /// Size constraints.
        style: BoxStyle,
    },
    /// Real content inside an `auto × auto` box.
    Content {
        /// Box element (attachment point), if mounted.
        element: Option<ElementId>,
        /// Always [`BoxStyle::AUTO`].
        style: BoxStyle,
        /// Content to render inside the box.
        content: &'a C,
    },
}

impl<C> CellFrame<'_, C> {
    /// Box element this frame targets.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            CellFrame::Placeholder { element, .. } | CellFrame::Content { element, .. } => *element,
        }
    }

    /// Box style for this frame.
    pub fn style(&self) -> BoxStyle {
        match self {
            CellFrame::Placeholder { style, .. } | CellFrame::Content { style, .. } => *style,
        }
    }

    /// Mode this frame renders.
    pub fn mode(&self) -> CellMode {
        match self {
            CellFrame::Placeholder { .. } => CellMode::Placeholder,
            CellFrame::Content { .. } => CellMode::Content,
        }
    }
}

/// A list item that defers its content until visible.
pub struct DeferredContentCell<C> {
    hook: VisibilityHook,
    min_height: Length,
    dimensions: CellDimensions,
    content: C,
    mode: CellMode,
    /// Entered CONTENT this frame; `after_commit` must measure.
    measure_pending: bool,
    /// Hook version the last render reflected.
    rendered_version: Option<u64>,
}

impl<C> DeferredContentCell<C> {
    /// Create a cell bound to the nearest scope's multiplexer.
    ///
    /// `min_height` sizes the placeholder until a measurement is pinned.
    pub fn new(multiplexer: Option<&MultiplexerHandle>, min_height: Length, content: C) -> Self {
        Self {
            hook: VisibilityHook::new(multiplexer),
            min_height,
            dimensions: CellDimensions::default(),
            content,
            mode: CellMode::Placeholder,
            measure_pending: false,
            rendered_version: None,
        }
    }

    /// Attach the box element the host created for this cell.
    pub fn mount(&mut self, element: ElementId) {
        self.hook.attach(Some(element));
    }

    /// Detach the box element.
    pub fn unmount(&mut self) {
        self.hook.attach(None);
        self.measure_pending = false;
    }

    /// Phase one: choose the rendition for this frame.
    ///
    /// CONTENT iff the latest delivered event for the attached element was
    /// intersecting.
    pub fn render(&mut self) -> CellFrame<'_, C> {
        let next = if self.hook.is_visible() {
            CellMode::Content
        } else {
            CellMode::Placeholder
        };

        match (self.mode, next) {
            (CellMode::Placeholder, CellMode::Content) => self.measure_pending = true,
            (_, CellMode::Placeholder) => self.measure_pending = false,
            _ => {}
        }
        self.mode = next;
        self.rendered_version = Some(self.hook.version());

        let element = self.hook.attached();
        match next {
            CellMode::Placeholder => CellFrame::Placeholder {
                element,
                style: self.placeholder_style(),
            },
            CellMode::Content => CellFrame::Content {
                element,
                style: BoxStyle::AUTO,
                content: &self.content,
            },
        }
    }

    /// Phase two: synchronous post-commit hook.
    ///
    /// Measures the committed content box once per PLACEHOLDER → CONTENT
    /// transition and pins the result. An unavailable or zero-size box pins
    /// zero; there is no retry. Returns the newly pinned dimensions, if any.
    pub fn after_commit(&mut self, surface: &dyn Surface) -> Option<CellDimensions> {
        if !self.measure_pending || self.mode != CellMode::Content {
            return None;
        }
        self.measure_pending = false;

        let measured = self
            .hook
            .attached()
            .and_then(|element| surface.measure(element))
            .unwrap_or(BoxSize::ZERO);
        self.dimensions.pin(measured);

        debug!(
            element = ?self.hook.attached(),
            dimensions = %self.dimensions,
            "pinned content size"
        );
        Some(self.dimensions)
    }

    /// Style the placeholder box is rendered with.
    ///
    /// Pinned axes use the pinned pixels; an unpinned height falls back to
    /// `auto` with the caller's minimum height as floor.
    ///
    /// A pinned height is a fixed `height` rather than a `min_height` floor:
    /// a placeholder has no content that could grow it, so both resolve to
    /// the same box, and a fixed height keeps the pin visible in the style.
    pub fn placeholder_style(&self) -> BoxStyle {
        let height = self.dimensions.height();
        BoxStyle {
            width: self.dimensions.width(),
            height,
            min_height: match height {
                Dimension::Auto => Some(self.min_height),
                Dimension::Px(_) => None,
            },
        }
    }

    /// Whether visibility changed since the last render.
    pub fn needs_render(&self) -> bool {
        self.rendered_version != Some(self.hook.version())
    }

    /// Mode of the last render.
    pub fn mode(&self) -> CellMode {
        self.mode
    }

    /// Cached placeholder dimensions.
    pub fn dimensions(&self) -> CellDimensions {
        self.dimensions
    }

    /// Current hook visibility (may be ahead of the last render).
    pub fn is_visible(&self) -> bool {
        self.hook.is_visible()
    }

    /// Attached box element.
    pub fn element(&self) -> Option<ElementId> {
        self.hook.attached()
    }

    /// Minimum placeholder height.
    pub fn min_height(&self) -> Length {
        self.min_height
    }

    /// Deferred content.
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Consume the cell, returning its content.
    pub fn into_content(self) -> C {
        self.content
    }

    /// Request re-render callbacks from the underlying hook.
    pub fn on_visibility_change(&self, listener: impl Fn(bool) + 'static) {
        self.hook.on_change(listener);
    }
}

impl<C> fmt::Debug for DeferredContentCell<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredContentCell")
            .field("mode", &self.mode)
            .field("dimensions", &self.dimensions)
            .field("min_height", &self.min_height)
            .field("hook", &self.hook)
            .finish()
    }
}

#[cfg(test)]
#[path = "deferred_tests.rs"]
mod tests;
