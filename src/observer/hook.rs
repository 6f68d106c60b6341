//! Per-element visibility subscription.
//!
//! A [`VisibilityHook`] owns one boolean visibility state and an attachment
//! point. Handing the attachment point an element registers it with the
//! enclosing scope's multiplexer; handing it `None` unregisters. The state is
//! written only by the multiplexer's fan-out for the currently attached element.
//!
//! Without an enclosing scope the hook still works but never reports visible.
//! The same holds when the scope has no rendering surface: deferred content
//! stays deferred in non-interactive rendering.

use super::multiplexer::MultiplexerHandle;
use crate::model::ElementId;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

type ChangeListener = Rc<dyn Fn(bool)>;

struct HookState {
    multiplexer: Option<MultiplexerHandle>,
    visible: Cell<bool>,
    attached: Cell<Option<ElementId>>,
    /// Bumped on every visibility change; owners compare it to decide re-rendering.
    version: Cell<u64>,
    listener: RefCell<Option<ChangeListener>>,
}

impl HookState {
    fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) == visible {
            return;
        }
        self.version.set(self.version.get() + 1);

        // Clone out so the listener may touch the hook again.
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(visible);
        }
    }
}

fn attach(state: &Rc<HookState>, element: Option<ElementId>) {
    let previous = state.attached.get();
    if previous == element {
        return;
    }

    if let (Some(previous), Some(mux)) = (previous, &state.multiplexer) {
        mux.unregister(previous);
    }
    state.attached.set(element);

    // Nothing has been delivered for the new element yet.
    state.set_visible(false);

    let (Some(element), Some(mux)) = (element, &state.multiplexer) else {
        return;
    };
    debug!(%element, "attaching element");

    let weak: Weak<HookState> = Rc::downgrade(state);
    mux.register(element, move |event| {
        // Owner gone: update-after-unmount is ignored.
        let Some(state) = weak.upgrade() else {
            return;
        };
        if state.attached.get() == Some(event.target) {
            state.set_visible(event.is_intersecting);
        }
    });
}

/// Boolean visibility of one element, fed by the nearest multiplexer.
pub struct VisibilityHook {
    state: Rc<HookState>,
}

impl VisibilityHook {
    /// Create a hook bound to the nearest scope's multiplexer, if any.
    pub fn new(multiplexer: Option<&MultiplexerHandle>) -> Self {
        if multiplexer.is_none() {
            warn!("visibility hook created outside a multiplexer scope; it never reports visible");
        }
        Self {
            state: Rc::new(HookState {
                multiplexer: multiplexer.cloned(),
                visible: Cell::new(false),
                attached: Cell::new(None),
                version: Cell::new(0),
                listener: RefCell::new(None),
            }),
        }
    }

    /// Attachment function: mount (`Some`) or unmount (`None`) an element.
    ///
    /// A previously attached element is unregistered before a new one is
    /// registered. Re-attaching the current element is a no-op.
    pub fn attach(&self, element: Option<ElementId>) {
        attach(&self.state, element);
    }

    /// Detachable attachment point the caller can store and invoke later.
    pub fn attachment(&self) -> Attachment {
        Attachment {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    /// Currently attached element.
    pub fn attached(&self) -> Option<ElementId> {
        self.state.attached.get()
    }

    /// Change counter; differs from a remembered value iff visibility changed since.
    pub fn version(&self) -> u64 {
        self.state.version.get()
    }

    /// Call `listener` with the new state on every change (re-render request).
    pub fn on_change(&self, listener: impl Fn(bool) + 'static) {
        *self.state.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Whether the hook is bound to a multiplexer that still exists.
    pub fn is_bound(&self) -> bool {
        self.state
            .multiplexer
            .as_ref()
            .is_some_and(MultiplexerHandle::is_live)
    }
}

impl Drop for VisibilityHook {
    fn drop(&mut self) {
        if let (Some(element), Some(mux)) = (self.state.attached.get(), &self.state.multiplexer) {
            mux.unregister(element);
        }
    }
}

impl fmt::Debug for VisibilityHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityHook")
            .field("visible", &self.is_visible())
            .field("attached", &self.attached())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Settable reference handed to whatever mounts the element.
///
/// Holds the hook weakly: once the hook is dropped, setting it does nothing.
#[derive(Clone)]
pub struct Attachment {
    state: Weak<HookState>,
}

impl Attachment {
    /// Mount (`Some`) or unmount (`None`) an element.
    pub fn set(&self, element: Option<ElementId>) {
        if let Some(state) = self.state.upgrade() {
            attach(&state, element);
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("live", &(self.state.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
