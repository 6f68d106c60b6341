//! One native tracker per root, fanned out to many per-target subscribers.
//!
//! # Ownership
//!
//! The owning [`MultiplexerScope`](super::MultiplexerScope) holds the only
//! strong reference. Descendants hold [`MultiplexerHandle`]s and the native
//! tracker holds a [`BatchSink`]; both are weak. Dropping the multiplexer
//! therefore turns every straggler `register`/`unregister` into a no-op and
//! every late batch into a silent drop.
//!
//! # Delivery guarantees
//!
//! - At most one callback per target; registering again replaces it.
//! - Once `unregister(target)` returns, no record for `target` reaches
//!   application code, including records already queued in a batch.
//! - Records in a batch are processed in delivery order, independently.

use super::registry::{Callback, Inserted, Registry};
use crate::host::{NativeTracker, Surface};
use crate::model::{ElementId, ObservationPolicy, ObservationRecord, VisibilityEvent};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

struct Shared {
    root: Option<ElementId>,
    policy: ObservationPolicy,
    /// `None` when there is no backing surface: the multiplexer is inert.
    tracker: RefCell<Option<Box<dyn NativeTracker>>>,
    registry: RefCell<Registry>,
}

impl Shared {
    fn is_inert(&self) -> bool {
        self.tracker.borrow().is_none()
    }

    fn register(&self, target: ElementId, callback: Callback) {
        if self.is_inert() {
            trace!(element = %target, "no surface; registration is inert");
            return;
        }

        let inserted = self.registry.borrow_mut().insert(target, callback);
        debug!(element = %target, replaced = (inserted == Inserted::Replaced), "registered target");

        if let Some(tracker) = self.tracker.borrow_mut().as_mut() {
            if let Inserted::Evicted(stale) = inserted {
                trace!(element = %stale, "evicted older generation");
                tracker.unobserve(stale);
            }
            // Restart native reporting so the (new) subscriber learns the current state.
            tracker.observe(target);
        }
    }

    fn unregister(&self, target: ElementId) {
        if !self.registry.borrow_mut().remove(target) {
            trace!(element = %target, "unregister of unknown target ignored");
            return;
        }
        debug!(element = %target, "unregistered target");

        if let Some(tracker) = self.tracker.borrow_mut().as_mut() {
            tracker.unobserve(target);
        }
    }

    fn dispatch(&self, records: &[ObservationRecord]) {
        for record in records {
            let checked_out = self.registry.borrow_mut().checkout(record.target);
            let Some((token, mut callback)) = checked_out else {
                trace!(element = %record.target, "dropping record for unregistered target");
                continue;
            };

            // Registry is not borrowed here: the callback may re-enter.
            callback(VisibilityEvent::from(*record));

            self.registry
                .borrow_mut()
                .checkin(record.target, token, callback);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(mut tracker) = self.tracker.get_mut().take() {
            tracker.disconnect();
        }
        let remaining = self.registry.get_mut().len();
        self.registry.get_mut().clear();
        debug!(root = ?self.root, remaining, "multiplexer terminated");
    }
}

/// Shares one native visibility tracker among many targets.
///
/// Not `Clone`: exactly one owner. Hand out [`MultiplexerHandle`]s instead.
pub struct VisibilityMultiplexer {
    shared: Rc<Shared>,
}

impl VisibilityMultiplexer {
    /// Build a multiplexer bound to `root` on `surface`.
    ///
    /// If the surface cannot back `root`, the result is inert: registrations
    /// succeed silently and no event is ever delivered.
    pub fn new(surface: &dyn Surface, root: ElementId, policy: ObservationPolicy) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let sink = BatchSink {
                shared: weak.clone(),
            };
            let tracker = surface.create_tracker(root, &policy, sink);
            Shared {
                root: Some(root),
                policy,
                tracker: RefCell::new(tracker),
                registry: RefCell::new(Registry::default()),
            }
        });

        if shared.is_inert() {
            debug!(%root, "surface cannot back root; multiplexer is inert");
        } else {
            debug!(%root, margin = %shared.policy.root_margin(), "multiplexer created");
        }
        Self { shared }
    }

    /// Build a multiplexer with no rendering surface at all.
    pub fn inert(policy: ObservationPolicy) -> Self {
        Self {
            shared: Rc::new(Shared {
                root: None,
                policy,
                tracker: RefCell::new(None),
                registry: RefCell::new(Registry::default()),
            }),
        }
    }

    /// Associate `callback` with `target`, replacing any previous callback.
    pub fn register(&self, target: ElementId, callback: impl FnMut(VisibilityEvent) + 'static) {
        self.shared.register(target, Box::new(callback));
    }

    /// Remove the association for `target`. Safe for unknown targets.
    pub fn unregister(&self, target: ElementId) {
        self.shared.unregister(target);
    }

    /// Weak handle for descendants.
    pub fn handle(&self) -> MultiplexerHandle {
        MultiplexerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Single native callback: fan a batch of records out to subscribers.
    pub fn dispatch(&self, records: &[ObservationRecord]) {
        self.shared.dispatch(records);
    }

    /// Whether this multiplexer has no backing surface.
    pub fn is_inert(&self) -> bool {
        self.shared.is_inert()
    }

    /// Whether `target` currently has a subscriber.
    pub fn is_registered(&self, target: ElementId) -> bool {
        self.shared.registry.borrow().contains(target)
    }

    /// Number of targets with a live subscriber.
    pub fn registered_count(&self) -> usize {
        self.shared.registry.borrow().len()
    }

    /// Root the tracker is bound to (`None` when constructed without a surface).
    pub fn root(&self) -> Option<ElementId> {
        self.shared.root
    }

    /// Policy the tracker was configured with.
    pub fn policy(&self) -> &ObservationPolicy {
        &self.shared.policy
    }
}

impl fmt::Debug for VisibilityMultiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityMultiplexer")
            .field("root", &self.shared.root)
            .field("inert", &self.is_inert())
            .field("registered", &self.registered_count())
            .finish()
    }
}

/// Non-owning reference to a multiplexer, threaded down to descendants.
///
/// Every operation is a silent no-op once the owning scope has unmounted.
#[derive(Clone)]
pub struct MultiplexerHandle {
    shared: Weak<Shared>,
}

impl MultiplexerHandle {
    /// See [`VisibilityMultiplexer::register`].
    pub fn register(&self, target: ElementId, callback: impl FnMut(VisibilityEvent) + 'static) {
        match self.shared.upgrade() {
            Some(shared) => shared.register(target, Box::new(callback)),
            None => trace!(element = %target, "multiplexer gone; registration ignored"),
        }
    }

    /// See [`VisibilityMultiplexer::unregister`].
    pub fn unregister(&self, target: ElementId) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unregister(target);
        }
    }

    /// Whether the owning multiplexer still exists.
    pub fn is_live(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Whether both handles point at the same multiplexer.
    pub fn same_multiplexer(&self, other: &MultiplexerHandle) -> bool {
        Weak::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for MultiplexerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiplexerHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

/// The multiplexer's single native callback, handed to the host tracker.
#[derive(Clone)]
pub struct BatchSink {
    shared: Weak<Shared>,
}

impl BatchSink {
    /// Deliver one batch of crossing records.
    ///
    /// Dropped silently if the multiplexer has terminated.
    pub fn deliver(&self, records: &[ObservationRecord]) {
        match self.shared.upgrade() {
            Some(shared) => shared.dispatch(records),
            None => trace!(count = records.len(), "multiplexer gone; batch dropped"),
        }
    }

    /// A sink connected to nothing, for hosts exercised in isolation.
    pub fn detached() -> Self {
        Self {
            shared: Weak::new(),
        }
    }
}

impl fmt::Debug for BatchSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSink")
            .field("live", &(self.shared.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
#[path = "multiplexer_tests.rs"]
mod tests;
