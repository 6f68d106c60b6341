//! Test doubles for the host collaborator contract.
//!
//! [`FakeSurface`] backs at most one tracker and records every native call,
//! so tests can assert on exactly what the multiplexer asked of the host and
//! hand-deliver batches through the captured sink. Sizes reported by
//! `measure` are set per element.

use crate::host::{NativeTracker, Surface};
use crate::model::{BoxSize, ElementId, ObservationPolicy, ObservationRecord};
use crate::observer::BatchSink;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Recording surface with a single hand-driven tracker.
#[derive(Default)]
pub struct FakeSurface {
    backed: Cell<bool>,
    sink: RefCell<Option<BatchSink>>,
    calls: Rc<RefCell<Vec<String>>>,
    sizes: RefCell<HashMap<ElementId, BoxSize>>,
}

impl FakeSurface {
    /// Surface able to back any root.
    pub fn backed() -> Self {
        let surface = Self::default();
        surface.backed.set(true);
        surface
    }

    /// Hand a batch to the tracker's sink, as the native callback would.
    ///
    /// # Panics
    ///
    /// Panics if no tracker was created.
    pub fn deliver(&self, records: &[ObservationRecord]) {
        let sink = self.sink.borrow().clone().expect("tracker created");
        sink.deliver(records);
    }

    /// Deliver one record.
    pub fn cross(&self, target: ElementId, is_intersecting: bool, ratio: f64) {
        self.deliver(&[ObservationRecord {
            target,
            is_intersecting,
            ratio,
        }]);
    }

    /// Native calls made so far, formatted as `"observe #1v0"` etc.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Size `measure` reports for `element`.
    pub fn set_size(&self, element: ElementId, size: BoxSize) {
        self.sizes.borrow_mut().insert(element, size);
    }
}

struct FakeTracker {
    calls: Rc<RefCell<Vec<String>>>,
}

impl NativeTracker for FakeTracker {
    fn observe(&mut self, target: ElementId) {
        self.calls.borrow_mut().push(format!("observe {target}"));
    }

    fn unobserve(&mut self, target: ElementId) {
        self.calls.borrow_mut().push(format!("unobserve {target}"));
    }

    fn disconnect(&mut self) {
        self.calls.borrow_mut().push("disconnect".to_string());
    }
}

impl Surface for FakeSurface {
    fn create_tracker(
        &self,
        _root: ElementId,
        _policy: &ObservationPolicy,
        sink: BatchSink,
    ) -> Option<Box<dyn NativeTracker>> {
        if !self.backed.get() {
            return None;
        }
        *self.sink.borrow_mut() = Some(sink);
        Some(Box::new(FakeTracker {
            calls: Rc::clone(&self.calls),
        }))
    }

    fn measure(&self, element: ElementId) -> Option<BoxSize> {
        self.sizes.borrow().get(&element).copied()
    }
}
