//! Tests for the visibility multiplexer.

use super::*;
use crate::test_harness::FakeSurface;
use std::cell::{Cell, RefCell};

// ===== Test Helpers =====

fn root() -> ElementId {
    ElementId::new(0, 0)
}

fn el(index: u32) -> ElementId {
    ElementId::new(index, 0)
}

fn record(target: ElementId, is_intersecting: bool) -> ObservationRecord {
    ObservationRecord {
        target,
        is_intersecting,
        ratio: if is_intersecting { 1.0 } else { 0.0 },
    }
}

fn recorder() -> (Rc<RefCell<Vec<bool>>>, impl FnMut(VisibilityEvent) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |event: VisibilityEvent| {
        sink.borrow_mut().push(event.is_intersecting)
    })
}

// ===== Registration =====

#[test]
fn register_observes_target_natively() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (_seen, cb) = recorder();

    mux.register(el(1), cb);

    assert!(mux.is_registered(el(1)));
    assert_eq!(surface.calls(), vec!["observe #1v0"]);
}

#[test]
fn fan_out_reaches_only_matching_target() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (a_seen, a) = recorder();
    let (b_seen, b) = recorder();
    mux.register(el(1), a);
    mux.register(el(2), b);

    surface.deliver(&[record(el(2), true)]);

    assert!(a_seen.borrow().is_empty());
    assert_eq!(*b_seen.borrow(), vec![true]);
}

#[test]
fn batch_preserves_per_target_order() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (seen, cb) = recorder();
    mux.register(el(1), cb);

    surface.deliver(&[
        record(el(1), true),
        record(el(9), true),
        record(el(1), false),
        record(el(1), true),
    ]);

    assert_eq!(*seen.borrow(), vec![true, false, true]);
}

#[test]
fn second_register_replaces_first_callback() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();

    mux.register(el(1), cb1);
    mux.register(el(1), cb2);
    surface.deliver(&[record(el(1), true)]);

    assert!(first.borrow().is_empty());
    assert_eq!(*second.borrow(), vec![true]);
    assert_eq!(mux.registered_count(), 1);
}

#[test]
fn unregister_stops_delivery_and_unobserves() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (seen, cb) = recorder();
    mux.register(el(1), cb);

    mux.unregister(el(1));
    surface.deliver(&[record(el(1), true)]);

    assert!(seen.borrow().is_empty());
    assert_eq!(surface.calls(), vec!["observe #1v0", "unobserve #1v0"]);
}

#[test]
fn newer_generation_unobserves_evicted_target() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (old_seen, old) = recorder();
    let (new_seen, new) = recorder();
    let recycled = ElementId::new(2, 1);

    mux.register(el(2), old);
    mux.register(recycled, new);
    surface.deliver(&[record(el(2), true), record(recycled, true)]);

    assert_eq!(
        surface.calls(),
        vec!["observe #2v0", "unobserve #2v0", "observe #2v1"]
    );
    assert!(old_seen.borrow().is_empty());
    assert_eq!(*new_seen.borrow(), vec![true]);
    assert_eq!(mux.registered_count(), 1);
}

#[test]
fn unregister_unknown_target_is_silent() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());

    mux.unregister(el(42));
    mux.unregister(el(42));

    assert!(surface.calls().is_empty());
}

#[test]
fn unregister_inside_batch_drops_queued_records() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (b_seen, b) = recorder();

    // A's callback unregisters B; B's record later in the same batch must not fire.
    let handle = mux.handle();
    mux.register(el(1), move |_event| handle.unregister(el(2)));
    mux.register(el(2), b);

    surface.deliver(&[record(el(1), true), record(el(2), true)]);

    assert!(b_seen.borrow().is_empty());
    assert!(!mux.is_registered(el(2)));
}

#[test]
fn callback_may_unregister_itself() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    let handle = mux.handle();
    mux.register(el(1), move |event| {
        counter.set(counter.get() + 1);
        handle.unregister(event.target);
    });

    surface.deliver(&[record(el(1), true), record(el(1), false)]);

    assert_eq!(count.get(), 1);
    assert!(!mux.is_registered(el(1)));
}

#[test]
fn callback_may_replace_itself() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (replacement_seen, replacement) = recorder();
    let replacement = RefCell::new(Some(replacement));
    let handle = mux.handle();
    mux.register(el(1), move |event| {
        if let Some(next) = replacement.borrow_mut().take() {
            handle.register(event.target, next);
        }
    });

    surface.deliver(&[record(el(1), true), record(el(1), false)]);

    assert_eq!(*replacement_seen.borrow(), vec![false]);
    assert_eq!(mux.registered_count(), 1);
}

// ===== Degradation =====

#[test]
fn unbacked_root_yields_inert_multiplexer() {
    let surface = FakeSurface::default();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let (seen, cb) = recorder();

    mux.register(el(1), cb);
    mux.unregister(el(1));

    assert!(mux.is_inert());
    assert_eq!(mux.registered_count(), 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn inert_multiplexer_ignores_everything() {
    let mux = VisibilityMultiplexer::inert(ObservationPolicy::default());
    let (seen, cb) = recorder();

    mux.register(el(1), cb);
    mux.dispatch(&[record(el(1), true)]);

    assert!(seen.borrow().is_empty());
    assert_eq!(mux.root(), None);
}

// ===== Termination =====

#[test]
fn dropping_multiplexer_disconnects_and_kills_handles() {
    let surface = FakeSurface::backed();
    let mux = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let handle = mux.handle();
    let (seen, cb) = recorder();
    handle.register(el(1), cb);

    drop(mux);

    assert!(!handle.is_live());
    let (late_seen, late) = recorder();
    handle.register(el(2), late);
    handle.unregister(el(1));
    surface.deliver(&[record(el(1), true), record(el(2), true)]);

    assert!(seen.borrow().is_empty());
    assert!(late_seen.borrow().is_empty());
    assert_eq!(surface.calls().last().map(String::as_str), Some("disconnect"));
}

#[test]
fn handles_compare_by_multiplexer() {
    let surface = FakeSurface::backed();
    let a = VisibilityMultiplexer::new(&surface, root(), ObservationPolicy::default());
    let b = VisibilityMultiplexer::inert(ObservationPolicy::default());

    assert!(a.handle().same_multiplexer(&a.handle()));
    assert!(!a.handle().same_multiplexer(&b.handle()));
}

#[test]
fn detached_sink_drops_batches() {
    BatchSink::detached().deliver(&[record(el(1), true)]);
}
