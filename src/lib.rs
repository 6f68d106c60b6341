//! Sightline
//!
//! Shared visibility tracking for long scrolling lists.
//!
//! One [`VisibilityMultiplexer`](observer::VisibilityMultiplexer) per scroll
//! container shares a single native visibility tracker among every item in
//! it. Items subscribe through a [`VisibilityHook`](observer::VisibilityHook)
//! and render as a [`DeferredContentCell`](cell::DeferredContentCell): an
//! empty placeholder until visible, real content while visible, and a
//! placeholder pinned to the measured content size afterwards so scroll
//! height stays stable.
//!
//! # Module Structure
//!
//! - `model`: element handles, observation policy, events, dimensions, errors
//! - `observer`: multiplexer, scope and hook
//! - `cell`: deferred content cell (measure-then-commit)
//! - `host`: rendering-surface contract and an in-memory implementation
//! - `list`: two-phase frame driver over a list of cells
//! - `config`, `logging`: ambient configuration and tracing setup
//! - `view`: terminal demo

pub mod cell;
pub mod config;
pub mod host;
pub mod list;
pub mod logging;
pub mod model;
pub mod observer;
pub mod view;

#[cfg(test)]
mod test_harness;
