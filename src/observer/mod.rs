//! Shared visibility observation.
//!
//! # Module Structure
//!
//! - `multiplexer`: [`VisibilityMultiplexer`] - one native tracker fanned out per target
//! - `registry`: slot table backing the multiplexer's dispatch
//! - `scope`: [`MultiplexerScope`] - owns one multiplexer, gates descendants on readiness
//! - `hook`: [`VisibilityHook`] - per-element boolean visibility subscription
//!
//! Data flows scope → multiplexer → hook: the scope builds the multiplexer
//! once its root exists, hooks register their elements through a
//! [`MultiplexerHandle`], and the multiplexer's single native callback
//! ([`BatchSink`]) fans each crossing out to the matching hook.

pub mod hook;
pub mod multiplexer;
mod registry;
pub mod scope;

pub use hook::{Attachment, VisibilityHook};
pub use multiplexer::{BatchSink, MultiplexerHandle, VisibilityMultiplexer};
pub use registry::Callback;
pub use scope::MultiplexerScope;
