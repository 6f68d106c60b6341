//! Deferred list cells.
//!
//! - `deferred`: [`DeferredContentCell`] - placeholder until visible, then
//!   content; pins measured size for later placeholders

pub mod deferred;

pub use deferred::{CellFrame, CellMode, DeferredContentCell};
