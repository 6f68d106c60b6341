//! Domain model: handles, observation policy, events and dimensions.

pub mod dimensions;
pub mod error;
pub mod event;
pub mod handle;
pub mod key_action;
pub mod policy;

pub use dimensions::{BoxSize, BoxStyle, CellDimensions, Dimension, Length};
pub use error::{AppError, PolicyError, ScopeError};
pub use event::{ObservationRecord, VisibilityEvent};
pub use handle::ElementId;
pub use key_action::KeyAction;
pub use policy::{ObservationPolicy, RootMargin, Thresholds, DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLDS};
