//! Layout dimension constants for TUI rendering.
//!
//! The board lays cards out in pixels on a headless surface; these constants
//! fix how pixels map onto terminal cells.

/// Pixels per terminal row.
pub const ROW_PX: f64 = 20.0;

/// Pixels per terminal column.
pub const COL_PX: f64 = 8.0;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Smallest generated card, in rows (border + title + body).
pub const MIN_CARD_ROWS: u16 = 3;

/// Largest generated card, in rows.
pub const MAX_CARD_ROWS: u16 = 12;

/// Rows scrolled by one `ScrollDown`/`ScrollUp`.
pub const SCROLL_STEP_ROWS: f64 = 1.0;
