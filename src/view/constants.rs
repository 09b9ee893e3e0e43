//! Scale and timing constants for the terminal host.
//!
//! The core works in pixels; the terminal maps them onto character cells with a fixed
//! scale, roughly matching the 1:2 aspect of a terminal cell.

use std::time::Duration;

/// Pixels per terminal column.
pub const PX_PER_COLUMN: f64 = 10.0;

/// Pixels per terminal row.
pub const PX_PER_ROW: f64 = 20.0;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Poll timeout while a pass is in flight (about 60 frames per second).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Poll timeout while idle.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Views below this opacity render dimmed.
pub const DIM_OPACITY: f64 = 0.5;

/// Container width in pixels for a terminal `columns` wide.
pub fn width_px(columns: u16) -> f64 {
    f64::from(columns.max(1)) * PX_PER_COLUMN
}
