//! Cursor Control
//!
//! Turns noisy IR pointer samples into smoothed cursor movement and
//! simulated button presses using only timing and displacement heuristics.
//!
//! # Architecture
//!
//! ```text
//! Sensor callback ──> on_sample ─┐
//!                                ├─> CursorController (one lock) ──> PointerBackend
//! PollingLoop ──────> on_tick ───┘     ├─> SmoothingFilter
//!                                      ├─> classify / ZoneMap
//!                                      └─> ClickSession
//! ```
//!
//! # Timing
//!
//! | Constant | Value | Meaning |
//! |----------|-------|---------|
//! | [`CLICK_TIMEOUT`] | 60ms | Dwell long enough to become a tap |
//! | [`UP_TIMEOUT`] | 100ms | Silence that ends a tap dwell or releases a session |
//! | [`RIGHT_CLICK_TIMEOUT`] | 750ms | Dwell that becomes a right-button interaction |
//!
//! The polling loop must tick well below [`CLICK_TIMEOUT`]; its period bounds
//! how late a tap or release can be detected.

use std::time::Duration;

pub mod click;
pub mod controller;
pub mod error;
pub mod filter;
pub mod polling;
pub mod runtime;
pub mod zones;

pub use click::{ClickSession, SessionState};
pub use controller::{ControllerSettings, ControllerSnapshot, ControllerStats, CursorController};
pub use error::{CursorError, InjectionError, Result};
pub use filter::SmoothingFilter;
pub use polling::PollingLoop;
pub use runtime::CursorRuntime;
pub use zones::{classify, ButtonKind, Placement, Zone, ZoneMap};

/// Dwell after which a still pointer counts as a deliberate pause
pub const CLICK_TIMEOUT: Duration = Duration::from_millis(60);

/// Idle time that ends a tap dwell or releases a held button
pub const UP_TIMEOUT: Duration = Duration::from_millis(100);

/// Dwell after which a still pointer starts a right-button interaction
pub const RIGHT_CLICK_TIMEOUT: Duration = Duration::from_millis(750);

/// Squared displacement (4 px) above which a dwell turns into a drag
pub const DRAG_THRESHOLD_SQUARED: i64 = 16;

/// Largest accepted smoothing window, in samples
pub const MAX_SMOOTHING: usize = 1024;

/// Default polling loop period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(50);

/// One raw or smoothed pointer position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sample {
    /// X coordinate in screen pixels
    pub x: i32,
    /// Y coordinate in screen pixels
    pub y: i32,
}

impl Sample {
    /// Create a sample
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another position
    pub fn distance_squared(&self, other: Sample) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl From<(i32, i32)> for Sample {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}
