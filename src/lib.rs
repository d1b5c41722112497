//! # ir-cursor
//!
//! Drives the host cursor from a handheld IR pointing sensor.
//!
//! Raw sensor positions are smoothed with a moving average and turned into
//! pointer movement. Taps, drags, long-dwell right clicks and off-screen
//! button selection are recognised from timing and displacement alone.
//!
//! # Architecture
//!
//! ```text
//! ir-cursor
//!   ├─> Sensor (raw samples on the sensor's own thread)
//!   ├─> CursorController (smoothing, zones, click sessions, one lock)
//!   ├─> PollingLoop (timeouts: tap detection and button release)
//!   └─> PointerBackend (move / press / release)
//! ```
//!
//! # Data Flow
//!
//! **Sample Path:** Sensor → `on_sample` → SmoothingFilter → PointerBackend
//!
//! **Timeout Path:** PollingLoop → `on_tick` → ClickSession → PointerBackend

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration
pub mod config;

/// Cursor control state machine
///
/// Smoothing, boundary zones, click sessions, the controller that ties them
/// together under one lock, and the polling loop that advances timeouts.
pub mod cursor;

/// Pointer injection backends
pub mod input;

/// Sensor devices
pub mod sensor;

/// Utility functions
pub mod utils;
