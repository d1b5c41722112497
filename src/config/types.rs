//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::cursor::DEFAULT_POLL_INTERVAL;

/// Cursor control configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorConfig {
    /// Smoothing window capacity in samples (>= 1)
    #[serde(default = "default_smoothing")]
    pub smoothing: usize,

    /// Zone action codes, top, right, bottom, left
    /// ('0' left, '1' move only, '2' right, '3' middle)
    #[serde(default = "default_zones")]
    pub zones: String,

    /// Move the cursor without ever pressing buttons
    #[serde(default)]
    pub no_clicks: bool,

    /// Polling loop period in microseconds
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,
}

fn default_smoothing() -> usize {
    5
}

fn default_zones() -> String {
    "0000".to_string()
}

fn default_poll_interval_us() -> u64 {
    DEFAULT_POLL_INTERVAL.as_micros() as u64
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            zones: default_zones(),
            no_clicks: false,
            poll_interval_us: default_poll_interval_us(),
        }
    }
}

/// Screen geometry used by the dry-run backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default log level when neither RUST_LOG nor -v is given
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}
