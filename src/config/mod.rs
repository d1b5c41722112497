//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod types;

pub use types::{CursorConfig, LoggingConfig, ScreenConfig};

use crate::cursor::{
    ControllerSettings, CursorError, ZoneMap, CLICK_TIMEOUT, MAX_SMOOTHING,
};
use crate::input::ScreenSize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Cursor control configuration
    #[serde(default)]
    pub cursor: CursorConfig,
    /// Screen configuration
    #[serde(default)]
    pub screen: ScreenConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let config = Self::parse(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from file without validating it
    ///
    /// Lets CLI overrides replace bad file values before
    /// [`validate`](Self::validate) runs.
    pub fn parse(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), CursorError> {
        if self.cursor.smoothing == 0 {
            return Err(CursorError::Configuration(
                "cursor.smoothing must be at least 1".to_string(),
            ));
        }
        if self.cursor.smoothing > MAX_SMOOTHING {
            return Err(CursorError::Configuration(format!(
                "cursor.smoothing ({}) must be at most {}",
                self.cursor.smoothing, MAX_SMOOTHING
            )));
        }

        ZoneMap::from_codes(&self.cursor.zones)?;

        if self.cursor.poll_interval_us == 0 {
            return Err(CursorError::Configuration(
                "cursor.poll_interval_us must be positive".to_string(),
            ));
        }
        if self.poll_interval() >= CLICK_TIMEOUT {
            return Err(CursorError::Configuration(format!(
                "cursor.poll_interval_us ({}) must be shorter than the {}ms click timeout",
                self.cursor.poll_interval_us,
                CLICK_TIMEOUT.as_millis()
            )));
        }

        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(CursorError::Configuration(format!(
                "invalid screen size {}x{}",
                self.screen.width, self.screen.height
            )));
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        smoothing: Option<usize>,
        zones: Option<String>,
        no_clicks: bool,
    ) -> Self {
        if let Some(smoothing) = smoothing {
            self.cursor.smoothing = smoothing;
        }
        if let Some(zones) = zones {
            self.cursor.zones = zones;
        }
        if no_clicks {
            self.cursor.no_clicks = true;
        }

        self
    }

    /// Controller parameters
    ///
    /// Decodes the zone table; fails only for configurations that did not
    /// pass [`validate`](Self::validate).
    pub fn controller_settings(&self) -> std::result::Result<ControllerSettings, CursorError> {
        Ok(ControllerSettings {
            smoothing: self.cursor.smoothing,
            zones: ZoneMap::from_codes(&self.cursor.zones)?,
            clicks_enabled: !self.cursor.no_clicks,
        })
    }

    /// Polling loop period
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.cursor.poll_interval_us)
    }

    /// Configured screen size
    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize::new(self.screen.width, self.screen.height)
    }
}
