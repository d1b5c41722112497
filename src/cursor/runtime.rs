//! Cursor Runtime
//!
//! Wires a sensor, a controller and a polling loop together and tears them
//! down in the right order.
//!
//! # Startup
//!
//! 1. Disable the sensor (it may still be delivering to an old callback)
//! 2. Install a callback feeding [`CursorController::on_sample`]
//! 3. Enable the sensor
//! 4. Spawn the [`PollingLoop`]
//!
//! # Shutdown
//!
//! 1. [`CursorController::finish`] releases any held button and raises the
//!    shutdown flag
//! 2. Join the polling thread
//! 3. Disable the sensor and remove the callback
//!
//! The polling thread is fully gone before the sensor and the injection
//! backend are released, so no injection can race their teardown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::controller::{ControllerStats, CursorController};
use super::error::{CursorError, Result};
use super::polling::PollingLoop;
use crate::sensor::{SampleCallback, SensorDevice};

/// Running sensor → controller → backend pipeline
pub struct CursorRuntime {
    controller: Arc<CursorController>,
    sensor: Box<dyn SensorDevice>,
    polling: Option<PollingLoop>,
}

impl CursorRuntime {
    /// Connect the sensor to the controller and start polling
    ///
    /// # Errors
    ///
    /// Returns error if the sensor cannot be enabled or the polling thread
    /// cannot be spawned. The sensor is left disabled in that case.
    pub fn start(
        controller: Arc<CursorController>,
        mut sensor: Box<dyn SensorDevice>,
        poll_interval: Duration,
    ) -> Result<Self> {
        info!("Starting cursor runtime");

        sensor.disable();
        sensor.set_sample_callback(Some(sample_callback(Arc::clone(&controller))));
        if let Err(e) = sensor.enable() {
            sensor.set_sample_callback(None);
            return Err(e);
        }

        let polling = match PollingLoop::spawn(Arc::clone(&controller), poll_interval) {
            Ok(polling) => polling,
            Err(e) => {
                sensor.disable();
                sensor.set_sample_callback(None);
                return Err(e);
            }
        };
        info!("Cursor runtime running, polling every {:?}", polling.interval());

        Ok(Self {
            controller,
            sensor,
            polling: Some(polling),
        })
    }

    /// True until the controller finished or failed
    pub fn is_running(&self) -> bool {
        !self.controller.is_finished()
            && self.polling.as_ref().is_some_and(PollingLoop::is_running)
    }

    /// Stop polling and detach the sensor
    ///
    /// Blocks until the polling thread has exited. Returns the injection
    /// failure that stopped the controller, if there was one.
    pub fn finish(mut self) -> Result<ControllerStats> {
        self.shutdown()?;
        let stats = self.controller.stats();
        info!(
            "Cursor runtime stopped: {} samples, {} sessions ({} taps, {} drags, {} right)",
            stats.samples, stats.sessions_begun, stats.taps, stats.drags, stats.right_clicks
        );
        Ok(stats)
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(mut polling) = self.polling.take() else {
            return Ok(());
        };

        let joined = polling.stop();
        self.sensor.disable();
        self.sensor.set_sample_callback(None);
        joined?;

        match self.controller.failure() {
            Some(cause) => Err(CursorError::Injection(cause)),
            None => Ok(()),
        }
    }
}

impl Drop for CursorRuntime {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Cursor runtime shutdown error: {}", e);
        }
    }
}

fn sample_callback(controller: Arc<CursorController>) -> SampleCallback {
    Arc::new(move |sample| {
        // Injection failures latch inside the controller; the polling loop
        // sees the shutdown flag and exits.
        if let Err(e) = controller.on_sample(sample) {
            match e {
                CursorError::Halted(_) => {}
                other => error!("Sample ({}, {}) failed: {}", sample.x, sample.y, other),
            }
        }
    })
}
