//! Polling Loop
//!
//! Timeouts only advance when something looks at the clock. Samples stop
//! arriving exactly when a tap or a release has to be detected, so a
//! dedicated thread ticks the controller at a fixed short period.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use super::controller::CursorController;
use super::error::{CursorError, Result};

/// Background thread calling [`CursorController::on_tick`]
pub struct PollingLoop {
    controller: Arc<CursorController>,
    thread_handle: Option<JoinHandle<Result<()>>>,
    interval: Duration,
}

impl PollingLoop {
    /// Spawn the polling thread
    ///
    /// # Errors
    ///
    /// Returns error if thread creation fails
    pub fn spawn(controller: Arc<CursorController>, interval: Duration) -> Result<Self> {
        let loop_controller = Arc::clone(&controller);
        let thread_handle = thread::Builder::new()
            .name("cursor-poll".to_string())
            .spawn(move || run_polling_loop(&loop_controller, interval))
            .map_err(|e| CursorError::ThreadPanic(format!("Thread spawn failed: {}", e)))?;

        debug!("Polling thread spawned");

        Ok(Self {
            controller,
            thread_handle: Some(thread_handle),
            interval,
        })
    }

    /// Tick period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True while the thread has not exited
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signal shutdown and wait for the thread to exit
    ///
    /// Returns the loop's own error, if it stopped on one.
    pub fn stop(&mut self) -> Result<()> {
        self.controller.finish();
        self.join()
    }

    /// Wait for the thread to exit without signalling it
    pub fn join(&mut self) -> Result<()> {
        let Some(handle) = self.thread_handle.take() else {
            return Ok(());
        };

        match handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!("Polling thread panicked");
                Err(CursorError::ThreadPanic("polling thread panicked".to_string()))
            }
        }
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("Dropping PollingLoop");
            let _ = self.stop();
        }
    }
}

fn run_polling_loop(controller: &CursorController, interval: Duration) -> Result<()> {
    debug!("Polling thread running");
    let mut ticks: u64 = 0;

    loop {
        if controller.is_finished() {
            break;
        }

        match controller.on_tick(Instant::now()) {
            Ok(()) => {}
            // Sample side already failed and reported it
            Err(CursorError::Halted(_)) => break,
            Err(e) => return Err(e),
        }
        ticks += 1;

        thread::sleep(interval);
    }

    info!("Polling loop exited after {} ticks", ticks);
    Ok(())
}
