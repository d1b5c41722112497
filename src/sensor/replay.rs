//! Scripted Sensor Playback
//!
//! Replays recorded pointer samples with their original spacing. Script
//! format, one step per line:
//!
//! ```text
//! # delay_ms  x    y
//! 0           640  360
//! 8           641  360
//! 120         -20  300   # off-screen, left zone
//! ```
//!
//! Each delay is relative to the previous step. Blank lines and `#`
//! comments are ignored.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::{SampleCallback, SensorDevice};
use crate::cursor::{CursorError, Result, Sample};

/// One scripted sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStep {
    /// Wait before delivering this sample
    pub delay: Duration,
    /// Raw position
    pub sample: Sample,
}

impl ReplayStep {
    /// Create a step
    pub fn new(delay_ms: u64, x: i32, y: i32) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            sample: Sample::new(x, y),
        }
    }
}

/// Parse a replay script
///
/// # Errors
///
/// Returns [`CursorError::Sensor`] naming the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<ReplayStep>> {
    let mut steps = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [delay, x, y] = fields.as_slice() else {
            return Err(CursorError::Sensor(format!(
                "line {}: expected `delay_ms x y`, got {:?}",
                index + 1,
                raw_line
            )));
        };

        let bad = |what: &str| {
            CursorError::Sensor(format!("line {}: invalid {} in {:?}", index + 1, what, raw_line))
        };
        steps.push(ReplayStep::new(
            delay.parse().map_err(|_| bad("delay"))?,
            x.parse().map_err(|_| bad("x"))?,
            y.parse().map_err(|_| bad("y"))?,
        ));
    }

    Ok(steps)
}

struct Playback {
    thread_handle: JoinHandle<()>,
    stop_tx: Sender<()>,
}

/// Sensor that plays back a fixed script on its own thread
pub struct ReplaySensor {
    script: Arc<Vec<ReplayStep>>,
    callback: Arc<RwLock<Option<SampleCallback>>>,
    playback: Option<Playback>,
    done_tx: Sender<()>,
    done_rx: Receiver<()>,
}

impl ReplaySensor {
    /// Create a sensor for the given steps
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        let (done_tx, done_rx) = unbounded();
        Self {
            script: Arc::new(steps),
            callback: Arc::new(RwLock::new(None)),
            playback: None,
            done_tx,
            done_rx,
        }
    }

    /// Load a script file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CursorError::Sensor(format!("cannot read replay script {}: {}", path.display(), e))
        })?;
        let steps = parse_script(&text)?;
        info!("Loaded {} replay steps from {}", steps.len(), path.display());
        Ok(Self::new(steps))
    }

    /// Number of scripted samples
    pub fn len(&self) -> usize {
        self.script.len()
    }

    /// True for an empty script
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Receives one message each time playback reaches the end
    pub fn completion(&self) -> Receiver<()> {
        self.done_rx.clone()
    }

    /// True while the playback thread is alive
    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.thread_handle.is_finished())
    }
}

impl SensorDevice for ReplaySensor {
    fn enable(&mut self) -> Result<()> {
        if self.playback.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let script = Arc::clone(&self.script);
        let callback = Arc::clone(&self.callback);
        let done_tx = self.done_tx.clone();

        let thread_handle = thread::Builder::new()
            .name("sensor-replay".to_string())
            .spawn(move || run_playback(&script, &callback, &stop_rx, &done_tx))
            .map_err(|e| CursorError::Sensor(format!("Thread spawn failed: {}", e)))?;

        debug!("Replay sensor enabled");
        self.playback = Some(Playback {
            thread_handle,
            stop_tx,
        });
        Ok(())
    }

    fn disable(&mut self) {
        let Some(playback) = self.playback.take() else {
            return;
        };

        let _ = playback.stop_tx.try_send(());
        if playback.thread_handle.join().is_err() {
            warn!("Replay thread panicked");
        }
        debug!("Replay sensor disabled");
    }

    fn set_sample_callback(&mut self, callback: Option<SampleCallback>) {
        *self.callback.write() = callback;
    }
}

impl Drop for ReplaySensor {
    fn drop(&mut self) {
        self.disable();
    }
}

fn run_playback(
    script: &[ReplayStep],
    callback: &RwLock<Option<SampleCallback>>,
    stop_rx: &Receiver<()>,
    done_tx: &Sender<()>,
) {
    for step in script {
        match stop_rx.recv_timeout(step.delay) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                debug!("Replay interrupted");
                return;
            }
        }

        // Clone out so the callback runs without holding the slot lock
        let current = callback.read().clone();
        if let Some(deliver) = current {
            deliver(step.sample);
        }
    }

    info!("Replay finished ({} samples)", script.len());
    let _ = done_tx.send(());
}
