//! IR Sensor Devices
//!
//! A sensor produces raw 2D positions and hands each one to a registered
//! callback on its own thread. The cursor runtime installs a callback that
//! feeds [`CursorController::on_sample`](crate::cursor::CursorController::on_sample).

use std::sync::Arc;

use crate::cursor::{Result, Sample};

pub mod replay;

pub use replay::{ReplaySensor, ReplayStep};

/// Callback invoked once per raw IR event
pub type SampleCallback = Arc<dyn Fn(Sample) + Send + Sync + 'static>;

/// Source of raw pointer samples
pub trait SensorDevice: Send {
    /// Start delivering samples to the callback
    fn enable(&mut self) -> Result<()>;

    /// Stop delivering samples
    ///
    /// Once this returns, the callback is not running and will not be
    /// invoked again until the next [`enable`](Self::enable).
    fn disable(&mut self);

    /// Install or remove the sample callback
    fn set_sample_callback(&mut self, callback: Option<SampleCallback>);
}
