//! Moving-Average Smoothing
//!
//! Raw IR positions jitter by a few pixels even when the pointer is held
//! still. The filter keeps the last `capacity` samples and reports their
//! per-axis mean, truncated toward zero.

use std::collections::VecDeque;

use tracing::trace;

use super::error::{CursorError, Result};
use super::{Sample, MAX_SMOOTHING};

/// Sliding-window moving average over raw samples
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    /// Most recent samples, oldest at the front
    window: VecDeque<Sample>,

    /// Maximum window length
    capacity: usize,
}

impl SmoothingFilter {
    /// Create an empty filter
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Configuration`] if `capacity` is zero or
    /// above [`MAX_SMOOTHING`].
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CursorError::Configuration(
                "smoothing window capacity must be at least 1".to_string(),
            ));
        }
        if capacity > MAX_SMOOTHING {
            return Err(CursorError::Configuration(format!(
                "smoothing window capacity {} exceeds the maximum of {}",
                capacity, MAX_SMOOTHING
            )));
        }

        Ok(Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Push a sample and return the smoothed position
    pub fn update(&mut self, sample: Sample) -> Sample {
        self.window.push_back(sample);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let n = self.window.len() as i64;
        let (sum_x, sum_y) = self
            .window
            .iter()
            .fold((0i64, 0i64), |(sx, sy), s| (sx + s.x as i64, sy + s.y as i64));

        // Integer division truncates toward zero on both axes
        let averaged = Sample::new((sum_x / n) as i32, (sum_y / n) as i32);

        trace!(
            "Smoothing: raw=({}, {}) avg=({}, {}) window={}",
            sample.x,
            sample.y,
            averaged.x,
            averaged.y,
            n
        );

        averaged
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// True before the first sample
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
