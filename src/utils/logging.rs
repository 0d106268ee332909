use log::{log_enabled, Level};
use std::time::Instant;

/// Traces how long a space query took and how many shapes it reported.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
    shapes: usize,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            shapes: 0,
        }
    }

    /// Adds `count` shapes to the total reported when the timer drops.
    pub fn record(&mut self, count: usize) {
        self.shapes += count;
    }

    pub fn shapes(&self) -> usize {
        self.shapes
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!(
                "end {} ({} µs, {} shapes)",
                self.label,
                elapsed.as_micros(),
                self.shapes
            );
        }
    }
}
