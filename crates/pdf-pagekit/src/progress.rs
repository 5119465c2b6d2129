//! Progress reporting for batch operations
//!
//! Observers only: nothing here can pause or cancel an operation.

/// Receives status text and `(current, total)` page progress.
pub trait ProgressSink {
    fn status(&mut self, _text: &str) {}

    fn progress(&mut self, _current: usize, _total: usize) {}
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Forwards progress to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn status(&mut self, text: &str) {
        log::info!("{}", text);
    }

    fn progress(&mut self, current: usize, total: usize) {
        log::debug!("{}/{}", current, total);
    }
}
