//! Progress reporting and cooperative cancellation.

use crate::core::asterism::Quality;

/// Snapshot sent after each evaluated combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// Quality of the combination just evaluated, `None` if the estimator
    /// failed on it.
    pub quality: Option<Quality>,
    pub evaluated: u64,
    pub total: u64,
    /// Whether the combination produced a usable asterism.
    pub usable: bool,
}

impl ProgressEvent {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.evaluated as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Receives progress events. Returning `false` stops the analysis.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent) -> bool;

    fn set_title(&self, _title: &str) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) -> bool + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) -> bool {
        self(event)
    }
}

/// Sink that ignores events and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) -> bool {
        true
    }
}
