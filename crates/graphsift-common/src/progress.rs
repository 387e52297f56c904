//! Per-call progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GraphError, Result};

/// Receives progress fractions from a running algorithm.
pub trait ProgressListener {
    fn on_progress(&mut self, fraction: f64);

    /// Polled at loop boundaries; returning `true` aborts the run with
    /// [`GraphError::Cancelled`].
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Handle an algorithm reports through. Lives for the duration of one call.
pub struct Progress<'a> {
    listener: Option<&'a mut dyn ProgressListener>,
    last: Option<f64>,
}

impl<'a> Progress<'a> {
    pub fn new(listener: &'a mut dyn ProgressListener) -> Self {
        Self {
            listener: Some(listener),
            last: None,
        }
    }

    pub fn silent() -> Self {
        Self {
            listener: None,
            last: None,
        }
    }

    /// Forwards `fraction` to the listener unless it repeats the previous
    /// value.
    pub fn report(&mut self, fraction: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(GraphError::InvalidProgress(fraction));
        }
        if self.last == Some(fraction) {
            return Ok(());
        }
        self.last = Some(fraction);
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_progress(fraction);
        }
        Ok(())
    }

    /// Reports `done / total`, clamped into `[0, 1]`. A zero total counts as
    /// complete.
    pub fn report_ratio(&mut self, done: usize, total: usize) -> Result<()> {
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).min(1.0)
        };
        self.report(fraction)
    }

    pub fn checkpoint(&self) -> Result<()> {
        match self.listener.as_deref() {
            Some(listener) if listener.is_cancelled() => Err(GraphError::Cancelled),
            _ => Ok(()),
        }
    }

    pub fn last_reported(&self) -> Option<f64> {
        self.last
    }
}

impl Default for Progress<'_> {
    fn default() -> Self {
        Self::silent()
    }
}

/// Records every fraction it receives.
#[derive(Debug, Default, Clone)]
pub struct ProgressLog {
    pub fractions: Vec<f64>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<f64> {
        self.fractions.last().copied()
    }

    pub fn is_monotonic(&self) -> bool {
        self.fractions.windows(2).all(|w| w[0] <= w[1])
    }
}

impl ProgressListener for ProgressLog {
    fn on_progress(&mut self, fraction: f64) {
        self.fractions.push(fraction);
    }
}

/// Shared cancellation flag. Clones observe the same flag, so one clone can be
/// handed to another thread while the other drives the algorithm.
#[derive(Debug, Default, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl ProgressListener for CancelToken {
    fn on_progress(&mut self, fraction: f64) {
        tracing::trace!(fraction, "progress");
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
