//! Plumbing shared by spreadsheet export and import runs
//!
//! - [`ProgressReporter`] forwards progress to a callback and never lets the
//!   percentage move backward within a run.
//! - [`CancelSignal`] is a cloneable flag a caller flips to abandon a run.
//! - [`InterchangeGate`] admits one run at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Phase, Progress, ProgressStatus};

/// Monotonic progress forwarding for one run
pub struct ProgressReporter<F: FnMut(&Progress)> {
    callback: F,
    last: u8,
}

impl<F: FnMut(&Progress)> ProgressReporter<F> {
    pub fn new(callback: F) -> Self {
        Self { callback, last: 0 }
    }

    fn emit(&mut self, status: ProgressStatus, progress: u8, message: String) {
        let progress = progress.min(100).max(self.last);
        self.last = progress;
        let snapshot = Progress::new(status, progress, message);
        debug!(status = ?snapshot.status, progress = snapshot.progress, message = %snapshot.message, "progress");
        (self.callback)(&snapshot);
    }

    /// Report progress inside a phase
    pub fn running(&mut self, phase: Phase, progress: u8, message: impl Into<String>) {
        // 100 is reserved for completion
        self.emit(ProgressStatus::Running(phase), progress.min(99), message.into());
    }

    /// Report progress within `[start, end]` for step `done` of `total`
    pub fn proportional(
        &mut self,
        phase: Phase,
        start: u8,
        end: u8,
        done: usize,
        total: usize,
        message: impl Into<String>,
    ) {
        let span = end.saturating_sub(start) as usize;
        let offset = if total == 0 {
            span
        } else {
            span * done.min(total) / total
        };
        self.running(phase, start + offset as u8, message);
    }

    pub fn complete(&mut self, message: impl Into<String>) {
        self.emit(ProgressStatus::Complete, 100, message.into());
    }

    /// Report failure; progress stays where the run stopped
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(progress = self.last, "{}", message);
        let last = self.last;
        self.emit(ProgressStatus::Error, last, message);
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}

/// Caller-owned cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Admits at most one run of a kind at a time
#[derive(Debug, Clone, Default)]
pub struct InterchangeGate {
    busy: Arc<AtomicBool>,
}

impl InterchangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate; `None` while another run holds it
    pub fn try_acquire(&self) -> Option<GateGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped
#[derive(Debug)]
pub struct GateGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
