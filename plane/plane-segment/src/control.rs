//! External run control: pause, resume and stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cloneable handle controlling a running segmentation from any thread.
///
/// The engine polls it at the head of every step and growth iteration, so a
/// request takes effect after the current iteration completes.
///
/// # Example
///
/// ```
/// use plane_segment::SegmentationControl;
///
/// let control = SegmentationControl::new();
/// let remote = control.clone();
///
/// remote.pause();
/// assert!(control.is_paused());
/// remote.resume();
/// remote.stop();
/// assert!(control.is_stopped());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SegmentationControl {
    paused: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl SegmentationControl {
    /// Creates a running, unpaused control.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a pause.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Lifts a pause.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Requests the run to stop. Irreversible.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Returns true while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Returns true once stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Blocks while paused, sleeping `poll` between checks. Returns false if
    /// the run was stopped.
    pub(crate) fn wait_while_paused(&self, poll: Duration) -> bool {
        loop {
            if self.is_stopped() {
                return false;
            }
            if !self.is_paused() {
                return true;
            }
            std::thread::sleep(poll);
        }
    }
}
