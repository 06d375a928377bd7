// SPDX-License-Identifier: MIT
//
// Cooperative pause/cancel token for a running batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Interval between pause-flag polls while a run is suspended.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct Flags {
    cancel: AtomicBool,
    pause: AtomicBool,
}

/// Shared control token observed by the batch worker between files.
///
/// The UI (or any controller thread) holds one clone and flips flags; the
/// worker holds another and polls them only at the top of the per-file
/// loop, so a file that is already processing always runs to completion.
/// Each flag has a single writer and a single reader, so relaxed ordering
/// is sufficient.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    flags: Arc<Flags>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before the next file. Files already written are
    /// kept; the file currently processing still completes.
    pub fn request_cancel(&self) {
        self.flags.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.cancel.load(Ordering::Relaxed)
    }

    /// Suspend (or resume) the run at the next per-file boundary.
    pub fn set_paused(&self, paused: bool) {
        self.flags.pause.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.flags.pause.load(Ordering::Relaxed)
    }

    /// Block while the pause flag is set, polling at
    /// [`PAUSE_POLL_INTERVAL`]. Returns `false` when cancellation was
    /// requested (before or during the pause), `true` once the run may
    /// proceed.
    pub fn wait_while_paused(&self) -> bool {
        loop {
            if self.is_cancelled() {
                return false;
            }
            if !self.is_paused() {
                return true;
            }
            std::thread::sleep(PAUSE_POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear() {
        let control = BatchControl::new();
        assert!(!control.is_cancelled());
        assert!(!control.is_paused());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let control = BatchControl::new();
        let observer = control.clone();
        control.request_cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn wait_returns_immediately_when_not_paused() {
        let control = BatchControl::new();
        assert!(control.wait_while_paused());
    }

    #[test]
    fn cancel_wins_over_pause() {
        let control = BatchControl::new();
        control.set_paused(true);
        control.request_cancel();
        // A paused run can be cancelled without resuming first.
        assert!(!control.wait_while_paused());
    }

    #[test]
    fn resume_from_another_thread_releases_the_wait() {
        let control = BatchControl::new();
        control.set_paused(true);

        let releaser = control.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            releaser.set_paused(false);
        });

        assert!(control.wait_while_paused());
        handle.join().expect("releaser thread");
    }
}
