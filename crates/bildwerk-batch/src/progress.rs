// SPDX-License-Identifier: MIT
//
// Progress reporting port for UI integration.

use bildwerk_core::FileOutcome;

/// Events emitted by the batch runner as files move through the run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Processing of a file is starting.
    FileStarted {
        index: usize,
        total: usize,
        name: String,
    },
    /// A file reached a terminal state (saved or save-failed).
    FileFinished {
        index: usize,
        name: String,
        outcome: FileOutcome,
    },
    /// An unreadable input was excluded from the batch.
    FileSkipped { index: usize, name: String },
    /// The run ended; counters cover every attempted file.
    Finished {
        saved: usize,
        failed: usize,
        skipped: usize,
    },
}

/// Port for receiving progress events.
///
/// Implementations must be cheap and non-blocking: events are emitted from
/// the worker thread between pipeline stages.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that discards all events.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
