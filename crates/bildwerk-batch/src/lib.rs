// SPDX-License-Identifier: MIT
//
// Bildwerk batch layer: sequential per-file orchestration with a
// cooperative pause/cancel token, progress reporting, a once-per-run log
// file, and best-effort folder reveal.

pub mod control;
pub mod log;
pub mod progress;
pub mod reveal;
pub mod runner;
pub mod scan;

pub use control::BatchControl;
pub use log::RunLog;
pub use progress::{NullSink, ProgressEvent, ProgressSink};
pub use runner::{BatchConfig, BatchRunner, BatchSummary};
pub use scan::list_images;
