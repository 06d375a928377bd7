// SPDX-License-Identifier: MIT
//
// Core domain types for the Bildwerk batch enhancer.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pair of sharpening intensities, selected per image by text detection.
///
/// Both values are clamped to the supported kernel range [0.0, 3.0] on
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpenProfile {
    /// Intensity applied to images without detected text.
    pub standard: f32,
    /// Intensity applied to images containing readable text.
    pub text: f32,
}

/// Supported intensity range for the sharpening kernels.
pub const INTENSITY_RANGE: (f32, f32) = (0.0, 3.0);

impl SharpenProfile {
    pub fn new(standard: f32, text: f32) -> Self {
        let (lo, hi) = INTENSITY_RANGE;
        Self {
            standard: standard.clamp(lo, hi),
            text: text.clamp(lo, hi),
        }
    }

    /// Pick the intensity for one image given the detection result.
    pub fn intensity_for(&self, text_detected: bool) -> f32 {
        if text_detected {
            self.text
        } else {
            self.standard
        }
    }
}

impl Default for SharpenProfile {
    fn default() -> Self {
        Self {
            standard: 1.0,
            text: 1.5,
        }
    }
}

/// One token reported by an OCR pass, with its confidence (0-100) and the
/// index of the pass configuration that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCandidate {
    pub text: String,
    pub confidence: f32,
    pub pass: usize,
}

impl WordCandidate {
    /// Whether this candidate counts toward the detection total.
    ///
    /// Both bounds are strict: a 2-character token or a confidence of
    /// exactly 70 never qualifies. The token must contain at least one
    /// alphabetic character and must not consist entirely of non-word
    /// characters (anything other than alphanumerics and underscore).
    pub fn qualifies(&self) -> bool {
        let word = self.text.trim();
        word.chars().count() >= 3
            && self.confidence > 70.0
            && word.chars().any(|c| c.is_alphabetic())
            && !word.chars().all(|c| !c.is_alphanumeric() && c != '_')
    }
}

/// Count the distinct qualifying word strings across all OCR passes.
///
/// Deduplication is case-sensitive and by exact string, matching the
/// union-with-threshold voting scheme: the same word seen by two passes
/// counts once.
pub fn count_distinct_qualifying(candidates: &[WordCandidate]) -> usize {
    let mut seen = std::collections::BTreeSet::new();
    for candidate in candidates {
        if candidate.qualifies() {
            seen.insert(candidate.text.trim());
        }
    }
    seen.len()
}

/// Output format for enhanced images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Keep the input file's extension.
    Auto,
    Png,
    Jpg,
    Bmp,
    Tiff,
    Webp,
}

impl OutputFormat {
    /// Parse a user-supplied format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Resolve the output extension (with leading dot) for a given input
    /// file name. `Auto` keeps the input extension as-is.
    pub fn resolve_extension(&self, input: &Path) -> String {
        match self {
            Self::Auto => input
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default(),
            Self::Png => ".png".into(),
            Self::Jpg => ".jpg".into(),
            Self::Bmp => ".bmp".into(),
            Self::Tiff => ".tiff".into(),
            Self::Webp => ".webp".into(),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Auto
    }
}

/// Terminal state of one file within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Enhanced image written successfully.
    Saved,
    /// Pipeline ran but the output could not be written.
    SaveFailed,
    /// Input was unreadable and the file was excluded from the batch.
    Skipped,
}

/// How a whole batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All files were attempted.
    Completed,
    /// Cancellation was requested between files.
    Cancelled,
    /// An unexpected error escaped the per-file loop.
    Aborted,
}

/// Sentinel written to the output-name log field when saving fails.
///
/// Kept verbatim for compatibility with parsers of existing run logs.
pub const SAVE_ERROR_SENTINEL: &str = "ERROR_AL_GUARDAR";

/// One row of the per-run processing log.
#[derive(Debug, Clone)]
pub struct ProcessingRecord {
    /// Input file name (not the full path).
    pub original_name: String,
    /// Output file name, or `None` when the save failed.
    pub output_name: Option<String>,
    /// When processing of this file started (local time).
    pub started_at: DateTime<Local>,
    /// When the output was written. `None` for save failures, which log
    /// empty end-time and elapsed fields.
    pub finished_at: Option<DateTime<Local>>,
    /// Whether the text detector flagged this image.
    pub text_detected: bool,
    /// Sharpening intensity actually applied.
    pub intensity: f32,
}

impl ProcessingRecord {
    /// Render the record as one semicolon-delimited log row.
    pub fn render_row(&self) -> String {
        let date = self.started_at.format("%d/%m/%Y");
        let start = self.started_at.format("%H:%M:%S");
        let (end, elapsed) = match self.finished_at {
            Some(finished) => (
                finished.format("%H:%M:%S").to_string(),
                format_elapsed(finished.signed_duration_since(self.started_at)),
            ),
            None => (String::new(), String::new()),
        };
        let output = self
            .output_name
            .as_deref()
            .unwrap_or(SAVE_ERROR_SENTINEL);
        let text = if self.text_detected { "Sí" } else { "No" };
        format!(
            "{};{};{};{};{};{};{};{}",
            self.original_name, output, date, start, end, elapsed, text, self.intensity
        )
    }
}

/// Format an elapsed duration in the `H:MM:SS[.ffffff]` shape: hours not
/// zero-padded, minutes and seconds two digits, and a six-digit fractional
/// part only when the duration has sub-second precision.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let total_micros = elapsed.num_microseconds().unwrap_or(0).max(0);
    let micros = total_micros % 1_000_000;
    let total_secs = total_micros / 1_000_000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if micros == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
    }
}
