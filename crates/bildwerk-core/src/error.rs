// SPDX-License-Identifier: MIT
//
// Unified error types for Bildwerk.

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Image / pipeline errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("super-resolution model error: {0}")]
    ModelError(String),

    // -- Batch errors --
    #[error("batch run failed: {0}")]
    BatchError(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
