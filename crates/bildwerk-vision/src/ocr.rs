// SPDX-License-Identifier: MIT
//
// OCR capability seam: the engine trait, per-pass configuration, and the
// three standard detection passes.

use bildwerk_core::Result;
use image::GrayImage;

/// Tesseract page-segmentation strategies used by the detection passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegMode {
    /// Assume a single uniform block of text (PSM 6).
    UniformBlock,
    /// Sparse text in no particular order (PSM 11).
    SparseText,
    /// Single column of variable-sized text (PSM 4).
    SingleColumn,
}

impl PageSegMode {
    /// Numeric Tesseract PSM value.
    pub fn tesseract_value(&self) -> u8 {
        match self {
            Self::UniformBlock => 6,
            Self::SparseText => 11,
            Self::SingleColumn => 4,
        }
    }
}

/// Configuration for a single OCR pass.
#[derive(Debug, Clone)]
pub struct OcrPassConfig {
    pub psm: PageSegMode,
    /// When set, recognition is restricted to these characters.
    pub whitelist: Option<String>,
    /// Tesseract language set, `+`-separated.
    pub languages: String,
}

/// Character whitelist for the precision-oriented pass: Latin letters with
/// Spanish accented vowels, digits, and a small punctuation set.
pub const LATIN_TEXT_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyzÁÉÍÓÚáéíóú0123456789-.,:()/°";

/// Capability trait for the OCR engine.
///
/// Implementations run one recognition pass over an already-binarized image
/// and return every detected token with its confidence (0-100). The engine
/// is treated as a black box; Bildwerk only filters and counts its output.
pub trait OcrEngine {
    fn extract_words(
        &self,
        image: &GrayImage,
        config: &OcrPassConfig,
    ) -> Result<Vec<(String, f32)>>;
}

/// The three differently-tuned passes run against the same binarized image.
///
/// A whitelist-constrained uniform-block pass cuts false positives from
/// noise, a sparse-text pass catches scattered labels, and a bilingual
/// column pass catches paragraph text; their union is thresholded instead
/// of calibrating each pass individually. The first two passes use the
/// primary language of the configured set, the third the full set.
pub fn standard_passes(languages: &str) -> [OcrPassConfig; 3] {
    let primary = languages.split('+').next().unwrap_or(languages).to_string();
    [
        OcrPassConfig {
            psm: PageSegMode::UniformBlock,
            whitelist: Some(LATIN_TEXT_WHITELIST.to_string()),
            languages: primary.clone(),
        },
        OcrPassConfig {
            psm: PageSegMode::SparseText,
            whitelist: None,
            languages: primary,
        },
        OcrPassConfig {
            psm: PageSegMode::SingleColumn,
            whitelist: None,
            languages: languages.to_string(),
        },
    ]
}
