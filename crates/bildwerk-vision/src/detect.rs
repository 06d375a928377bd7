// SPDX-License-Identifier: MIT
//
// Text detection: OCR voting across three pass configurations over one
// preprocessed image.

use bildwerk_core::{count_distinct_qualifying, Result, WordCandidate};
use image::RgbImage;
use tracing::{debug, instrument, warn};

use crate::ocr::{standard_passes, OcrEngine};
use crate::preprocess::prepare_for_ocr;

/// Decides whether an image contains enough readable text to switch the
/// sharpening profile.
///
/// Detection never fails past this boundary: a throwing OCR pass only loses
/// that pass's contribution. In debug mode that guarantee is deliberately
/// dropped and the first internal failure propagates, so misbehaving
/// language packs or segmentation modes can be diagnosed.
#[derive(Debug, Clone)]
pub struct TextDetector {
    /// Minimum distinct qualifying words for a positive result.
    pub min_words: usize,
    /// Propagate pass failures instead of degrading to "no text".
    pub debug: bool,
    /// Tesseract language set handed to the standard passes.
    pub languages: String,
}

impl TextDetector {
    pub fn new(min_words: usize, languages: impl Into<String>) -> Self {
        Self {
            min_words,
            debug: false,
            languages: languages.into(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Run text detection over `image` using `engine`.
    ///
    /// The image is preprocessed once (grayscale, gamma, adaptive inverse
    /// threshold), then each standard pass contributes tokens. Tokens are
    /// filtered through the word-qualification rule, deduplicated by exact
    /// string across passes, and the distinct count is compared against
    /// `min_words`.
    #[instrument(skip(self, image, engine), fields(min_words = self.min_words))]
    pub fn detect(&self, image: &RgbImage, engine: &dyn OcrEngine) -> Result<bool> {
        let binarized = prepare_for_ocr(image);

        let mut candidates: Vec<WordCandidate> = Vec::new();
        for (pass, config) in standard_passes(&self.languages).iter().enumerate() {
            match engine.extract_words(&binarized, config) {
                Ok(words) => {
                    debug!(pass, tokens = words.len(), "OCR pass complete");
                    candidates.extend(words.into_iter().map(|(text, confidence)| {
                        WordCandidate {
                            text,
                            confidence,
                            pass,
                        }
                    }));
                }
                Err(err) if self.debug => return Err(err),
                Err(err) => {
                    warn!(pass, error = %err, "OCR pass failed, dropping its contribution");
                }
            }
        }

        let distinct = count_distinct_qualifying(&candidates);
        debug!(distinct, min_words = self.min_words, "detection vote complete");
        Ok(distinct >= self.min_words)
    }
}
