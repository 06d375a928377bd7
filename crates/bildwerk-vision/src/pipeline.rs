// SPDX-License-Identifier: MIT
//
// Per-image enhancement pipeline: text detection, intensity selection,
// super-resolution, sharpening.

use bildwerk_core::{Result, SharpenProfile};
use image::RgbImage;
use tracing::{debug, instrument};

use crate::detect::TextDetector;
use crate::ocr::OcrEngine;
use crate::sharpen::sharpen;
use crate::upscale::SuperResolutionModel;

/// Result of enhancing one image.
#[derive(Debug)]
pub struct Enhanced {
    pub image: RgbImage,
    pub text_detected: bool,
    pub intensity: f32,
}

/// Orchestrates the per-image steps in strict order: optional text
/// detection, intensity selection, the super-resolution call, and adaptive
/// sharpening. Output naming and format policy belong to the caller.
pub struct EnhancementPipeline<'a> {
    model: &'a dyn SuperResolutionModel,
    detection: Option<(&'a dyn OcrEngine, TextDetector)>,
    profile: SharpenProfile,
}

impl<'a> EnhancementPipeline<'a> {
    /// Pipeline without text detection: every image gets the standard
    /// intensity and the non-text kernel.
    pub fn new(model: &'a dyn SuperResolutionModel, profile: SharpenProfile) -> Self {
        Self {
            model,
            detection: None,
            profile,
        }
    }

    /// Enable OCR text detection with the given engine and detector.
    pub fn with_text_detection(
        mut self,
        engine: &'a dyn OcrEngine,
        detector: TextDetector,
    ) -> Self {
        self.detection = Some((engine, detector));
        self
    }

    /// Borrow the model, e.g. for the fail-fast load check before a batch.
    pub fn model(&self) -> &dyn SuperResolutionModel {
        self.model
    }

    /// Enhance one image.
    ///
    /// Detection runs on the original (pre-upscale) image; the model then
    /// upscales the original, and sharpening is applied to the model output
    /// with the selected intensity and kernel.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &RgbImage) -> Result<Enhanced> {
        let text_detected = match &self.detection {
            Some((engine, detector)) => detector.detect(image, *engine)?,
            None => false,
        };
        let intensity = self.profile.intensity_for(text_detected);
        debug!(text_detected, intensity, "profile selected");

        let upscaled = self.model.enhance(image)?;
        let sharpened = sharpen(&upscaled, intensity, text_detected);

        Ok(Enhanced {
            image: sharpened,
            text_detected,
            intensity,
        })
    }
}
