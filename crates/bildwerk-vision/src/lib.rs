// SPDX-License-Identifier: MIT
//
// Bildwerk vision layer: the adaptive sharpening filter, OCR-based text
// detection, and the per-image enhancement pipeline. The super-resolution
// model and the OCR engine are capability traits; real backends live behind
// the "upscale" and "ocr" feature gates.

pub mod detect;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod sharpen;
pub mod upscale;

#[cfg(feature = "ocr")]
pub mod tesseract;

#[cfg(feature = "upscale")]
pub mod esrgan;

pub use detect::TextDetector;
pub use ocr::{standard_passes, OcrEngine, OcrPassConfig, PageSegMode};
pub use pipeline::{Enhanced, EnhancementPipeline};
pub use sharpen::sharpen;
pub use upscale::SuperResolutionModel;

#[cfg(feature = "ocr")]
pub use tesseract::TesseractBackend;

#[cfg(feature = "upscale")]
pub use esrgan::EsrganModel;
