// SPDX-License-Identifier: MIT
//
// Tesseract OCR backend via leptess.
//
// Only available when the `ocr` feature is enabled; requires the Tesseract
// and Leptonica system libraries plus the trained language data for the
// configured language set (spa and eng by default). The engine is handed
// an already-binarized image and returns raw (token, confidence) pairs;
// filtering and voting happen in the detector.

use std::io::Cursor;
use std::path::PathBuf;

use bildwerk_core::{BildwerkError, Result};
use image::GrayImage;
use leptess::{LepTess, Variable};
use tracing::{debug, instrument};

use crate::ocr::{OcrEngine, OcrPassConfig};

/// Word rows in Tesseract's TSV output carry level 5.
const TSV_WORD_LEVEL: &str = "5";

/// OCR engine backed by a system Tesseract installation.
#[derive(Debug, Default)]
pub struct TesseractBackend {
    /// Optional explicit tessdata directory. `None` lets Tesseract use its
    /// compiled-in default or `TESSDATA_PREFIX`.
    datapath: Option<PathBuf>,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_datapath(datapath: impl Into<PathBuf>) -> Self {
        Self {
            datapath: Some(datapath.into()),
        }
    }
}

impl OcrEngine for TesseractBackend {
    /// Run one recognition pass.
    ///
    /// A fresh `LepTess` is initialized per call because the language set
    /// differs between passes and re-initialization is cheap relative to
    /// recognition itself.
    #[instrument(skip(self, image), fields(psm = config.psm.tesseract_value(), languages = %config.languages))]
    fn extract_words(
        &self,
        image: &GrayImage,
        config: &OcrPassConfig,
    ) -> Result<Vec<(String, f32)>> {
        let datapath = self.datapath.as_ref().map(|p| p.to_string_lossy().into_owned());
        let mut engine = LepTess::new(datapath.as_deref(), &config.languages).map_err(|err| {
            BildwerkError::OcrError(format!(
                "failed to initialize Tesseract for '{}': {}",
                config.languages, err
            ))
        })?;

        engine
            .set_variable(
                Variable::TesseditPagesegMode,
                &config.psm.tesseract_value().to_string(),
            )
            .map_err(|err| {
                BildwerkError::OcrError(format!("failed to set page segmentation mode: {}", err))
            })?;

        if let Some(whitelist) = &config.whitelist {
            engine
                .set_variable(Variable::TesseditCharWhitelist, whitelist)
                .map_err(|err| {
                    BildwerkError::OcrError(format!("failed to set character whitelist: {}", err))
                })?;
        }

        // leptess takes encoded image data; hand over the binarized image
        // as an in-memory PNG.
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|err| {
                BildwerkError::OcrError(format!("failed to encode image for OCR: {}", err))
            })?;
        engine.set_image_from_mem(&png).map_err(|err| {
            BildwerkError::OcrError(format!("failed to load image into Tesseract: {}", err))
        })?;

        let tsv = engine.get_tsv_text(0).map_err(|err| {
            BildwerkError::OcrError(format!("Tesseract recognition failed: {}", err))
        })?;

        let words = parse_tsv_words(&tsv);
        debug!(tokens = words.len(), "OCR pass extracted tokens");
        Ok(words)
    }
}

/// Parse word rows out of Tesseract TSV output.
///
/// Columns: level, page, block, par, line, word, left, top, width, height,
/// conf, text. Only level-5 (word) rows with a parseable confidence and
/// non-empty text survive.
fn parse_tsv_words(tsv: &str) -> Vec<(String, f32)> {
    let mut words = Vec::new();
    for line in tsv.lines() {
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < 12 || columns[0] != TSV_WORD_LEVEL {
            continue;
        }
        let Ok(confidence) = columns[10].parse::<f32>() else {
            continue;
        };
        let text = columns[11].trim();
        if text.is_empty() {
            continue;
        }
        words.push((text.to_string(), confidence));
    }
    words
}
