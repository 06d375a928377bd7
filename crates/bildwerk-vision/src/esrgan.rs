// SPDX-License-Identifier: MIT
//
// Real-ESRGAN super-resolution backend via rten.
//
// Only available when the `upscale` feature is enabled. Expects 4x
// Real-ESRGAN weights converted to the `.rten` format; the model file is
// loaded lazily on first use and reused for the whole run.
//
// The default weights location follows the XDG cache convention:
// `$XDG_CACHE_HOME/bildwerk/realesrgan-x4plus.rten`, falling back to
// `~/.cache/bildwerk/realesrgan-x4plus.rten`.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use bildwerk_core::{BildwerkError, Result};
use image::RgbImage;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;
use tracing::{info, instrument};

use crate::upscale::SuperResolutionModel;

/// Well-known filename for the converted Real-ESRGAN weights.
const WEIGHTS_FILENAME: &str = "realesrgan-x4plus.rten";

/// Default directory for cached model weights.
fn default_weights_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("bildwerk")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("bildwerk")
    } else {
        PathBuf::from("bildwerk-models")
    }
}

/// Super-resolution model backed by Real-ESRGAN weights executed via rten.
pub struct EsrganModel {
    weights_path: PathBuf,
    model: OnceLock<Model>,
}

impl EsrganModel {
    /// Model reading weights from an explicit path.
    pub fn new(weights_path: impl Into<PathBuf>) -> Self {
        Self {
            weights_path: weights_path.into(),
            model: OnceLock::new(),
        }
    }

    /// Model reading weights from the default cache location.
    pub fn with_defaults() -> Self {
        Self::new(default_weights_dir().join(WEIGHTS_FILENAME))
    }

    /// The configured weights path (for diagnostics).
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    /// Load the model on first call, reuse it afterwards.
    fn model(&self) -> Result<&Model> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }
        info!(path = %self.weights_path.display(), "loading super-resolution weights");
        let loaded = Model::load_file(&self.weights_path).map_err(|err| {
            BildwerkError::ModelError(format!(
                "failed to load weights from {}: {}",
                self.weights_path.display(),
                err
            ))
        })?;
        // A concurrent load can win the race; either instance is valid.
        let _ = self.model.set(loaded);
        Ok(self.model.get().expect("model slot was just filled"))
    }
}

impl SuperResolutionModel for EsrganModel {
    fn ensure_loaded(&self) -> Result<()> {
        self.model().map(|_| ())
    }

    /// Run the network on one image.
    ///
    /// Input is normalized to NCHW f32 in [0, 1]; the output tensor is
    /// clamped back to 8-bit RGB. No tiling: the whole image goes through
    /// in one pass, so very large inputs are memory-hungry.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn enhance(&self, image: &RgbImage) -> Result<RgbImage> {
        let model = self.model()?;
        let (width, height) = image.dimensions();

        let mut input = NdTensor::<f32, 4>::zeros([1, 3, height as usize, width as usize]);
        for (x, y, pixel) in image.enumerate_pixels() {
            for channel in 0..3 {
                input[[0, channel, y as usize, x as usize]] =
                    pixel.0[channel] as f32 / 255.0;
            }
        }

        let output = model
            .run_one(input.into(), None)
            .map_err(|err| BildwerkError::ModelError(format!("inference failed: {}", err)))?;
        let output: NdTensor<f32, 4> = output.try_into().map_err(|_| {
            BildwerkError::ModelError("model produced an unexpected output shape".into())
        })?;

        let [_, channels, out_height, out_width] = output.shape();
        if channels != 3 {
            return Err(BildwerkError::ModelError(format!(
                "expected 3 output channels, got {}",
                channels
            )));
        }

        let mut enhanced = RgbImage::new(out_width as u32, out_height as u32);
        for y in 0..out_height {
            for x in 0..out_width {
                let pixel = [
                    to_u8(output[[0, 0, y, x]]),
                    to_u8(output[[0, 1, y, x]]),
                    to_u8(output[[0, 2, y, x]]),
                ];
                enhanced.put_pixel(x as u32, y as u32, image::Rgb(pixel));
            }
        }

        info!(
            out_width,
            out_height,
            "super-resolution complete"
        );
        Ok(enhanced)
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
