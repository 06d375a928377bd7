// SPDX-License-Identifier: MIT
//
// Super-resolution capability seam.

use bildwerk_core::Result;
use image::RgbImage;

/// Capability trait for the pretrained super-resolution network.
///
/// The network is opaque: Bildwerk hands it an RGB image and receives an
/// upscaled/denoised RGB image back. Calls may take seconds; there is no
/// retry logic, and a failure is fatal to the file being processed.
pub trait SuperResolutionModel {
    /// Load model weights ahead of the first enhancement.
    ///
    /// Called once before a batch starts so that a missing or corrupt
    /// weights file aborts the run before any file is touched. The default
    /// is a no-op for backends with nothing to preload.
    fn ensure_loaded(&self) -> Result<()> {
        Ok(())
    }

    /// Run the network on one image.
    fn enhance(&self, image: &RgbImage) -> Result<RgbImage>;
}
