// SPDX-License-Identifier: MIT
//
// Persistent application configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{BildwerkError, Result};

/// Persistent application settings.
///
/// Every field carries a `serde(default)` so that configs written by older
/// versions load cleanly: missing keys take the hard-coded defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sharpening intensity for images without detected text.
    #[serde(default = "defaults::standard_intensity")]
    pub standard_intensity: f32,
    /// Sharpening intensity for images containing text.
    #[serde(default = "defaults::text_intensity")]
    pub text_intensity: f32,
    /// Open the input/output folders in the file manager after a run.
    #[serde(default = "defaults::yes")]
    pub open_folders_on_finish: bool,
    /// Delete source files after their output is confirmed written.
    #[serde(default)]
    pub delete_source_on_success: bool,
    /// Last-used input directory (empty when never set).
    #[serde(default)]
    pub recent_input_dir: String,
    /// Last-used output directory (empty when never set).
    #[serde(default)]
    pub recent_output_dir: String,
    /// Run OCR text detection to pick the sharpening profile.
    #[serde(default = "defaults::yes")]
    pub text_detection_enabled: bool,
    /// Debug mode: OCR pass failures become fatal instead of degrading.
    #[serde(default)]
    pub debug_mode: bool,
    /// Minimum distinct qualifying words for a positive detection.
    #[serde(default = "defaults::min_words")]
    pub min_qualifying_words: u32,
    /// Tesseract language set, `+`-separated (e.g. "spa+eng").
    #[serde(default = "defaults::languages")]
    pub ocr_languages: String,
}

mod defaults {
    pub fn standard_intensity() -> f32 {
        1.0
    }
    pub fn text_intensity() -> f32 {
        1.5
    }
    pub fn yes() -> bool {
        true
    }
    pub fn min_words() -> u32 {
        2
    }
    pub fn languages() -> String {
        "spa+eng".into()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            standard_intensity: defaults::standard_intensity(),
            text_intensity: defaults::text_intensity(),
            open_folders_on_finish: true,
            delete_source_on_success: false,
            recent_input_dir: String::new(),
            recent_output_dir: String::new(),
            text_detection_enabled: true,
            debug_mode: false,
            min_qualifying_words: defaults::min_words(),
            ocr_languages: defaults::languages(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from `path`.
    ///
    /// A missing file is not an error: defaults are returned. An unreadable
    /// or corrupt file is logged and likewise degrades to defaults, so a
    /// damaged config never blocks startup.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "configuration loaded");
                    config
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "corrupt config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable config, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the configuration to `path`, rewriting all keys.
    ///
    /// Unlike `load`, failures here are surfaced: the user has just
    /// confirmed settings and should know they were not saved.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|err| {
            BildwerkError::ConfigError(format!(
                "failed to write config to {}: {}",
                path.display(),
                err
            ))
        })?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}
