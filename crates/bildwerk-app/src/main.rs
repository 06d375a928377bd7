// SPDX-License-Identifier: MIT
//
// Bildwerk: batch image enhancement from the command line.
//
// Entry point. Initialises logging, loads persisted settings, merges
// command-line overrides, and drives one batch run over the input folder.

mod data_dir;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use bildwerk_batch::BatchConfig;
use bildwerk_core::{AppConfig, OutputFormat, Result};

#[cfg(not(feature = "upscale"))]
use bildwerk_core::BildwerkError;

#[cfg(feature = "upscale")]
use bildwerk_batch::{BatchControl, BatchRunner, ProgressEvent, ProgressSink};
#[cfg(feature = "upscale")]
use bildwerk_core::{FileOutcome, SharpenProfile};
#[cfg(feature = "upscale")]
use bildwerk_vision::{EnhancementPipeline, EsrganModel};
#[cfg(feature = "upscale")]
use tracing::info;

#[cfg(feature = "ocr")]
use bildwerk_vision::{TesseractBackend, TextDetector};

/// Enhance a folder of scanned images: super-resolution upscale plus
/// text-aware adaptive sharpening, with a per-run processing log.
#[derive(Debug, Parser)]
#[command(name = "bildwerk", version, about)]
struct Cli {
    /// Folder containing the images to enhance (png, jpg, jpeg).
    input: PathBuf,

    /// Folder that receives the enhanced images and the run log.
    output: PathBuf,

    /// Output format: auto keeps each input's extension.
    #[arg(long, default_value = "auto", value_parser = parse_format)]
    format: OutputFormat,

    /// Sharpening intensity for images without detected text (0.0 to 3.0).
    #[arg(long)]
    standard_intensity: Option<f32>,

    /// Sharpening intensity for images with detected text (0.0 to 3.0).
    #[arg(long)]
    text_intensity: Option<f32>,

    /// Skip OCR text detection; every image gets the standard intensity.
    #[arg(long)]
    no_text_detection: bool,

    /// Distinct qualifying words required to flag an image as text.
    #[arg(long)]
    min_words: Option<u32>,

    /// OCR languages, primary first (e.g. "spa+eng").
    #[arg(long)]
    languages: Option<String>,

    /// Delete each source file once its output is confirmed on disk.
    #[arg(long)]
    delete_source: bool,

    /// Treat OCR pass failures as fatal instead of skipping the pass.
    #[arg(long)]
    debug: bool,

    /// Do not open the input and output folders when the run finishes.
    #[arg(long)]
    no_open_folders: bool,

    /// Settings file location (defaults to the platform data directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Super-resolution weights file (defaults to the platform cache dir).
    #[cfg(feature = "upscale")]
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Tesseract data directory override.
    #[cfg(feature = "ocr")]
    #[arg(long)]
    tessdata: Option<PathBuf>,
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    OutputFormat::from_name(s).ok_or_else(|| format!("unknown format: {s}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "batch run failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(data_dir::config_path);
    let mut config = AppConfig::load(&config_path);
    apply_overrides(&mut config, &cli);

    config.recent_input_dir = cli.input.display().to_string();
    config.recent_output_dir = cli.output.display().to_string();
    if let Err(err) = config.save(&config_path) {
        // Settings persistence is a convenience; the run continues.
        warn!(%err, path = %config_path.display(), "could not save settings");
    }

    std::fs::create_dir_all(&cli.output)?;
    let batch_config = BatchConfig {
        input_dir: cli.input.clone(),
        output_dir: cli.output.clone(),
        format: cli.format,
        delete_source: config.delete_source_on_success,
    };
    batch_config.validate()?;

    #[cfg(not(feature = "upscale"))]
    {
        return Err(BildwerkError::ModelError(
            "this build has no super-resolution backend (enable the \"upscale\" feature)".into(),
        ));
    }

    #[cfg(feature = "upscale")]
    {
        let profile = SharpenProfile::new(config.standard_intensity, config.text_intensity);
        let model = match &cli.weights {
            Some(path) => EsrganModel::new(path),
            None => EsrganModel::with_defaults(),
        };

        #[cfg(feature = "ocr")]
        let engine = match &cli.tessdata {
            Some(path) => TesseractBackend::with_datapath(path),
            None => TesseractBackend::new(),
        };

        #[allow(unused_mut)]
        let mut pipeline = EnhancementPipeline::new(&model, profile);
        if config.text_detection_enabled {
            #[cfg(feature = "ocr")]
            {
                let detector =
                    TextDetector::new(config.min_qualifying_words as usize, &config.ocr_languages)
                        .with_debug(config.debug_mode);
                pipeline = pipeline.with_text_detection(&engine, detector);
            }
            #[cfg(not(feature = "ocr"))]
            warn!("this build has no OCR backend; every image gets the standard intensity");
        }

        info!(input = %cli.input.display(), output = %cli.output.display(), "starting batch");
        let runner = BatchRunner::new(pipeline, batch_config);

        // The batch runs on its own thread; the main thread holds the
        // control token, matching the worker/control split of the GUI hosts.
        let control = BatchControl::new();
        let summary = std::thread::scope(|scope| {
            let worker = control.clone();
            scope
                .spawn(move || runner.run(&worker, &ConsoleSink))
                .join()
                .unwrap_or_else(|_| {
                    Err(bildwerk_core::BildwerkError::BatchError(
                        "worker thread panicked".into(),
                    ))
                })
        })?;

        println!(
            "done: {} saved, {} failed, {} skipped (log: {})",
            summary.saved,
            summary.failed,
            summary.skipped,
            summary.log_path.display()
        );

        if config.open_folders_on_finish {
            bildwerk_batch::reveal::reveal_dir(&cli.input);
            bildwerk_batch::reveal::reveal_dir(&cli.output);
        }
        Ok(())
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(v) = cli.standard_intensity {
        config.standard_intensity = v;
    }
    if let Some(v) = cli.text_intensity {
        config.text_intensity = v;
    }
    if let Some(v) = cli.min_words {
        config.min_qualifying_words = v;
    }
    if let Some(v) = &cli.languages {
        config.ocr_languages = v.clone();
    }
    if cli.no_text_detection {
        config.text_detection_enabled = false;
    }
    if cli.delete_source {
        config.delete_source_on_success = true;
    }
    if cli.debug {
        config.debug_mode = true;
    }
    if cli.no_open_folders {
        config.open_folders_on_finish = false;
    }
}

/// Per-file progress on stdout.
#[cfg(feature = "upscale")]
struct ConsoleSink;

#[cfg(feature = "upscale")]
impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FileStarted { index, total, name } => {
                println!("[{}/{}] {}", index + 1, total, name);
            }
            ProgressEvent::FileFinished { outcome, name, .. } => match outcome {
                FileOutcome::Saved => {}
                FileOutcome::SaveFailed => println!("  could not save output for {name}"),
                FileOutcome::Skipped => {}
            },
            ProgressEvent::FileSkipped { name, .. } => {
                println!("  skipped unreadable file {name}");
            }
            ProgressEvent::Finished { .. } => {}
        }
    }
}
