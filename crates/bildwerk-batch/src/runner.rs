// SPDX-License-Identifier: MIT
//
// Sequential batch runner: scans, enhances and saves a folder of images,
// recording one log row per attempted file.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{error, info, instrument, warn};

use bildwerk_core::{
    BildwerkError, FileOutcome, OutputFormat, ProcessingRecord, Result, RunOutcome,
};
use bildwerk_vision::EnhancementPipeline;

use crate::control::BatchControl;
use crate::log::RunLog;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::scan::list_images;

/// Per-run batch settings.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Delete the source file after its output is confirmed on disk.
    pub delete_source: bool,
}

/// Counters and outcome of a finished (or interrupted) run.
#[derive(Debug)]
pub struct BatchSummary {
    pub outcome: RunOutcome,
    /// Files that went through the pipeline (saved + failed).
    pub attempted: usize,
    pub saved: usize,
    pub failed: usize,
    /// Unreadable inputs excluded from the batch.
    pub skipped: usize,
    pub log_path: PathBuf,
}

/// Drives the enhancement pipeline over every supported image in the
/// input directory, strictly in name order, one file at a time.
pub struct BatchRunner<'a> {
    pipeline: EnhancementPipeline<'a>,
    config: BatchConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(pipeline: EnhancementPipeline<'a>, config: BatchConfig) -> Self {
        Self { pipeline, config }
    }

    /// Run the batch over the current contents of the input directory.
    pub fn run(&self, control: &BatchControl, sink: &dyn ProgressSink) -> Result<BatchSummary> {
        let files = list_images(&self.config.input_dir)?;
        self.run_at(&files, control, sink, Local::now())
    }

    /// Run the batch over an explicit file list with a pinned start time.
    ///
    /// The start time determines the log file name and the `_enhanced_`
    /// suffix shared by every output of the run.
    #[instrument(skip_all, fields(files = files.len()))]
    pub fn run_at(
        &self,
        files: &[String],
        control: &BatchControl,
        sink: &dyn ProgressSink,
        run_start: DateTime<Local>,
    ) -> Result<BatchSummary> {
        // Fail fast before touching any file: a model that cannot load
        // would otherwise abort on the first image with the log already
        // created.
        self.pipeline.model().ensure_loaded()?;

        let suffix = run_start.format("_enhanced_%Y-%m-%d_%H-%M").to_string();
        let mut log = RunLog::new(&self.config.output_dir, run_start);
        let total = files.len();
        let (mut saved, mut failed, mut skipped) = (0usize, 0usize, 0usize);
        let mut outcome = RunOutcome::Completed;

        info!(total, input = %self.config.input_dir.display(), "batch started");

        for (index, name) in files.iter().enumerate() {
            if control.is_cancelled() || !control.wait_while_paused() {
                outcome = RunOutcome::Cancelled;
                info!(attempted = saved + failed, "batch cancelled");
                break;
            }

            sink.on_event(ProgressEvent::FileStarted {
                index,
                total,
                name: name.clone(),
            });

            let input_path = self.config.input_dir.join(name);
            let image = match image::open(&input_path) {
                Ok(image) => image.into_rgb8(),
                Err(err) => {
                    // Unreadable inputs are excluded without a log row.
                    warn!(file = %name, %err, "unreadable input skipped");
                    skipped += 1;
                    sink.on_event(ProgressEvent::FileSkipped {
                        index,
                        name: name.clone(),
                    });
                    continue;
                }
            };

            let started_at = Local::now();
            let enhanced = match self.pipeline.process(&image) {
                Ok(enhanced) => enhanced,
                Err(err) => {
                    // A pipeline failure is not a per-file condition; stop
                    // the run but keep the rows gathered so far.
                    error!(file = %name, %err, "pipeline failed, aborting run");
                    log.write()?;
                    return Err(err);
                }
            };

            let stem = std::path::Path::new(name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            let ext = self.config.format.resolve_extension(std::path::Path::new(name));
            let output_name = format!("{stem}{suffix}{ext}");
            let output_path = self.config.output_dir.join(&output_name);

            let file_outcome = match enhanced.image.save(&output_path) {
                Ok(()) => {
                    saved += 1;
                    if self.config.delete_source && output_path.exists() {
                        if let Err(err) = std::fs::remove_file(&input_path) {
                            warn!(file = %name, %err, "could not delete source file");
                        }
                    }
                    log.append(ProcessingRecord {
                        original_name: name.clone(),
                        output_name: Some(output_name),
                        started_at,
                        finished_at: Some(Local::now()),
                        text_detected: enhanced.text_detected,
                        intensity: enhanced.intensity,
                    });
                    FileOutcome::Saved
                }
                Err(err) => {
                    // The source file is kept; the row carries the save
                    // sentinel with empty end-time and elapsed fields.
                    error!(file = %name, %err, "could not save output");
                    failed += 1;
                    log.append(ProcessingRecord {
                        original_name: name.clone(),
                        output_name: None,
                        started_at,
                        finished_at: None,
                        text_detected: enhanced.text_detected,
                        intensity: enhanced.intensity,
                    });
                    FileOutcome::SaveFailed
                }
            };

            sink.on_event(ProgressEvent::FileFinished {
                index,
                name: name.clone(),
                outcome: file_outcome,
            });
        }

        log.write()?;
        sink.on_event(ProgressEvent::Finished {
            saved,
            failed,
            skipped,
        });
        info!(saved, failed, skipped, ?outcome, "batch finished");

        Ok(BatchSummary {
            outcome,
            attempted: saved + failed,
            saved,
            failed,
            skipped,
            log_path: log.path().to_owned(),
        })
    }
}

impl BatchConfig {
    /// Basic validation before a run: both directories must exist.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(BildwerkError::BatchError(format!(
                "input directory does not exist: {}",
                self.input_dir.display()
            )));
        }
        if !self.output_dir.is_dir() {
            return Err(BildwerkError::BatchError(format!(
                "output directory does not exist: {}",
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use chrono::TimeZone;
    use image::{Rgb, RgbImage};

    use bildwerk_core::SharpenProfile;
    use bildwerk_vision::SuperResolutionModel;

    use crate::log::LOG_HEADER;

    /// Model that returns the input unchanged.
    struct IdentityModel;

    impl SuperResolutionModel for IdentityModel {
        fn enhance(&self, image: &RgbImage) -> Result<RgbImage> {
            Ok(image.clone())
        }
    }

    struct FailingModel;

    impl SuperResolutionModel for FailingModel {
        fn ensure_loaded(&self) -> Result<()> {
            Err(BildwerkError::ModelError("weights missing".into()))
        }
        fn enhance(&self, _image: &RgbImage) -> Result<RgbImage> {
            Err(BildwerkError::ModelError("weights missing".into()))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for CollectingSink {
        fn on_event(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Sink that requests cancellation after the first finished file.
    struct CancelAfterFirst {
        control: BatchControl,
    }

    impl ProgressSink for CancelAfterFirst {
        fn on_event(&self, event: ProgressEvent) {
            if matches!(event, ProgressEvent::FileFinished { .. }) {
                self.control.request_cancel();
            }
        }
    }

    fn run_start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 10, 30, 0).unwrap()
    }

    fn write_image(dir: &Path, name: &str) {
        RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]))
            .save(dir.join(name))
            .unwrap();
    }

    fn config_for(input: &Path, output: &Path, delete_source: bool) -> BatchConfig {
        BatchConfig {
            input_dir: input.to_owned(),
            output_dir: output.to_owned(),
            format: OutputFormat::Auto,
            delete_source,
        }
    }

    #[test]
    fn saves_every_file_and_writes_one_row_each() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_image(input.path(), name);
        }

        let model = IdentityModel;
        let pipeline = EnhancementPipeline::new(&model, SharpenProfile::default());
        let runner = BatchRunner::new(pipeline, config_for(input.path(), output.path(), false));
        let files = list_images(input.path()).unwrap();
        let summary = runner
            .run_at(&files, &BatchControl::new(), &CollectingSink::default(), run_start())
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.saved, 3);
        assert_eq!(summary.failed, 0);
        assert!(output
            .path()
            .join("a_enhanced_2026-03-14_10-30.png")
            .exists());

        let content = std::fs::read_to_string(&summary.log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], LOG_HEADER);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn save_failure_logs_sentinel_and_keeps_going() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_image(input.path(), name);
        }
        // A directory at b's output path makes its save fail.
        std::fs::create_dir(output.path().join("b_enhanced_2026-03-14_10-30.png")).unwrap();

        let model = IdentityModel;
        let pipeline = EnhancementPipeline::new(&model, SharpenProfile::default());
        let runner = BatchRunner::new(pipeline, config_for(input.path(), output.path(), false));
        let files = list_images(input.path()).unwrap();
        let summary = runner
            .run_at(&files, &BatchControl::new(), &CollectingSink::default(), run_start())
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.failed, 1);

        let content = std::fs::read_to_string(&summary.log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("b.png;ERROR_AL_GUARDAR;"));
        // File c is still processed after the failure.
        assert!(output
            .path()
            .join("c_enhanced_2026-03-14_10-30.png")
            .exists());
    }

    #[test]
    fn cancellation_stops_between_files_and_flushes_partial_log() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png", "d.png", "e.png"] {
            write_image(input.path(), name);
        }

        let model = IdentityModel;
        let pipeline = EnhancementPipeline::new(&model, SharpenProfile::default());
        let runner = BatchRunner::new(pipeline, config_for(input.path(), output.path(), false));
        let control = BatchControl::new();
        let sink = CancelAfterFirst {
            control: control.clone(),
        };
        let files = list_images(input.path()).unwrap();
        let summary = runner.run_at(&files, &control, &sink, run_start()).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.saved, 1);
        assert!(!output
            .path()
            .join("b_enhanced_2026-03-14_10-30.png")
            .exists());

        let content = std::fs::read_to_string(&summary.log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn unreadable_input_is_skipped_without_a_log_row() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_image(input.path(), "a.png");
        std::fs::write(input.path().join("broken.png"), b"not an image").unwrap();

        let model = IdentityModel;
        let pipeline = EnhancementPipeline::new(&model, SharpenProfile::default());
        let runner = BatchRunner::new(pipeline, config_for(input.path(), output.path(), false));
        let files = list_images(input.path()).unwrap();
        let summary = runner
            .run_at(&files, &BatchControl::new(), &CollectingSink::default(), run_start())
            .unwrap();

        assert_eq!(summary.saved, 1);
        assert_eq!(summary.skipped, 1);
        let content = std::fs::read_to_string(&summary.log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        // The unreadable source stays where it was.
        assert!(input.path().join("broken.png").exists());
    }

    #[test]
    fn delete_source_removes_input_only_after_confirmed_save() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_image(input.path(), "a.png");
        write_image(input.path(), "b.png");
        std::fs::create_dir(output.path().join("b_enhanced_2026-03-14_10-30.png")).unwrap();

        let model = IdentityModel;
        let pipeline = EnhancementPipeline::new(&model, SharpenProfile::default());
        let runner = BatchRunner::new(pipeline, config_for(input.path(), output.path(), true));
        let files = list_images(input.path()).unwrap();
        runner
            .run_at(&files, &BatchControl::new(), &CollectingSink::default(), run_start())
            .unwrap();

        assert!(!input.path().join("a.png").exists());
        // Failed save keeps its source.
        assert!(input.path().join("b.png").exists());
    }

    #[test]
    fn model_load_failure_aborts_before_any_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_image(input.path(), "a.png");

        let model = FailingModel;
        let pipeline = EnhancementPipeline::new(&model, SharpenProfile::default());
        let runner = BatchRunner::new(pipeline, config_for(input.path(), output.path(), false));
        let files = list_images(input.path()).unwrap();
        let result = runner.run_at(
            &files,
            &BatchControl::new(),
            &CollectingSink::default(),
            run_start(),
        );

        assert!(matches!(result, Err(BildwerkError::ModelError(_))));
        // No log file is created when the model never loads.
        assert!(std::fs::read_dir(output.path()).unwrap().next().is_none());
        assert!(input.path().join("a.png").exists());
    }

    #[test]
    fn validate_rejects_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig {
            input_dir: dir.path().join("missing"),
            output_dir: dir.path().to_owned(),
            format: OutputFormat::Auto,
            delete_source: false,
        };
        assert!(config.validate().is_err());
    }
}
