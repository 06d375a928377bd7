// SPDX-License-Identifier: MIT
//
// Per-run semicolon-separated processing log.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use bildwerk_core::{ProcessingRecord, Result};

/// Column header row. Consumers parse these logs by position, so the
/// header text is part of the file format and must not change.
pub const LOG_HEADER: &str = "Nombre_Imagen_Original;Nombre_Imagen_Procesada;Fecha;Hora_Inicio;Hora_Fin;Tiempo_Transcurrido (hh:mm:ss);Contiene_Texto;Nitidez_Aplicada";

/// Accumulates one record per attempted file and writes the log file
/// exactly once at the end of the run.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    records: Vec<ProcessingRecord>,
}

impl RunLog {
    /// Creates a log whose file name carries the run start timestamp,
    /// minute resolution, so each run gets its own file.
    pub fn new(output_dir: &Path, run_start: DateTime<Local>) -> Self {
        let name = format!(
            "processed_images_{}.log",
            run_start.format("%Y-%m-%d_%H-%M")
        );
        Self {
            path: output_dir.join(name),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: ProcessingRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes header plus one row per record. Called once per run; a
    /// partial run (cancel or abort) still flushes the rows gathered
    /// so far.
    pub fn write(&self) -> Result<()> {
        let mut out = String::with_capacity(LOG_HEADER.len() + self.records.len() * 96);
        out.push_str(LOG_HEADER);
        out.push('\n');
        for record in &self.records {
            out.push_str(&record.render_row());
            out.push('\n');
        }
        std::fs::write(&self.path, out)?;
        info!(path = %self.path.display(), rows = self.records.len(), "run log written");
        Ok(())
    }
}
