//! Decision sinks and file writers.

use crate::{Error, Result};
use log::warn;
use pixvtx_core::{DecisionRecord, VertexEstimate};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One output row: the decision of an event and, optionally, its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionRow {
    /// Event identifier.
    pub event: u64,
    /// Filter decision.
    #[serde(flatten)]
    pub decision: DecisionRecord,
    /// Intermediate values, absent for events without a hit collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<VertexEstimate>,
}

/// Receiver of per-event decisions.
pub trait DecisionSink {
    /// Writes one row.
    ///
    /// # Errors
    /// Returns an error if the row cannot be stored.
    fn write_row(&mut self, row: &DecisionRow) -> Result<()>;

    /// Flushes buffered rows.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl DecisionSink for Vec<DecisionRow> {
    fn write_row(&mut self, row: &DecisionRow) -> Result<()> {
        self.push(*row);
        Ok(())
    }
}

/// Output file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header line.
    Csv,
    /// One JSON object per line.
    JsonLines,
}

impl OutputFormat {
    /// Picks the format from the file extension, defaulting to CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Self::Csv,
            Some("jsonl" | "ndjson" | "json") => Self::JsonLines,
            other => {
                warn!(
                    "unknown output extension {:?}, defaulting to CSV",
                    other.unwrap_or("")
                );
                Self::Csv
            }
        }
    }
}

/// Writer for filter decisions.
pub struct DecisionFileWriter<W: Write = BufWriter<File>> {
    writer: W,
    format: OutputFormat,
    diagnostics: bool,
    wrote_header: bool,
}

impl DecisionFileWriter {
    /// Creates a file writer; the format follows the file extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = OutputFormat::from_path(path.as_ref());
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> DecisionFileWriter<W> {
    /// Wraps an arbitrary writer.
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            diagnostics: false,
            wrote_header: false,
        }
    }

    /// Includes the vertex estimate in every row.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the output format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Consumes the writer and returns the inner sink.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_csv(&mut self, row: &DecisionRow) -> Result<()> {
        if !self.wrote_header {
            write!(self.writer, "event,accept,n_pxl_hits")?;
            if self.diagnostics {
                write!(
                    self.writer,
                    ",best_z,n_best,n_minus,n_plus,quality,threshold,degenerate_hits"
                )?;
            }
            writeln!(self.writer)?;
            self.wrote_header = true;
        }

        write!(
            self.writer,
            "{},{},{}",
            row.event, row.decision.accept, row.decision.hit_count
        )?;
        if self.diagnostics {
            match &row.estimate {
                Some(e) => write!(
                    self.writer,
                    ",{},{},{},{},{},{},{}",
                    e.best_z,
                    e.n_best,
                    e.n_minus,
                    e.n_plus,
                    e.quality,
                    e.threshold,
                    e.degenerate_hits
                )?,
                None => write!(self.writer, ",,,,,,,")?,
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_json(&mut self, row: &DecisionRow) -> Result<()> {
        let row = if self.diagnostics {
            *row
        } else {
            DecisionRow {
                estimate: None,
                ..*row
            }
        };
        serde_json::to_writer(&mut self.writer, &row)
            .map_err(|source| Error::Json { line: 0, source })?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> DecisionSink for DecisionFileWriter<W> {
    fn write_row(&mut self, row: &DecisionRow) -> Result<()> {
        match self.format {
            OutputFormat::Csv => self.write_csv(row),
            OutputFormat::JsonLines => self.write_json(row),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
