//! Row sources.
//!
//! A [`RowSource`] hands the pipeline fully materialized rows. Any failure
//! while reading is fatal for the run and surfaces as [`Error::Upstream`].

use crossover_core::{Error, RawRow, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Producer of raw rows.
pub trait RowSource {
    /// Read every row. Called once per run.
    fn read_rows(&mut self) -> Result<Vec<RawRow>>;

    /// Short description for logs.
    fn describe(&self) -> String {
        "rows".to_string()
    }
}

impl RowSource for Vec<RawRow> {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        Ok(std::mem::take(self))
    }

    fn describe(&self) -> String {
        format!("{} in-memory rows", self.len())
    }
}

/// CSV-backed row source. The header row supplies column names.
pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
    label: String,
}

impl CsvRowSource<File> {
    /// Open a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|e| Error::upstream(format!("failed to open {}: {e}", path.display())))?;
        Ok(Self::new(file, path.display().to_string()))
    }
}

impl<R: Read> CsvRowSource<R> {
    /// Wrap any reader.
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self {
            reader,
            label: label.into(),
        }
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        let headers = self
            .reader
            .headers()
            .map_err(|e| Error::upstream(format!("{}: failed to read headers: {e}", self.label)))?
            .clone();

        let mut rows = Vec::new();
        for (idx, record) in self.reader.records().enumerate() {
            let record = record.map_err(|e| {
                // +2: header is line 1 and records are 1-based.
                Error::upstream(format!("{}: line {}: {e}", self.label, idx + 2))
            })?;
            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            rows.push(row);
        }

        tracing::debug!(source = %self.label, rows = rows.len(), "read csv rows");
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
