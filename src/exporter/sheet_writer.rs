use crate::error::{FieldHistError, Result};
use crate::extractor::TimeSeries;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes one time series as a tabular sheet: column 0 holds the row time,
/// columns 1..k the extracted scalars, text-encoded.
pub struct SheetWriter;

impl SheetWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `series` to `path`, creating missing parent directories and
    /// silently replacing any existing file.
    ///
    /// The sheet is staged to a temporary file next to the destination and
    /// persisted only after every row is flushed, so a failed export never
    /// leaves a partially-written file visible.
    pub fn write(&self, series: &TimeSeries, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));

        std::fs::create_dir_all(parent).map_err(|e| export_error(path, e))?;

        let staged = NamedTempFile::new_in(parent).map_err(|e| export_error(path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(staged);

        for sample in series.iter() {
            let mut record = Vec::with_capacity(sample.values.len() + 1);
            record.push(sample.time.to_string());
            record.extend(sample.values.iter().map(|v| v.to_string()));
            writer
                .write_record(&record)
                .map_err(|e| export_error(path, e))?;
        }

        let staged = writer
            .into_inner()
            .map_err(|e| export_error(path, e))?;

        staged.persist(path).map_err(|e| export_error(path, e))?;

        Ok(())
    }
}

impl Default for SheetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn export_error<E: std::fmt::Display>(path: &Path, error: E) -> FieldHistError {
    FieldHistError::Export {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
