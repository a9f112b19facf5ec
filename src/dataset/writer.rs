//! Atomic CSV writer.
//!
//! Rows go to a temporary file in the destination directory, which replaces
//! the destination only on [`AtomicCsvWriter::finish`]. Dropping the writer
//! without finishing deletes the temporary file, so an interrupted or failed
//! run never leaves a partial output behind.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tempfile::NamedTempFile;

use super::DatasetError;

/// CSV writer that only publishes complete output.
pub struct AtomicCsvWriter {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
}

impl AtomicCsvWriter {
    /// Create a writer targeting `final_path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the temporary file cannot be created.
    pub fn new(final_path: &Path, delimiter: u8) -> Result<Self, DatasetError> {
        let parent = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let temp_file = NamedTempFile::new_in(parent).map_err(|source| DatasetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Writing to temporary file {}",
            temp_file.path().display()
        );

        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(BufWriter::new(temp_file));

        Ok(Self {
            writer,
            final_path: final_path.to_path_buf(),
        })
    }

    /// Write one row.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Csv`] if the row cannot be written.
    pub fn write_row<S: AsRef<[u8]>>(&mut self, row: &[S]) -> Result<(), DatasetError> {
        self.writer.write_record(row)?;
        Ok(())
    }

    /// Flush and move the output into place.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or renaming fails; the temporary file is
    /// removed in that case.
    pub fn finish(self) -> Result<PathBuf, DatasetError> {
        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| DatasetError::Io {
                path: self.final_path.clone(),
                source: e.into_error(),
            })?;

        let mut temp_file = buf_writer.into_inner().map_err(|e| DatasetError::Io {
            path: self.final_path.clone(),
            source: e.into_error(),
        })?;
        temp_file.flush().map_err(|source| DatasetError::Io {
            path: self.final_path.clone(),
            source,
        })?;

        temp_file.persist(&self.final_path)?;
        log::debug!("Output moved into place at {}", self.final_path.display());
        Ok(self.final_path)
    }
}
