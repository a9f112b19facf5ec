//! Delimited file input and output for the command-line runner.
//!
//! The matching engine only sees rows; this module turns files into rows and
//! rows back into a file that appears at its destination only once the run
//! has completed.

pub mod reader;
pub mod writer;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use reader::DatasetReader;
pub use writer::AtomicCsvWriter;

/// Errors raised while reading or writing datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// I/O error with the file involved.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Malformed delimited data.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The temporary output could not be moved into place.
    #[error("Failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// The delimiter is not a single byte.
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

/// Convert a configured delimiter character to the byte the CSV layer expects.
///
/// # Errors
///
/// Returns [`DatasetError::InvalidDelimiter`] for non-ASCII characters.
pub fn delimiter_byte(delimiter: char) -> Result<u8, DatasetError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(DatasetError::InvalidDelimiter(delimiter))
}

/// Output path next to the input: `<dir>/<stem><suffix>.<ext>`.
///
/// # Example
///
/// ```
/// use rowdupe::dataset::default_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     default_output_path(Path::new("/data/contacts.csv"), "_output"),
///     PathBuf::from("/data/contacts_output.csv")
/// );
/// ```
#[must_use]
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{suffix}");
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}
