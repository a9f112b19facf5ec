//! Lazy record reader over delimited text.
//!
//! The first record is returned like any other; deciding that it is the
//! header is the matching engine's job. Records may be shorter or longer
//! than the header.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::DatasetError;
use crate::matching::Row;

/// Iterator of rows read from a delimited source.
pub struct DatasetReader<R> {
    inner: csv::Reader<R>,
    record: StringRecord,
}

impl DatasetReader<File> {
    /// Open a delimited file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the file cannot be opened.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Reading {}", path.display());
        Ok(Self::from_reader(file, delimiter))
    }
}

impl<R: Read> DatasetReader<R> {
    /// Wrap any byte source.
    #[must_use]
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        let inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);
        Self {
            inner,
            record: StringRecord::new(),
        }
    }
}

impl<R: Read> Iterator for DatasetReader<R> {
    type Item = Result<Row, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.read_record(&mut self.record) {
            Ok(true) => Some(Ok(self.record.iter().map(str::to_owned).collect())),
            Ok(false) => None,
            Err(e) => Some(Err(DatasetError::Csv(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(data: &str, delimiter: u8) -> Vec<Row> {
        DatasetReader::from_reader(data.as_bytes(), delimiter)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_header_is_first_record() {
        let rows = read_all("Name,Email\nAnn,ann@x.com\n", b',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ["Name", "Email"]);
        assert_eq!(rows[1], ["Ann", "ann@x.com"]);
    }

    #[test]
    fn test_quoted_fields() {
        let rows = read_all("Name,Notes\n\"Smith, Ann\",\"said \"\"hi\"\"\"\n", b',');
        assert_eq!(rows[1], ["Smith, Ann", "said \"hi\""]);
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let rows = read_all("a,b,c\n1\n1,2,3,4\n", b',');
        assert_eq!(rows[1], ["1"]);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_tab_delimiter() {
        let rows = read_all("Email\tPhone\nx@y.z\t555\n", b'\t');
        assert_eq!(rows[1], ["x@y.z", "555"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(read_all("", b',').is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let data: &[u8] = b"Email\n\xff\xfe\n";
        let mut reader = DatasetReader::from_reader(data, b',');
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(DatasetError::Csv(_)))));
    }

    #[test]
    fn test_open_missing_file() {
        let result = DatasetReader::open(Path::new("/non/existent/rows.csv"), b',');
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
