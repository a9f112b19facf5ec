//! Streaming driver: header in, grouped rows out.
//!
//! The header is consumed first to resolve column bindings, then each data
//! row is classified and emitted with its group identifier prepended. Rows
//! are handled strictly one at a time in input order; nothing beyond the
//! lookup index is retained between rows.
//!
//! Two entry points are provided:
//!
//! - [`StreamProcessor::process`] wraps an infallible row sequence in a lazy
//!   iterator ([`GroupedRows`]) whose first item is the output header.
//! - [`StreamProcessor::begin`] returns a [`GroupingSession`] driven one row
//!   at a time, for sources that can fail between rows (files, sockets).
//!
//! # Example
//!
//! ```
//! use rowdupe::matching::StreamProcessor;
//!
//! let rows = vec![
//!     vec!["Name".to_string(), "Email".to_string()],
//!     vec!["Ann".to_string(), "ann@example.com".to_string()],
//!     vec!["Annie".to_string(), " ANN@example.com".to_string()],
//! ];
//!
//! let processor = StreamProcessor::new(["email"]).unwrap();
//! let mut grouped = processor.process(rows).unwrap();
//! let output: Vec<Vec<String>> = grouped.by_ref().collect();
//!
//! assert_eq!(output[0], ["UID", "Name", "Email"]);
//! assert_eq!(output[1][0], "1");
//! assert_eq!(output[2][0], "1");
//!
//! let stats = grouped.finish();
//! assert_eq!(stats.rows_processed, 2);
//! assert_eq!(stats.duplicates, 1);
//! assert_eq!(stats.groups, 1);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use super::locator::locate_columns;
use super::matcher::{MatchEngine, MatchOutcome};
use super::normalize::MatchFieldType;
use super::MatchError;

/// Header label of the prepended group identifier column.
pub const UID_COLUMN: &str = "UID";

/// One record: cell values in header order.
pub type Row = Vec<String>;

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Data rows processed (header excluded).
    pub rows_processed: u64,
    /// Rows that resolved to an existing group.
    pub duplicates: u64,
    /// Distinct group identifiers allocated.
    pub groups: u64,
    /// Distinct normalized values held in the lookup index, per match type.
    pub index_entries: BTreeMap<String, usize>,
}

impl RunStatistics {
    /// Rows that opened a new group.
    #[must_use]
    pub fn unique_rows(&self) -> u64 {
        self.rows_processed - self.duplicates
    }

    /// Percentage of rows flagged as duplicates.
    #[must_use]
    pub fn duplicate_rate(&self) -> f64 {
        if self.rows_processed == 0 {
            0.0
        } else {
            (self.duplicates as f64 / self.rows_processed as f64) * 100.0
        }
    }
}

/// Configured entry point of the pipeline.
#[derive(Debug, Clone)]
pub struct StreamProcessor {
    match_types: Vec<MatchFieldType>,
}

impl StreamProcessor {
    /// Create a processor from configured match-type tokens.
    ///
    /// Tokens are parsed with [`MatchFieldType::parse`]; repeats are dropped
    /// keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EmptyMatchTypes`] if no token is given.
    pub fn new<I, S>(tokens: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_types(
            tokens
                .into_iter()
                .map(|t| MatchFieldType::parse(t.as_ref()))
                .collect(),
        )
    }

    /// Create a processor from already parsed match types.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EmptyMatchTypes`] if `match_types` is empty.
    pub fn with_types(match_types: Vec<MatchFieldType>) -> Result<Self, MatchError> {
        let mut unique: Vec<MatchFieldType> = Vec::with_capacity(match_types.len());
        for field_type in match_types {
            if !unique.contains(&field_type) {
                unique.push(field_type);
            }
        }

        if unique.is_empty() {
            return Err(MatchError::EmptyMatchTypes);
        }

        Ok(Self {
            match_types: unique,
        })
    }

    /// Match types this processor binds columns to.
    #[must_use]
    pub fn match_types(&self) -> &[MatchFieldType] {
        &self.match_types
    }

    /// Resolve the header and start a run.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NoMatchColumns`] if no header column resolves to
    /// a configured match type. No row may be processed in that case.
    pub fn begin<S: AsRef<str>>(&self, header: &[S]) -> Result<GroupingSession, MatchError> {
        let bindings = locate_columns(header, &self.match_types)?;
        log::debug!(
            "Matching on {} column(s) across {} configured type(s)",
            bindings.len(),
            self.match_types.len()
        );

        let mut output_header = Vec::with_capacity(header.len() + 1);
        output_header.push(UID_COLUMN.to_string());
        output_header.extend(header.iter().map(|h| h.as_ref().to_string()));

        Ok(GroupingSession {
            engine: MatchEngine::new(bindings),
            output_header,
            rows_processed: 0,
            duplicates: 0,
        })
    }

    /// Wrap a row sequence whose first item is the header.
    ///
    /// The returned iterator yields the output header followed by one output
    /// row per input data row.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MissingHeader`] if `rows` is empty, or any error
    /// from [`StreamProcessor::begin`].
    pub fn process<I>(&self, rows: I) -> Result<GroupedRows<I::IntoIter>, MatchError>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(MatchError::MissingHeader)?;
        let session = self.begin(header.as_slice())?;

        Ok(GroupedRows {
            rows,
            session,
            header_pending: true,
        })
    }
}

/// A run in progress, fed one data row at a time.
#[derive(Debug)]
pub struct GroupingSession {
    engine: MatchEngine,
    output_header: Row,
    rows_processed: u64,
    duplicates: u64,
}

impl GroupingSession {
    /// Output header: the identifier column followed by the input header.
    #[must_use]
    pub fn output_header(&self) -> &[String] {
        &self.output_header
    }

    /// Classify one data row without building an output row.
    pub fn classify<S: AsRef<str>>(&mut self, row: &[S]) -> MatchOutcome {
        let outcome = self.engine.classify(row);
        self.rows_processed += 1;
        if outcome.is_duplicate {
            self.duplicates += 1;
        }
        outcome
    }

    /// Classify one data row and return it with its group identifier prepended.
    pub fn process_row(&mut self, row: Row) -> Row {
        let outcome = self.classify(row.as_slice());

        let mut output = Vec::with_capacity(row.len() + 1);
        output.push(outcome.group_id.to_string());
        output.extend(row);
        output
    }

    /// Data rows processed so far.
    #[must_use]
    pub fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    /// Duplicates found so far.
    #[must_use]
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> RunStatistics {
        RunStatistics {
            rows_processed: self.rows_processed,
            duplicates: self.duplicates,
            groups: self.engine.groups_allocated(),
            index_entries: self.engine.index().entries_per_type(),
        }
    }

    /// End the run and return its final counters.
    #[must_use]
    pub fn finish(self) -> RunStatistics {
        let stats = self.stats();
        log::debug!(
            "Run finished: {} rows, {} duplicates, {} groups, {} index entries",
            stats.rows_processed,
            stats.duplicates,
            stats.groups,
            self.engine.index().len()
        );
        stats
    }
}

/// Lazy output sequence produced by [`StreamProcessor::process`].
///
/// Dropping it early stops the run; no further rows are read or recorded.
#[derive(Debug)]
pub struct GroupedRows<I> {
    rows: I,
    session: GroupingSession,
    header_pending: bool,
}

impl<I> GroupedRows<I> {
    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> RunStatistics {
        self.session.stats()
    }

    /// End the run and return its final counters.
    #[must_use]
    pub fn finish(self) -> RunStatistics {
        self.session.finish()
    }
}

impl<I> Iterator for GroupedRows<I>
where
    I: Iterator<Item = Row>,
{
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.header_pending {
            self.header_pending = false;
            return Some(self.session.output_header.clone());
        }
        let row = self.rows.next()?;
        Some(self.session.process_row(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let extra = usize::from(self.header_pending);
        let (low, high) = self.rows.size_hint();
        (
            low.saturating_add(extra),
            high.and_then(|h| h.checked_add(extra)),
        )
    }
}
