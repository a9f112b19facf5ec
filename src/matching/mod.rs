//! Single-pass record grouping.
//!
//! This module is the matching engine proper:
//! - Field normalization per match type ([`normalize`])
//! - Header column binding ([`locate_columns`])
//! - The lookup index and group identifier allocator ([`LookupIndex`], [`GroupIdAllocator`])
//! - First-match-wins row classification ([`RowMatcher`], [`MatchEngine`])
//! - The streaming driver and run statistics ([`StreamProcessor`], [`RunStatistics`])
//!
//! It never touches files, the terminal or the process environment; callers
//! hand it rows and take rows back.

pub mod index;
pub mod locator;
pub mod matcher;
pub mod normalize;
pub mod stream;

use thiserror::Error;

pub use index::{GroupId, GroupIdAllocator, LookupIndex};
pub use locator::{header_token, locate_columns, ColumnBinding};
pub use matcher::{MatchEngine, MatchOutcome, RowMatcher};
pub use normalize::{normalize, MatchFieldType};
pub use stream::{GroupedRows, GroupingSession, Row, RunStatistics, StreamProcessor, UID_COLUMN};

/// Run-level configuration errors. All of them abort the run before any
/// data row is processed.
#[derive(Debug, Error)]
pub enum MatchError {
    /// No match type was configured.
    #[error("No match types configured")]
    EmptyMatchTypes,

    /// The input had no header row.
    #[error("Input is empty: expected a header row")]
    MissingHeader,

    /// No header column resolved to a configured match type.
    #[error(
        "No column matches the configured match types [{}]{}",
        .configured.join(", "),
        .suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default()
    )]
    NoMatchColumns {
        /// Configured match-type tokens.
        configured: Vec<String>,
        /// Header column that looks closest to a configured type.
        suggestion: Option<String>,
    },
}
