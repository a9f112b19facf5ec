//! Header analysis: which columns take part in matching.
//!
//! Each header name is reduced to a candidate token by stripping a trailing
//! run of digits (with any whitespace before it) and lower-casing, so
//! `"Email"`, `"Email2"` and `"EMAIL 3"` all bind to the `email` type.
//! Columns whose token is not configured are left unbound and pass through
//! the run untouched.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::MatchFieldType;
use super::MatchError;

/// Trailing disambiguation suffix on duplicate column names.
static NUMBERED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+$").expect("suffix pattern is valid"));

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A header column bound to a match type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    /// Zero-based column position, stable for the run.
    pub position: usize,
    /// Match type the column was resolved to.
    pub field_type: MatchFieldType,
}

impl ColumnBinding {
    /// Create a binding.
    #[must_use]
    pub fn new(position: usize, field_type: MatchFieldType) -> Self {
        Self {
            position,
            field_type,
        }
    }
}

/// Candidate type token for a header name.
///
/// # Example
///
/// ```
/// use rowdupe::matching::header_token;
///
/// assert_eq!(header_token("Email2"), "email");
/// assert_eq!(header_token("Phone 10"), "phone");
/// assert_eq!(header_token("Name"), "name");
/// ```
#[must_use]
pub fn header_token(name: &str) -> String {
    NUMBERED_SUFFIX.replace(name.trim(), "").trim().to_lowercase()
}

/// Bind header columns to the configured match types.
///
/// Bindings come back in header column order.
///
/// # Errors
///
/// Returns [`MatchError::NoMatchColumns`] when no column resolves to any
/// configured type.
pub fn locate_columns<S: AsRef<str>>(
    header: &[S],
    match_types: &[MatchFieldType],
) -> Result<Vec<ColumnBinding>, MatchError> {
    let bindings: Vec<ColumnBinding> = header
        .iter()
        .enumerate()
        .filter_map(|(position, name)| {
            let token = header_token(name.as_ref());
            match_types
                .iter()
                .find(|t| t.token() == token)
                .map(|t| ColumnBinding::new(position, t.clone()))
        })
        .collect();

    if bindings.is_empty() {
        return Err(MatchError::NoMatchColumns {
            configured: match_types.iter().map(|t| t.token().to_string()).collect(),
            suggestion: suggest_column(header, match_types),
        });
    }

    for binding in &bindings {
        log::debug!(
            "Column {} ({:?}) bound to match type '{}'",
            binding.position,
            header[binding.position].as_ref(),
            binding.field_type
        );
    }

    Ok(bindings)
}

/// Header name that looks most like one of the configured types.
fn suggest_column<S: AsRef<str>>(header: &[S], match_types: &[MatchFieldType]) -> Option<String> {
    header
        .iter()
        .flat_map(|name| {
            let token = header_token(name.as_ref());
            match_types.iter().map(move |t| {
                let score = strsim::jaro_winkler(t.token(), &token);
                (score, name.as_ref())
            })
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, name)| name.to_string())
}
