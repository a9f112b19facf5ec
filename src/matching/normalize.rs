//! Field normalization.
//!
//! Every match-field type maps raw cell text to a canonical key through a
//! plain function. Recognized types get a dedicated rule; anything else
//! falls back to trim + lower-case so unanticipated match types keep working.
//!
//! A normalizer returns `None` when nothing meaningful is left. `None` keys
//! are never written to or read from the lookup index, so two records that
//! are both missing a field never match on it.
//!
//! # Example
//!
//! ```
//! use rowdupe::matching::{normalize, MatchFieldType};
//!
//! let phone = MatchFieldType::Phone;
//! assert_eq!(normalize(Some("(555) 123-4567"), &phone).as_deref(), Some("15551234567"));
//! assert_eq!(normalize(Some("12345"), &phone).as_deref(), Some("12345"));
//! assert_eq!(normalize(None, &phone), None);
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

/// Signature shared by all normalization rules.
pub type NormalizeFn = fn(&str) -> Option<String>;

/// Length of a North American number without its country code.
const NATIONAL_PHONE_DIGITS: usize = 10;

/// Country code prepended to bare national numbers.
const DEFAULT_COUNTRY_CODE: char = '1';

/// Semantic category of a match column.
///
/// The set of categories comes from configuration. `Email` and `Phone` have
/// their own rules; every other token is carried in `Other` and normalized
/// with the fallback rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchFieldType {
    /// E-mail addresses.
    Email,
    /// Telephone numbers.
    Phone,
    /// Any other configured token (already lower-case).
    Other(String),
}

impl MatchFieldType {
    /// Parse a configured token.
    ///
    /// Tokens are trimmed and lower-cased first, so `" Email "` and `"email"`
    /// name the same type.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "email" => Self::Email,
            "phone" => Self::Phone,
            _ => Self::Other(token),
        }
    }

    /// Canonical lower-case token for this type.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Other(token) => token,
        }
    }

    /// The normalization rule for this type.
    #[must_use]
    pub fn normalizer(&self) -> NormalizeFn {
        match self {
            Self::Email => normalize_email,
            Self::Phone => normalize_phone,
            Self::Other(_) => normalize_text,
        }
    }
}

impl fmt::Display for MatchFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for MatchFieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

/// Normalize a raw field value for the given match type.
///
/// Total function: a missing value, or one that normalizes to nothing,
/// yields `None`.
#[must_use]
pub fn normalize(raw: Option<&str>, field_type: &MatchFieldType) -> Option<String> {
    raw.and_then(field_type.normalizer())
}

/// Trim surrounding whitespace and lower-case.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    normalize_text(raw)
}

/// Keep decimal digits only; prepend the country code to bare 10-digit numbers.
///
/// Digit strings of any other length are ambiguous and left untouched.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => None,
        NATIONAL_PHONE_DIGITS => {
            let mut canonical = String::with_capacity(NATIONAL_PHONE_DIGITS + 1);
            canonical.push(DEFAULT_COUNTRY_CODE);
            canonical.push_str(&digits);
            Some(canonical)
        }
        _ => Some(digits),
    }
}

/// Fallback rule: trim and lower-case.
#[must_use]
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
