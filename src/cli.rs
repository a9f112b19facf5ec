//! Command-line interface definitions for rowdupe.
//!
//! # Example
//!
//! ```bash
//! # Group contacts by email or phone, writing contacts_output.csv
//! rowdupe contacts.csv --match-type email,phone
//!
//! # Tab-separated input, explicit output, JSON summary
//! rowdupe people.tsv -d '\t' -o grouped.tsv --summary json
//!
//! # Debug logging
//! rowdupe -v contacts.csv
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Group duplicate records in a delimited file.
///
/// Every record gets a leading UID column. Records whose normalized email,
/// phone or other configured match column equals one seen earlier reuse
/// that record's UID.
#[derive(Debug, Parser)]
#[command(name = "rowdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Delimited input file; the first record is the header
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (default: <input stem>_output.<ext> next to the input)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Match column types, e.g. email,phone (repeatable or comma separated)
    ///
    /// Header names match a type after stripping a trailing number, so
    /// "Email1" and "Email 2" both count as email columns.
    #[arg(short = 'm', long = "match-type", value_name = "TYPE", value_delimiter = ',')]
    pub match_types: Vec<String>,

    /// Field delimiter (single ASCII character, `\t` for tab)
    #[arg(short, long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Configuration file (default: platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Summary format printed after the run
    #[arg(long, value_enum, default_value = "text")]
    pub summary: SummaryFormat,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Summary format to print. `--quiet` drops the text summary but keeps an
    /// explicitly requested JSON one.
    #[must_use]
    pub fn summary_format(&self) -> SummaryFormat {
        match self.summary {
            SummaryFormat::Text if self.quiet => SummaryFormat::None,
            format => format,
        }
    }
}

/// Format of the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
    /// No summary
    None,
}

/// Parse a delimiter argument.
///
/// Accepts a single character or the escapes `\t` and `tab`.
///
/// ```
/// use rowdupe::cli::parse_delimiter;
///
/// assert_eq!(parse_delimiter(";").unwrap(), ';');
/// assert_eq!(parse_delimiter("\\t").unwrap(), '\t');
/// assert!(parse_delimiter(",,").is_err());
/// ```
///
/// # Errors
///
/// Returns an error for empty, multi-character or non-ASCII input.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    let c = match s {
        "\\t" | "tab" => '\t',
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                (None, _) => return Err("Delimiter cannot be empty".to_string()),
                _ => return Err(format!("Delimiter must be one character: '{s}'")),
            }
        }
    };

    if !c.is_ascii() {
        return Err(format!("Delimiter must be ASCII: '{c}'"));
    }
    Ok(c)
}
