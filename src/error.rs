//! Structured error handling and exit codes.

use serde::Serialize;

use crate::matching::MatchError;

/// Exit codes for the rowdupe binary.
///
/// - 0: Success
/// - 1: General error (I/O, malformed input, unexpected failure)
/// - 2: Configuration error (no usable match column, no match types)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The run completed and the output was written.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The run could not start with the given configuration.
    ConfigurationError = 2,
    /// The run was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RW000",
            Self::GeneralError => "RW001",
            Self::ConfigurationError => "RW002",
            Self::Interrupted => "RW130",
        }
    }

    /// Pick the exit code for an error returned by [`crate::run_app`].
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<Interrupted>().is_some() {
            Self::Interrupted
        } else if err.downcast_ref::<MatchError>().is_some() {
            Self::ConfigurationError
        } else {
            Self::GeneralError
        }
    }
}

/// Marker error for a run stopped by Ctrl+C.
#[derive(Debug, thiserror::Error)]
#[error("Run interrupted by user after {rows} row(s); no output written")]
pub struct Interrupted {
    /// Rows processed before the interrupt.
    pub rows: u64,
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
