//! Exit codes and structured error output for the CLI.

use serde::Serialize;

/// Exit codes for the `ao2vis` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Command completed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The named character folder does not exist.
    NotFound = 2,
    /// Interrupted by Ctrl+C.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "AV000",
            Self::GeneralError => "AV001",
            Self::NotFound => "AV002",
            Self::Interrupted => "AV130",
        }
    }
}

/// Error raised when a command names a character that is not mounted.
#[derive(Debug, thiserror::Error)]
#[error("Character folder not found: {0}")]
pub struct CharacterNotFound(pub String);

/// Error raised when the user interrupts a command.
#[derive(Debug, thiserror::Error)]
#[error("Interrupted")]
pub struct Interrupted;

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "AV001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}

/// Pick the exit code for an error returned by `run_app`.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<Interrupted>().is_some() {
        ExitCode::Interrupted
    } else if err.downcast_ref::<CharacterNotFound>().is_some() {
        ExitCode::NotFound
    } else {
        ExitCode::GeneralError
    }
}
