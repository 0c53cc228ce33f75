use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while a
/// tilt series is staged, aligned, or its outputs renamed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as creating directories or links.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a parameter or configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a tilt series path has no file stem to derive names from.
    #[error("tilt series path has no file name: {0}")]
    InvalidTiltSeries(PathBuf),

    /// Raised when a tilt angle file contains a token that is not a number.
    #[error("invalid tilt angle '{value}' on line {line}")]
    InvalidTiltAngle { line: usize, value: String },

    /// Raised when the external executable could not be started at all.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Raised when the external executable ran but reported failure.
    #[error("{program} exited unsuccessfully ({status})")]
    ExternalToolFailed { program: String, status: ExitStatus },

    /// Raised when an output the external executable should have written is absent.
    #[error("expected output file not found: {0}")]
    MissingOutput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
