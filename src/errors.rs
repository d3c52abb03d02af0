//! Error types for the autopr crate
//!
//! Each error type has a corresponding error code for programmatic handling.

use thiserror::Error;

/// Result type alias for autopr operations
pub type Result<T> = std::result::Result<T, AutoprError>;

/// Main error type for all autopr operations
#[derive(Debug, Error)]
pub enum AutoprError {
    /// `capture` was called while another capture on the same session is in flight
    #[error("Attempted to re-enter capture while a capture is in progress")]
    CaptureInProgress,

    /// The working tree has uncommitted changes at capture entry
    #[error("Git checkout is not clean")]
    DirtyWorktree,

    /// A required command-line binary is not installed or not on PATH
    #[error("Required binary not found: {0}")]
    MissingBinary(String),

    /// Git command error
    #[error("Git error: {0}")]
    Git(String),

    /// GitHub CLI command error
    #[error("gh error: {0}")]
    Gh(String),

    /// The PR creation output did not end with a parseable PR number
    #[error("Could not parse pull request number from: {0}")]
    PrNumber(String),

    /// A retried command failed on every attempt
    #[error("Command failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AutoprError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            AutoprError::CaptureInProgress => "CAPTURE_IN_PROGRESS",
            AutoprError::DirtyWorktree => "DIRTY_WORKTREE",
            AutoprError::MissingBinary(_) => "MISSING_BINARY",
            AutoprError::Git(_) => "GIT_ERROR",
            AutoprError::Gh(_) => "GH_ERROR",
            AutoprError::PrNumber(_) => "PR_NUMBER",
            AutoprError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            AutoprError::Io(_) => "IO_ERROR",
        }
    }
}
