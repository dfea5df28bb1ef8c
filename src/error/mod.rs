//! Error handling module for Splice

use thiserror::Error;

use crate::domain::errors::JobError;

/// Main error type for Splice operations
#[derive(Error, Debug)]
pub enum SpliceError {
    /// The job description is structurally invalid
    #[error("Invalid job: {0}")]
    InvalidJob(#[from] JobError),

    /// Both a simple filter chain and a filter graph would be emitted
    #[error("Conflicting filters: -vf '{simple}' cannot be combined with -filter_complex '{complex}'")]
    FilterConflict { simple: String, complex: String },

    /// Job description file could not be parsed
    #[error("Failed to parse job file {path}: {message}")]
    JobFile { path: String, message: String },

    /// Configuration file or override is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for Splice operations
pub type SpliceResult<T> = std::result::Result<T, SpliceError>;
