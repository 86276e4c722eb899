//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.
//!
//! Only configuration problems and internal invariant violations ever reach
//! the caller of a pipeline run. Missing annotation, missing phenotype
//! mappings and failed lookups are resolved to "no data" inside the steps.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Rexomiser operations
#[derive(Error, Debug)]
pub enum RexomiserError {
    /// I/O errors (file missing, permission denied, read/write failures)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON documents (analysis descriptions, variants, reference data)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (invalid CLI arguments, bad analysis settings)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A step specification is missing a mandatory field or holds an invalid value
    #[error("Invalid {step} step: field '{field}' {message}")]
    InvalidStep {
        step: String,
        field: String,
        message: String,
    },

    /// External data lookup failed. Recovered as "no data" by the core.
    #[error("Data access error: {message}")]
    DataAccess { message: String },

    /// Programming error detected while running the pipeline
    #[error("Internal invariant violated: {message}")]
    Invariant { message: String },

    /// File not found errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },
}

/// Type alias for Results using RexomiserError
pub type Result<T> = std::result::Result<T, RexomiserError>;

impl RexomiserError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid step error naming the step and the offending field
    pub fn invalid_step(
        step: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidStep {
            step: step.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a data access error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess {
            message: message.into(),
        }
    }

    /// Create an invariant violation
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_step_message_names_step_and_field() {
        let err = RexomiserError::invalid_step("qualityFilter", "minQuality", "is required");
        assert_eq!(
            err.to_string(),
            "Invalid qualityFilter step: field 'minQuality' is required"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RexomiserError = io.into();
        assert!(matches!(err, RexomiserError::Io(_)));
    }
}
