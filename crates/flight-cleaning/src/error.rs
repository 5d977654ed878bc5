//! Error types for the flight cleaning pipeline.
//!
//! Only caller-configuration problems and boundary failures are errors.
//! Per-field defects (a missing route, an unparseable flight code) degrade to
//! defaults and are reported as [`FieldDefect`](crate::types::FieldDefect)
//! values instead.
//!
//! Errors are serializable so they can be emitted as JSON by the CLI.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Identifier step was zero or negative.
    #[error("Invalid step {0}: identifier step must be a positive integer")]
    InvalidStep(i64),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Required column was not found in the parsed input.
    #[error("Column '{0}' not found in input")]
    ColumnNotFound(String),

    /// A reconstructed identifier does not fit in an i64.
    #[error("Reconstructed flight code for row {row} overflows a 64-bit integer")]
    SequenceOverflow { row: usize },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStep(_) => "INVALID_STEP",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::SequenceOverflow { .. } => "SEQUENCE_OVERFLOW",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by caller configuration rather than input data.
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::InvalidStep(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        match err {
            ConfigValidationError::InvalidStep(step) => CleaningError::InvalidStep(step),
            other => CleaningError::InvalidConfig(other.to_string()),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
