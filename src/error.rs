//! Error types for the airq pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for airq operations
pub type Result<T> = std::result::Result<T, AirqError>;

/// Main error type for the training and serving pipeline
#[derive(Error, Debug)]
pub enum AirqError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Data error: required column `{0}` is missing")]
    MissingColumn(String),

    #[error("Data error: feature `{0}` has no non-missing training values")]
    EmptyFeature(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("Invalid field `{field}`: {reason}")]
    SchemaValidation { field: String, reason: String },

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse grouping of errors, used to decide whether a failure is fatal
/// at startup or recoverable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Training,
    Artifact,
    SchemaValidation,
    Prediction,
    Internal,
}

impl AirqError {
    /// Create a schema validation error for a request field
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AirqError::SchemaValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            AirqError::DataError(_) | AirqError::MissingColumn(_) | AirqError::EmptyFeature(_) => {
                ErrorCategory::Data
            }
            AirqError::TrainingError(_) => ErrorCategory::Training,
            AirqError::ArtifactNotFound(_) | AirqError::ArtifactCorrupt(_) => ErrorCategory::Artifact,
            AirqError::SchemaValidation { .. } => ErrorCategory::SchemaValidation,
            AirqError::PredictionError(_) | AirqError::ModelNotFitted => ErrorCategory::Prediction,
            _ => ErrorCategory::Internal,
        }
    }

    /// Errors raised while preparing a model are fatal at process startup
    pub fn is_fatal_at_startup(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::SchemaValidation | ErrorCategory::Prediction
        )
    }
}

impl From<polars::error::PolarsError> for AirqError {
    fn from(err: polars::error::PolarsError) -> Self {
        AirqError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for AirqError {
    fn from(err: serde_json::Error) -> Self {
        AirqError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for AirqError {
    fn from(err: bincode::Error) -> Self {
        AirqError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for AirqError {
    fn from(err: ndarray::ShapeError) -> Self {
        AirqError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
