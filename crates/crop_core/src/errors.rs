//! Error types for the crop forest core

use thiserror::Error;

/// Errors that can occur while validating inputs or running the forest
#[derive(Error, Debug)]
pub enum ForestError {
    /// A feature is missing, non-finite, or outside its enumeration
    #[error("Invalid feature `{field}`: {reason}")]
    InvalidFeature { field: String, reason: String },

    /// Prediction was requested from a forest with no trees
    #[error("Classifier has not been trained")]
    NotTrained,

    /// Training was invoked on a classifier that already holds trees
    #[error("Classifier is already trained; build a new one instead of retraining")]
    Retrain,

    /// Invalid hyperparameters
    #[error("Invalid model parameters: {0}")]
    InvalidParameters(String),

    /// Structurally broken model (e.g. after deserialization)
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Configuration could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForestError {
    pub(crate) fn invalid_feature(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFeature {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for crop forest operations
pub type Result<T> = std::result::Result<T, ForestError>;
