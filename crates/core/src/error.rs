//! Error types for MedQA.
//!
//! One enum covers every failure category: knowledge base loading,
//! configuration, text generation, prompts and I/O.

use thiserror::Error;

/// Unified error type for MedQA.
///
/// Library functions return `Result<T, AppError>` and never panic.
#[derive(Error, Debug)]
pub enum AppError {
    /// Knowledge source does not exist
    #[error("Knowledge base not found: {0}")]
    NotFound(String),

    /// Knowledge source has zero rows
    #[error("Knowledge base is empty: {0}")]
    Empty(String),

    /// Knowledge source is malformed or lacks required columns
    #[error("Knowledge base format error: {0}")]
    Format(String),

    /// Missing or invalid configuration (credentials, model, provider)
    #[error("Configuration error: {0}")]
    Config(String),

    /// External text-generation call failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt definition or rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Format(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
