//! Error types for the kurso application.

use thiserror::Error;

use crate::provider::ProviderError;

/// A shared error type for the entire kurso application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every variant renders as a
/// single human-readable message; callers never need to match on
/// provider-specific details to display a failure.
#[derive(Error, Debug, Clone)]
pub enum KursoError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Failure reported by an LLM provider adapter
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KursoError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a provider failure
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

impl From<std::io::Error> for KursoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KursoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, KursoError>`.
pub type Result<T> = std::result::Result<T, KursoError>;
