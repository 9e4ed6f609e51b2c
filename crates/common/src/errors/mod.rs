//! Error types for Affilnet
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - Error codes for machine-readable identification
//! - Classification of fatal analytics failures
//!
//! Noisy input is never an error here: a header without institution keywords
//! yields an empty result and a deleted alias is silently dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors (1xxx)
    CorpusError,
    InvalidMetadata,

    // Analytics errors (7xxx)
    EmptyGraph,
    NotConverged,
    SingularSystem,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    IoError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Input (1xxx)
            ErrorCode::CorpusError => 1001,
            ErrorCode::InvalidMetadata => 1002,

            // Analytics (7xxx)
            ErrorCode::EmptyGraph => 7001,
            ErrorCode::NotConverged => 7002,
            ErrorCode::SingularSystem => 7003,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::IoError => 9004,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Corpus error for {path}: {message}")]
    Corpus { path: String, message: String },

    #[error("Invalid metadata: {message}")]
    InvalidMetadata { message: String },

    // Analytics errors
    #[error("{algorithm} requires a non-empty graph")]
    EmptyGraph { algorithm: String },

    #[error("{algorithm} failed to converge after {iterations} iterations")]
    NotConverged { algorithm: String, iterations: usize },

    #[error("{algorithm} linear system has no unique solution")]
    SingularSystem { algorithm: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Corpus { .. } => ErrorCode::CorpusError,
            AppError::InvalidMetadata { .. } => ErrorCode::InvalidMetadata,
            AppError::EmptyGraph { .. } => ErrorCode::EmptyGraph,
            AppError::NotConverged { .. } => ErrorCode::NotConverged,
            AppError::SingularSystem { .. } => ErrorCode::SingularSystem,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Check if this error came out of a graph computation
    pub fn is_fatal_analytics(&self) -> bool {
        matches!(
            self,
            AppError::EmptyGraph { .. }
                | AppError::NotConverged { .. }
                | AppError::SingularSystem { .. }
        )
    }

    /// Shorthand for an empty-graph failure
    pub fn empty_graph(algorithm: &str) -> Self {
        AppError::EmptyGraph { algorithm: algorithm.to_string() }
    }

    /// Shorthand for a power-iteration failure
    pub fn not_converged(algorithm: &str, iterations: usize) -> Self {
        AppError::NotConverged {
            algorithm: algorithm.to_string(),
            iterations,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string()
        }
    }
}
