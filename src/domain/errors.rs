//! Domain error types
//!
//! This module defines the error hierarchy for Strata. Run-level failures
//! (configuration, retrieval) abort an export; resource-level failures
//! (formatting, storage) are recorded and the run moves on.

use thiserror::Error;

/// Main Strata error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum StrataError {
    /// A required setting or named parameter is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The selection query of a retriever could not be executed
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// A single resource could not be resolved or rendered
    #[error("Formatting error: {0}")]
    Formatting(String),

    /// A single artifact could not be written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Content repository errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Content repository errors
///
/// Errors raised by a [`crate::adapters::repository::RepositorySession`].
/// These never expose the backing store's own types.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No node exists at the requested path or identifier
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A path is not absolute or contains empty segments
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A query could not be executed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A property exists but its value cannot be read
    #[error("Property {property} of {path} is unreadable: {reason}")]
    PropertyUnreadable {
        path: String,
        property: String,
        reason: String,
    },

    /// A content fixture could not be loaded
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        StrataError::Serialization(err.to_string())
    }
}

impl StrataError {
    /// Whether this error aborts a whole export run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StrataError::Configuration(_) | StrataError::Retrieval(_)
        )
    }
}
