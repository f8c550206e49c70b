//! Vector store error types.

use thiserror::Error;

use crate::{BackendKind, FilterDialect};

/// Result type for vector store operations.
pub type VectorResult<T> = Result<T, VectorError>;

/// Vector store errors.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backend kind without filter enforcement support.
    #[error(
        "unsupported vector store backend '{name}', expected one of: {}",
        BackendKind::supported_names()
    )]
    UnsupportedBackend { name: String },

    /// Filter dialect does not match the bound backend.
    #[error("{backend} expects a {expected} filter, found a {found} filter")]
    FilterMismatch {
        backend: BackendKind,
        expected: FilterDialect,
        found: FilterDialect,
    },

    /// Filter expression that cannot be evaluated or translated.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl VectorError {
    /// Creates an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates an unsupported backend error.
    pub fn unsupported_backend(name: impl Into<String>) -> Self {
        Self::UnsupportedBackend { name: name.into() }
    }

    /// Creates an invalid filter error.
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    /// Creates a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns `true` for errors caused by configuration rather than the backend.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::UnsupportedBackend { .. } | Self::FilterMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
