//! Retrieval error types.

use nvisy_vector::{BackendKind, VectorError};
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Result type for enforced retrieval.
pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Categories of retrieval errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// An enforcement clause would stack on a caller-supplied clause.
    PolicyConflict,
    /// Backend, filter dialect or credentials are misconfigured.
    Configuration,
    /// The caller's auth context was missing or empty.
    InvalidInput,
    /// The requested operation is not offered.
    UnsupportedOperation,
    /// The similarity search itself failed.
    Backend,
}

/// Enforced retrieval errors.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The incoming filter already has a clause on an enforced field.
    #[error("{field} already exists in the search filter")]
    Conflict { field: &'static str },

    /// The bound backend has no filter enforcement support.
    #[error(
        "vector store must be one of the supported backends ({}), got {kind}",
        BackendKind::supported_names()
    )]
    UnsupportedBackend { kind: BackendKind },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Auth context missing or empty while required.
    #[error("invalid auth context: {0}")]
    InvalidAuthContext(String),

    /// Operation intentionally not offered.
    #[error("{0} is not supported")]
    UnsupportedOperation(&'static str),

    /// Vector store error.
    #[error(transparent)]
    Vector(#[from] VectorError),
}

impl RetrievalError {
    /// Creates a conflict error for `field`.
    pub fn conflict(field: &'static str) -> Self {
        Self::Conflict { field }
    }

    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an invalid auth context error.
    pub fn invalid_auth_context(msg: impl Into<String>) -> Self {
        Self::InvalidAuthContext(msg.into())
    }

    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict { .. } => ErrorKind::PolicyConflict,
            Self::UnsupportedBackend { .. } | Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidAuthContext(_) => ErrorKind::InvalidInput,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::Vector(err) if err.is_configuration() => ErrorKind::Configuration,
            Self::Vector(_) => ErrorKind::Backend,
        }
    }
}
