//! Policy error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Policy errors.
///
/// Fetch-side variants never escape [`PolicySource::fetch`]; they are logged
/// there and turned into an absent policy.
///
/// [`PolicySource::fetch`]: crate::PolicySource::fetch
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Policy file does not exist.
    #[error("policy file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error while reading a policy file.
    #[error("failed to read policy file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy document could not be parsed.
    #[error("malformed policy document: {0}")]
    Parse(String),

    /// Policy endpoint answered with a non-success status.
    #[error("policy endpoint returned HTTP {status}")]
    Http { status: u16 },

    /// Policy endpoint could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// Request to the policy endpoint timed out.
    #[error("policy request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Deny-group resolution failed.
    #[error("failed to resolve deny group {group}: {reason}")]
    GroupResolution { group: String, reason: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PolicyError {
    /// Creates a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Creates a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a group resolution error.
    pub fn group_resolution(group: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GroupResolution {
            group: group.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns `true` for configuration errors, which are fatal to the caller.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
