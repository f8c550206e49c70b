//! Retriever configuration.

#[cfg(feature = "config")]
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};

/// Configuration for [`EnforcedRetriever`](crate::EnforcedRetriever).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RetrieverConfig {
    /// Reject queries without a non-empty auth context
    #[cfg_attr(
        feature = "config",
        arg(
            long = "require-auth-context",
            env = "NVISY_REQUIRE_AUTH_CONTEXT",
            action = ArgAction::Set,
            default_value_t = true
        )
    )]
    #[serde(default = "default_require_auth_context")]
    pub require_auth_context: bool,
}

fn default_require_auth_context() -> bool {
    true
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            require_auth_context: true,
        }
    }
}

impl RetrieverConfig {
    /// Allows queries without an auth context; they run without identity
    /// enforcement.
    pub fn allow_anonymous(mut self) -> Self {
        self.require_auth_context = false;
        self
    }
}
