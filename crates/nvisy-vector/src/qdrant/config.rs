//! Qdrant store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_METADATA_PAYLOAD_KEY, VectorError, VectorResult};

/// Default payload key holding the document text.
pub const DEFAULT_CONTENT_PAYLOAD_KEY: &str = "page_content";

/// Configuration for [`QdrantStore`](super::QdrantStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// Qdrant server URL (e.g., "http://localhost:6334")
    pub url: String,

    /// API key for authentication (optional)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Collection holding the documents
    pub collection: String,

    /// Payload key of the document text
    #[serde(default = "default_content_payload_key")]
    pub content_payload_key: String,

    /// Payload key of the document metadata
    #[serde(default = "default_metadata_payload_key")]
    pub metadata_payload_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_content_payload_key() -> String {
    DEFAULT_CONTENT_PAYLOAD_KEY.to_owned()
}

fn default_metadata_payload_key() -> String {
    DEFAULT_METADATA_PAYLOAD_KEY.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

impl QdrantConfig {
    /// Creates a configuration for `collection` on the server at `url`.
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: collection.into(),
            content_payload_key: default_content_payload_key(),
            metadata_payload_key: default_metadata_payload_key(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the API key for authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the payload keys of the document text and metadata.
    pub fn with_payload_keys(
        mut self,
        content: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        self.content_payload_key = content.into();
        self.metadata_payload_key = metadata.into();
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> VectorResult<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(VectorError::invalid_config(
                "Qdrant URL must start with http:// or https://",
            ));
        }

        if self.collection.is_empty() {
            return Err(VectorError::invalid_config(
                "Qdrant collection name cannot be empty",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(VectorError::invalid_config(
                "Qdrant timeout must be greater than zero",
            ));
        }

        Ok(())
    }
}
