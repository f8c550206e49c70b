//! Vector store backend kinds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{FilterDialect, VectorError, VectorResult};

/// Recognised vector store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    Pinecone,
    Qdrant,
    Weaviate,
    Chroma,
    Milvus,
    #[strum(serialize = "pgvector")]
    #[serde(rename = "pgvector")]
    PgVector,
}

impl BackendKind {
    /// Backends that support enforced retrieval.
    pub const SUPPORTED: [BackendKind; 3] = [Self::Pinecone, Self::Qdrant, Self::Weaviate];

    /// Parses a backend name, rejecting unknown names as unsupported.
    pub fn parse(name: &str) -> VectorResult<Self> {
        Self::from_str(name.trim()).map_err(|_| VectorError::unsupported_backend(name))
    }

    /// Returns `true` if filter enforcement is available for this backend.
    pub fn is_supported(self) -> bool {
        self.dialect().is_some()
    }

    /// Returns the native filter dialect of a supported backend.
    pub fn dialect(self) -> Option<FilterDialect> {
        match self {
            Self::Pinecone => Some(FilterDialect::Flat),
            Self::Qdrant => Some(FilterDialect::Tree),
            Self::Weaviate => Some(FilterDialect::Where),
            Self::Chroma | Self::Milvus | Self::PgVector => None,
        }
    }

    /// Returns an error unless this backend is supported.
    pub fn ensure_supported(self) -> VectorResult<FilterDialect> {
        self.dialect()
            .ok_or_else(|| VectorError::unsupported_backend(self.as_ref()))
    }

    /// Comma separated names of the supported backends.
    pub fn supported_names() -> String {
        Self::iter()
            .filter(|kind| kind.is_supported())
            .map(|kind| kind.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
