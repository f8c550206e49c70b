//! Per-backend filter adapters.

use std::fmt;

use crate::pinecone::PineconeAdapter;
use crate::qdrant::QdrantAdapter;
use crate::weaviate::WeaviateAdapter;
use crate::{BackendKind, SearchOptions, VectorResult};

/// Adds enforcement clauses to search options in one backend's dialect.
///
/// Adapters only ever add clauses. Callers check [`has_clause`] first when a
/// pre-existing clause on the same field must be rejected.
///
/// [`has_clause`]: FilterAdapter::has_clause
pub trait FilterAdapter: fmt::Debug + Send + Sync {
    /// Backend this adapter writes filters for.
    fn kind(&self) -> BackendKind;

    /// Returns `true` if the current filter already has a clause on `field`.
    fn has_clause(&self, options: &SearchOptions, field: &str) -> VectorResult<bool>;

    /// Requires the document's `field` to hold at least one of `values`.
    fn require_any(
        &self,
        options: &mut SearchOptions,
        field: &str,
        values: &[String],
    ) -> VectorResult<()>;

    /// Requires the document's `field` to hold none of `values`.
    ///
    /// An empty `values` adds nothing.
    fn exclude_all(
        &self,
        options: &mut SearchOptions,
        field: &str,
        values: &[String],
    ) -> VectorResult<()>;
}

/// Returns the adapter for `kind`, or `None` if the backend has no filter
/// enforcement support.
pub fn adapter_for(kind: BackendKind) -> Option<&'static dyn FilterAdapter> {
    match kind {
        BackendKind::Pinecone => Some(&PineconeAdapter),
        BackendKind::Qdrant => Some(&QdrantAdapter),
        BackendKind::Weaviate => Some(&WeaviateAdapter),
        BackendKind::Chroma | BackendKind::Milvus | BackendKind::PgVector => None,
    }
}
