//! Similarity search backends and bindings.

mod binding;
mod memory;

pub use binding::VectorStoreBinding;
pub use memory::MemoryStore;

use crate::{BackendKind, Document, SearchOptions, VectorResult};

/// A vector store able to answer similarity searches.
///
/// Searches are synchronous. The store must honour `options.filter`; no
/// results are filtered after the search returns.
pub trait VectorStoreBackend: Send + Sync {
    /// Backend kind, which determines the filter dialect.
    fn kind(&self) -> BackendKind;

    /// Returns up to `options.k` documents most similar to `query`.
    fn similarity_search(&self, query: &str, options: &SearchOptions)
    -> VectorResult<Vec<Document>>;
}
