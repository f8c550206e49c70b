//! Search options bag.

use serde::{Deserialize, Serialize};

use crate::{
    BackendKind, BooleanFilter, FilterDialect, FlatFilter, SearchFilter, VectorError,
    VectorResult, WhereFilter,
};

/// Default number of documents returned by a search.
pub const DEFAULT_K: usize = 4;

/// Default payload key under which metadata is stored.
pub const DEFAULT_METADATA_PAYLOAD_KEY: &str = "metadata";

/// Options passed along with every similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Number of documents to return.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Backend filter expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    /// Payload key holding document metadata in tree-filtered stores.
    #[serde(default = "default_metadata_payload_key")]
    pub metadata_payload_key: String,
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_metadata_payload_key() -> String {
    DEFAULT_METADATA_PAYLOAD_KEY.to_owned()
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            filter: None,
            metadata_payload_key: default_metadata_payload_key(),
        }
    }
}

impl SearchOptions {
    /// Creates default search options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of documents to return.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets a pre-existing filter.
    pub fn with_filter(mut self, filter: impl Into<SearchFilter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the metadata payload key.
    pub fn with_metadata_payload_key(mut self, key: impl Into<String>) -> Self {
        self.metadata_payload_key = key.into();
        self
    }

    /// Checks that the current filter, if any, is written in `kind`'s dialect.
    pub fn check_dialect(&self, kind: BackendKind) -> VectorResult<()> {
        let expected = kind.ensure_supported()?;
        match &self.filter {
            Some(filter) if filter.dialect() != expected => Err(VectorError::FilterMismatch {
                backend: kind,
                expected,
                found: filter.dialect(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn flat_filter_mut(&mut self) -> VectorResult<&mut FlatFilter> {
        self.check_dialect(BackendKind::Pinecone)?;
        match self.filter.get_or_insert_with(|| FlatFilter::new().into()) {
            SearchFilter::Flat(filter) => Ok(filter),
            other => Err(mismatch(BackendKind::Pinecone, FilterDialect::Flat, other)),
        }
    }

    pub(crate) fn tree_filter_mut(&mut self) -> VectorResult<&mut BooleanFilter> {
        self.check_dialect(BackendKind::Qdrant)?;
        match self.filter.get_or_insert_with(|| BooleanFilter::new().into()) {
            SearchFilter::Tree(filter) => Ok(filter),
            other => Err(mismatch(BackendKind::Qdrant, FilterDialect::Tree, other)),
        }
    }

    /// Returns the where filter slot; absent until a clause is added.
    pub(crate) fn where_filter_mut(&mut self) -> VectorResult<&mut Option<SearchFilter>> {
        self.check_dialect(BackendKind::Weaviate)?;
        Ok(&mut self.filter)
    }

    pub(crate) fn where_filter(&self) -> Option<&WhereFilter> {
        match &self.filter {
            Some(SearchFilter::Where(filter)) => Some(filter),
            _ => None,
        }
    }
}

fn mismatch(backend: BackendKind, expected: FilterDialect, found: &SearchFilter) -> VectorError {
    VectorError::FilterMismatch {
        backend,
        expected,
        found: found.dialect(),
    }
}
