//! In-process vector store.

use std::sync::{PoisonError, RwLock};

use crate::{
    BackendKind, Document, SearchFilter, SearchOptions, TRACING_TARGET, VectorResult,
    VectorStoreBackend,
};

/// An in-memory store that evaluates every filter dialect itself.
///
/// Documents are ranked by how many query terms their text contains, ties
/// keeping insertion order. The store reports whichever backend kind it was
/// created with, so it can stand in for any backend.
#[derive(Debug)]
pub struct MemoryStore {
    kind: BackendKind,
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Creates an empty store reporting `kind`.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store holding `documents`.
    pub fn with_documents(kind: BackendKind, documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new(kind);
        store.add_documents(documents);
        store
    }

    /// Appends documents to the store.
    pub fn add_documents(&self, documents: impl IntoIterator<Item = Document>) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(documents);
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn admits(filter: Option<&SearchFilter>, document: &Document) -> VectorResult<bool> {
        match filter {
            None => Ok(true),
            Some(SearchFilter::Flat(filter)) => filter.matches(&document.metadata),
            Some(SearchFilter::Where(filter)) => filter.matches(&document.metadata),
            Some(SearchFilter::Tree(filter)) => Ok(filter.matches(&document.to_payload())),
        }
    }
}

fn score(terms: &[String], text: &str) -> usize {
    let text = text.to_lowercase();
    terms.iter().filter(|term| text.contains(term.as_str())).count()
}

impl VectorStoreBackend for MemoryStore {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn similarity_search(&self, query: &str, options: &SearchOptions) -> VectorResult<Vec<Document>> {
        if self.kind.is_supported() {
            options.check_dialect(self.kind)?;
        }

        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);

        let mut ranked = Vec::new();
        for document in documents.iter() {
            if Self::admits(options.filter.as_ref(), document)? {
                ranked.push((score(&terms, &document.page_content), document));
            }
        }
        let considered = documents.len();
        let admitted = ranked.len();

        // Stable sort keeps insertion order among equal scores.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        let results: Vec<Document> = ranked
            .into_iter()
            .take(options.k)
            .map(|(_, document)| document.clone())
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            kind = %self.kind,
            considered,
            admitted,
            returned = results.len(),
            "Memory search finished"
        );

        Ok(results)
    }
}
