//! Pairing of a vector store with its search options.

use std::sync::Arc;

use crate::{BackendKind, SearchOptions, VectorStoreBackend};

/// A vector store together with the search options every query starts from.
#[derive(Clone)]
pub struct VectorStoreBinding {
    store: Arc<dyn VectorStoreBackend>,
    options: SearchOptions,
}

impl VectorStoreBinding {
    /// Binds `store` with default search options.
    pub fn new(store: Arc<dyn VectorStoreBackend>) -> Self {
        Self {
            store,
            options: SearchOptions::default(),
        }
    }

    /// Replaces the base search options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the backend kind of the bound store.
    pub fn kind(&self) -> BackendKind {
        self.store.kind()
    }

    /// Returns the bound store.
    pub fn store(&self) -> &Arc<dyn VectorStoreBackend> {
        &self.store
    }

    /// Returns the base search options.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }
}

impl std::fmt::Debug for VectorStoreBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreBinding")
            .field("kind", &self.kind())
            .field("options", &self.options)
            .finish()
    }
}
