//! Qdrant boolean-tree filters and the live Qdrant store.

mod adapter;
mod config;
mod convert;
mod store;

pub use adapter::QdrantAdapter;
pub use config::QdrantConfig;
pub use convert::to_qdrant_filter;
pub use store::{QdrantStore, QueryEmbedder};
