#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod filter;
pub mod pinecone;
pub mod qdrant;
pub mod store;
pub mod weaviate;

mod adapter;
mod document;
mod error;
mod kind;
mod options;

pub use adapter::{FilterAdapter, adapter_for};
pub use document::Document;
pub use error::{VectorError, VectorResult};
pub use filter::{
    BooleanFilter, FieldCondition, FilterCondition, FilterDialect, FlatFilter, Match,
    SearchFilter, WhereFilter, WhereOperator,
};
pub use kind::BackendKind;
pub use options::{DEFAULT_K, DEFAULT_METADATA_PAYLOAD_KEY, SearchOptions};
pub use store::{MemoryStore, VectorStoreBackend, VectorStoreBinding};

/// Tracing target for vector store operations.
pub const TRACING_TARGET: &str = "nvisy_vector";
