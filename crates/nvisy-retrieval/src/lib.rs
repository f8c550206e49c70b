#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod fields;

mod compiler;
mod config;
mod error;
mod retriever;

pub use compiler::FilterCompiler;
pub use config::RetrieverConfig;
pub use error::{ErrorKind, RetrievalError, RetrievalResult};
pub use retriever::EnforcedRetriever;

/// Tracing target for enforced retrieval.
pub const TRACING_TARGET: &str = "nvisy_retrieval";
