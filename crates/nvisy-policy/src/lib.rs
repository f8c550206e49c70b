#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod cache;
pub mod source;

mod config;
mod error;
mod resolver;
mod types;

pub use cache::{PolicyCache, PolicyRefresher, PolicySnapshot, RefresherHandle};
pub use config::{
    DEFAULT_CLOUD_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_REFRESH_INTERVAL_SECS,
    PolicyServiceConfig, PolicySourceKind,
};
pub use error::{PolicyError, PolicyResult};
pub use resolver::{GroupResolver, IdentityGroupResolver};
pub use source::{FilePolicySource, PolicySource, RemotePolicySource};
pub use types::{AuthContext, DenyPolicy, IdentityPolicy, PolicyConfig, SemanticContext, Superuser};

/// Tracing target for policy operations.
pub const TRACING_TARGET: &str = "nvisy_policy";
