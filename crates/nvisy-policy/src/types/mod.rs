//! Policy, authorization and semantic context types.

mod auth;
mod policy;
mod semantic;

pub use auth::AuthContext;
pub use policy::{DenyPolicy, IdentityPolicy, PolicyConfig, Superuser};
pub use semantic::SemanticContext;
