//! Policy sources.
//!
//! A [`PolicySource`] fetches the policy document for an application. Fetching
//! is soft: [`PolicySource::fetch`] logs every failure and reports an absent
//! policy instead of an error.

mod file;
mod remote;

use async_trait::async_trait;
pub use file::FilePolicySource;
pub use remote::RemotePolicySource;

use crate::{PolicyConfig, PolicyResult};

/// Tracing target for policy source operations.
pub(crate) const TRACING_TARGET: &str = "nvisy_policy::source";

/// Source of tenant policies.
#[async_trait]
pub trait PolicySource: Send + Sync {
    /// Short name of the source, used in logs.
    fn name(&self) -> &'static str;

    /// Fetches the policy for `app_name`, reporting why it failed.
    async fn try_fetch(&self, app_name: &str) -> PolicyResult<PolicyConfig>;

    /// Fetches the policy for `app_name`, returning `None` on any failure.
    async fn fetch(&self, app_name: &str) -> Option<PolicyConfig> {
        match self.try_fetch(app_name).await {
            Ok(policy) => Some(policy),
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    source = self.name(),
                    app_name = %app_name,
                    error = %err,
                    "Failed to fetch policy"
                );
                None
            }
        }
    }
}
