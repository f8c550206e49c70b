//! Process-wide policy cache.
//!
//! The cache holds one [`PolicySnapshot`] behind a read-write lock. Readers
//! clone the current `Arc` and release the lock immediately; the refresh
//! path fetches and derives outside the lock and publishes the new snapshot
//! with a single reference swap, so a reader sees either the old pair or the
//! new pair and never waits on the network.

mod refresher;
mod snapshot;

use std::sync::{Arc, PoisonError, RwLock};

pub use refresher::{PolicyRefresher, RefresherHandle};
pub use snapshot::PolicySnapshot;

use crate::{
    GroupResolver, IdentityGroupResolver, PolicyConfig, PolicyResult, PolicySource,
    SemanticContext,
};

/// Tracing target for policy cache operations.
pub(crate) const TRACING_TARGET: &str = "nvisy_policy::cache";

struct PolicyCacheInner {
    current: RwLock<Arc<PolicySnapshot>>,
    resolver: Arc<dyn GroupResolver>,
}

/// Shared holder of the latest policy snapshot.
///
/// This type is `Clone` and all clones share the same snapshot.
#[derive(Clone)]
pub struct PolicyCache {
    inner: Arc<PolicyCacheInner>,
}

impl PolicyCache {
    /// Creates an empty cache using identity deny-group resolution.
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(IdentityGroupResolver))
    }

    /// Creates an empty cache with a custom deny-group resolver.
    pub fn with_resolver(resolver: Arc<dyn GroupResolver>) -> Self {
        Self {
            inner: Arc::new(PolicyCacheInner {
                current: RwLock::new(Arc::new(PolicySnapshot::empty())),
                resolver,
            }),
        }
    }

    /// Returns the current snapshot.
    pub fn read(&self) -> Arc<PolicySnapshot> {
        let current = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// Returns the semantic context of the current snapshot.
    pub fn semantic_context(&self) -> Option<SemanticContext> {
        self.read().semantic_context().cloned()
    }

    /// Derives a snapshot from `policy` and publishes it.
    ///
    /// On a derivation error the current snapshot is left untouched.
    pub fn publish(&self, policy: PolicyConfig) -> PolicyResult<Arc<PolicySnapshot>> {
        let snapshot = Arc::new(PolicySnapshot::derive(policy, self.inner.resolver.as_ref())?);

        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Arc::clone(&snapshot);
        drop(current);

        if let Some(semantic) = snapshot.semantic_context() {
            tracing::info!(
                target: TRACING_TARGET,
                denied_topics = semantic.denied_topics().len(),
                denied_entities = semantic.denied_entities().len(),
                superusers = snapshot.policy().map_or(0, |p| p.superusers().len()),
                "Policy cache updated"
            );
        }

        Ok(snapshot)
    }

    /// Runs one refresh cycle against `source`.
    ///
    /// Returns `true` if a new snapshot was published. Failures are logged and
    /// leave the current snapshot in place.
    pub async fn refresh(&self, source: &dyn PolicySource, app_name: &str) -> bool {
        let Some(policy) = source.fetch(app_name).await else {
            return false;
        };

        match self.publish(policy) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    app_name = %app_name,
                    error = %err,
                    "Failed to derive semantic context, keeping previous policy"
                );
                false
            }
        }
    }
}

impl Default for PolicyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PolicyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.read();
        f.debug_struct("PolicyCache")
            .field("loaded", &!snapshot.is_empty())
            .field("refreshed_at", &snapshot.refreshed_at())
            .field("resolver", &self.inner.resolver)
            .finish()
    }
}
