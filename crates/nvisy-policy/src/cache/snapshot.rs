//! Immutable policy snapshots.

use jiff::Timestamp;

use crate::{GroupResolver, PolicyConfig, PolicyResult, SemanticContext};

/// A policy together with the semantic context derived from it.
///
/// Snapshots are only built empty or by [`PolicySnapshot::derive`], so the
/// semantic context is always the projection of the policy it travels with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySnapshot {
    policy: Option<PolicyConfig>,
    semantic_context: Option<SemanticContext>,
    refreshed_at: Option<Timestamp>,
}

impl PolicySnapshot {
    /// Creates the startup snapshot with neither policy nor semantic context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derives a snapshot from a freshly fetched policy.
    ///
    /// Deny groups are expanded with `resolver` and unioned with the explicit
    /// deny lists. A section missing from the policy contributes nothing.
    pub fn derive(policy: PolicyConfig, resolver: &dyn GroupResolver) -> PolicyResult<Self> {
        let mut entities = Vec::new();
        if let Some(entity) = &policy.entity {
            for group in &entity.deny_groups {
                entities.extend(resolver.entities(group)?);
            }
            entities.extend(entity.deny.iter().cloned());
        }

        let mut topics = Vec::new();
        if let Some(semantics) = &policy.semantics {
            for group in &semantics.deny_groups {
                topics.extend(resolver.topics(group)?);
            }
            topics.extend(semantics.deny.iter().cloned());
        }

        Ok(Self {
            semantic_context: Some(SemanticContext::new(topics, entities)),
            policy: Some(policy),
            refreshed_at: Some(Timestamp::now()),
        })
    }

    /// Returns the cached policy.
    pub fn policy(&self) -> Option<&PolicyConfig> {
        self.policy.as_ref()
    }

    /// Returns the semantic context derived from the cached policy.
    pub fn semantic_context(&self) -> Option<&SemanticContext> {
        self.semantic_context.as_ref()
    }

    /// Returns when the snapshot was published.
    pub fn refreshed_at(&self) -> Option<Timestamp> {
        self.refreshed_at
    }

    /// Returns `true` if no policy has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.policy.is_none()
    }

    /// Returns `true` if `user_id` is a superuser under the cached policy.
    pub fn is_superuser(&self, user_id: &str) -> bool {
        self.policy
            .as_ref()
            .is_some_and(|policy| policy.is_superuser(user_id))
    }
}
