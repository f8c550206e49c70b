//! Semantic deny context derived from a policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Topics and entities a query must never surface.
///
/// Sets are ordered so that compiled filters are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticContext {
    denied_topics: BTreeSet<String>,
    denied_entities: BTreeSet<String>,
}

impl SemanticContext {
    /// Creates a semantic context from deny lists.
    pub fn new(
        denied_topics: impl IntoIterator<Item = impl Into<String>>,
        denied_entities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            denied_topics: denied_topics.into_iter().map(Into::into).collect(),
            denied_entities: denied_entities.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the denied topics.
    pub fn denied_topics(&self) -> &BTreeSet<String> {
        &self.denied_topics
    }

    /// Returns the denied entities.
    pub fn denied_entities(&self) -> &BTreeSet<String> {
        &self.denied_entities
    }

    /// Returns `true` if nothing is denied.
    pub fn is_empty(&self) -> bool {
        self.denied_topics.is_empty() && self.denied_entities.is_empty()
    }
}
