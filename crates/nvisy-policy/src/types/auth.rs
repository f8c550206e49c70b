//! Per-query authorization context.

use serde::{Deserialize, Serialize};

/// Identity of the caller issuing a retrieval query.
///
/// Identities keep the order in which they were supplied; duplicates are
/// dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAuthContext")]
pub struct AuthContext {
    user_id: String,
    authorized_identities: Vec<String>,
}

impl AuthContext {
    /// Creates an auth context for a user and the identities they hold.
    pub fn new(
        user_id: impl Into<String>,
        identities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut authorized_identities: Vec<String> = Vec::new();
        for identity in identities {
            let identity = identity.into();
            if !authorized_identities.contains(&identity) {
                authorized_identities.push(identity);
            }
        }

        Self {
            user_id: user_id.into(),
            authorized_identities,
        }
    }

    /// Returns the user identifier.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the authorized identities in supplied order.
    pub fn authorized_identities(&self) -> &[String] {
        &self.authorized_identities
    }

    /// Returns `true` if the caller holds no identities.
    pub fn is_empty(&self) -> bool {
        self.authorized_identities.is_empty()
    }
}

#[derive(Deserialize)]
struct RawAuthContext {
    user_id: String,
    #[serde(default)]
    authorized_identities: Vec<String>,
}

impl From<RawAuthContext> for AuthContext {
    fn from(raw: RawAuthContext) -> Self {
        Self::new(raw.user_id, raw.authorized_identities)
    }
}
