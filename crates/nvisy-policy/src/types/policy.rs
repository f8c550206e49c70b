//! Tenant data-access policy document.

use serde::{Deserialize, Serialize};

/// Tenant-scoped data-access policy.
///
/// Replaced wholesale on every refresh, never mutated in place. Unknown
/// fields in the source document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Identity section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityPolicy>,
    /// Entity deny rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<DenyPolicy>,
    /// Topic deny rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<DenyPolicy>,
}

impl PolicyConfig {
    /// Parses a policy document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> crate::PolicyResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Returns the configured superusers.
    pub fn superusers(&self) -> &[Superuser] {
        self.identity
            .as_ref()
            .map(|identity| identity.superusers.as_slice())
            .unwrap_or_default()
    }

    /// Returns `true` if `user_id` is listed as a superuser.
    pub fn is_superuser(&self, user_id: &str) -> bool {
        self.superusers().iter().any(|s| s.name == user_id)
    }
}

/// Identity section of a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPolicy {
    /// Users exempt from identity enforcement.
    #[serde(default, alias = "superuser")]
    pub superusers: Vec<Superuser>,
}

/// A superuser entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Superuser {
    /// User identifier.
    pub name: String,
}

/// Explicit deny list plus named deny groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyPolicy {
    /// Denied names.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Denied group names, expanded by a [`GroupResolver`](crate::GroupResolver).
    #[serde(default)]
    pub deny_groups: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let policy = PolicyConfig::from_slice(
            br#"{
                "identity": {"superusers": [{"name": "admin"}]},
                "entity": {"deny": ["us-ssn"], "deny_groups": ["pii"]},
                "semantics": {"deny": ["politics"], "deny_groups": []},
                "version": 3
            }"#,
        )
        .unwrap();

        assert!(policy.is_superuser("admin"));
        assert!(!policy.is_superuser("u1"));
        assert_eq!(policy.entity.as_ref().unwrap().deny_groups, ["pii"]);
        assert_eq!(policy.semantics.as_ref().unwrap().deny, ["politics"]);
    }

    #[test]
    fn test_parse_sparse_document() {
        let policy = PolicyConfig::from_slice(br#"{"semantics": {}}"#).unwrap();
        assert!(policy.identity.is_none());
        assert!(policy.entity.is_none());
        assert_eq!(policy.semantics, Some(DenyPolicy::default()));
        assert!(policy.superusers().is_empty());
    }

    #[test]
    fn test_superuser_alias() {
        let policy =
            PolicyConfig::from_slice(br#"{"identity": {"superuser": [{"name": "root"}]}}"#)
                .unwrap();
        assert!(policy.is_superuser("root"));
    }

    #[test]
    fn test_malformed_document() {
        assert!(PolicyConfig::from_slice(br#"{"entity": {"deny": "nope"}}"#).is_err());
        assert!(PolicyConfig::from_slice(b"not json").is_err());
    }
}
