//! Deny-group resolution.

use crate::PolicyResult;

/// Expands named deny groups into concrete entity and topic names.
pub trait GroupResolver: Send + Sync + std::fmt::Debug {
    /// Resolves an entity deny group.
    fn entities(&self, group: &str) -> PolicyResult<Vec<String>>;

    /// Resolves a topic deny group.
    fn topics(&self, group: &str) -> PolicyResult<Vec<String>>;
}

/// Treats every group name as its own single member.
///
/// No group directory exists yet, so `pii` denies the literal tag `pii`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityGroupResolver;

impl GroupResolver for IdentityGroupResolver {
    fn entities(&self, group: &str) -> PolicyResult<Vec<String>> {
        Ok(vec![group.to_owned()])
    }

    fn topics(&self, group: &str) -> PolicyResult<Vec<String>> {
        Ok(vec![group.to_owned()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_resolution() {
        let resolver = IdentityGroupResolver;
        assert_eq!(resolver.entities("pii").unwrap(), ["pii"]);
        assert_eq!(resolver.topics("harmful-advice").unwrap(), ["harmful-advice"]);
    }
}
