//! File-backed policy source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{PolicySource, TRACING_TARGET};
use crate::{PolicyConfig, PolicyError, PolicyResult};

/// Reads `policy-<app_name>.json` from a directory.
#[derive(Debug, Clone)]
pub struct FilePolicySource {
    dir: PathBuf,
}

impl FilePolicySource {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a source reading from the current working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    /// Returns the policy file path for an application.
    pub fn policy_path(&self, app_name: &str) -> PathBuf {
        self.dir.join(Self::file_name(app_name))
    }

    /// Returns the policy file name for an application.
    pub fn file_name(app_name: &str) -> String {
        format!("policy-{app_name}.json")
    }

    /// Rejects app names that would leave the policy directory.
    pub fn check_app_name(app_name: &str) -> PolicyResult<()> {
        if app_name.contains(['/', '\\', '\0']) {
            return Err(PolicyError::invalid_config(format!(
                "app name {app_name:?} must not contain path separators"
            )));
        }
        Ok(())
    }

    /// Returns the directory policies are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for FilePolicySource {
    fn default() -> Self {
        Self::current_dir()
    }
}

#[async_trait]
impl PolicySource for FilePolicySource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn try_fetch(&self, app_name: &str) -> PolicyResult<PolicyConfig> {
        Self::check_app_name(app_name)?;
        let path = self.policy_path(app_name);

        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                PolicyError::NotFound(path.clone())
            } else {
                PolicyError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let policy = PolicyConfig::from_slice(&bytes)?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            bytes = bytes.len(),
            "Read policy file"
        );

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_path() {
        let source = FilePolicySource::new("/etc/nvisy");
        assert_eq!(
            source.policy_path("acme-rag"),
            PathBuf::from("/etc/nvisy/policy-acme-rag.json")
        );
    }

    #[tokio::test]
    async fn test_reads_policy_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("policy-acme.json"),
            r#"{"semantics": {"deny": ["politics"]}}"#,
        )
        .unwrap();

        let source = FilePolicySource::new(dir.path());
        let policy = source.fetch("acme").await.unwrap();
        assert_eq!(policy.semantics.unwrap().deny, ["politics"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let source = FilePolicySource::new(dir.path());

        assert!(matches!(
            source.try_fetch("acme").await,
            Err(PolicyError::NotFound(_))
        ));
        assert!(source.fetch("acme").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("policy-acme.json"), "{ not json").unwrap();

        let source = FilePolicySource::new(dir.path());
        assert!(matches!(
            source.try_fetch("acme").await,
            Err(PolicyError::Parse(_))
        ));
        assert!(source.fetch("acme").await.is_none());
    }

    #[tokio::test]
    async fn test_app_name_cannot_leave_directory() {
        let root = tempfile::tempdir().unwrap();
        let policies = root.path().join("policies");
        std::fs::create_dir(&policies).unwrap();
        std::fs::create_dir(policies.join("policy-")).unwrap();
        std::fs::write(root.path().join("x.json"), "{}").unwrap();

        let source = FilePolicySource::new(&policies);
        for name in ["/../../x", "../x"] {
            let err = source.try_fetch(name).await.unwrap_err();
            assert!(err.is_configuration(), "{name}");
            assert!(source.fetch(name).await.is_none());
        }
    }
}
