//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── query arguments               # Question, caller, documents, backend
//! ├── policy: PolicyServiceConfig   # Policy source, refresh, timeouts
//! └── retriever: RetrieverConfig    # Auth context requirements
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! nvisy-cli --app-name acme --documents docs.json \
//!     --user alice --identity Finance "quarterly budget"
//!
//! # Or with the policy fetched from the cloud service
//! PEBBLO_POLICY_SOURCE=cloud PEBBLO_API_KEY=... nvisy-cli --app-name acme ...
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use nvisy_policy::{AuthContext, PolicyServiceConfig};
use nvisy_retrieval::RetrieverConfig;
use nvisy_vector::{BackendKind, DEFAULT_K};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "nvisy")]
#[command(about = "Run a policy-enforced retrieval query")]
#[command(version)]
pub struct Cli {
    /// Question to search for
    pub question: String,

    /// JSON file holding an array of documents to search
    #[arg(long, env = "NVISY_DOCUMENTS")]
    pub documents: PathBuf,

    /// Vector store dialect the documents are searched with
    #[arg(long, env = "NVISY_BACKEND", default_value = "pinecone")]
    pub backend: String,

    /// Caller's user id
    #[arg(long, env = "NVISY_USER")]
    pub user: Option<String>,

    /// Identity held by the caller, repeatable
    #[arg(long = "identity", value_name = "IDENTITY")]
    #[serde(default)]
    pub identities: Vec<String>,

    /// Maximum number of documents returned
    #[arg(long = "top-k", env = "NVISY_TOP_K", default_value_t = DEFAULT_K)]
    pub top_k: usize,

    /// Policy source configuration.
    #[clap(flatten)]
    pub policy: PolicyServiceConfig,

    /// Retriever configuration.
    #[clap(flatten)]
    pub retriever: RetrieverConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so stdout only carries the query results.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.policy
            .validate()
            .context("invalid policy configuration")?;
        anyhow::ensure!(self.top_k > 0, "--top-k must be greater than zero");
        Ok(())
    }

    /// Returns the backend kind named by `--backend`.
    pub fn backend_kind(&self) -> anyhow::Result<BackendKind> {
        BackendKind::parse(&self.backend).context("invalid --backend")
    }

    /// Returns the caller's auth context, if a user or identities were given.
    pub fn auth_context(&self) -> Option<AuthContext> {
        if self.user.is_none() && self.identities.is_empty() {
            return None;
        }

        let user = self.user.clone().unwrap_or_default();
        Some(AuthContext::new(user, self.identities.iter().cloned()))
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            app_name = %self.policy.app_name,
            policy_source = %self.policy.policy_source,
            backend = %self.backend,
            documents = %self.documents.display(),
            identities = self.identities.len(),
            require_auth_context = self.retriever.require_auth_context,
            "Query configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(["nvisy"].iter().chain(args)).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_arguments() {
        let cli = parse(&[
            "--app-name",
            "acme",
            "--documents",
            "docs.json",
            "--user",
            "alice",
            "--identity",
            "Finance",
            "--identity",
            "Legal",
            "quarterly budget",
        ]);

        assert_eq!(cli.question, "quarterly budget");
        assert_eq!(cli.backend_kind().unwrap(), BackendKind::Pinecone);
        assert_eq!(cli.top_k, DEFAULT_K);
        assert!(cli.retriever.require_auth_context);

        let auth = cli.auth_context().unwrap();
        assert_eq!(auth.user_id(), "alice");
        assert_eq!(auth.authorized_identities(), ["Finance", "Legal"]);
    }

    #[test]
    fn test_anonymous_query_has_no_auth_context() {
        let cli = parse(&[
            "--app-name",
            "acme",
            "--documents",
            "docs.json",
            "--require-auth-context",
            "false",
            "anything",
        ]);

        assert!(cli.auth_context().is_none());
        assert!(!cli.retriever.require_auth_context);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let cli = parse(&[
            "--app-name",
            "acme",
            "--documents",
            "docs.json",
            "--backend",
            "faiss",
            "anything",
        ]);
        assert!(cli.backend_kind().is_err());
    }
}
