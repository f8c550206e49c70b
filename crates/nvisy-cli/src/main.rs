#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use nvisy_policy::PolicyCache;
use nvisy_retrieval::EnforcedRetriever;
use nvisy_vector::{Document, MemoryStore, SearchOptions, VectorStoreBinding};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "nvisy_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "nvisy_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "nvisy_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "query finished successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "query failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let kind = cli.backend_kind()?;
    let cache = load_policy(&cli).await?;

    let documents = load_documents(&cli.documents).await?;
    let store = MemoryStore::with_documents(kind, documents);
    let binding = VectorStoreBinding::new(Arc::new(store))
        .with_options(SearchOptions::new().with_k(cli.top_k));

    let retriever = EnforcedRetriever::new(binding, cache, cli.retriever.clone())
        .context("failed to create enforced retriever")?;

    let auth = cli.auth_context();
    let results = retriever
        .retrieve(&cli.question, auth.as_ref())
        .with_context(|| format!("query {:?} failed", cli.question))?;

    let output = serde_json::to_string_pretty(&results).context("failed to encode results")?;
    println!("{output}");

    Ok(())
}

/// Runs one policy refresh and returns the populated cache.
///
/// A failed refresh is not fatal: the query then runs with identity
/// enforcement only.
async fn load_policy(cli: &Cli) -> anyhow::Result<PolicyCache> {
    let source = cli
        .policy
        .build_source()
        .context("failed to create policy source")?;

    let cache = PolicyCache::new();
    if !cache.refresh(source.as_ref(), &cli.policy.app_name).await {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            app_name = %cli.policy.app_name,
            "No policy loaded, only identity enforcement applies"
        );
    }

    Ok(cache)
}

/// Reads a JSON array of documents.
async fn load_documents(path: &Path) -> anyhow::Result<Vec<Document>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let documents: Vec<Document> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse documents in {}", path.display()))?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        count = documents.len(),
        path = %path.display(),
        "Loaded documents"
    );

    Ok(documents)
}
