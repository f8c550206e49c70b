//! Enforced retrieval.

use std::time::Instant;

use nvisy_policy::{AuthContext, PolicyCache};
use nvisy_vector::{Document, SearchOptions, VectorStoreBinding};
use strum::{AsRefStr, Display};

use crate::{FilterCompiler, RetrievalError, RetrievalResult, RetrieverConfig};

/// Tracing target for retrieval queries.
pub(crate) const TRACING_TARGET: &str = "nvisy_retrieval::retriever";

/// Stage of a single enforced query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum QueryState {
    Init,
    IdentityFilterApplied,
    SemanticFilterApplied,
    Searching,
    Done,
    Failed,
}

/// Progress of one query through the enforcement stages.
struct QueryRun {
    state: QueryState,
    started: Instant,
    identity_enforced: bool,
    policy_loaded: bool,
}

impl QueryRun {
    fn start() -> Self {
        Self {
            state: QueryState::Init,
            started: Instant::now(),
            identity_enforced: false,
            policy_loaded: false,
        }
    }

    fn advance(&mut self, next: QueryState) {
        tracing::trace!(
            target: TRACING_TARGET,
            from = %self.state,
            to = %next,
            "Query state changed"
        );
        self.state = next;
    }

    /// Records the outcome of the current stage.
    fn check<T>(&mut self, result: RetrievalResult<T>) -> RetrievalResult<T> {
        result.inspect_err(|err| {
            tracing::warn!(
                target: TRACING_TARGET,
                state = %self.state,
                kind = %err.kind(),
                error = %err,
                "Enforced query failed"
            );
            self.state = QueryState::Failed;
        })
    }
}

/// Retriever that enforces identity and semantic policy on every query.
///
/// Each query reads the current policy snapshot, compiles the enforcement
/// filter onto a copy of the binding's search options and delegates to the
/// bound store. The binding's own options are never modified.
#[derive(Debug, Clone)]
pub struct EnforcedRetriever {
    binding: VectorStoreBinding,
    compiler: FilterCompiler,
    cache: PolicyCache,
    config: RetrieverConfig,
}

impl EnforcedRetriever {
    /// Creates a retriever over `binding`.
    ///
    /// Fails before any search or network work if the bound backend is not
    /// supported or its base filter is written in another dialect.
    pub fn new(
        binding: VectorStoreBinding,
        cache: PolicyCache,
        config: RetrieverConfig,
    ) -> RetrievalResult<Self> {
        let compiler = FilterCompiler::new(binding.kind())?;
        binding.options().check_dialect(binding.kind())?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %binding.kind(),
            require_auth_context = config.require_auth_context,
            "Created enforced retriever"
        );

        Ok(Self {
            binding,
            compiler,
            cache,
            config,
        })
    }

    /// Returns the vector store binding.
    pub fn binding(&self) -> &VectorStoreBinding {
        &self.binding
    }

    /// Returns the policy cache read on every query.
    pub fn cache(&self) -> &PolicyCache {
        &self.cache
    }

    /// Returns the search options a query for `auth` would run with.
    pub fn enforced_options(&self, auth: Option<&AuthContext>) -> RetrievalResult<SearchOptions> {
        self.enforce(auth, &mut QueryRun::start())
    }

    /// Returns the documents relevant to `question` that `auth` may see.
    pub fn retrieve(
        &self,
        question: &str,
        auth: Option<&AuthContext>,
    ) -> RetrievalResult<Vec<Document>> {
        let mut run = QueryRun::start();
        let options = self.enforce(auth, &mut run)?;

        run.advance(QueryState::Searching);
        let documents = run.check(
            self.binding
                .store()
                .similarity_search(question, &options)
                .map_err(RetrievalError::from),
        )?;
        run.advance(QueryState::Done);

        tracing::debug!(
            target: TRACING_TARGET,
            backend = %self.compiler.kind(),
            identity_enforced = run.identity_enforced,
            policy_loaded = run.policy_loaded,
            count = documents.len(),
            elapsed_ms = run.started.elapsed().as_millis() as u64,
            "Enforced query finished"
        );

        Ok(documents)
    }

    /// Asynchronous retrieval is not offered and always fails.
    pub async fn retrieve_async(
        &self,
        _question: &str,
        _auth: Option<&AuthContext>,
    ) -> RetrievalResult<Vec<Document>> {
        Err(RetrievalError::UnsupportedOperation("asynchronous retrieval"))
    }

    /// Compiles identity then semantic enforcement onto a copy of the
    /// binding's options.
    fn enforce(
        &self,
        auth: Option<&AuthContext>,
        run: &mut QueryRun,
    ) -> RetrievalResult<SearchOptions> {
        run.check(self.validate_auth(auth))?;

        let snapshot = self.cache.read();
        let mut options = self.binding.options().clone();

        let identity = self.identity_target(auth, &snapshot);
        run.check(self.compiler.apply_identity(&mut options, identity))?;
        run.identity_enforced = identity.is_some();
        run.advance(QueryState::IdentityFilterApplied);

        run.check(
            self.compiler
                .apply_semantic(&mut options, snapshot.semantic_context()),
        )?;
        run.policy_loaded = !snapshot.is_empty();
        run.advance(QueryState::SemanticFilterApplied);

        Ok(options)
    }

    fn validate_auth(&self, auth: Option<&AuthContext>) -> RetrievalResult<()> {
        if !self.config.require_auth_context {
            return Ok(());
        }

        match auth {
            None => Err(RetrievalError::invalid_auth_context(
                "an auth context is required",
            )),
            Some(auth) if auth.is_empty() => Err(RetrievalError::invalid_auth_context(
                "auth context holds no authorized identities",
            )),
            Some(_) => Ok(()),
        }
    }

    /// Returns the auth context to enforce, or `None` for superusers.
    fn identity_target<'a>(
        &self,
        auth: Option<&'a AuthContext>,
        snapshot: &nvisy_policy::PolicySnapshot,
    ) -> Option<&'a AuthContext> {
        let auth = auth?;
        if snapshot.is_superuser(auth.user_id()) {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %auth.user_id(),
                "Superuser query, skipping identity enforcement"
            );
            return None;
        }
        Some(auth)
    }
}
