//! Enforcement filter compiler.

use nvisy_policy::{AuthContext, SemanticContext};
use nvisy_vector::{BackendKind, FilterAdapter, SearchOptions, adapter_for};

use crate::fields::{AUTHORIZED_IDENTITIES, SEMANTIC_ENTITIES, SEMANTIC_TOPICS};
use crate::{RetrievalError, RetrievalResult};

/// Compiles identity and semantic enforcement into one backend's dialect.
///
/// Clauses are only ever added. A clause is never written over, or next to,
/// a clause the caller already placed on the same field: that is a
/// [`RetrievalError::Conflict`].
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler {
    kind: BackendKind,
    adapter: &'static dyn FilterAdapter,
}

impl FilterCompiler {
    /// Creates a compiler for `kind`.
    pub fn new(kind: BackendKind) -> RetrievalResult<Self> {
        let adapter = adapter_for(kind).ok_or(RetrievalError::UnsupportedBackend { kind })?;
        Ok(Self { kind, adapter })
    }

    /// Returns the backend this compiler writes filters for.
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Requires documents' authorized identities to intersect the caller's.
    ///
    /// Adds nothing without an auth context.
    pub fn apply_identity(
        &self,
        options: &mut SearchOptions,
        auth: Option<&AuthContext>,
    ) -> RetrievalResult<()> {
        let Some(auth) = auth else {
            return Ok(());
        };

        self.ensure_vacant(options, AUTHORIZED_IDENTITIES)?;
        self.adapter
            .require_any(options, AUTHORIZED_IDENTITIES, auth.authorized_identities())?;
        Ok(())
    }

    /// Excludes documents tagged with a denied topic or entity.
    ///
    /// Adds nothing without a semantic context, and nothing for an empty deny
    /// set.
    pub fn apply_semantic(
        &self,
        options: &mut SearchOptions,
        semantic: Option<&SemanticContext>,
    ) -> RetrievalResult<()> {
        let Some(semantic) = semantic else {
            return Ok(());
        };

        let exclusions: Vec<(&'static str, Vec<String>)> = [
            (SEMANTIC_TOPICS, semantic.denied_topics()),
            (SEMANTIC_ENTITIES, semantic.denied_entities()),
        ]
        .into_iter()
        .filter(|(_, denied)| !denied.is_empty())
        .map(|(field, denied)| (field, denied.iter().cloned().collect()))
        .collect();

        for &(field, _) in &exclusions {
            self.ensure_vacant(options, field)?;
        }
        for (field, denied) in &exclusions {
            self.adapter.exclude_all(options, field, denied)?;
        }
        Ok(())
    }

    /// Returns a copy of `base` carrying both enforcement steps.
    ///
    /// `base` is never modified, so a failed compilation leaves nothing
    /// behind.
    pub fn apply(
        &self,
        base: &SearchOptions,
        auth: Option<&AuthContext>,
        semantic: Option<&SemanticContext>,
    ) -> RetrievalResult<SearchOptions> {
        let mut options = base.clone();
        self.apply_identity(&mut options, auth)?;
        self.apply_semantic(&mut options, semantic)?;
        Ok(options)
    }

    fn ensure_vacant(&self, options: &SearchOptions, field: &'static str) -> RetrievalResult<()> {
        if self.adapter.has_clause(options, field)? {
            return Err(RetrievalError::conflict(field));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nvisy_vector::{
        BooleanFilter, FieldCondition, FlatFilter, SearchFilter, VectorError, WhereFilter,
        WhereOperator,
    };
    use serde_json::json;

    use super::*;

    fn auth() -> AuthContext {
        AuthContext::new("u1", ["Finance"])
    }

    fn deny_politics() -> SemanticContext {
        SemanticContext::new(["politics".to_owned()], Vec::<String>::new())
    }

    #[test]
    fn test_unsupported_backend() {
        for kind in [BackendKind::Chroma, BackendKind::Milvus, BackendKind::PgVector] {
            assert!(matches!(
                FilterCompiler::new(kind),
                Err(RetrievalError::UnsupportedBackend { kind: k }) if k == kind
            ));
        }
    }

    #[test]
    fn test_flat_compilation() {
        let compiler = FilterCompiler::new(BackendKind::Pinecone).unwrap();
        let base = SearchOptions::new().with_filter(FlatFilter::new().with("source", json!("wiki")));

        let filter = compiler
            .apply(&base, Some(&auth()), Some(&deny_politics()))
            .unwrap()
            .filter
            .unwrap();
        assert_eq!(
            serde_json::to_value(filter).unwrap()["expr"],
            json!({
                "source": "wiki",
                "authorized_identities": {"$in": ["Finance"]},
                "pebblo_semantic_topics": {"$nin": ["politics"]},
            })
        );
    }

    #[test]
    fn test_tree_compilation_uses_branches() {
        let compiler = FilterCompiler::new(BackendKind::Qdrant).unwrap();
        let filter = compiler
            .apply(&SearchOptions::new(), Some(&auth()), Some(&deny_politics()))
            .unwrap()
            .filter;

        let Some(SearchFilter::Tree(filter)) = filter else {
            panic!("expected a tree filter");
        };
        assert_eq!(
            filter,
            BooleanFilter::new()
                .must(FieldCondition::any("metadata.authorized_identities", ["Finance"]))
                .must_not(FieldCondition::any("metadata.pebblo_semantic_topics", ["politics"]))
        );
    }

    #[test]
    fn test_where_compilation_uses_not() {
        let compiler = FilterCompiler::new(BackendKind::Weaviate).unwrap();
        let filter = compiler
            .apply(&SearchOptions::new(), Some(&auth()), Some(&deny_politics()))
            .unwrap()
            .filter;

        let Some(SearchFilter::Where(filter)) = filter else {
            panic!("expected a where filter");
        };
        assert_eq!(filter.operator, WhereOperator::And);
        assert_eq!(
            filter.operands,
            [
                WhereFilter::contains_any("authorized_identities", ["Finance"]),
                WhereFilter::not(WhereFilter::contains_any("pebblo_semantic_topics", ["politics"])),
            ]
        );
    }

    #[test]
    fn test_identity_applied_twice_conflicts() {
        for kind in BackendKind::SUPPORTED {
            let compiler = FilterCompiler::new(kind).unwrap();
            let mut options = SearchOptions::new();

            compiler.apply_identity(&mut options, Some(&auth())).unwrap();
            let err = compiler
                .apply_identity(&mut options, Some(&auth()))
                .unwrap_err();
            assert!(
                matches!(err, RetrievalError::Conflict { field: AUTHORIZED_IDENTITIES }),
                "{kind}: {err}"
            );
        }
    }

    #[test]
    fn test_caller_semantic_clause_conflicts() {
        let compiler = FilterCompiler::new(BackendKind::Qdrant).unwrap();
        let base = SearchOptions::new().with_filter(
            BooleanFilter::new()
                .must(FieldCondition::any("metadata.pebblo_semantic_topics", ["economy"])),
        );

        let err = compiler
            .apply(&base, Some(&auth()), Some(&deny_politics()))
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Conflict { field: SEMANTIC_TOPICS }));
    }

    /// A caller clause on `field`, written in `kind`'s dialect.
    fn caller_clause(kind: BackendKind, field: &str) -> SearchFilter {
        match kind {
            BackendKind::Pinecone => FlatFilter::new().with(field, json!({"$in": ["economy"]})).into(),
            BackendKind::Qdrant => BooleanFilter::new()
                .must(FieldCondition::any(format!("metadata.{field}"), ["economy"]))
                .into(),
            BackendKind::Weaviate => WhereFilter::contains_any(field, ["economy"]).into(),
            other => panic!("no dialect for {other}"),
        }
    }

    #[test]
    fn test_caller_semantic_clauses_conflict_on_every_backend() {
        let semantic = SemanticContext::new(["politics"], ["us-ssn"]);

        for kind in BackendKind::SUPPORTED {
            let compiler = FilterCompiler::new(kind).unwrap();

            for field in [SEMANTIC_TOPICS, SEMANTIC_ENTITIES] {
                let base = SearchOptions::new().with_filter(caller_clause(kind, field));
                let err = compiler
                    .apply(&base, Some(&auth()), Some(&semantic))
                    .unwrap_err();
                assert!(
                    matches!(err, RetrievalError::Conflict { field: f } if f == field),
                    "{kind}/{field}: {err}"
                );
                assert_eq!(err.kind(), crate::ErrorKind::PolicyConflict);
            }
        }
    }

    #[test]
    fn test_caller_clause_on_undenied_field_is_kept() {
        let semantic = SemanticContext::new(["politics"], Vec::<String>::new());

        for kind in BackendKind::SUPPORTED {
            let compiler = FilterCompiler::new(kind).unwrap();
            let base = SearchOptions::new().with_filter(caller_clause(kind, SEMANTIC_ENTITIES));
            assert!(compiler.apply(&base, None, Some(&semantic)).is_ok(), "{kind}");
        }
    }

    #[test]
    fn test_absent_contexts_add_nothing() {
        let compiler = FilterCompiler::new(BackendKind::Pinecone).unwrap();
        assert_eq!(compiler.apply(&SearchOptions::new(), None, None).unwrap().filter, None);

        let empty = SemanticContext::new(Vec::<String>::new(), Vec::<String>::new());
        assert_eq!(
            compiler
                .apply(&SearchOptions::new(), None, Some(&empty))
                .unwrap()
                .filter,
            None
        );
    }

    #[test]
    fn test_base_options_untouched_on_failure() {
        let compiler = FilterCompiler::new(BackendKind::Pinecone).unwrap();
        let base = SearchOptions::new().with_filter(
            FlatFilter::new().with("pebblo_semantic_topics", json!({"$in": ["economy"]})),
        );

        let err = compiler
            .apply(&base, Some(&auth()), Some(&deny_politics()))
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Conflict { field: SEMANTIC_TOPICS }));
        assert_eq!(
            base.filter,
            Some(FlatFilter::new().with("pebblo_semantic_topics", json!({"$in": ["economy"]})).into())
        );
    }

    #[test]
    fn test_foreign_dialect_is_configuration_error() {
        let compiler = FilterCompiler::new(BackendKind::Qdrant).unwrap();
        let base = SearchOptions::new().with_filter(FlatFilter::new());

        let err = compiler.apply(&base, Some(&auth()), None).unwrap_err();
        assert!(matches!(err, RetrievalError::Vector(VectorError::FilterMismatch { .. })));
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}
