//! Live Qdrant vector store.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{PointId, ScoredPoint, SearchPointsBuilder};
use serde_json::{Map, Value};
use tokio::runtime::{Handle, RuntimeFlavor};

use super::{QdrantConfig, to_qdrant_filter};
use crate::{
    BackendKind, Document, SearchFilter, SearchOptions, TRACING_TARGET, VectorError,
    VectorResult, VectorStoreBackend,
};

/// Turns query text into the embedding searched for.
pub trait QueryEmbedder: Send + Sync {
    /// Embeds a single query.
    fn embed_query(&self, text: &str) -> VectorResult<Vec<f32>>;
}

/// Qdrant-backed similarity search.
///
/// Searches block the calling thread on a tokio runtime the store does not
/// own. Inside that runtime they must run on a multi-threaded scheduler;
/// a current-thread runtime is reported as a backend error.
pub struct QdrantStore {
    client: Qdrant,
    handle: Handle,
    config: QdrantConfig,
    embedder: Arc<dyn QueryEmbedder>,
}

impl QdrantStore {
    /// Creates a store on the tokio runtime of the calling context.
    pub fn new(config: QdrantConfig, embedder: Arc<dyn QueryEmbedder>) -> VectorResult<Self> {
        let handle = Handle::try_current()
            .map_err(|_| VectorError::invalid_config("Qdrant store requires a tokio runtime"))?;
        Self::with_handle(config, embedder, handle)
    }

    /// Creates a store that runs its searches on `handle`.
    ///
    /// `handle` should belong to a multi-threaded runtime: a current-thread
    /// runtime only makes progress while its owner is blocked on it.
    pub fn with_handle(
        config: QdrantConfig,
        embedder: Arc<dyn QueryEmbedder>,
        handle: Handle,
    ) -> VectorResult<Self> {
        config.validate()?;

        let client = {
            let _guard = handle.enter();
            Qdrant::from_url(&config.url)
                .api_key(config.api_key.clone())
                .timeout(config.timeout())
                .build()
                .map_err(|e| VectorError::connection(e.to_string()))?
        };

        tracing::debug!(
            target: TRACING_TARGET,
            url = %config.url,
            collection = %config.collection,
            "Created Qdrant store"
        );

        Ok(Self {
            client,
            handle,
            config,
            embedder,
        })
    }

    /// Returns search options addressing this store's metadata payload key.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::new().with_metadata_payload_key(&self.config.metadata_payload_key)
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &QdrantConfig {
        &self.config
    }

    fn block_on<F: Future>(&self, future: F) -> VectorResult<F::Output> {
        match Handle::try_current() {
            Err(_) => Ok(self.handle.block_on(future)),
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(|| self.handle.block_on(future)))
            }
            Ok(_) => Err(VectorError::backend(
                "Qdrant search cannot block a current-thread runtime",
            )),
        }
    }
}

impl VectorStoreBackend for QdrantStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Qdrant
    }

    fn similarity_search(&self, query: &str, options: &SearchOptions) -> VectorResult<Vec<Document>> {
        options.check_dialect(self.kind())?;
        let filter = match &options.filter {
            Some(SearchFilter::Tree(filter)) if !filter.is_empty() => Some(to_qdrant_filter(filter)?),
            _ => None,
        };

        let vector = self.embedder.embed_query(query)?;
        let mut search = SearchPointsBuilder::new(&self.config.collection, vector, options.k as u64)
            .with_payload(true);
        if let Some(filter) = filter {
            search = search.filter(filter);
        }

        let response = self
            .block_on(self.client.search_points(search))?
            .map_err(|e| VectorError::backend(e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %self.config.collection,
            count = response.result.len(),
            elapsed_ms = (response.time * 1000.0) as u64,
            "Qdrant search finished"
        );

        Ok(response
            .result
            .into_iter()
            .map(|point| {
                to_document(
                    point,
                    &self.config.content_payload_key,
                    &options.metadata_payload_key,
                )
            })
            .collect())
    }
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore")
            .field("url", &self.config.url)
            .field("collection", &self.config.collection)
            .finish_non_exhaustive()
    }
}

fn to_document(point: ScoredPoint, content_key: &str, metadata_key: &str) -> Document {
    let mut payload: HashMap<String, Value> = point
        .payload
        .into_iter()
        .map(|(k, v)| (k, qdrant_value_to_json(v)))
        .collect();

    let page_content = match payload.remove(content_key) {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };
    let metadata = match payload.remove(metadata_key) {
        Some(Value::Object(metadata)) => metadata,
        _ => Map::new(),
    };

    Document {
        id: extract_point_id(point.id),
        page_content,
        metadata,
    }
}

fn extract_point_id(id: Option<PointId>) -> Option<String> {
    match id?.point_id_options? {
        PointIdOptions::Num(n) => Some(n.to_string()),
        PointIdOptions::Uuid(s) => Some(s),
    }
}

fn qdrant_value_to_json(value: qdrant_client::qdrant::Value) -> Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::from(i),
        Some(Kind::DoubleValue(f)) => Value::from(f),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(obj)) => Value::Object(
            obj.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use qdrant_client::qdrant::{ListValue, Struct};

    use super::*;
    use crate::FlatFilter;

    struct FixedEmbedder;

    impl QueryEmbedder for FixedEmbedder {
        fn embed_query(&self, _text: &str) -> VectorResult<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    fn string(s: &str) -> qdrant_client::qdrant::Value {
        qdrant_client::qdrant::Value {
            kind: Some(Kind::StringValue(s.to_owned())),
        }
    }

    #[test]
    fn test_point_to_document() {
        let metadata = Struct {
            fields: HashMap::from([(
                "authorized_identities".to_owned(),
                qdrant_client::qdrant::Value {
                    kind: Some(Kind::ListValue(ListValue {
                        values: vec![string("Finance")],
                    })),
                },
            )]),
        };
        let point = ScoredPoint {
            id: Some(PointId::from(7u64)),
            payload: HashMap::from([
                ("page_content".to_owned(), string("quarterly results")),
                (
                    "metadata".to_owned(),
                    qdrant_client::qdrant::Value {
                        kind: Some(Kind::StructValue(metadata)),
                    },
                ),
            ]),
            score: 0.9,
            ..Default::default()
        };

        let document = to_document(point, "page_content", "metadata");
        assert_eq!(document.id.as_deref(), Some("7"));
        assert_eq!(document.page_content, "quarterly results");
        assert_eq!(
            document.metadata.get("authorized_identities"),
            Some(&serde_json::json!(["Finance"]))
        );
    }

    fn unreachable_config() -> QdrantConfig {
        let mut config = QdrantConfig::new("http://127.0.0.1:1", "docs");
        config.timeout_secs = 2;
        config
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejects_foreign_filter_before_searching() {
        let store = QdrantStore::new(unreachable_config(), Arc::new(FixedEmbedder)).unwrap();

        let options = store.search_options().with_filter(FlatFilter::new());
        let err = store.similarity_search("q", &options).unwrap_err();
        assert!(matches!(err, VectorError::FilterMismatch { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_and_drop_inside_multi_thread_runtime() {
        let store = QdrantStore::new(unreachable_config(), Arc::new(FixedEmbedder)).unwrap();

        let err = store
            .similarity_search("q", &store.search_options())
            .unwrap_err();
        assert!(matches!(err, VectorError::Backend(_)));
        drop(store);
    }

    #[tokio::test]
    async fn test_current_thread_runtime_is_reported() {
        let store = QdrantStore::new(unreachable_config(), Arc::new(FixedEmbedder)).unwrap();

        let err = store
            .similarity_search("q", &store.search_options())
            .unwrap_err();
        assert!(matches!(err, VectorError::Backend(_)));
        drop(store);
    }

    #[test]
    fn test_search_from_plain_thread_with_handle() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let store = QdrantStore::with_handle(
            unreachable_config(),
            Arc::new(FixedEmbedder),
            runtime.handle().clone(),
        )
        .unwrap();

        let err = store
            .similarity_search("q", &store.search_options())
            .unwrap_err();
        assert!(matches!(err, VectorError::Backend(_)));
    }

    #[test]
    fn test_requires_runtime() {
        let err = QdrantStore::new(unreachable_config(), Arc::new(FixedEmbedder)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let err = QdrantStore::new(QdrantConfig::new("http://localhost:6334", ""), Arc::new(FixedEmbedder))
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
