//! Retrieved documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A text chunk with its metadata, as stored in and returned by a vector store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Chunk text.
    pub page_content: String,
    /// Arbitrary metadata, including the enforcement tags.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Creates a document without metadata.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            id: None,
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Adds a list-of-strings metadata field.
    pub fn with_tags<I, S>(self, key: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<Value> = tags.into_iter().map(|t| Value::String(t.into())).collect();
        self.with_field(key, Value::Array(tags))
    }

    /// Returns the document as a `{page_content, metadata}` payload.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("page_content".into(), Value::String(self.page_content.clone()));
        payload.insert("metadata".into(), Value::Object(self.metadata.clone()));
        payload
    }
}
