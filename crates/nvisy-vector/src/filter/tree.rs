//! Boolean-tree filters with `must`, `must_not` and `should` branches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{contains, intersects, lookup};

/// A boolean filter tree.
///
/// A document matches when every `must` condition holds, no `must_not`
/// condition holds, and at least one `should` condition holds if any are
/// given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FilterCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<FilterCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<FilterCondition>,
}

/// A single condition of a [`BooleanFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterCondition {
    /// Condition on a payload field.
    Field(FieldCondition),
    /// Nested boolean filter.
    Filter(BooleanFilter),
}

/// Condition on a dotted payload key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub key: String,
    #[serde(rename = "match")]
    pub r#match: Match,
}

/// Value matcher of a [`FieldCondition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Match {
    /// Field equals the value, or is an array holding it.
    Value(Value),
    /// Field, or any element of it, is one of the values.
    Any(Vec<Value>),
}

impl BooleanFilter {
    /// Creates an empty filter, which matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `must` condition.
    pub fn must(mut self, condition: impl Into<FilterCondition>) -> Self {
        self.must.push(condition.into());
        self
    }

    /// Adds a `must_not` condition.
    pub fn must_not(mut self, condition: impl Into<FilterCondition>) -> Self {
        self.must_not.push(condition.into());
        self
    }

    /// Adds a `should` condition.
    pub fn should(mut self, condition: impl Into<FilterCondition>) -> Self {
        self.should.push(condition.into());
        self
    }

    /// Returns `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty() && self.should.is_empty()
    }

    /// Returns `true` if any condition, at any depth and in any branch, is
    /// keyed on `key`.
    pub fn has_key(&self, key: &str) -> bool {
        self.must
            .iter()
            .chain(&self.must_not)
            .chain(&self.should)
            .any(|condition| match condition {
                FilterCondition::Field(field) => field.key == key,
                FilterCondition::Filter(nested) => nested.has_key(key),
            })
    }

    /// Evaluates the filter against a `{page_content, metadata}` payload.
    pub fn matches(&self, payload: &Map<String, Value>) -> bool {
        self.must.iter().all(|c| c.matches(payload))
            && !self.must_not.iter().any(|c| c.matches(payload))
            && (self.should.is_empty() || self.should.iter().any(|c| c.matches(payload)))
    }
}

impl FilterCondition {
    fn matches(&self, payload: &Map<String, Value>) -> bool {
        match self {
            Self::Field(field) => field.matches(payload),
            Self::Filter(nested) => nested.matches(payload),
        }
    }
}

impl FieldCondition {
    /// Matches documents whose `key` equals `value` or holds it.
    pub fn value(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            r#match: Match::Value(value.into()),
        }
    }

    /// Matches documents whose `key` holds any of `values`.
    pub fn any<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            key: key.into(),
            r#match: Match::Any(values.into_iter().map(Into::into).collect()),
        }
    }

    fn matches(&self, payload: &Map<String, Value>) -> bool {
        let Some(field) = lookup(payload, self.key.split('.')) else {
            return false;
        };

        match &self.r#match {
            Match::Value(expected) => contains(field, expected),
            Match::Any(set) => intersects(field, set),
        }
    }
}

impl From<FieldCondition> for FilterCondition {
    fn from(condition: FieldCondition) -> Self {
        Self::Field(condition)
    }
}

impl From<BooleanFilter> for FilterCondition {
    fn from(filter: BooleanFilter) -> Self {
        Self::Filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(metadata: Value) -> Map<String, Value> {
        json!({"page_content": "quarterly results", "metadata": metadata})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_must_and_must_not() {
        let doc = payload(json!({
            "authorized_identities": ["Finance"],
            "pebblo_semantic_topics": ["economy"],
        }));

        let allowed = BooleanFilter::new()
            .must(FieldCondition::any("metadata.authorized_identities", ["Finance", "HR"]))
            .must_not(FieldCondition::any("metadata.pebblo_semantic_topics", ["politics"]));
        assert!(allowed.matches(&doc));

        let denied = allowed
            .clone()
            .must_not(FieldCondition::any("metadata.pebblo_semantic_topics", ["economy"]));
        assert!(!denied.matches(&doc));
    }

    #[test]
    fn test_should_and_nested() {
        let doc = payload(json!({"source": "wiki"}));

        let filter = BooleanFilter::new().must(
            BooleanFilter::new()
                .should(FieldCondition::value("metadata.source", "slack"))
                .should(FieldCondition::value("metadata.source", "wiki")),
        );
        assert!(filter.matches(&doc));
        assert!(filter.has_key("metadata.source"));
        assert!(!filter.has_key("metadata.topics"));

        let none = BooleanFilter::new().should(FieldCondition::value("page_content", "other"));
        assert!(!none.matches(&doc));
    }

    #[test]
    fn test_missing_key_never_matches() {
        let doc = payload(json!({}));
        let filter = BooleanFilter::new()
            .must_not(FieldCondition::any("metadata.pebblo_semantic_topics", ["politics"]));
        assert!(filter.matches(&doc));
        assert!(!BooleanFilter::new()
            .must(FieldCondition::any("metadata.authorized_identities", ["Finance"]))
            .matches(&doc));
    }

    #[test]
    fn test_deserialize_native_shape() {
        let filter: BooleanFilter = serde_json::from_value(json!({
            "must": [
                {"key": "metadata.authorized_identities", "match": {"any": ["Finance"]}},
                {"should": [{"key": "metadata.source", "match": {"value": "wiki"}}]}
            ]
        }))
        .unwrap();

        assert!(matches!(filter.must[0], FilterCondition::Field(_)));
        assert!(matches!(filter.must[1], FilterCondition::Filter(_)));
        assert!(filter.has_key("metadata.source"));
    }
}
