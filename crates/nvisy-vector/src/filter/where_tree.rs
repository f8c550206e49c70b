//! Where-operator filter trees.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

use super::{contains, intersects, lookup};
use crate::{VectorError, VectorResult};

/// Operators of a [`WhereFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
pub enum WhereOperator {
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    ContainsAny,
    ContainsAll,
}

/// Text operand, either a single string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    One(String),
    Many(Vec<String>),
}

/// A where filter node.
///
/// Logical nodes (`And`, `Or`, `Not`) carry `operands`; comparison nodes
/// carry a `path` and one typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereFilter {
    pub operator: WhereOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<WhereFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_text: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
}

impl WhereFilter {
    fn node(operator: WhereOperator) -> Self {
        Self {
            operator,
            path: Vec::new(),
            operands: Vec::new(),
            value_text: None,
            value_int: None,
            value_number: None,
            value_boolean: None,
        }
    }

    /// Conjunction of `operands`.
    pub fn and(operands: Vec<WhereFilter>) -> Self {
        Self {
            operands,
            ..Self::node(WhereOperator::And)
        }
    }

    /// Disjunction of `operands`.
    pub fn or(operands: Vec<WhereFilter>) -> Self {
        Self {
            operands,
            ..Self::node(WhereOperator::Or)
        }
    }

    /// Negation of `operand`.
    pub fn not(operand: WhereFilter) -> Self {
        Self {
            operands: vec![operand],
            ..Self::node(WhereOperator::Not)
        }
    }

    /// `path` holds any of `values`.
    pub fn contains_any<I, S>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::text(WhereOperator::ContainsAny, path, values)
    }

    /// `path` holds all of `values`.
    pub fn contains_all<I, S>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::text(WhereOperator::ContainsAll, path, values)
    }

    /// `path` equals `value`.
    pub fn equal(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: vec![path.into()],
            value_text: Some(TextValue::One(value.into())),
            ..Self::node(WhereOperator::Equal)
        }
    }

    fn text<I, S>(operator: WhereOperator, path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: vec![path.into()],
            value_text: Some(TextValue::Many(values.into_iter().map(Into::into).collect())),
            ..Self::node(operator)
        }
    }

    /// Returns `true` if this node or any operand compares `field`.
    pub fn references(&self, field: &str) -> bool {
        self.path.last().is_some_and(|last| last == field)
            || self.operands.iter().any(|operand| operand.references(field))
    }

    /// Evaluates the filter against document metadata.
    pub fn matches(&self, metadata: &Map<String, Value>) -> VectorResult<bool> {
        match self.operator {
            WhereOperator::And => {
                for operand in &self.operands {
                    if !operand.matches(metadata)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            WhereOperator::Or => {
                for operand in &self.operands {
                    if operand.matches(metadata)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            WhereOperator::Not => match self.operands.as_slice() {
                [operand] => Ok(!operand.matches(metadata)?),
                _ => Err(VectorError::invalid_filter("Not takes exactly one operand")),
            },
            WhereOperator::Equal | WhereOperator::NotEqual => {
                let expected = self.scalar()?;
                let equal = self.field(metadata)?.is_some_and(|v| contains(v, &expected));
                Ok(equal == (self.operator == WhereOperator::Equal))
            }
            WhereOperator::ContainsAny => {
                let values = self.values();
                Ok(self.field(metadata)?.is_some_and(|v| intersects(v, &values)))
            }
            WhereOperator::ContainsAll => {
                let values = self.values();
                Ok(self
                    .field(metadata)?
                    .is_some_and(|v| values.iter().all(|expected| contains(v, expected))))
            }
        }
    }

    fn field<'a>(&self, metadata: &'a Map<String, Value>) -> VectorResult<Option<&'a Value>> {
        if self.path.is_empty() {
            return Err(VectorError::invalid_filter(format!(
                "{} requires a path",
                self.operator
            )));
        }
        Ok(lookup(metadata, self.path.iter().map(String::as_str)))
    }

    fn scalar(&self) -> VectorResult<Value> {
        match self.values().as_slice() {
            [value] => Ok(value.clone()),
            _ => Err(VectorError::invalid_filter(format!(
                "{} requires a single value",
                self.operator
            ))),
        }
    }

    fn values(&self) -> Vec<Value> {
        if let Some(text) = &self.value_text {
            return match text {
                TextValue::One(s) => vec![Value::String(s.clone())],
                TextValue::Many(items) => items.iter().cloned().map(Value::String).collect(),
            };
        }

        self.value_int
            .map(Value::from)
            .or_else(|| self.value_number.map(Value::from))
            .or_else(|| self.value_boolean.map(Value::Bool))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_serializes_native_shape() {
        let filter = WhereFilter::contains_any("authorized_identities", ["Finance"]);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "operator": "ContainsAny",
                "path": ["authorized_identities"],
                "valueText": ["Finance"],
            })
        );
    }

    #[test]
    fn test_contains_and_not() {
        let doc = metadata(json!({"pebblo_semantic_topics": ["politics", "economy"]}));

        let any = WhereFilter::contains_any("pebblo_semantic_topics", ["politics"]);
        assert!(any.matches(&doc).unwrap());
        assert!(!WhereFilter::not(any.clone()).matches(&doc).unwrap());
        assert!(WhereFilter::contains_all("pebblo_semantic_topics", ["economy", "politics"])
            .matches(&doc)
            .unwrap());
        assert!(!WhereFilter::contains_all("pebblo_semantic_topics", ["economy", "sports"])
            .matches(&doc)
            .unwrap());
    }

    #[test]
    fn test_logical_nodes() {
        let doc = metadata(json!({"source": "wiki", "year": 2021}));

        let filter = WhereFilter::and(vec![
            WhereFilter::equal("source", "wiki"),
            WhereFilter::or(vec![
                WhereFilter::equal("source", "slack"),
                serde_json::from_value(json!({"operator": "Equal", "path": ["year"], "valueInt": 2021}))
                    .unwrap(),
            ]),
        ]);
        assert!(filter.matches(&doc).unwrap());
        assert!(filter.references("year"));
        assert!(!filter.references("authorized_identities"));
    }

    #[test]
    fn test_malformed_nodes() {
        let doc = metadata(json!({}));
        let not = WhereFilter {
            operands: vec![],
            ..WhereFilter::not(WhereFilter::equal("a", "b"))
        };
        assert!(not.matches(&doc).is_err());

        let equal = WhereFilter::contains_any("source", ["a", "b"]);
        let equal = WhereFilter {
            operator: WhereOperator::Equal,
            ..equal
        };
        assert!(equal.matches(&doc).is_err());
    }
}
