//! Flat operator-map filters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{contains, intersects};
use crate::{VectorError, VectorResult};

/// A flat map of metadata fields to values or `$` operator objects.
///
/// Top-level keys are combined with AND; `$and` and `$or` take lists of
/// nested maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatFilter(Map<String, Value>);

impl FlatFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the condition on `key`.
    pub fn with(mut self, key: impl Into<String>, condition: Value) -> Self {
        self.insert(key, condition);
        self
    }

    /// Adds or replaces the condition on `key`.
    pub fn insert(&mut self, key: impl Into<String>, condition: Value) {
        self.0.insert(key.into(), condition);
    }

    /// Returns the condition on `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns `true` if any condition, at any depth, is keyed on `field`.
    pub fn has_field(&self, field: &str) -> bool {
        map_has_field(&self.0, field)
    }

    /// Evaluates the filter against document metadata.
    pub fn matches(&self, metadata: &Map<String, Value>) -> VectorResult<bool> {
        eval_map(&self.0, metadata)
    }
}

impl From<Map<String, Value>> for FlatFilter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn map_has_field(map: &Map<String, Value>, field: &str) -> bool {
    map.iter().any(|(key, value)| match key.as_str() {
        "$and" | "$or" => value.as_array().is_some_and(|clauses| {
            clauses
                .iter()
                .filter_map(Value::as_object)
                .any(|clause| map_has_field(clause, field))
        }),
        key => key == field,
    })
}

fn clauses<'a>(op: &str, value: &'a Value) -> VectorResult<Vec<&'a Map<String, Value>>> {
    value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_object).collect::<Option<Vec<_>>>())
        .ok_or_else(|| VectorError::invalid_filter(format!("{op} expects a list of objects")))
}

fn eval_map(map: &Map<String, Value>, metadata: &Map<String, Value>) -> VectorResult<bool> {
    for (key, condition) in map {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !eval_map(clause, metadata)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if eval_map(clause, metadata)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            op if op.starts_with('$') => {
                return Err(VectorError::invalid_filter(format!(
                    "unsupported top-level operator {op}"
                )));
            }
            field => eval_field(metadata.get(field), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn eval_field(value: Option<&Value>, condition: &Value) -> VectorResult<bool> {
    match condition {
        Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => {
            for (op, arg) in ops {
                if !eval_operator(value, op, arg)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        literal => Ok(value.is_some_and(|v| contains(v, literal))),
    }
}

fn eval_operator(value: Option<&Value>, op: &str, arg: &Value) -> VectorResult<bool> {
    let matched = match op {
        "$eq" => value.is_some_and(|v| contains(v, arg)),
        "$ne" => !value.is_some_and(|v| contains(v, arg)),
        "$in" | "$nin" => {
            let set = arg.as_array().ok_or_else(|| {
                VectorError::invalid_filter(format!("{op} expects a list of values"))
            })?;
            let hit = value.is_some_and(|v| intersects(v, set));
            if op == "$in" { hit } else { !hit }
        }
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let bound = arg.as_f64().ok_or_else(|| {
                VectorError::invalid_filter(format!("{op} expects a number"))
            })?;
            value.and_then(Value::as_f64).is_some_and(|v| match op {
                "$gt" => v > bound,
                "$gte" => v >= bound,
                "$lt" => v < bound,
                _ => v <= bound,
            })
        }
        other => {
            return Err(VectorError::invalid_filter(format!(
                "unsupported operator {other}"
            )));
        }
    };

    Ok(matched)
}
