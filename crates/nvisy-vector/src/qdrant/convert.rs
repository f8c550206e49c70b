//! Translation of boolean-tree filters into native Qdrant filters.

use qdrant_client::qdrant::condition::ConditionOneOf;
use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{Condition, Filter, RepeatedIntegers, RepeatedStrings};
use serde_json::Value;

use crate::{BooleanFilter, FilterCondition, Match, VectorError, VectorResult};

/// Converts a [`BooleanFilter`] into a `qdrant_client` filter.
///
/// Match values must be strings, integers or booleans; `any` lists must be
/// all strings or all integers.
pub fn to_qdrant_filter(filter: &BooleanFilter) -> VectorResult<Filter> {
    Ok(Filter {
        must: conditions(&filter.must)?,
        must_not: conditions(&filter.must_not)?,
        should: conditions(&filter.should)?,
        ..Default::default()
    })
}

fn conditions(items: &[FilterCondition]) -> VectorResult<Vec<Condition>> {
    items.iter().map(condition).collect()
}

fn condition(item: &FilterCondition) -> VectorResult<Condition> {
    match item {
        FilterCondition::Field(field) => Ok(Condition::matches(
            field.key.clone(),
            match_value(&field.key, &field.r#match)?,
        )),
        FilterCondition::Filter(nested) => Ok(Condition {
            condition_one_of: Some(ConditionOneOf::Filter(to_qdrant_filter(nested)?)),
        }),
    }
}

fn match_value(key: &str, matcher: &Match) -> VectorResult<MatchValue> {
    let unsupported =
        || VectorError::invalid_filter(format!("unsupported match value for {key}"));

    match matcher {
        Match::Value(Value::String(s)) => Ok(MatchValue::Keyword(s.clone())),
        Match::Value(Value::Bool(b)) => Ok(MatchValue::Boolean(*b)),
        Match::Value(Value::Number(n)) => n.as_i64().map(MatchValue::Integer).ok_or_else(unsupported),
        Match::Value(_) => Err(unsupported()),
        Match::Any(values) => {
            if let Some(strings) = values
                .iter()
                .map(|v| v.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
            {
                return Ok(MatchValue::Keywords(RepeatedStrings { strings }));
            }

            values
                .iter()
                .map(Value::as_i64)
                .collect::<Option<Vec<_>>>()
                .map(|integers| MatchValue::Integers(RepeatedIntegers { integers }))
                .ok_or_else(unsupported)
        }
    }
}
