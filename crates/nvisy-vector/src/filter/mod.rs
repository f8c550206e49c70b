//! Backend filter dialects.
//!
//! Each supported backend speaks one dialect: a flat operator map, a boolean
//! `must`/`must_not` tree, or a `where` operator tree. [`SearchFilter`] holds
//! any of them; every dialect can also be evaluated in process against a
//! document's metadata.

mod flat;
mod tree;
mod where_tree;

pub use flat::FlatFilter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};
pub use tree::{BooleanFilter, FieldCondition, FilterCondition, Match};
pub use where_tree::{TextValue, WhereFilter, WhereOperator};

/// Filter dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterDialect {
    /// Flat map of fields to values or `$` operators.
    Flat,
    /// Boolean tree with `must`, `must_not` and `should` branches.
    Tree,
    /// Operator tree with `path` and typed values.
    Where,
}

/// A backend-specific filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", content = "expr", rename_all = "lowercase")]
pub enum SearchFilter {
    Flat(FlatFilter),
    Tree(BooleanFilter),
    Where(WhereFilter),
}

impl SearchFilter {
    /// Returns the dialect of this filter.
    pub fn dialect(&self) -> FilterDialect {
        match self {
            Self::Flat(_) => FilterDialect::Flat,
            Self::Tree(_) => FilterDialect::Tree,
            Self::Where(_) => FilterDialect::Where,
        }
    }
}

impl From<FlatFilter> for SearchFilter {
    fn from(filter: FlatFilter) -> Self {
        Self::Flat(filter)
    }
}

impl From<BooleanFilter> for SearchFilter {
    fn from(filter: BooleanFilter) -> Self {
        Self::Tree(filter)
    }
}

impl From<WhereFilter> for SearchFilter {
    fn from(filter: WhereFilter) -> Self {
        Self::Where(filter)
    }
}

/// Follows `path` through nested objects.
fn lookup<'a, 'p>(
    root: &'a Map<String, Value>,
    mut path: impl Iterator<Item = &'p str>,
) -> Option<&'a Value> {
    let mut current = root.get(path.next()?)?;
    for segment in path {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Field equals `expected`, or is an array holding it.
fn contains(field: &Value, expected: &Value) -> bool {
    match field {
        Value::Array(items) => items.contains(expected),
        other => other == expected,
    }
}

/// Field, or any element of an array field, is in `set`.
fn intersects(field: &Value, set: &[Value]) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| set.contains(item)),
        other => set.contains(other),
    }
}
