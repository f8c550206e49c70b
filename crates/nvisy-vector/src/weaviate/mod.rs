//! Weaviate-style where filters.

use crate::{
    BackendKind, FilterAdapter, FilterDialect, SearchFilter, SearchOptions, VectorError,
    VectorResult, WhereFilter, WhereOperator,
};

/// Writes `ContainsAny` nodes, combining them with any existing filter
/// under a single `And` node.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeaviateAdapter;

impl WeaviateAdapter {
    fn push(options: &mut SearchOptions, clause: WhereFilter) -> VectorResult<()> {
        let slot = options.where_filter_mut()?;
        let combined = match slot.take() {
            None => clause,
            Some(SearchFilter::Where(mut and)) if and.operator == WhereOperator::And => {
                and.operands.push(clause);
                and
            }
            Some(SearchFilter::Where(existing)) => WhereFilter::and(vec![existing, clause]),
            Some(other) => {
                let found = other.dialect();
                *slot = Some(other);
                return Err(VectorError::FilterMismatch {
                    backend: BackendKind::Weaviate,
                    expected: FilterDialect::Where,
                    found,
                });
            }
        };
        *slot = Some(combined.into());
        Ok(())
    }
}

impl FilterAdapter for WeaviateAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Weaviate
    }

    fn has_clause(&self, options: &SearchOptions, field: &str) -> VectorResult<bool> {
        options.check_dialect(self.kind())?;
        Ok(options.where_filter().is_some_and(|filter| filter.references(field)))
    }

    fn require_any(
        &self,
        options: &mut SearchOptions,
        field: &str,
        values: &[String],
    ) -> VectorResult<()> {
        Self::push(options, WhereFilter::contains_any(field, values.iter().cloned()))
    }

    fn exclude_all(
        &self,
        options: &mut SearchOptions,
        field: &str,
        values: &[String],
    ) -> VectorResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        Self::push(
            options,
            WhereFilter::not(WhereFilter::contains_any(field, values.iter().cloned())),
        )
    }
}
