//! Pinecone-style flat filters.

use serde_json::{Value, json};

use crate::{BackendKind, FilterAdapter, SearchOptions, SearchFilter, VectorResult};

/// Writes flat `$in`/`$nin` conditions keyed by the metadata field.
#[derive(Debug, Clone, Copy, Default)]
pub struct PineconeAdapter;

impl FilterAdapter for PineconeAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Pinecone
    }

    fn has_clause(&self, options: &SearchOptions, field: &str) -> VectorResult<bool> {
        options.check_dialect(self.kind())?;
        Ok(matches!(&options.filter, Some(SearchFilter::Flat(filter)) if filter.has_field(field)))
    }

    fn require_any(
        &self,
        options: &mut SearchOptions,
        field: &str,
        values: &[String],
    ) -> VectorResult<()> {
        options
            .flat_filter_mut()?
            .insert(field, json!({ "$in": strings(values) }));
        Ok(())
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
        options
            .flat_filter_mut()?
            .insert(field, json!({ "$nin": strings(values) }));
        Ok(())
    }
}

fn strings(values: &[String]) -> Vec<Value> {
    values.iter().cloned().map(Value::String).collect()
}
