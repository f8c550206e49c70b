//! Qdrant filter adapter.

use crate::{
    BackendKind, FieldCondition, FilterAdapter, SearchFilter, SearchOptions, VectorResult,
};

/// Appends match-any conditions to the `must` and `must_not` branches.
///
/// Fields are addressed below the metadata payload key, e.g.
/// `metadata.authorized_identities`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QdrantAdapter;

impl QdrantAdapter {
    fn key(options: &SearchOptions, field: &str) -> String {
        format!("{}.{field}", options.metadata_payload_key)
    }
}

impl FilterAdapter for QdrantAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Qdrant
    }

    fn has_clause(&self, options: &SearchOptions, field: &str) -> VectorResult<bool> {
        options.check_dialect(self.kind())?;
        let key = Self::key(options, field);
        Ok(matches!(&options.filter, Some(SearchFilter::Tree(filter)) if filter.has_key(&key)))
    }

    fn require_any(
        &self,
        options: &mut SearchOptions,
        field: &str,
        values: &[String],
    ) -> VectorResult<()> {
        let key = Self::key(options, field);
        options
            .tree_filter_mut()?
            .must
            .push(FieldCondition::any(key, values.iter().cloned()).into());
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
        let key = Self::key(options, field);
        options
            .tree_filter_mut()?
            .must_not
            .push(FieldCondition::any(key, values.iter().cloned()).into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BooleanFilter, FilterCondition};

    #[test]
    fn test_appends_into_branches_preserving_siblings() {
        let existing = FieldCondition::value("metadata.source", "wiki");
        let mut options =
            SearchOptions::new().with_filter(BooleanFilter::new().must(existing.clone()));

        QdrantAdapter
            .require_any(&mut options, "authorized_identities", &["Finance".into()])
            .unwrap();
        QdrantAdapter
            .exclude_all(&mut options, "pebblo_semantic_entities", &["us-ssn".into()])
            .unwrap();

        let Some(SearchFilter::Tree(filter)) = &options.filter else {
            panic!("expected a tree filter");
        };
        assert_eq!(
            filter.must,
            vec![
                FilterCondition::from(existing),
                FieldCondition::any("metadata.authorized_identities", ["Finance"]).into(),
            ]
        );
        assert_eq!(
            filter.must_not,
            vec![FilterCondition::from(FieldCondition::any(
                "metadata.pebblo_semantic_entities",
                ["us-ssn"]
            ))]
        );
    }

    #[test]
    fn test_custom_payload_key() {
        let mut options = SearchOptions::new().with_metadata_payload_key("meta");
        QdrantAdapter
            .require_any(&mut options, "authorized_identities", &["Finance".into()])
            .unwrap();

        assert!(QdrantAdapter.has_clause(&options, "authorized_identities").unwrap());
        let Some(SearchFilter::Tree(filter)) = &options.filter else {
            panic!("expected a tree filter");
        };
        assert!(filter.has_key("meta.authorized_identities"));
    }
}
