//! Document metadata fields referenced by enforcement clauses.

/// Identities allowed to read a document.
pub const AUTHORIZED_IDENTITIES: &str = "authorized_identities";

/// Topics a document was classified under.
pub const SEMANTIC_TOPICS: &str = "pebblo_semantic_topics";

/// Entities detected in a document.
pub const SEMANTIC_ENTITIES: &str = "pebblo_semantic_entities";
