pub mod document;
pub mod editing;
pub mod lifecycle;
pub mod models;
pub mod search;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use document::Document;
pub use editing::{
    EditRange, EditRelation, IndentConfig, TextEdit, Translation, translate, translate_batch,
};
pub use lifecycle::{AnchorState, LifecycleError, StaleReason, TrackedAnchor};
pub use models::*;
pub use search::{
    Candidate, ProximitySearch, ReanchorConfig, ScoringConfig, SearchConfig, SearchInput,
    reanchor, reanchor_until,
};
