use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::document::Document;
use crate::editing::{IndentConfig, TextEdit, Translation, translate};
use crate::models::{AnchorObject, PotentialAnchorObject};
use crate::search::{ReanchorConfig, reanchor};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LifecycleError {
    #[error("Cannot {action} an anchor that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: AnchorState,
    },
    #[error("No candidate {0} for this anchor")]
    UnknownCandidate(Uuid),
}

/// Why an anchor stopped tracking its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaleReason {
    /// An edit removed the anchored text.
    Deleted,
    /// An edit replaced the anchored text along with its surroundings.
    Invalidated,
    /// The document no longer holds the cached text at the anchor's range.
    TextChanged,
    /// Candidates were offered and turned down.
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "reason")]
pub enum AnchorState {
    /// Following edits as they happen.
    Tracking,
    /// Needs a re-anchor search.
    Stale(StaleReason),
    /// Candidates are waiting for a decision.
    Searching(StaleReason),
    /// Removed for good, along with its annotation.
    Deleted,
}

impl fmt::Display for AnchorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorState::Tracking => write!(f, "tracking"),
            AnchorState::Stale(reason) => write!(f, "stale ({reason:?})"),
            AnchorState::Searching(_) => write!(f, "awaiting a candidate decision"),
            AnchorState::Deleted => write!(f, "deleted"),
        }
    }
}

/// An anchor object together with where it is in its lifecycle.
///
/// ```text
/// Tracking --edit deletes/invalidates--> Stale --search finds candidates--> Searching
///    ^          or validate fails          ^                                  |
///    |                                     +------------ dismiss -------------+
///    +--------------------------- accept ------------------------------------+
/// ```
///
/// Any state can move to `Deleted`, which is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAnchor {
    pub object: AnchorObject,
    pub state: AnchorState,
    #[serde(default)]
    pub candidates: Vec<PotentialAnchorObject>,
}

impl TrackedAnchor {
    pub fn new(object: AnchorObject) -> Self {
        Self {
            object,
            state: AnchorState::Tracking,
            candidates: Vec::new(),
        }
    }

    fn invalid(&self, action: &'static str) -> LifecycleError {
        LifecycleError::InvalidTransition {
            action,
            state: self.state,
        }
    }

    fn mark_stale(&mut self, reason: StaleReason) {
        log::debug!("Anchor {} is stale: {reason:?}", self.object.anchor_id);
        self.state = AnchorState::Stale(reason);
        self.candidates.clear();
    }

    /// Follows one edit, `document` being the text after it.
    ///
    /// A tracking anchor is translated. A stale anchor ignores edits, except
    /// that pending candidates are dropped because their ranges are now out of
    /// date.
    pub fn apply_edit(
        &mut self,
        edit: &TextEdit,
        document: &Document,
        indent: &IndentConfig,
    ) -> Result<(), LifecycleError> {
        match self.state {
            AnchorState::Tracking => match translate(&self.object, edit, document, indent) {
                Translation::Unchanged => {}
                Translation::Updated(object) => self.object = object,
                Translation::Deleted => self.mark_stale(StaleReason::Deleted),
                Translation::Invalidated => self.mark_stale(StaleReason::Invalidated),
            },
            AnchorState::Stale(_) => {}
            AnchorState::Searching(reason) => self.mark_stale(reason),
            AnchorState::Deleted => return Err(self.invalid("edit")),
        }
        Ok(())
    }

    /// Marks a tracking anchor stale if its cached text no longer matches the
    /// document. Returns whether the anchor is stale afterwards.
    pub fn validate(&mut self, document: &Document) -> bool {
        if self.state == AnchorState::Tracking && self.object.is_stale(document) {
            self.mark_stale(StaleReason::TextChanged);
        }
        matches!(
            self.state,
            AnchorState::Stale(_) | AnchorState::Searching(_)
        )
    }

    /// Runs a re-anchor search for a stale anchor. With candidates the anchor
    /// moves to `Searching`; without, it stays stale.
    pub fn search(
        &mut self,
        document: &Document,
        config: &ReanchorConfig,
    ) -> Result<&[PotentialAnchorObject], LifecycleError> {
        let reason = match self.state {
            AnchorState::Stale(reason) | AnchorState::Searching(reason) => reason,
            _ => return Err(self.invalid("search for")),
        };

        self.candidates = reanchor(&self.object, document, config);
        self.state = if self.candidates.is_empty() {
            AnchorState::Stale(reason)
        } else {
            AnchorState::Searching(reason)
        };
        log::debug!(
            "Anchor {} has {} candidates",
            self.object.anchor_id,
            self.candidates.len()
        );
        Ok(&self.candidates)
    }

    /// Replaces the anchor with one of the offered candidates and resumes
    /// tracking.
    pub fn accept(
        &mut self,
        candidate_id: Uuid,
        document: &Document,
        surrounding_lines: usize,
    ) -> Result<(), LifecycleError> {
        if !matches!(self.state, AnchorState::Searching(_)) {
            return Err(self.invalid("accept a candidate for"));
        }
        let candidate = self
            .candidates
            .iter()
            .find(|candidate| candidate.candidate_id == candidate_id)
            .ok_or(LifecycleError::UnknownCandidate(candidate_id))?;

        self.object = candidate.accept(document, surrounding_lines);
        self.state = AnchorState::Tracking;
        self.candidates.clear();
        log::debug!(
            "Anchor {} accepted relocation to {}",
            self.object.anchor_id,
            self.object.anchor
        );
        Ok(())
    }

    /// Turns down every offered candidate.
    pub fn dismiss(&mut self) -> Result<(), LifecycleError> {
        if !matches!(self.state, AnchorState::Searching(_)) {
            return Err(self.invalid("dismiss candidates for"));
        }
        self.mark_stale(StaleReason::Dismissed);
        Ok(())
    }

    pub fn delete(&mut self) {
        self.state = AnchorState::Deleted;
        self.candidates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;
    use crate::tests::{anchor, capture};
    use pretty_assertions::assert_eq;

    fn tracked() -> (TrackedAnchor, Document) {
        let text = "foo()\nbar()\nbaz()";
        (
            TrackedAnchor::new(capture(text, anchor(1, 0, 1, 5))),
            Document::new(text),
        )
    }

    fn edited(document: &Document, edit: &TextEdit) -> Document {
        let mut document = document.clone();
        document.apply_edit(edit);
        document
    }

    #[test]
    fn test_edits_keep_a_tracking_anchor_tracking() {
        let (mut tracked, document) = tracked();
        let edit = TextEdit::insert(Position::new(0, 0), "// top\n");

        tracked
            .apply_edit(&edit, &edited(&document, &edit), &IndentConfig::default())
            .unwrap();

        assert_eq!(tracked.state, AnchorState::Tracking);
        assert_eq!(tracked.object.anchor, anchor(2, 0, 2, 5));
    }

    #[test]
    fn test_deleting_the_text_makes_the_anchor_stale() {
        let (mut tracked, document) = tracked();
        let edit = TextEdit::delete(Position::new(1, 0), Position::new(2, 0));

        tracked
            .apply_edit(&edit, &edited(&document, &edit), &IndentConfig::default())
            .unwrap();

        assert_eq!(tracked.state, AnchorState::Stale(StaleReason::Deleted));
    }

    #[test]
    fn test_validate_detects_external_changes() {
        let (mut tracked, _) = tracked();
        assert!(!tracked.validate(&Document::new("foo()\nbar()\nbaz()")));
        assert!(tracked.validate(&Document::new("foo()\nqux()\nbaz()")));
        assert_eq!(tracked.state, AnchorState::Stale(StaleReason::TextChanged));
    }

    #[test]
    fn test_search_then_accept_resumes_tracking() {
        let (mut tracked, _) = tracked();
        let moved = Document::new("foo()\nqux()\nbaz()\nbar()");
        tracked.validate(&moved);

        let best = tracked
            .search(&moved, &ReanchorConfig::default())
            .unwrap()
            .first()
            .map(|candidate| candidate.candidate_id)
            .unwrap();
        assert_eq!(
            tracked.state,
            AnchorState::Searching(StaleReason::TextChanged)
        );

        tracked.accept(best, &moved, 5).unwrap();

        assert_eq!(tracked.state, AnchorState::Tracking);
        assert_eq!(tracked.object.anchor, anchor(3, 0, 3, 5));
        assert!(tracked.candidates.is_empty());
        assert!(!tracked.validate(&moved));
    }

    #[test]
    fn test_search_without_results_stays_stale() {
        let (mut tracked, _) = tracked();
        let emptied = Document::new("");
        tracked.validate(&emptied);

        let candidates = tracked.search(&emptied, &ReanchorConfig::default()).unwrap();

        assert!(candidates.is_empty());
        assert_eq!(tracked.state, AnchorState::Stale(StaleReason::TextChanged));
    }

    #[test]
    fn test_dismiss_returns_to_stale() {
        let (mut tracked, _) = tracked();
        let moved = Document::new("foo()\nqux()\nbaz()\nbar()");
        tracked.validate(&moved);
        tracked.search(&moved, &ReanchorConfig::default()).unwrap();

        tracked.dismiss().unwrap();

        assert_eq!(tracked.state, AnchorState::Stale(StaleReason::Dismissed));
        assert!(tracked.candidates.is_empty());
    }

    #[test]
    fn test_tracking_anchor_cannot_be_searched() {
        let (mut tracked, document) = tracked();
        let err = tracked
            .search(&document, &ReanchorConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                action: "search for",
                state: AnchorState::Tracking,
            }
        );
    }

    #[test]
    fn test_unknown_candidate_is_rejected() {
        let (mut tracked, _) = tracked();
        let moved = Document::new("foo()\nqux()\nbaz()\nbar()");
        tracked.validate(&moved);
        tracked.search(&moved, &ReanchorConfig::default()).unwrap();

        let missing = Uuid::new_v4();
        assert_eq!(
            tracked.accept(missing, &moved, 5),
            Err(LifecycleError::UnknownCandidate(missing))
        );
    }

    #[test]
    fn test_deleted_is_final() {
        let (mut tracked, document) = tracked();
        tracked.delete();
        let edit = TextEdit::insert(Position::new(0, 0), "x");

        let result = tracked.apply_edit(&edit, &edited(&document, &edit), &IndentConfig::default());

        assert!(result.is_err());
        assert_eq!(tracked.state, AnchorState::Deleted);
        assert!(!tracked.validate(&document));
    }
}
