use crate::editing::TextEdit;
use crate::models::Anchor;

/// Which anchor boundary an edit contained in the anchor touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Edit starts exactly at the anchor start and ends inside it.
    TouchesStart,
    /// Edit lies strictly inside the anchor.
    Interior,
    /// Edit ends exactly at the anchor end.
    TouchesEnd,
}

/// Where one edit sits relative to one anchor.
///
/// Every (anchor, edit) pair maps to exactly one variant, and each variant has
/// exactly one handler in [`super::translate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRelation {
    /// Inserts nothing and removes nothing.
    Empty,
    /// Removes the whole anchor and inserts nothing.
    Deletes,
    /// Starts after the anchor end (or is a pure insertion at the end).
    After,
    /// Ends on a line above the anchor start line.
    Above,
    /// Ends at or before the anchor start, on the anchor start line. Pure
    /// insertions at the anchor start land here and push the anchor forward.
    BeforeStartOnLine,
    /// Lies within the anchor.
    Inside(Boundary),
    /// Starts within the anchor and runs past its end.
    OverlapsEnd,
    /// Starts before the anchor and ends inside it.
    OverlapsStart,
    /// Swallows the whole anchor and inserts new text in its place along with
    /// text outside it. There is no way to tell where the anchor went.
    Replaces,
}

impl EditRelation {
    /// True when the handler for this relation rewrites text inside the anchor.
    pub fn touches_content(&self) -> bool {
        matches!(
            self,
            EditRelation::Inside(_) | EditRelation::OverlapsEnd | EditRelation::OverlapsStart
        )
    }
}

/// Classifies `edit` against `anchor`. Positions are compared in pre-edit
/// coordinates.
pub fn classify(anchor: &Anchor, edit: &TextEdit) -> EditRelation {
    let (start, end) = if edit.start() <= edit.end() {
        (edit.start(), edit.end())
    } else {
        (edit.end(), edit.start())
    };
    let (anchor_start, anchor_end) = (anchor.start(), anchor.end());
    let inserts = !edit.text.is_empty();

    if edit.is_noop() {
        return EditRelation::Empty;
    }
    if !inserts && start <= anchor_start && end >= anchor_end {
        return EditRelation::Deletes;
    }
    if start > anchor_end || (start == anchor_end && !anchor.is_empty()) {
        return EditRelation::After;
    }
    if end <= anchor_start {
        return if end.line < anchor_start.line {
            EditRelation::Above
        } else {
            EditRelation::BeforeStartOnLine
        };
    }
    if start < anchor_start {
        return if end < anchor_end {
            EditRelation::OverlapsStart
        } else {
            EditRelation::Replaces
        };
    }
    if end < anchor_end {
        let boundary = if start == anchor_start {
            Boundary::TouchesStart
        } else {
            Boundary::Interior
        };
        return EditRelation::Inside(boundary);
    }
    if end == anchor_end {
        return EditRelation::Inside(Boundary::TouchesEnd);
    }
    EditRelation::OverlapsEnd
}
