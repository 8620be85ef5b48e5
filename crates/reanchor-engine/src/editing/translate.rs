use crate::document::Document;
use crate::editing::relation::{Boundary, EditRelation, classify};
use crate::editing::{IndentConfig, TextEdit};
use crate::models::{Anchor, AnchorObject, AnchorType, Position};

/// Coordinate-level result of pushing one anchor through one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorShift {
    Unchanged,
    Moved {
        anchor: Anchor,
        /// Text inside the anchor was rewritten, so the cached snapshot is out
        /// of date.
        content_changed: bool,
    },
    Deleted,
    Invalidated,
}

/// Result of translating an [`AnchorObject`] through one edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    Unchanged,
    Updated(AnchorObject),
    /// The edit removed everything the anchor covered.
    Deleted,
    /// The edit replaced the anchor along with surrounding text; the anchor has
    /// to be relocated by search.
    Invalidated,
}

impl Translation {
    /// True for outcomes after which the anchor can no longer be tracked
    /// incrementally.
    pub fn needs_reanchor(&self) -> bool {
        matches!(self, Translation::Deleted | Translation::Invalidated)
    }
}

/// Outcome of translating through a batch of edits, together with the document
/// state after the last edit of the batch.
#[derive(Debug, Clone)]
pub struct BatchTranslation {
    pub translation: Translation,
    pub document: Document,
}

/// Edit positions needed by the handlers, with the indent filter applied.
struct EditGeometry {
    start: Position,
    end: Position,
    inserted_end: Position,
    diff: isize,
    is_deletion: bool,
    indent_only: bool,
}

impl EditGeometry {
    fn new(edit: &TextEdit, indent: &IndentConfig) -> Self {
        let (start, end) = if edit.start() <= edit.end() {
            (edit.start(), edit.end())
        } else {
            (edit.end(), edit.start())
        };

        // Auto-indent replaces an indent unit with one of the same size. Take
        // the replaced length as the inserted length so no drift is applied.
        let indent_only =
            indent.is_indent_unit(&edit.text) && edit.text_length() == edit.range_length;
        let inserted_end = if indent_only {
            Position::new(start.line, start.offset + edit.range_length)
        } else {
            edit.inserted_end()
        };

        Self {
            start,
            end,
            inserted_end,
            diff: edit.diff(),
            is_deletion: edit.text.is_empty(),
            indent_only,
        }
    }

    /// Post-edit location of a position at or after the edit end.
    fn shift_past(&self, position: Position) -> Position {
        if position.line == self.end.line {
            Position::new(
                self.inserted_end.line,
                self.inserted_end.offset + position.offset.saturating_sub(self.end.offset),
            )
        } else {
            Position::new(shift_line(position.line, self.diff), position.offset)
        }
    }
}

fn shift_line(line: usize, diff: isize) -> usize {
    line.saturating_add_signed(diff)
}

/// Pushes `anchor` through `edit` without looking at any document.
pub fn translate_anchor(anchor: &Anchor, edit: &TextEdit, indent: &IndentConfig) -> AnchorShift {
    let relation = classify(anchor, edit);
    let geometry = EditGeometry::new(edit, indent);
    log::trace!("anchor {anchor} vs edit {}-{}: {relation:?}", geometry.start, geometry.end);

    let shift = match relation {
        EditRelation::Empty | EditRelation::After => AnchorShift::Unchanged,
        EditRelation::Deletes => AnchorShift::Deleted,
        EditRelation::Replaces => AnchorShift::Invalidated,
        EditRelation::Above => shift_from_above(anchor, &geometry),
        EditRelation::BeforeStartOnLine => shift_from_start_line(anchor, &geometry),
        EditRelation::Inside(boundary) => shift_inside(anchor, &geometry, boundary),
        EditRelation::OverlapsEnd => shift_back_boundary(anchor, &geometry),
        EditRelation::OverlapsStart => shift_front_boundary(anchor, &geometry),
    };

    match shift {
        AnchorShift::Moved {
            anchor: moved,
            content_changed,
        } if moved == *anchor && !content_changed => AnchorShift::Unchanged,
        other => other,
    }
}

fn moved(anchor: Anchor, content_changed: bool) -> AnchorShift {
    AnchorShift::Moved {
        anchor,
        content_changed,
    }
}

/// Edit ends on a line above the anchor: only line numbers move.
fn shift_from_above(anchor: &Anchor, geometry: &EditGeometry) -> AnchorShift {
    if geometry.diff == 0 {
        return AnchorShift::Unchanged;
    }
    let mut shifted = *anchor;
    shifted.start_line = shift_line(anchor.start_line, geometry.diff);
    shifted.end_line = shift_line(anchor.end_line, geometry.diff);
    moved(shifted, false)
}

/// Edit ends on the anchor's start line at or before its start. Covers both the
/// same-line offset shift and newlines typed right at the anchor start; a
/// single-line anchor keeps its length.
fn shift_from_start_line(anchor: &Anchor, geometry: &EditGeometry) -> AnchorShift {
    let start = geometry.shift_past(anchor.start());
    let end = geometry.shift_past(anchor.end());
    moved(Anchor::new(start, end), false)
}

/// Edit lies inside the anchor: the start stays, the end follows the edit.
fn shift_inside(anchor: &Anchor, geometry: &EditGeometry, boundary: Boundary) -> AnchorShift {
    let end = match boundary {
        Boundary::TouchesStart | Boundary::Interior => geometry.shift_past(anchor.end()),
        Boundary::TouchesEnd => geometry.inserted_end,
    };
    moved(Anchor::new(anchor.start(), end), !geometry.indent_only)
}

/// Edit runs past the anchor end: shrink to the edit start, or grow to cover
/// the inserted text.
fn shift_back_boundary(anchor: &Anchor, geometry: &EditGeometry) -> AnchorShift {
    let end = if geometry.is_deletion {
        geometry.start
    } else {
        geometry.inserted_end
    };
    moved(Anchor::new(anchor.start(), end), true)
}

/// Edit starts before the anchor and ends inside it: the start moves to the edit
/// start (the removed prefix is gone, or the inserted text now leads the
/// anchor) and the end follows the edit.
fn shift_front_boundary(anchor: &Anchor, geometry: &EditGeometry) -> AnchorShift {
    let end = geometry.shift_past(anchor.end());
    moved(Anchor::new(geometry.start, end), true)
}

/// Pulls a multi-line anchor's end back off trailing blank lines, or off a line
/// it only reaches at column 0.
fn settle_end(anchor: Anchor, document: &Document) -> Anchor {
    if anchor.is_single_line() {
        return anchor;
    }
    if anchor.end_offset > 0 && !document.is_blank_line(anchor.end_line) {
        return anchor;
    }

    let mut line = if anchor.end_offset == 0 {
        anchor.end_line - 1
    } else {
        anchor.end_line
    };
    while line > anchor.start_line && document.is_blank_line(line) {
        line -= 1;
    }

    let offset = document.line_len(line);
    let offset = if line == anchor.start_line {
        offset.max(anchor.start_offset)
    } else {
        offset
    };
    Anchor::new(anchor.start(), Position::new(line, offset))
}

/// Translates one anchor object through one edit.
///
/// `document` must be the state *after* `edit` has been applied. Edits of one
/// change event have to be fed in report order, each with the document state
/// that follows it; see [`translate_batch`].
pub fn translate(
    object: &AnchorObject,
    edit: &TextEdit,
    document: &Document,
    indent: &IndentConfig,
) -> Translation {
    match translate_anchor(&object.anchor, edit, indent) {
        AnchorShift::Unchanged => Translation::Unchanged,
        AnchorShift::Deleted => {
            log::debug!("anchor {} deleted by edit", object.anchor_id);
            Translation::Deleted
        }
        AnchorShift::Invalidated => {
            log::debug!("anchor {} invalidated by edit", object.anchor_id);
            Translation::Invalidated
        }
        AnchorShift::Moved {
            anchor,
            content_changed,
        } => {
            // Only rewritten content may leave the end dangling on blank lines.
            let settled = if content_changed {
                document.clamp(&settle_end(anchor, document))
            } else {
                document.clamp(&anchor)
            };
            let mut updated = object.clone();
            updated.anchor = settled;
            if content_changed || settled != anchor {
                updated.anchor_text = document.slice(&settled);
            }
            updated.anchor_type = AnchorType::classify(&settled, document);
            log::debug!(
                "anchor {} moved {} -> {}",
                object.anchor_id,
                object.anchor,
                settled
            );
            Translation::Updated(updated)
        }
    }
}

/// Applies `edits` in order to `document` (the pre-edit state) and translates
/// the anchor through each one against the document produced by the previous
/// step. Stops translating at the first deletion or invalidation, but always
/// returns the document with every edit applied.
pub fn translate_batch(
    object: &AnchorObject,
    edits: &[TextEdit],
    document: &Document,
    indent: &IndentConfig,
) -> BatchTranslation {
    let mut document = document.clone();
    let mut current: Option<AnchorObject> = None;
    let mut terminal: Option<Translation> = None;

    for edit in edits {
        document.apply_edit(edit);
        if terminal.is_some() {
            continue;
        }
        let base = current.as_ref().unwrap_or(object);
        match translate(base, edit, &document, indent) {
            Translation::Unchanged => {}
            Translation::Updated(updated) => current = Some(updated),
            other => terminal = Some(other),
        }
    }

    let translation = match (terminal, current) {
        (Some(terminal), _) => terminal,
        (None, Some(updated)) if updated != *object => Translation::Updated(updated),
        (None, _) => Translation::Unchanged,
    };
    BatchTranslation {
        translation,
        document,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{anchor, capture};
    use pretty_assertions::assert_eq;

    fn p(line: usize, offset: usize) -> Position {
        Position::new(line, offset)
    }

    fn apply(text: &str, object: &AnchorObject, edit: &TextEdit) -> (Translation, Document) {
        let mut document = Document::new(text);
        document.apply_edit(edit);
        let translation = translate(object, edit, &document, &IndentConfig::default());
        (translation, document)
    }

    fn updated(translation: Translation) -> AnchorObject {
        match translation {
            Translation::Updated(object) => object,
            other => panic!("expected an updated anchor, got {other:?}"),
        }
    }

    #[test]
    fn test_newline_above_shifts_lines_only() {
        let text = "foo()\nbar()\nbaz()";
        let object = capture(text, anchor(1, 0, 1, 5));

        let (translation, _) = apply(text, &object, &TextEdit::insert(p(0, 0), "\n"));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(2, 0, 2, 5));
        assert_eq!(object.anchor_text, "bar()");
    }

    #[test]
    fn test_line_shift_keeps_whole_line_anchor_ending_at_column_zero() {
        let text = "x\na\nb\nc";
        let object = capture(text, anchor(1, 0, 3, 0));
        assert_eq!(object.anchor_text, "a\nb\n");

        let (translation, document) = apply(text, &object, &TextEdit::insert(p(0, 0), "\n"));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(2, 0, 4, 0));
        assert_eq!(object.anchor_text, "a\nb\n");
        assert!(!object.is_stale(&document));
    }

    #[test]
    fn test_removing_lines_above_shifts_up() {
        let text = "a\nb\nc\nbar()\n";
        let object = capture(text, anchor(3, 0, 3, 5));

        let (translation, _) = apply(text, &object, &TextEdit::delete(p(0, 0), p(2, 0)));

        assert_eq!(updated(translation).anchor, anchor(1, 0, 1, 5));
    }

    #[test]
    fn test_same_line_insert_before_start_shifts_offsets() {
        let text = "let x = bar();";
        let object = capture(text, anchor(0, 8, 0, 13));

        let (translation, _) = apply(text, &object, &TextEdit::insert(p(0, 4), "mut "));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 12, 0, 17));
        assert_eq!(object.anchor_text, "bar()");
    }

    #[test]
    fn test_same_line_edit_before_multi_line_anchor_keeps_end() {
        let text = "    call(a,\n         b);";
        let object = capture(text, anchor(0, 4, 1, 12));

        let (translation, _) = apply(text, &object, &TextEdit::delete(p(0, 0), p(0, 2)));

        assert_eq!(updated(translation).anchor, anchor(0, 2, 1, 12));
    }

    #[test]
    fn test_enter_at_anchor_start_moves_start_down() {
        let text = "x = foo(1)";
        let object = capture(text, anchor(0, 4, 0, 10));

        let (translation, document) = apply(text, &object, &TextEdit::insert(p(0, 4), "\n    "));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(1, 4, 1, 10));
        assert_eq!(document.slice(&object.anchor), "foo(1)");
        assert_eq!(object.anchor_text, "foo(1)");
    }

    #[test]
    fn test_typing_inside_single_line_anchor_grows_end() {
        let text = "foo(bar)";
        let object = capture(text, anchor(0, 0, 0, 8));

        let (translation, _) = apply(text, &object, &TextEdit::insert(p(0, 7), ", baz"));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 0, 0, 13));
        assert_eq!(object.anchor_text, "foo(bar, baz)");
    }

    #[test]
    fn test_newlines_inside_multi_line_anchor_push_end_down() {
        let text = "fn a() {\n    one();\n}";
        let object = capture(text, anchor(0, 0, 2, 1));

        let (translation, _) = apply(text, &object, &TextEdit::insert(p(1, 10), "\n    two();"));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 0, 3, 1));
        assert_eq!(object.anchor_text, "fn a() {\n    one();\n    two();\n}");
    }

    #[test]
    fn test_replacing_anchor_tail_tracks_inserted_end() {
        let text = "value = old_name";
        let object = capture(text, anchor(0, 8, 0, 16));

        let (translation, _) = apply(
            text,
            &object,
            &TextEdit::replace(p(0, 12), p(0, 16), "identifier"),
        );
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 8, 0, 22));
        assert_eq!(object.anchor_text, "old_identifier");
    }

    #[test]
    fn test_deleting_past_anchor_end_shrinks_it() {
        let text = "one\ntwo\nthree\nfour";
        let object = capture(text, anchor(0, 0, 2, 5));

        let (translation, _) = apply(text, &object, &TextEdit::delete(p(1, 1), p(3, 2)));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 0, 1, 1));
        assert_eq!(object.anchor_text, "one\nt");
    }

    #[test]
    fn test_deleting_across_anchor_start_pulls_start_back() {
        let text = "alpha beta gamma";
        let object = capture(text, anchor(0, 6, 0, 16));

        let (translation, _) = apply(text, &object, &TextEdit::delete(p(0, 2), p(0, 8)));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 2, 0, 10));
        assert_eq!(object.anchor_text, "ta gamma");
    }

    #[test]
    fn test_trailing_blank_end_line_is_trimmed() {
        let text = "a {\n  b\n}\ntail";
        let object = capture(text, anchor(0, 0, 2, 1));

        // Wipe the closing brace line's content; the end now sits on a blank line.
        let (translation, _) = apply(text, &object, &TextEdit::delete(p(2, 0), p(2, 1)));
        let object = updated(translation);

        assert_eq!(object.anchor, anchor(0, 0, 1, 3));
        assert_eq!(object.anchor_text, "a {\n  b");
    }

    #[test]
    fn test_full_deletion_reports_deleted() {
        let text = "foo()\nbar()\nbaz()";
        let object = capture(text, anchor(1, 0, 1, 5));

        let (translation, _) = apply(text, &object, &TextEdit::delete(p(1, 0), p(1, 5)));

        assert_eq!(translation, Translation::Deleted);
        assert!(translation.needs_reanchor());
    }

    #[test]
    fn test_replacement_swallowing_anchor_is_invalidated() {
        let text = "foo()\nbar()\nbaz()";
        let object = capture(text, anchor(1, 0, 1, 5));

        let (translation, _) =
            apply(text, &object, &TextEdit::replace(p(0, 2), p(2, 1), "pasted"));

        assert_eq!(translation, Translation::Invalidated);
    }

    #[test]
    fn test_indent_unit_at_anchor_start_is_ignored() {
        let text = "    call();";
        let object = capture(text, anchor(0, 4, 0, 11));
        let edit = TextEdit::new(p(0, 0), p(0, 4), "    ", 4);

        let (translation, _) = apply(text, &object, &edit);

        assert_eq!(translation, Translation::Unchanged);
    }

    #[test]
    fn test_batch_applies_edits_against_running_document() {
        let text = "foo()\nbar()\nbaz()";
        let object = capture(text, anchor(1, 0, 1, 5));
        // The second edit is expressed in coordinates produced by the first.
        let edits = vec![
            TextEdit::insert(p(0, 0), "\n"),
            TextEdit::insert(p(2, 3), "_x"),
        ];

        let batch = translate_batch(&object, &edits, &Document::new(text), &IndentConfig::default());
        let object = updated(batch.translation);

        assert_eq!(batch.document.text(), "\nfoo()\nbar_x()\nbaz()");
        assert_eq!(object.anchor, anchor(2, 0, 2, 7));
        assert_eq!(object.anchor_text, "bar_x()");
    }

    #[test]
    fn test_batch_stops_translating_after_deletion() {
        let text = "foo()\nbar()\nbaz()";
        let object = capture(text, anchor(1, 0, 1, 5));
        let edits = vec![
            TextEdit::delete(p(1, 0), p(1, 5)),
            TextEdit::insert(p(0, 0), "// header\n"),
        ];

        let batch = translate_batch(&object, &edits, &Document::new(text), &IndentConfig::default());

        assert_eq!(batch.translation, Translation::Deleted);
        assert_eq!(batch.document.text(), "// header\nfoo()\n\nbaz()");
    }
}
