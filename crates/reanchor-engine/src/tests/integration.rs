use super::*;
use crate::editing::{IndentConfig, TextEdit, Translation, translate_batch};
use crate::lifecycle::{AnchorState, TrackedAnchor};
use crate::search::ReanchorConfig;
use pretty_assertions::assert_eq;

const SOURCE: &str = "fn main() {\n    let items = load();\n    let total = compute(&items);\n    println!(\"{total}\");\n}\n";

#[test]
fn test_editing_session_keeps_anchor_on_its_text() {
    // Given an anchor on the `let total` line
    let object = capture(SOURCE, anchor(2, 4, 2, 32));
    let document = Document::new(SOURCE);

    // When the user adds a comment above, indents the line and renames a variable
    let edits = [
        TextEdit::insert(Position::new(0, 0), "// entry point\n"),
        TextEdit::insert(Position::new(3, 0), "    "),
        TextEdit::replace(Position::new(2, 8), Position::new(2, 13), "things"),
    ];
    let batch = translate_batch(&object, &edits, &document, &IndentConfig::default());

    // Then the anchor moved down a line and still covers the same statement
    let Translation::Updated(updated) = batch.translation else {
        panic!("expected the anchor to move");
    };
    assert_eq!(updated.anchor.start_line, 3);
    assert_eq!(updated.anchor_text, "let total = compute(&items);");
    assert!(!updated.is_stale(&batch.document));
}

#[test]
fn test_stale_anchor_is_recovered_through_search() {
    // Given a tracked anchor on the `let total` line
    let mut tracked = TrackedAnchor::new(capture(SOURCE, anchor(2, 4, 2, 32)));

    // When the file is rewritten outside the editor with the line moved down
    let rewritten = Document::new(
        "fn main() {\n    let items = load();\n    log(\"loaded\");\n    check(&items);\n    let total = compute(&items);\n    println!(\"{total}\");\n}\n",
    );
    assert!(tracked.validate(&rewritten));

    // Then search offers the moved line first and accepting it resumes tracking
    let best = tracked
        .search(&rewritten, &ReanchorConfig::default())
        .unwrap()
        .first()
        .cloned()
        .unwrap();
    assert_eq!(best.anchor, anchor(4, 4, 4, 32));

    tracked.accept(best.candidate_id, &rewritten, 5).unwrap();
    assert_eq!(tracked.state, AnchorState::Tracking);
    assert_eq!(tracked.object.anchor_text, "let total = compute(&items);");
}
