use pretty_assertions::assert_eq;
use reanchor_engine::{
    Anchor, AnchorObject, Document, FileIdentity, IndentConfig, Position, ReanchorConfig,
    TextEdit, Translation, reanchor, translate, translate_batch,
};
use rstest::rstest;
use uuid::Uuid;

const SOURCE: &str = "fn run() {\n    let items = load();\n    let total = compute(items);\n    report(total);\n}";

fn anchor(sl: usize, so: usize, el: usize, eo: usize) -> Anchor {
    Anchor::new(Position::new(sl, so), Position::new(el, eo))
}

fn capture(text: &str, range: Anchor) -> AnchorObject {
    AnchorObject::capture(
        &Document::new(text),
        range,
        FileIdentity::from_path("src/run.rs"),
        Uuid::new_v4(),
        Vec::new(),
        5,
    )
}

fn translate_one(text: &str, range: Anchor, edit: &TextEdit) -> Translation {
    let mut document = Document::new(text);
    document.apply_edit(edit);
    translate(&capture(text, range), edit, &document, &IndentConfig::default())
}

#[rstest]
#[case::delete_later_on_line(TextEdit::delete(Position::new(2, 31), Position::new(2, 31)))]
#[case::delete_next_line(TextEdit::delete(Position::new(3, 4), Position::new(3, 10)))]
#[case::delete_to_end(TextEdit::delete(Position::new(3, 0), Position::new(4, 1)))]
fn test_edits_after_the_anchor_leave_it_alone(#[case] edit: TextEdit) {
    let translation = translate_one(SOURCE, anchor(2, 4, 2, 31), &edit);
    assert_eq!(translation, Translation::Unchanged);
}

#[rstest]
#[case::exact_range(anchor(2, 4, 2, 31))]
#[case::whole_line(anchor(2, 0, 3, 0))]
#[case::surrounding_lines(anchor(1, 2, 3, 6))]
#[case::everything(anchor(0, 0, 4, 1))]
fn test_deleting_a_covering_range_deletes(#[case] range: Anchor) {
    let edit = TextEdit::delete(range.start(), range.end());
    let translation = translate_one(SOURCE, anchor(2, 4, 2, 31), &edit);
    assert_eq!(translation, Translation::Deleted);
}

#[test]
fn test_batch_edits_apply_to_the_state_left_by_the_previous_edit() {
    let text = "foo()\nbar()\nbaz()";
    let object = capture(text, anchor(1, 0, 1, 5));
    let edits = [
        TextEdit::insert(Position::new(0, 0), "\n"),
        // Line 2 only holds `bar()` after the first edit.
        TextEdit::insert(Position::new(2, 0), "x"),
    ];

    let batch = translate_batch(&object, &edits, &Document::new(text), &IndentConfig::default());

    let Translation::Updated(updated) = batch.translation else {
        panic!("expected the anchor to move");
    };
    assert_eq!(updated.anchor, anchor(2, 1, 2, 6));
    assert_eq!(updated.anchor_text, "bar()");
    assert_eq!(batch.document.text(), "\nfoo()\nxbar()\nbaz()");
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn test_lines_inserted_above_shift_by_exactly_that_many(#[case] lines: usize) {
    let range = anchor(2, 4, 3, 18);
    let edit = TextEdit::insert(Position::new(0, 0), "// note\n".repeat(lines));

    let Translation::Updated(updated) = translate_one(SOURCE, range, &edit) else {
        panic!("expected the anchor to move");
    };

    assert_eq!(updated.anchor, anchor(2 + lines, 4, 3 + lines, 18));
}

#[test]
fn test_lines_removed_above_shift_up() {
    let edit = TextEdit::delete(Position::new(0, 0), Position::new(1, 0));

    let Translation::Updated(updated) = translate_one(SOURCE, anchor(2, 4, 2, 31), &edit) else {
        panic!("expected the anchor to move");
    };

    assert_eq!(updated.anchor, anchor(1, 4, 1, 31));
}

#[test]
fn test_exact_duplicate_outranks_punctuation_distractors() {
    let object = capture(SOURCE, anchor(2, 4, 2, 31));
    let mut lines: Vec<&str> = ["}", "};", ");", "})"].repeat(10);
    lines.push("    let total = compute(items);");
    lines.extend(["}", "}"]);
    let document = Document::new(&lines.join("\n"));

    let candidates = reanchor(&object, &document, &ReanchorConfig::default());

    let top = &candidates[0];
    assert_eq!(top.anchor, anchor(40, 4, 40, 31));
    assert!(top.weight < ReanchorConfig::default().search.high_similarity_threshold);
    assert!(
        candidates
            .iter()
            .all(|candidate| candidate.anchor_text.chars().any(char::is_alphanumeric)),
        "punctuation-only candidate surfaced: {candidates:?}"
    );
}

#[rstest]
#[case::one_line(anchor(2, 4, 2, 31))]
#[case::multi_line(anchor(1, 4, 3, 18))]
#[case::whole_file(anchor(0, 0, 4, 1))]
#[case::single_token(anchor(2, 16, 2, 31))]
#[case::partial_line(anchor(2, 8, 2, 21))]
fn test_searching_an_unmodified_document_finds_the_original(#[case] range: Anchor) {
    let object = capture(SOURCE, range);
    let document = Document::new(SOURCE);

    let candidates = reanchor(&object, &document, &ReanchorConfig::default());

    let top = &candidates[0];
    assert_eq!(top.anchor, range);
    assert!(top.weight.abs() < 1e-9, "top weight {}", top.weight);
    assert!(candidates.iter().all(|c| c.weight >= top.weight));
}
