/*!
 * # Edit Translation
 *
 * Keeps an anchor's coordinates in step with a live document, one edit at a
 * time, without rescanning the file.
 *
 * ## How an edit is handled
 *
 * 1. **Classification**: [`relation::classify`] places the edit relative to the
 *    anchor in exactly one [`EditRelation`] variant.
 * 2. **Handler**: each variant has one handler in [`translate`] that computes the
 *    new start/end. Indent-only edits (a tab, or one indent unit of spaces
 *    replacing the same amount) are neutralised first.
 * 3. **Settling**: a multi-line anchor whose end lands on column 0 or on a blank
 *    line is pulled back to the last line with content.
 * 4. **Snapshot**: if the edit rewrote text inside the anchor, the cached
 *    `anchor_text` is re-sliced from the post-edit document.
 *
 * ## Ordering
 *
 * Edits reported together must be translated in report order, each against the
 * document produced by the edit before it. [`translate_batch`] does this.
 * Out-of-order input is not detected.
 *
 * ## When translation gives up
 *
 * A full deletion yields [`Translation::Deleted`]; an edit that swallows the
 * anchor and puts new text in its place yields [`Translation::Invalidated`].
 * Both mean the anchor is stale and should go through re-anchor search.
 */

pub mod edit;
pub mod relation;
pub mod translate;

pub use edit::{EditRange, IndentConfig, TextEdit};
pub use relation::{Boundary, EditRelation, classify};
pub use translate::{
    AnchorShift, BatchTranslation, Translation, translate, translate_anchor, translate_batch,
};
